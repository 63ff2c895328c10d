// tests/property.rs

use std::path::{Path, PathBuf};

use proptest::prelude::*;

use mackerel::assets::script::concat_sources;
use mackerel::engine::{CoreCommand, CoreRuntime, RuntimeEvent, TaskOutcome};
use mackerel::fs::mock::MockFileSystem;
use mackerel::pipeline::sources::{build_globset, collect_sorted};
use mackerel::types::{AssetKind, OverlapPolicy};

// Unique relative script paths, up to two directories deep.
fn script_paths() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::btree_set("[a-c]{1,2}(/[a-c]{1,2}){0,2}", 1..12)
        .prop_map(|set| set.into_iter().map(|p| format!("{p}.js")).collect())
}

fn bundle(files: &[String]) -> Vec<u8> {
    let fs = MockFileSystem::new();
    for rel in files {
        fs.add_file(Path::new("/s/js").join(rel), rel.as_bytes().to_vec());
    }
    let set = build_globset(&["**/*.js".to_string()]).unwrap();
    let sources = collect_sorted(&fs, Path::new("/s/js"), &set).unwrap();
    concat_sources(&fs, &sources, "\n").unwrap()
}

proptest! {
    #[test]
    fn bundle_does_not_depend_on_creation_order(
        files in script_paths(),
        seed in any::<u64>(),
    ) {
        let mut shuffled = files.clone();
        // Deterministic rotate + reverse; enough to change insertion order.
        let n = shuffled.len();
        shuffled.rotate_left((seed as usize) % n);
        if seed % 2 == 0 {
            shuffled.reverse();
        }

        prop_assert_eq!(bundle(&files), bundle(&shuffled));
    }

    #[test]
    fn every_source_appears_exactly_once(files in script_paths()) {
        let out = String::from_utf8(bundle(&files)).unwrap();
        let parts: Vec<&str> = out.split('\n').collect();
        prop_assert_eq!(parts.len(), files.len());
        for rel in &files {
            prop_assert_eq!(parts.iter().filter(|p| **p == rel.as_str()).count(), 1);
        }
    }

    #[test]
    fn queued_category_never_runs_concurrently(
        // true = change arrives, false = the running binding completes
        events in proptest::collection::vec(any::<bool>(), 1..60),
        queue_length in 1usize..4,
    ) {
        let kind = AssetKind::Style;
        let mut core = CoreRuntime::new([kind], OverlapPolicy::Queue, queue_length);
        let mut started = 0usize;
        let mut changes = 0usize;

        for is_change in events {
            let event = if is_change {
                changes += 1;
                RuntimeEvent::SourceChanged { kind, path: PathBuf::from("x.scss") }
            } else if core.active(kind) > 0 {
                RuntimeEvent::BindingCompleted { kind, outcome: TaskOutcome::Success }
            } else {
                continue;
            };

            let step = core.step(event);
            prop_assert!(step.keep_running);
            started += step
                .commands
                .iter()
                .filter(|c| matches!(c, CoreCommand::RunBinding(k) if *k == kind))
                .count();

            prop_assert!(core.active(kind) <= 1);
            prop_assert!(started <= changes);
        }

        // Draining completions runs at most `queue_length` more times.
        let before_drain = started;
        while core.active(kind) > 0 {
            let step = core.step(RuntimeEvent::BindingCompleted { kind, outcome: TaskOutcome::Success });
            started += step.commands.len();
        }
        prop_assert!(started - before_drain <= queue_length);
        prop_assert!(core.is_idle());
        prop_assert!(core.queue_is_empty());
    }
}
