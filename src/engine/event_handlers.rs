// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::engine::queue::TriggerQueue;
use crate::engine::TaskOutcome;
use crate::types::{AssetKind, OverlapPolicy};

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreCommand {
    /// Start one run of the category's watch binding.
    RunBinding(AssetKind),
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn continue_with(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

/// In-flight binding runs per bound category.
#[derive(Debug, Default)]
pub struct ActiveRuns {
    active: BTreeMap<AssetKind, usize>,
}

impl ActiveRuns {
    pub fn new(kinds: impl IntoIterator<Item = AssetKind>) -> Self {
        Self {
            active: kinds.into_iter().map(|k| (k, 0)).collect(),
        }
    }

    pub fn is_bound(&self, kind: AssetKind) -> bool {
        self.active.contains_key(&kind)
    }

    pub fn active(&self, kind: AssetKind) -> usize {
        self.active.get(&kind).copied().unwrap_or(0)
    }

    pub fn is_idle(&self) -> bool {
        self.active.values().all(|&n| n == 0)
    }

    fn start(&mut self, kind: AssetKind) -> CoreCommand {
        *self.active.entry(kind).or_insert(0) += 1;
        CoreCommand::RunBinding(kind)
    }

    fn finish(&mut self, kind: AssetKind) -> bool {
        match self.active.get_mut(&kind) {
            Some(n) if *n > 0 => {
                *n -= 1;
                true
            }
            _ => false,
        }
    }
}

/// Handle a source change for `kind`.
///
/// - Idle category: start its binding.
/// - Busy category: apply the overlap policy.
pub fn handle_source_change(
    runs: &mut ActiveRuns,
    queue: &mut TriggerQueue,
    policy: OverlapPolicy,
    kind: AssetKind,
) -> CoreStep {
    if !runs.is_bound(kind) {
        debug!(kind = %kind, "change for unbound category; ignoring");
        return CoreStep::continue_with(Vec::new());
    }

    if runs.active(kind) == 0 {
        return CoreStep::continue_with(vec![runs.start(kind)]);
    }

    let commands = match policy {
        OverlapPolicy::Queue => {
            queue.record(kind);
            Vec::new()
        }
        OverlapPolicy::Drop => {
            debug!(kind = %kind, "binding busy; dropping change");
            Vec::new()
        }
        OverlapPolicy::Overlap => vec![runs.start(kind)],
    };
    CoreStep::continue_with(commands)
}

/// Handle the end of one binding run: the category becomes idle (whatever
/// the outcome) and a queued rerun, if any, starts.
pub fn handle_binding_completion(
    runs: &mut ActiveRuns,
    queue: &mut TriggerQueue,
    kind: AssetKind,
    outcome: TaskOutcome,
) -> CoreStep {
    if !runs.finish(kind) {
        warn!(kind = %kind, "completion for a binding that was not running");
    }
    match outcome {
        TaskOutcome::Success => info!(kind = %kind, "watch binding finished"),
        TaskOutcome::Failed => warn!(kind = %kind, "watch binding finished with failures"),
    }

    let mut commands = Vec::new();
    if runs.active(kind) == 0 && queue.take(kind) {
        commands.push(runs.start(kind));
    }
    CoreStep::continue_with(commands)
}
