// tests/asset_script.rs

mod common;
use crate::common::{init_tracing, Site};

use mackerel::assets::ScriptTask;
use mackerel::config::ConfigFile;
use mackerel::errors::MackerelError;
use mackerel::pipeline::sources::build_globset;
use mackerel::pipeline::Stage;
use mackerel::types::AssetKind;
use mackerel_test_utils::transforms::{fails_on, identity, squeeze, wrap, FnTransform};
use std::sync::Arc;

fn task(site: &Site, lint: Arc<FnTransform>, minify: Arc<FnTransform>) -> ScriptTask {
    let cfg = ConfigFile::builtin();
    let paths = site.paths(&cfg);
    ScriptTask {
        fs: site.fs(),
        src_dir: paths.source_dir(AssetKind::Script).to_path_buf(),
        include: build_globset(&cfg.script.include).unwrap(),
        dest_dir: paths.dest_dir(AssetKind::Script).to_path_buf(),
        bundle: cfg.script.bundle.clone(),
        separator: cfg.script.separator.clone(),
        transpile: Stage::rewrite("transpile", wrap("babel")),
        lint: Some(Stage::gate("lint", lint)),
        minify: Stage::rewrite("minify", minify),
    }
}

#[tokio::test]
async fn sources_are_bundled_in_sorted_depth_first_order() {
    init_tracing();
    let site = Site::new();
    site.write("src/js/zeta.js", "z");
    site.write("src/js/lib/b.js", "b");
    site.write("src/js/alpha.js", "a");
    site.write("src/js/lib/a.js", "la");
    site.write("src/js/README.md", "not a script");

    let report = task(&site, identity("eslint"), squeeze("uglify"))
        .build()
        .await
        .unwrap();

    assert_eq!(site.read_string("dist/js/index.js"), "babel(a\nla\nb\nz)");
    assert_eq!(site.read_string("dist/js/index.min.js"), "babel(a\nla\nb\nz)".replace('\n', ""));
    assert_eq!(
        report.written,
        vec![site.path("dist/js/index.js"), site.path("dist/js/index.min.js")]
    );
}

#[tokio::test]
async fn bundle_is_stable_across_rebuilds() {
    init_tracing();
    let site = Site::new();
    for name in ["c.js", "a.js", "b/x.js", "b/a.js"] {
        site.write(&format!("src/js/{name}"), name);
    }

    let t = task(&site, identity("eslint"), squeeze("uglify"));
    t.build().await.unwrap();
    let first = site.read("dist/js/index.js");
    t.build().await.unwrap();
    assert_eq!(site.read("dist/js/index.js"), first);
}

#[tokio::test]
async fn lint_failure_fails_the_task_and_keeps_previous_outputs() {
    init_tracing();
    let site = Site::new();
    site.write("src/js/app.js", "undefinedThing()");
    site.write("dist/js/index.js", "previous");
    site.write("dist/js/index.min.js", "previous-min");

    let lint = fails_on(
        "eslint",
        "undefinedThing",
        "index.js:1:1: 'undefinedThing' is not defined. [Error/no-undef]",
    );
    let minify = squeeze("uglify");
    let err = task(&site, lint, minify.clone()).build().await.unwrap_err();

    assert!(matches!(err, MackerelError::LintFailed { count: 1, .. }), "{err}");
    assert_eq!(site.read_string("dist/js/index.js"), "previous");
    assert_eq!(site.read_string("dist/js/index.min.js"), "previous-min");
    assert_eq!(minify.calls(), 0);
}

#[tokio::test]
async fn linter_sees_the_transpiled_bundle() {
    init_tracing();
    let site = Site::new();
    site.write("src/js/one.js", "1");
    site.write("src/js/two.js", "2");

    let lint = identity("eslint");
    task(&site, lint.clone(), squeeze("uglify")).build().await.unwrap();

    assert_eq!(lint.seen(), vec![b"babel(1\n2)".to_vec()]);
}

#[tokio::test]
async fn empty_source_directory_produces_nothing() {
    init_tracing();
    let site = Site::new();
    std::fs::create_dir_all(site.path("src/js")).unwrap();

    let report = task(&site, identity("eslint"), squeeze("uglify"))
        .build()
        .await
        .unwrap();

    assert!(report.written.is_empty());
    assert!(!site.exists("dist/js/index.js"));
}
