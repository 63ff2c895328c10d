// tests/commands_e2e.rs
#![cfg(unix)]

mod common;
use crate::common::{init_tracing, with_timeout, Site};

use std::sync::Arc;
use std::time::Duration;

use mackerel::config::ConfigFile;
use mackerel::dag::{Runner, TaskOutcome};
use mackerel::tasks::{build_app, App, DEFAULT_TASK};
use mackerel_test_utils::builders::ConfigFileBuilder;

/// Stock layout with plain unix tools standing in for the node toolchain.
fn config() -> ConfigFile {
    ConfigFileBuilder::new()
        .without_server()
        .edit(|raw| {
            raw.template.compile = "tr 'a-z' 'A-Z'".to_string();
            raw.template.validate = None;

            raw.style.compile = "cat".to_string();
            raw.style.fix = None;
            raw.style.report = Some("grep -n '!important' | sed 's/^/index.css:/' ; true".to_string());
            raw.style.postprocess = vec!["sed 's/;}/}/g'".to_string()];
            raw.style.minify = "tr -d ' \\n'".to_string();

            raw.script.transpile = "cat".to_string();
            raw.script.lint = Some("if grep -q debugger; then echo 'index.js:1:1: unexpected debugger' >&2; exit 1; fi".to_string());
            raw.script.minify = "tr -d ' \\n'".to_string();

            raw.images.compress.clear();
            raw.images
                .compress
                .insert("svg".to_string(), "sed 's/  */ /g'".to_string());
        })
        .build()
}

fn app(site: &Site, cfg: &ConfigFile) -> App {
    build_app(cfg, &site.paths(cfg), site.fs()).unwrap()
}

fn seed(site: &Site) {
    site.write("src/pug/index.pug", "hello");
    site.write("src/scss/index.scss", "a { color: red; }\n");
    site.write("src/js/a.js", "var a = 1;");
    site.write("src/js/lib/b.js", "var b = 2;");
    site.write("src/images/logo.svg", "<svg    width=\"1\"/>");
    site.write("src/images/photo.png", "PNG");
}

#[tokio::test]
async fn each_asset_task_builds_its_outputs() {
    init_tracing();
    let site = Site::new();
    seed(&site);
    let cfg = config();
    let runner = Runner::new(Arc::clone(&app(&site, &cfg).registry));

    for task in ["html", "css", "js", "images"] {
        let outcome = with_timeout(runner.run(task)).await.unwrap();
        assert_eq!(outcome, TaskOutcome::Success, "{task}");
    }

    assert_eq!(site.read_string("dist/html/index.html"), "HELLO");
    assert_eq!(site.read_string("dist/css/index.css"), "a { color: red; }\n");
    assert_eq!(site.read_string("dist/css/index.min.css"), "a{color:red;}");
    assert_eq!(site.read_string("dist/js/index.js"), "var a = 1;\nvar b = 2;");
    assert_eq!(site.read_string("dist/js/index.min.js"), "vara=1;varb=2;");
    assert_eq!(site.read_string("dist/images/logo.svg"), "<svg width=\"1\"/>");
    assert_eq!(site.read_string("dist/images/photo.png"), "PNG");
}

#[tokio::test]
async fn failing_lint_fails_only_the_script_task() {
    init_tracing();
    let site = Site::new();
    seed(&site);
    site.write("src/js/c.js", "debugger;");
    let cfg = config();
    let runner = Runner::new(Arc::clone(&app(&site, &cfg).registry));

    assert_eq!(runner.run("js").await.unwrap(), TaskOutcome::Failed);
    assert!(!site.exists("dist/js/index.js"));

    assert_eq!(runner.run("css").await.unwrap(), TaskOutcome::Success);
    assert!(site.exists("dist/css/index.min.css"));
}

#[tokio::test]
async fn default_builds_everything_then_rebuilds_on_change() {
    init_tracing();
    let site = Site::new();
    seed(&site);
    let cfg = config();
    let app = app(&site, &cfg);
    let runner = Runner::new(Arc::clone(&app.registry));

    let outcome = with_timeout(runner.run(DEFAULT_TASK)).await.unwrap();
    assert_eq!(outcome, TaskOutcome::Success);
    assert!(site.exists("dist/html/index.html"));
    assert!(site.exists("dist/js/index.min.js"));
    assert!(app.services.is_active().await);

    tokio::time::sleep(Duration::from_millis(100)).await;
    site.write("src/scss/index.scss", "b { margin: 0; }\n");

    with_timeout(async {
        while !site.read_string("dist/css/index.min.css").contains("margin:0") {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;
    // Other categories were not touched by the style edit.
    assert_eq!(site.read_string("dist/html/index.html"), "HELLO");

    app.services.shutdown().await;
    assert!(!app.services.is_active().await);
}
