// tests/config_loading.rs

mod common;
use crate::common::Site;

use std::path::Path;

use mackerel::config::{load_and_validate, resolve_config, PathConfig};
use mackerel::errors::MackerelError;
use mackerel::types::{AssetKind, OverlapPolicy};

#[test]
fn empty_file_uses_the_stock_layout() {
    let site = Site::new();
    let path = site.write("Mackerel.toml", "");

    let (cfg, root) = resolve_config(Some(path.as_path())).unwrap();
    assert_eq!(root, site.root());

    let paths = PathConfig::resolve(&root, &cfg.paths);
    assert_eq!(paths.source_dir(AssetKind::Style), site.path("src/scss"));
    assert_eq!(paths.dest_dir(AssetKind::Script), site.path("dist/js"));
    assert_eq!(cfg.watch.overlap, OverlapPolicy::Queue);
    assert!(cfg.server.enabled);
}

#[test]
fn stock_tools_format_with_four_space_indentation() {
    let site = Site::new();
    let path = site.write("Mackerel.toml", "");
    let (cfg, _) = resolve_config(Some(path.as_path())).unwrap();

    assert!(cfg.template.compile.contains(r#"{"pretty":"    "}"#), "{}", cfg.template.compile);
    // The reformatting pass runs last, right before the readable write.
    let last = cfg.style.postprocess.last().unwrap();
    assert!(last.contains("--tab-width 4"), "{last}");
}

#[test]
fn sections_override_individual_fields() {
    let site = Site::new();
    let path = site.write(
        "site/Mackerel.toml",
        r#"
[paths]
dest = "public"
css_dest = "styles"

[script]
bundle = "app.js"
lint = "npx eslint --stdin"

[images]
extensions = ["png", "webp"]

[images.compress]
png = "optipng -"

[server]
port = 8080
directory_listing = false

[watch]
overlap = "drop"
use_hash = true
"#,
    );

    let (cfg, root) = resolve_config(Some(path.as_path())).unwrap();
    assert_eq!(root, site.path("site"));

    let paths = PathConfig::resolve(&root, &cfg.paths);
    assert_eq!(paths.dest_dir(AssetKind::Style), site.path("site/public/styles"));
    assert_eq!(paths.dest_dir(AssetKind::Template), site.path("site/public/html"));

    assert_eq!(cfg.script.bundle, "app.js");
    // Untouched fields keep their defaults.
    assert_eq!(cfg.script.separator, "\n");
    assert_eq!(cfg.images.extensions, vec!["png", "webp"]);
    assert_eq!(cfg.images.compress.len(), 1);
    assert_eq!(cfg.server.port, 8080);
    assert!(!cfg.server.directory_listing);
    assert_eq!(cfg.watch.overlap, OverlapPolicy::Drop);
    assert!(cfg.watch.use_hash);
}

#[test]
fn unknown_overlap_policy_is_a_parse_error() {
    let site = Site::new();
    let path = site.write("Mackerel.toml", "[watch]\noverlap = \"sometimes\"\n");

    let err = load_and_validate(&path).unwrap_err();
    assert!(matches!(err, MackerelError::TomlError(_)), "{err}");
}

#[test]
fn escaping_paths_are_rejected() {
    let site = Site::new();
    let path = site.write("Mackerel.toml", "[paths]\nsrc = \"../elsewhere\"\n");

    let err = load_and_validate(&path).unwrap_err();
    assert!(matches!(err, MackerelError::ConfigError(_)), "{err}");
}

#[test]
fn shared_output_directories_are_rejected() {
    let site = Site::new();
    let path = site.write("Mackerel.toml", "[paths]\njs_dest = \"assets\"\ncss_dest = \"assets\"\n");

    let err = load_and_validate(&path).unwrap_err();
    assert!(err.to_string().contains("disjoint"), "{err}");
}

#[test]
fn missing_explicit_config_is_an_error() {
    let site = Site::new();
    let err = resolve_config(Some(site.path("nope.toml").as_path())).unwrap_err();
    assert!(matches!(err, MackerelError::IoError(_)), "{err}");
}

#[test]
fn bare_file_name_resolves_against_the_working_directory() {
    let root = mackerel::config::loader::config_root_dir(Path::new("Mackerel.toml"));
    assert_eq!(root, std::env::current_dir().unwrap());
}
