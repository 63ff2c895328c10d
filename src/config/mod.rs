// src/config/mod.rs

//! Configuration loading and validation for mackerel.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk, or fall back to built-ins (`loader.rs`).
//! - Validate path and tool invariants (`validate.rs`).
//! - Anchor the `[paths]` section at the project root (`paths.rs`).

pub mod loader;
pub mod model;
pub mod paths;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, resolve_config};
pub use model::{
    ConfigFile, ImagesSection, PathsSection, RawConfigFile, ScriptSection, ServerSection,
    StyleSection, TemplateSection, WatchSection,
};
pub use paths::PathConfig;
