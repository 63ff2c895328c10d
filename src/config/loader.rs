// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// File name looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "Mackerel.toml";

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and validate it.
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks path invariants, commands, globs and watch settings.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Resolve the configuration to use and the project root it is anchored at.
///
/// - An explicit path must exist; its parent directory is the project root.
/// - Without an explicit path, `Mackerel.toml` in the current directory is
///   used when present, otherwise the built-in defaults apply and the current
///   directory is the project root.
pub fn resolve_config(explicit: Option<&Path>) -> Result<(ConfigFile, PathBuf)> {
    match explicit {
        Some(path) => {
            let cfg = load_and_validate(path)?;
            Ok((cfg, config_root_dir(path)))
        }
        None => {
            let path = default_config_path();
            if path.is_file() {
                let cfg = load_and_validate(&path)?;
                Ok((cfg, config_root_dir(&path)))
            } else {
                info!(
                    "no {} found; using built-in configuration",
                    DEFAULT_CONFIG_FILE
                );
                let root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
                Ok((ConfigFile::builtin(), root))
            }
        }
    }
}

/// Default config path: `Mackerel.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from(DEFAULT_CONFIG_FILE)
}

/// Figure out the project root for a config file.
///
/// - If the config path has a non-empty parent (e.g. "site/Mackerel.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Mackerel.toml" (parent = ""),
///   we fall back to the current working directory.
pub fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}
