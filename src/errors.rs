// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MackerelError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Cycle detected in task graph: {0}")]
    TaskCycle(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// A Rewrite stage (compiler, transpiler, minifier...) exited non-zero.
    #[error("task '{task}': stage '{stage}' failed: {detail}")]
    StageFailed {
        task: String,
        stage: String,
        detail: String,
    },

    /// A fail-on-error linter reported problems.
    #[error("task '{task}': lint stage '{stage}' reported {count} problem(s)")]
    LintFailed {
        task: String,
        stage: String,
        count: usize,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, MackerelError>;
