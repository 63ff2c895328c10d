// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::tasks::DEFAULT_TASK;

/// Command-line arguments for `mackerel`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "mackerel",
    version,
    about = "Build front-end assets with external tools, serve them and live-reload on change.",
    long_about = None
)]
pub struct CliArgs {
    /// Task to run (html, css, js, images, browserSync-init,
    /// browserSync-reload, watch, default).
    #[arg(value_name = "TASK", default_value = DEFAULT_TASK)]
    pub task: String,

    /// Path to the config file (TOML).
    ///
    /// When the default `Mackerel.toml` does not exist, built-in defaults are
    /// used. An explicitly given path must exist.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `MACKEREL_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print paths, tools and task graph, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Print the registered task names and exit.
    #[arg(long)]
    pub list: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_defaults_to_default_composition() {
        let args = CliArgs::parse_from(["mackerel"]);
        assert_eq!(args.task, "default");
        assert!(args.config.is_none());
        assert!(!args.dry_run);
    }

    #[test]
    fn positional_task_and_flags_are_parsed() {
        let args = CliArgs::parse_from([
            "mackerel",
            "css",
            "--config",
            "site/Mackerel.toml",
            "--log-level",
            "debug",
            "--dry-run",
        ]);
        assert_eq!(args.task, "css");
        assert_eq!(args.config.as_deref(), Some("site/Mackerel.toml"));
        assert!(matches!(args.log_level, Some(LogLevel::Debug)));
        assert!(args.dry_run);
    }
}
