// src/lib.rs

pub mod assets;
pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod pipeline;
pub mod server;
pub mod tasks;
pub mod types;
pub mod watch;

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{resolve_config, ConfigFile, PathConfig};
use crate::dag::{Runner, TaskEntry};
use crate::errors::{MackerelError, Result};
use crate::fs::{FileSystem, RealFileSystem};
use crate::tasks::{build_app, App};
use crate::types::AssetKind;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and path resolution
/// - the task registry and its services (dev server, watcher)
/// - running the requested task
/// - Ctrl-C handling while services keep the process alive
///
/// Returns whether the requested task succeeded.
pub async fn run(args: CliArgs) -> Result<bool> {
    let (cfg, root) = resolve_config(args.config.as_deref().map(Path::new))?;
    let paths = PathConfig::resolve(&root, &cfg.paths);
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);

    let app = build_app(&cfg, &paths, fs)?;

    if args.list {
        for name in app.registry.names() {
            println!("{name}");
        }
        return Ok(true);
    }

    if args.dry_run {
        print_dry_run(&cfg, &paths, &app);
        return Ok(true);
    }

    if !app.registry.contains(&args.task) {
        return Err(MackerelError::TaskNotFound(args.task));
    }

    let runner = Runner::new(Arc::clone(&app.registry));
    let outcome = runner.run(&args.task).await?;
    info!(task = %args.task, ?outcome, "task settled");

    if app.services.is_active().await {
        info!("serving and watching; press Ctrl-C to stop");
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for Ctrl-C: {e}");
        }
        app.services.shutdown().await;
    }

    Ok(outcome.is_success())
}

/// Print resolved paths, tools and the task table without running anything.
fn print_dry_run(cfg: &ConfigFile, paths: &PathConfig, app: &App) {
    println!("mackerel dry-run");
    println!("  root: {}", paths.root().display());
    println!();

    println!("paths:");
    for kind in AssetKind::ALL {
        println!(
            "  {:<8} {} -> {}",
            kind.task_name(),
            paths.source_dir(kind).display(),
            paths.dest_dir(kind).display()
        );
    }
    println!();

    println!("tools:");
    println!("  html.compile:   {}", cfg.template.compile);
    if let Some(v) = &cfg.template.validate {
        println!("  html.validate:  {v}");
    }
    println!("  css.compile:    {}", cfg.style.compile);
    if let Some(v) = &cfg.style.fix {
        println!("  css.fix:        {v}");
    }
    if let Some(v) = &cfg.style.report {
        println!("  css.report:     {v}");
    }
    for (i, v) in cfg.style.postprocess.iter().enumerate() {
        println!("  css.postprocess[{i}]: {v}");
    }
    println!("  css.minify:     {}", cfg.style.minify);
    println!("  js.transpile:   {}", cfg.script.transpile);
    if let Some(v) = &cfg.script.lint {
        println!("  js.lint:        {v}");
    }
    println!("  js.minify:      {}", cfg.script.minify);
    for (ext, cmd) in &cfg.images.compress {
        println!("  images.{ext}:     {cmd}");
    }
    println!();

    println!("tasks:");
    for (name, entry) in app.registry.entries() {
        match entry {
            TaskEntry::Action(_) => println!("  - {name}"),
            TaskEntry::Composite(node) => println!("  - {name} = {node}"),
        }
    }
    println!();

    match &app.services.server {
        Some(server) => {
            let o = server.options();
            println!(
                "server: http://{}:{}/ serving {} (listing: {})",
                o.host,
                o.port,
                o.root.display(),
                o.directory_listing
            );
        }
        None => println!("server: disabled"),
    }
    println!(
        "watch: overlap={:?} queue_length={} use_hash={}",
        cfg.watch.overlap, cfg.watch.queue_length, cfg.watch.use_hash
    );
    for binding in app.services.watch.bindings() {
        println!("  {} -> {}", binding.kind, binding.node());
    }

    debug!("dry-run complete (no execution)");
}
