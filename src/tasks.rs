// src/tasks.rs

//! The standard task table.
//!
//! | name                 | does                                                   |
//! |----------------------|--------------------------------------------------------|
//! | `html`               | template entry → markup                                |
//! | `css`                | style entry → readable + minified stylesheet           |
//! | `js`                 | script sources → bundle + minified bundle              |
//! | `images`             | recognized images → compressed copies                  |
//! | `browserSync-init`   | start the dev server (idempotent)                      |
//! | `browserSync-reload` | tell connected pages to reload                         |
//! | `watch`              | install the per-category watch bindings                |
//! | `default`            | init, then all four asset tasks in parallel, then watch|

use std::sync::Arc;

use tracing::info;

use crate::assets::{ImageTask, ScriptTask, StyleTask, TemplateTask};
use crate::config::{ConfigFile, PathConfig};
use crate::dag::{Runner, TaskAction, TaskNode, TaskRegistry};
use crate::engine::WatchService;
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::pipeline::{BoxFuture, TaskReport, Toolchain};
use crate::server::{DevServer, ServerOptions};
use crate::types::AssetKind;
use crate::watch::{build_profiles, standard_bindings};

pub const SERVER_INIT_TASK: &str = "browserSync-init";
pub const SERVER_RELOAD_TASK: &str = "browserSync-reload";
pub const WATCH_TASK: &str = "watch";
pub const DEFAULT_TASK: &str = "default";

/// Start the dev server. With the server disabled this does nothing.
#[derive(Debug)]
pub struct ServerInitAction {
    pub server: Option<Arc<DevServer>>,
}

impl TaskAction for ServerInitAction {
    fn run<'a>(&'a self, _runner: &'a Runner) -> BoxFuture<'a, Result<TaskReport>> {
        Box::pin(async move {
            match &self.server {
                Some(server) => {
                    server.start().await?;
                }
                None => info!("dev server disabled; skipping start"),
            }
            Ok(TaskReport::new(SERVER_INIT_TASK))
        })
    }
}

#[derive(Debug)]
pub struct ServerReloadAction {
    pub server: Option<Arc<DevServer>>,
}

impl TaskAction for ServerReloadAction {
    fn run<'a>(&'a self, _runner: &'a Runner) -> BoxFuture<'a, Result<TaskReport>> {
        Box::pin(async move {
            if let Some(server) = &self.server {
                server.reload();
            }
            Ok(TaskReport::new(SERVER_RELOAD_TASK))
        })
    }
}

#[derive(Debug)]
pub struct WatchAction {
    pub service: Arc<WatchService>,
}

impl TaskAction for WatchAction {
    fn run<'a>(&'a self, runner: &'a Runner) -> BoxFuture<'a, Result<TaskReport>> {
        Box::pin(async move {
            self.service.install(runner).await?;
            Ok(TaskReport::new(WATCH_TASK))
        })
    }
}

/// Long-lived services the tasks may start.
#[derive(Debug, Clone)]
pub struct Services {
    pub server: Option<Arc<DevServer>>,
    pub watch: Arc<WatchService>,
}

impl Services {
    /// Is anything still running that should keep the process alive?
    pub async fn is_active(&self) -> bool {
        let serving = self.server.as_ref().is_some_and(|s| s.is_running());
        serving || self.watch.is_active().await
    }

    pub async fn shutdown(&self) {
        self.watch.shutdown().await;
        if let Some(server) = &self.server {
            server.shutdown();
        }
    }
}

#[derive(Debug)]
pub struct App {
    pub registry: Arc<TaskRegistry>,
    pub services: Services,
}

/// `default`: start the server, build everything concurrently, then watch.
///
/// The series keeps going past a failed step so a broken source does not
/// prevent serving and watching.
pub fn default_composition() -> TaskNode {
    TaskNode::series_continue(vec![
        TaskNode::task(SERVER_INIT_TASK),
        TaskNode::parallel(
            AssetKind::ALL
                .iter()
                .map(|k| TaskNode::task(k.task_name()))
                .collect(),
        ),
        TaskNode::task(WATCH_TASK),
    ])
}

/// Build the standard registry and the services behind it.
pub fn build_app(cfg: &ConfigFile, paths: &PathConfig, fs: Arc<dyn FileSystem>) -> Result<App> {
    let tools = Toolchain::new(paths.root());

    let server = cfg
        .server
        .enabled
        .then(|| Arc::new(DevServer::new(ServerOptions::from_config(&cfg.server, paths))));
    let reload_task = server.as_ref().map(|_| SERVER_RELOAD_TASK);

    let watch = Arc::new(WatchService::new(
        paths.src_root(),
        build_profiles(cfg, paths)?,
        standard_bindings(reload_task),
        cfg.watch.clone(),
        Arc::clone(&fs),
    ));

    let registry = TaskRegistry::builder()
        .action(
            AssetKind::Template.task_name(),
            Arc::new(TemplateTask::from_config(cfg, paths, Arc::clone(&fs), &tools)),
        )
        .action(
            AssetKind::Style.task_name(),
            Arc::new(StyleTask::from_config(cfg, paths, Arc::clone(&fs), &tools)),
        )
        .action(
            AssetKind::Script.task_name(),
            Arc::new(ScriptTask::from_config(cfg, paths, Arc::clone(&fs), &tools)?),
        )
        .action(
            AssetKind::Image.task_name(),
            Arc::new(ImageTask::from_config(cfg, paths, Arc::clone(&fs), &tools)),
        )
        .action(
            SERVER_INIT_TASK,
            Arc::new(ServerInitAction {
                server: server.clone(),
            }),
        )
        .action(
            SERVER_RELOAD_TASK,
            Arc::new(ServerReloadAction {
                server: server.clone(),
            }),
        )
        .action(
            WATCH_TASK,
            Arc::new(WatchAction {
                service: Arc::clone(&watch),
            }),
        )
        .composite(DEFAULT_TASK, default_composition())
        .build()?;

    Ok(App {
        registry: Arc::new(registry),
        services: Services { server, watch },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn standard_names_are_registered() {
        let cfg = ConfigFile::builtin();
        let paths = PathConfig::resolve("/nonexistent/site", &cfg.paths);
        let app = build_app(&cfg, &paths, Arc::new(MockFileSystem::new())).unwrap();

        let names: Vec<&str> = app.registry.names().collect();
        assert_eq!(
            names,
            [
                "browserSync-init",
                "browserSync-reload",
                "css",
                "default",
                "html",
                "images",
                "js",
                "watch"
            ]
        );
    }

    #[test]
    fn default_runs_init_then_builds_then_watch() {
        assert_eq!(
            default_composition().to_string(),
            "series_continue(browserSync-init, parallel(html, css, js, images), watch)"
        );
    }

    #[test]
    fn bindings_skip_reload_without_server() {
        let mut cfg = ConfigFile::builtin();
        cfg.server.enabled = false;
        let paths = PathConfig::resolve("/nonexistent/site", &cfg.paths);
        let app = build_app(&cfg, &paths, Arc::new(MockFileSystem::new())).unwrap();

        assert!(app.services.server.is_none());
        for binding in app.services.watch.bindings() {
            assert_eq!(binding.tasks, vec![binding.kind.task_name().to_string()]);
        }
    }
}
