// src/engine/service.rs

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::WatchSection;
use crate::dag::Runner;
use crate::engine::{CoreRuntime, Runtime, RuntimeEvent};
use crate::errors::Result;
use crate::exec::RealBindingExecutor;
use crate::fs::FileSystem;
use crate::watch::{
    spawn_watcher, CategoryWatchProfile, ChangeContext, FingerprintStore, WatchBinding,
    WatcherHandle,
};

#[derive(Debug)]
struct WatchSession {
    watcher: Option<WatcherHandle>,
    tx: mpsc::Sender<RuntimeEvent>,
    handle: JoinHandle<Result<()>>,
}

/// Installs the watch bindings once and keeps them for the life of the
/// process (there is no unwatch).
#[derive(Debug)]
pub struct WatchService {
    watch_root: PathBuf,
    profiles: Arc<Vec<CategoryWatchProfile>>,
    bindings: Vec<WatchBinding>,
    settings: WatchSection,
    fs: Arc<dyn FileSystem>,
    session: AsyncMutex<Option<WatchSession>>,
}

impl WatchService {
    pub fn new(
        watch_root: impl Into<PathBuf>,
        profiles: Vec<CategoryWatchProfile>,
        bindings: Vec<WatchBinding>,
        settings: WatchSection,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        Self {
            watch_root: watch_root.into(),
            profiles: Arc::new(profiles),
            bindings,
            settings,
            fs,
            session: AsyncMutex::new(None),
        }
    }

    pub fn bindings(&self) -> &[WatchBinding] {
        &self.bindings
    }

    pub async fn is_active(&self) -> bool {
        self.session.lock().await.is_some()
    }

    /// Start the dispatch runtime and the filesystem watcher. Idempotent.
    pub async fn install(&self, runner: &Runner) -> Result<()> {
        let mut session = self.session.lock().await;
        if session.is_some() {
            info!("watch bindings already installed");
            return Ok(());
        }

        let (tx, rx) = mpsc::channel::<RuntimeEvent>(64);
        let executor = RealBindingExecutor::new(runner.clone(), &self.bindings, tx.clone());
        let core = CoreRuntime::new(
            self.bindings.iter().map(|b| b.kind),
            self.settings.overlap,
            self.settings.queue_length,
        );
        let handle = tokio::spawn(Runtime::new(core, rx, executor).run());

        let ctx = ChangeContext {
            fs: Arc::clone(&self.fs),
            profiles: Arc::clone(&self.profiles),
            fingerprints: self
                .settings
                .use_hash
                .then(|| Arc::new(Mutex::new(FingerprintStore::new()))),
            runtime_tx: tx.clone(),
        };
        ctx.seed_fingerprints();

        let watcher = if self.fs.is_dir(&self.watch_root) {
            Some(spawn_watcher(&self.watch_root, ctx)?)
        } else {
            warn!(root = ?self.watch_root, "source root does not exist; nothing to watch");
            None
        };

        for binding in &self.bindings {
            info!(kind = %binding.kind, tasks = ?binding.tasks, "watch binding installed");
        }

        *session = Some(WatchSession {
            watcher,
            tx,
            handle,
        });
        Ok(())
    }

    /// Stop watching and wait for the dispatch loop to exit. Binding runs
    /// already in flight are left to finish on their own.
    pub async fn shutdown(&self) {
        let Some(session) = self.session.lock().await.take() else {
            return;
        };
        drop(session.watcher);
        let _ = session.tx.send(RuntimeEvent::ShutdownRequested).await;
        match session.handle.await {
            Ok(Ok(())) => info!("watch runtime stopped"),
            Ok(Err(e)) => warn!(error = %e, "watch runtime stopped with error"),
            Err(e) => warn!(error = %e, "watch runtime task failed"),
        }
    }
}
