// src/watch/event_handler.rs

//! Turn one changed path into category triggers.

use std::path::Path;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::RuntimeEvent;
use crate::fs::FileSystem;
use crate::types::AssetKind;
use crate::watch::hash::{category_fingerprint, FingerprintStore};
use crate::watch::patterns::{matching_kinds, CategoryWatchProfile};

/// Everything the change handler needs, shared by the watcher loop.
#[derive(Debug, Clone)]
pub struct ChangeContext {
    pub fs: Arc<dyn FileSystem>,
    pub profiles: Arc<Vec<CategoryWatchProfile>>,
    /// `Some` when content hashing is enabled.
    pub fingerprints: Option<Arc<Mutex<FingerprintStore>>>,
    pub runtime_tx: mpsc::Sender<RuntimeEvent>,
}

impl ChangeContext {
    /// Record the current fingerprint of every category, so the first real
    /// edit after startup is compared against what was just built.
    pub fn seed_fingerprints(&self) {
        let Some(store) = &self.fingerprints else {
            return;
        };
        let mut store = store.lock().unwrap_or_else(|p| p.into_inner());
        for profile in self.profiles.iter() {
            match category_fingerprint(self.fs.as_ref(), profile) {
                Ok(hash) => {
                    store.update(profile.kind(), hash);
                }
                Err(err) => warn!(kind = %profile.kind(), error = %err, "failed to seed fingerprint"),
            }
        }
    }
}

/// Process a single changed path. Returns false once the runtime is gone.
pub async fn process_file_change(ctx: &ChangeContext, path: &Path) -> bool {
    let kinds = matching_kinds(&ctx.profiles, path);
    if kinds.is_empty() {
        return true;
    }

    for kind in kinds {
        if !should_trigger(ctx, kind).await {
            continue;
        }

        debug!(kind = %kind, path = ?path, "watch match -> triggering binding");
        let event = RuntimeEvent::SourceChanged {
            kind,
            path: path.to_path_buf(),
        };
        if let Err(err) = ctx.runtime_tx.send(event).await {
            warn!("failed to send RuntimeEvent::SourceChanged: {err}");
            return false;
        }
    }
    true
}

/// Hash gate. Errors fall back to triggering.
async fn should_trigger(ctx: &ChangeContext, kind: AssetKind) -> bool {
    let Some(store) = ctx.fingerprints.clone() else {
        return true;
    };
    let Some(profile) = ctx.profiles.iter().find(|p| p.kind() == kind).cloned() else {
        return true;
    };
    let fs = Arc::clone(&ctx.fs);

    tokio::task::spawn_blocking(move || {
        let hash = match category_fingerprint(fs.as_ref(), &profile) {
            Ok(h) => h,
            Err(err) => {
                warn!(kind = %kind, error = %err, "failed to fingerprint sources; triggering anyway");
                return true;
            }
        };

        let mut store = store.lock().unwrap_or_else(|p| p.into_inner());
        let changed = store.update(kind, hash);
        if !changed {
            info!(kind = %kind, "content unchanged; skipping trigger");
        }
        changed
    })
    .await
    .unwrap_or(true)
}
