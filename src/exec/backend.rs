// src/exec/backend.rs

//! Pluggable binding executor.
//!
//! The runtime talks to a [`BindingExecutor`] instead of the task runner
//! directly, so tests can swap in a fake that records dispatches and
//! completes them on demand.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;
use tracing::warn;

use crate::dag::{Runner, TaskNode};
use crate::engine::RuntimeEvent;
use crate::errors::{MackerelError, Result};
use crate::types::AssetKind;
use crate::watch::WatchBinding;

pub trait BindingExecutor: Send {
    /// Start one run of `kind`'s binding.
    ///
    /// Must not wait for the run to finish; completion is reported later
    /// with `RuntimeEvent::BindingCompleted`.
    fn run_binding(
        &mut self,
        kind: AssetKind,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Runs bindings through the task [`Runner`] on the Tokio runtime.
#[derive(Debug)]
pub struct RealBindingExecutor {
    runner: Runner,
    bindings: HashMap<AssetKind, TaskNode>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
}

impl RealBindingExecutor {
    pub fn new(
        runner: Runner,
        bindings: &[WatchBinding],
        runtime_tx: mpsc::Sender<RuntimeEvent>,
    ) -> Self {
        Self {
            runner,
            bindings: bindings.iter().map(|b| (b.kind, b.node())).collect(),
            runtime_tx,
        }
    }
}

impl BindingExecutor for RealBindingExecutor {
    fn run_binding(
        &mut self,
        kind: AssetKind,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            let node = self
                .bindings
                .get(&kind)
                .cloned()
                .ok_or_else(|| MackerelError::TaskNotFound(format!("watch binding for {kind}")))?;

            let run = self.runner.run_node(node);
            let tx = self.runtime_tx.clone();
            tokio::spawn(async move {
                let outcome = run.await;
                if let Err(err) = tx.send(RuntimeEvent::BindingCompleted { kind, outcome }).await {
                    warn!("failed to report binding completion: {err}");
                }
            });
            Ok(())
        })
    }
}
