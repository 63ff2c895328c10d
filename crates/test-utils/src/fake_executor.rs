use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use mackerel::engine::{RuntimeEvent, TaskOutcome};
use mackerel::errors::Result;
use mackerel::exec::BindingExecutor;
use mackerel::types::AssetKind;
use tokio::sync::mpsc;

/// A fake executor that:
/// - records which bindings were "run"
/// - optionally reports `BindingCompleted(Success)` right away; otherwise
///   the test sends completions itself.
pub struct FakeBindingExecutor {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    executed: Arc<Mutex<Vec<AssetKind>>>,
    auto_complete: bool,
}

impl FakeBindingExecutor {
    pub fn new(
        runtime_tx: mpsc::Sender<RuntimeEvent>,
        executed: Arc<Mutex<Vec<AssetKind>>>,
        auto_complete: bool,
    ) -> Self {
        Self {
            runtime_tx,
            executed,
            auto_complete,
        }
    }
}

impl BindingExecutor for FakeBindingExecutor {
    fn run_binding(
        &mut self,
        kind: AssetKind,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.runtime_tx.clone();
        let executed = Arc::clone(&self.executed);
        let auto_complete = self.auto_complete;

        Box::pin(async move {
            executed.lock().unwrap().push(kind);

            if auto_complete {
                // Spawned so the runtime loop is not blocked on its own channel.
                tokio::spawn(async move {
                    let _ = tx
                        .send(RuntimeEvent::BindingCompleted {
                            kind,
                            outcome: TaskOutcome::Success,
                        })
                        .await;
                });
            }
            Ok(())
        })
    }
}
