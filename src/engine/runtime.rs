// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::errors::Result;
use crate::exec::BindingExecutor;

use super::core::CoreRuntime;
use super::{CoreCommand, RuntimeEvent};

/// Async IO shell around [`CoreRuntime`].
///
/// Reads events from the channel, feeds them to the core and hands
/// `RunBinding` commands to a [`BindingExecutor`].
pub struct Runtime<E: BindingExecutor> {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    executor: E,
}

impl<E: BindingExecutor> fmt::Debug for Runtime<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<E: BindingExecutor> Runtime<E> {
    pub fn new(core: CoreRuntime, event_rx: mpsc::Receiver<RuntimeEvent>, executor: E) -> Self {
        Self {
            core,
            event_rx,
            executor,
        }
    }

    /// Main event loop; returns on shutdown or when every sender is gone.
    pub async fn run(mut self) -> Result<()> {
        info!("watch runtime started");

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; exiting");
                    break;
                }
            };

            debug!(?event, "runtime received event");
            let step = self.core.step(event);

            for command in step.commands {
                self.execute_command(command).await?;
            }

            if !step.keep_running {
                info!("shutdown requested; stopping watch runtime");
                break;
            }
        }

        Ok(())
    }

    async fn execute_command(&mut self, command: CoreCommand) -> Result<()> {
        match command {
            CoreCommand::RunBinding(kind) => {
                debug!(kind = %kind, "dispatching watch binding");
                self.executor.run_binding(kind).await
            }
        }
    }
}
