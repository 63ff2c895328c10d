// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! Per bound category the states are idle and running. The core consumes
//! [`RuntimeEvent`]s and produces:
//! - an updated core state
//! - a list of commands describing what the IO shell should do next
//!
//! It has no channels, no Tokio types and does no IO, so it is unit tested
//! directly.

use crate::engine::event_handlers::{
    handle_binding_completion, handle_source_change, ActiveRuns, CoreStep,
};
use crate::engine::queue::TriggerQueue;
use crate::engine::RuntimeEvent;
use crate::types::{AssetKind, OverlapPolicy};

#[derive(Debug)]
pub struct CoreRuntime {
    runs: ActiveRuns,
    queue: TriggerQueue,
    policy: OverlapPolicy,
}

impl CoreRuntime {
    pub fn new(
        kinds: impl IntoIterator<Item = AssetKind>,
        policy: OverlapPolicy,
        queue_length: usize,
    ) -> Self {
        Self {
            runs: ActiveRuns::new(kinds),
            queue: TriggerQueue::new(queue_length),
            policy,
        }
    }

    /// No binding is running (for tests).
    pub fn is_idle(&self) -> bool {
        self.runs.is_idle()
    }

    pub fn active(&self, kind: AssetKind) -> usize {
        self.runs.active(kind)
    }

    /// Queue emptiness (for tests).
    pub fn queue_is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::SourceChanged { kind, .. } => {
                handle_source_change(&mut self.runs, &mut self.queue, self.policy, kind)
            }
            RuntimeEvent::BindingCompleted { kind, outcome } => {
                handle_binding_completion(&mut self.runs, &mut self.queue, kind, outcome)
            }
            RuntimeEvent::ShutdownRequested => CoreStep {
                commands: Vec::new(),
                keep_running: false,
            },
        }
    }
}
