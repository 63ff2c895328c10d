// src/engine/mod.rs

//! Watch dispatch engine.
//!
//! This module ties together:
//! - the per-category run state and trigger queue (what happens when a
//!   change arrives while that category's binding is still running)
//! - the runtime event loop that reacts to:
//!   - source changes reported by the watcher
//!   - binding completions reported by the executor
//!   - shutdown requests
//! - [`WatchService`], which installs all of the above for the `watch` task
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use std::path::PathBuf;

use crate::types::AssetKind;

pub use crate::dag::TaskOutcome;

/// Events flowing into the runtime from the watcher and the executor.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// A watched source of this category was created, modified or removed.
    SourceChanged { kind: AssetKind, path: PathBuf },
    /// One run of the category's binding (asset task, then reload) settled.
    BindingCompleted { kind: AssetKind, outcome: TaskOutcome },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod event_handlers;
pub mod queue;
pub mod runtime;
pub mod service;

pub use core::CoreRuntime;
pub use event_handlers::{CoreCommand, CoreStep};
pub use queue::TriggerQueue;
pub use runtime::Runtime;
pub use service::WatchService;
