// src/pipeline/mod.rs

//! Stage plumbing shared by the asset tasks.
//!
//! An asset task is a fixed, linear sequence of [`Stage`]s. Each stage wraps
//! a [`Transform`] (normally an external tool, see [`command`]) and a
//! [`StageRole`] deciding what the stage's output and exit status mean:
//!
//! - `Rewrite`: output replaces the content; failure fails the task.
//! - `Fix`: output replaces the content whenever it is non-empty, even on
//!   a non-zero exit; failure diagnostics are logged and recorded.
//! - `Check`: content passes through untouched; output is diagnostics.
//!   `Advisory` checks never fail, `FailOnError` checks fail the task.

use std::fmt::Debug;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

pub mod command;
pub mod diagnostics;
pub mod naming;
pub mod sources;
pub mod stage;
pub mod toolchain;

pub use command::CommandTransform;
pub use diagnostics::{parse_diagnostics, Diagnostic};
pub use stage::{run_stage, StageContext};
pub use toolchain::Toolchain;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Result of running one transform over some content.
#[derive(Debug, Clone, Default)]
pub struct TransformOutput {
    pub content: Vec<u8>,
    pub diagnostics: Vec<Diagnostic>,
    pub success: bool,
}

/// A content transform: bytes in, bytes (and diagnostics) out.
///
/// Production code uses [`CommandTransform`]; tests plug in closures.
pub trait Transform: Send + Sync + Debug {
    /// Short label used in logs and errors (e.g. the command line).
    fn label(&self) -> &str;

    /// Only spawn/IO problems are `Err`; tool failures are reported through
    /// [`TransformOutput::success`].
    fn apply<'a>(
        &'a self,
        input: &'a [u8],
        ctx: &'a StageContext,
    ) -> BoxFuture<'a, anyhow::Result<TransformOutput>>;
}

/// What a lint/validation stage's failure means for the task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckPolicy {
    Advisory,
    FailOnError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageRole {
    Rewrite,
    Fix,
    Check(CheckPolicy),
}

/// One step of an asset task.
#[derive(Debug, Clone)]
pub struct Stage {
    pub name: String,
    pub role: StageRole,
    pub transform: Arc<dyn Transform>,
}

impl Stage {
    pub fn new(name: impl Into<String>, role: StageRole, transform: Arc<dyn Transform>) -> Self {
        Self {
            name: name.into(),
            role,
            transform,
        }
    }

    pub fn rewrite(name: impl Into<String>, transform: Arc<dyn Transform>) -> Self {
        Self::new(name, StageRole::Rewrite, transform)
    }

    pub fn fix(name: impl Into<String>, transform: Arc<dyn Transform>) -> Self {
        Self::new(name, StageRole::Fix, transform)
    }

    pub fn advisory(name: impl Into<String>, transform: Arc<dyn Transform>) -> Self {
        Self::new(name, StageRole::Check(CheckPolicy::Advisory), transform)
    }

    pub fn gate(name: impl Into<String>, transform: Arc<dyn Transform>) -> Self {
        Self::new(name, StageRole::Check(CheckPolicy::FailOnError), transform)
    }
}

/// A file that could not be processed in a best-effort batch.
#[derive(Debug, Clone)]
pub struct FileFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// What a task did, for logs and tests.
#[derive(Debug, Clone, Default)]
pub struct TaskReport {
    pub task: String,
    /// Artifacts written, in write order.
    pub written: Vec<PathBuf>,
    /// Advisory findings collected along the way.
    pub diagnostics: Vec<Diagnostic>,
    /// Per-file failures that did not abort the task.
    pub failures: Vec<FileFailure>,
}

impl TaskReport {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            ..Self::default()
        }
    }
}
