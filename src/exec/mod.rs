// src/exec/mod.rs

//! Execution layer.
//!
//! - [`process`] runs external tool commands with piped stdin/stdout.
//! - [`backend`] provides the [`BindingExecutor`] trait and the
//!   [`RealBindingExecutor`] the watch runtime uses in production, which
//!   tests replace with a fake.

pub mod backend;
pub mod process;

pub use backend::{BindingExecutor, RealBindingExecutor};
pub use process::{run_with_input, ProcessOutput, ProcessSpec};
