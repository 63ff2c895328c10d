// src/dag/mod.rs

//! Named tasks and their composition.
//!
//! - [`graph`] defines [`TaskNode`] (series / parallel trees over task
//!   names) and validates them as a graph.
//! - [`registry`] holds the immutable name → task table.
//! - [`runner`] executes names or trees against that table.

pub mod graph;
pub mod registry;
pub mod runner;

pub use graph::{SeriesPolicy, TaskName, TaskNode};
pub use registry::{TaskAction, TaskEntry, TaskRegistry, TaskRegistryBuilder};
pub use runner::{Runner, TaskOutcome};
