// src/assets/mod.rs

//! The four asset tasks: templates, styles, scripts and images.
//!
//! Each task reads from its source directory (see
//! [`PathConfig`](crate::config::PathConfig)), threads the content through
//! its [`Stage`](crate::pipeline::Stage)s and writes into its output
//! directory. Every run is a full rebuild of its category.

pub mod images;
pub mod script;
pub mod style;
pub mod template;

pub use images::ImageTask;
pub use script::{concat_sources, ScriptTask};
pub use style::StyleTask;
pub use template::TemplateTask;

use crate::dag::{Runner, TaskAction};
use crate::errors::Result;
use crate::pipeline::{BoxFuture, TaskReport};

impl TaskAction for TemplateTask {
    fn run<'a>(&'a self, _runner: &'a Runner) -> BoxFuture<'a, Result<TaskReport>> {
        Box::pin(self.build())
    }
}

impl TaskAction for StyleTask {
    fn run<'a>(&'a self, _runner: &'a Runner) -> BoxFuture<'a, Result<TaskReport>> {
        Box::pin(self.build())
    }
}

impl TaskAction for ScriptTask {
    fn run<'a>(&'a self, _runner: &'a Runner) -> BoxFuture<'a, Result<TaskReport>> {
        Box::pin(self.build())
    }
}

impl TaskAction for ImageTask {
    fn run<'a>(&'a self, _runner: &'a Runner) -> BoxFuture<'a, Result<TaskReport>> {
        Box::pin(self.build())
    }
}
