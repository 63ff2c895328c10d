// src/pipeline/toolchain.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::pipeline::{CommandTransform, Transform};

/// Factory for tool transforms, all anchored at the project root.
#[derive(Debug, Clone)]
pub struct Toolchain {
    cwd: PathBuf,
}

impl Toolchain {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self { cwd: cwd.into() }
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn command(&self, cmd: &str) -> Arc<dyn Transform> {
        Arc::new(CommandTransform::new(cmd, self.cwd.clone()))
    }
}
