#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use mackerel::config::{ConfigFile, PathConfig};
use mackerel::fs::{FileSystem, RealFileSystem};
use tempfile::TempDir;

pub use mackerel_test_utils::{init_tracing, with_timeout};

/// A throwaway project directory.
pub struct Site {
    dir: TempDir,
}

impl Site {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    pub fn write(&self, rel: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dirs");
        }
        std::fs::write(&path, contents).expect("write file");
        path
    }

    pub fn read(&self, rel: &str) -> Vec<u8> {
        std::fs::read(self.path(rel)).unwrap_or_else(|e| panic!("reading {rel}: {e}"))
    }

    pub fn read_string(&self, rel: &str) -> String {
        String::from_utf8(self.read(rel)).expect("utf-8")
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.path(rel).exists()
    }

    pub fn paths(&self, cfg: &ConfigFile) -> PathConfig {
        PathConfig::resolve(self.root(), &cfg.paths)
    }

    pub fn fs(&self) -> Arc<dyn FileSystem> {
        Arc::new(RealFileSystem)
    }
}
