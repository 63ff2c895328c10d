// src/watch/patterns.rs

use std::path::{Path, PathBuf};

use anyhow::Result;
use globset::GlobSet;

use crate::config::{ConfigFile, PathConfig};
use crate::pipeline::sources::build_globset;
use crate::types::AssetKind;
use crate::watch::path_utils::relative_str;

/// Compiled watch patterns for one source category.
///
/// Patterns are evaluated against paths relative to the category's source
/// directory, with forward slashes.
#[derive(Debug, Clone)]
pub struct CategoryWatchProfile {
    kind: AssetKind,
    source_dir: PathBuf,
    patterns: Vec<String>,
    set: GlobSet,
}

impl CategoryWatchProfile {
    pub fn new(kind: AssetKind, source_dir: impl Into<PathBuf>, patterns: Vec<String>) -> Result<Self> {
        let source_dir = source_dir.into();
        // Canonicalize once so event paths (which notify reports canonical)
        // strip cleanly, even for removed files.
        let source_dir = source_dir.canonicalize().unwrap_or(source_dir);
        let set = build_globset(&patterns)?;
        Ok(Self {
            kind,
            source_dir,
            patterns,
            set,
        })
    }

    pub fn kind(&self) -> AssetKind {
        self.kind
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn globset(&self) -> &GlobSet {
        &self.set
    }

    /// Does this absolute path belong to the category?
    pub fn matches(&self, path: &Path) -> bool {
        match relative_str(&self.source_dir, path) {
            Some(rel) if !rel.is_empty() => self.set.is_match(&rel),
            _ => false,
        }
    }
}

/// Patterns that select a category's watched files from its config section.
pub fn watch_patterns(cfg: &ConfigFile, kind: AssetKind) -> Vec<String> {
    match kind {
        AssetKind::Template => cfg.template.watch.clone(),
        AssetKind::Style => cfg.style.watch.clone(),
        AssetKind::Script => cfg.script.include.clone(),
        AssetKind::Image => cfg.images.watch_globs(),
    }
}

/// One profile per category, in [`AssetKind::ALL`] order.
pub fn build_profiles(cfg: &ConfigFile, paths: &PathConfig) -> Result<Vec<CategoryWatchProfile>> {
    AssetKind::ALL
        .iter()
        .map(|&kind| {
            CategoryWatchProfile::new(kind, paths.source_dir(kind), watch_patterns(cfg, kind))
        })
        .collect()
}

/// Kinds whose profile matches `path`.
pub fn matching_kinds(profiles: &[CategoryWatchProfile], path: &Path) -> Vec<AssetKind> {
    profiles
        .iter()
        .filter(|p| p.matches(path))
        .map(|p| p.kind())
        .collect()
}
