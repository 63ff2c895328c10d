// src/config/paths.rs

//! Resolved, immutable path configuration.

use std::path::{Path, PathBuf};

use crate::config::model::PathsSection;
use crate::types::AssetKind;

/// Absolute-ish directories for every logical role, anchored at the project
/// root. Built once at startup and shared read-only by every task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathConfig {
    root: PathBuf,
    src_root: PathBuf,
    dest_root: PathBuf,
    template_src: PathBuf,
    style_src: PathBuf,
    script_src: PathBuf,
    image_src: PathBuf,
    html_dest: PathBuf,
    css_dest: PathBuf,
    js_dest: PathBuf,
    image_dest: PathBuf,
}

impl PathConfig {
    /// Anchor a validated `[paths]` section at `root`.
    pub fn resolve(root: impl Into<PathBuf>, paths: &PathsSection) -> Self {
        let root = root.into();
        let src_root = root.join(&paths.src);
        let dest_root = root.join(&paths.dest);

        Self {
            template_src: src_root.join(&paths.template_src),
            style_src: src_root.join(&paths.style_src),
            script_src: src_root.join(&paths.script_src),
            image_src: src_root.join(&paths.image_src),
            html_dest: dest_root.join(&paths.html_dest),
            css_dest: dest_root.join(&paths.css_dest),
            js_dest: dest_root.join(&paths.js_dest),
            image_dest: dest_root.join(&paths.image_dest),
            root,
            src_root,
            dest_root,
        }
    }

    /// Project root; external tools run with this as working directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn src_root(&self) -> &Path {
        &self.src_root
    }

    /// Build-output root; served by the dev server.
    pub fn dest_root(&self) -> &Path {
        &self.dest_root
    }

    pub fn source_dir(&self, kind: AssetKind) -> &Path {
        match kind {
            AssetKind::Template => &self.template_src,
            AssetKind::Style => &self.style_src,
            AssetKind::Script => &self.script_src,
            AssetKind::Image => &self.image_src,
        }
    }

    pub fn dest_dir(&self, kind: AssetKind) -> &Path {
        match kind {
            AssetKind::Template => &self.html_dest,
            AssetKind::Style => &self.css_dest,
            AssetKind::Script => &self.js_dest,
            AssetKind::Image => &self.image_dest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_matches_stock_directories() {
        let paths = PathConfig::resolve("/site", &PathsSection::default());

        assert_eq!(paths.source_dir(AssetKind::Template), Path::new("/site/src/pug"));
        assert_eq!(paths.source_dir(AssetKind::Style), Path::new("/site/src/scss"));
        assert_eq!(paths.source_dir(AssetKind::Script), Path::new("/site/src/js"));
        assert_eq!(paths.source_dir(AssetKind::Image), Path::new("/site/src/images"));
        assert_eq!(paths.dest_dir(AssetKind::Template), Path::new("/site/dist/html"));
        assert_eq!(paths.dest_dir(AssetKind::Style), Path::new("/site/dist/css"));
        assert_eq!(paths.dest_dir(AssetKind::Script), Path::new("/site/dist/js"));
        assert_eq!(paths.dest_dir(AssetKind::Image), Path::new("/site/dist/images"));
        assert_eq!(paths.dest_root(), Path::new("/site/dist"));
    }

    #[test]
    fn every_role_lives_under_its_root() {
        let paths = PathConfig::resolve("/p", &PathsSection::default());
        for kind in AssetKind::ALL {
            assert!(paths.source_dir(kind).starts_with(paths.src_root()));
            assert!(paths.dest_dir(kind).starts_with(paths.dest_root()));
        }
    }
}
