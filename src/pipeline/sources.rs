// src/pipeline/sources.rs

//! Deterministic source discovery.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::fs::FileSystem;

/// Build a GlobSet from simple string patterns.
pub fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

/// `dir/sub/a.js` relative to `root`, with forward slashes.
pub fn relative_slash_path(root: &Path, path: &Path) -> Option<String> {
    path.strip_prefix(root)
        .ok()
        .map(|rel| rel.to_string_lossy().replace('\\', "/"))
}

/// Collect files under `root` whose root-relative path matches `matcher`.
///
/// Traversal is depth-first with the entries of every directory sorted by
/// name, so the same file set always yields the same order. A missing
/// `root` yields an empty list.
pub fn collect_sorted(fs: &dyn FileSystem, root: &Path, matcher: &GlobSet) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    if !fs.is_dir(root) {
        return Ok(files);
    }

    let mut stack = vec![root.to_path_buf()];
    while let Some(path) = stack.pop() {
        if fs.is_dir(&path) {
            let mut entries = fs.read_dir(&path)?;
            entries.sort();
            // Reverse so the smallest name is popped first.
            stack.extend(entries.into_iter().rev());
        } else if fs.is_file(&path) {
            if let Some(rel) = relative_slash_path(root, &path) {
                if matcher.is_match(&rel) {
                    files.push(path);
                }
            }
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn traversal_is_sorted_depth_first() {
        let fs = MockFileSystem::new();
        fs.add_file("/s/js/zeta.js", b"z".to_vec());
        fs.add_file("/s/js/lib/b.js", b"b".to_vec());
        fs.add_file("/s/js/alpha.js", b"a".to_vec());
        fs.add_file("/s/js/lib/a.js", b"a".to_vec());
        fs.add_file("/s/js/notes.txt", b"n".to_vec());

        let set = build_globset(&["**/*.js".to_string()]).unwrap();
        let files = collect_sorted(&fs, Path::new("/s/js"), &set).unwrap();

        assert_eq!(
            files,
            vec![
                PathBuf::from("/s/js/alpha.js"),
                PathBuf::from("/s/js/lib/a.js"),
                PathBuf::from("/s/js/lib/b.js"),
                PathBuf::from("/s/js/zeta.js"),
            ]
        );
    }

    #[test]
    fn missing_root_is_empty() {
        let fs = MockFileSystem::new();
        let set = build_globset(&["**/*".to_string()]).unwrap();
        assert!(collect_sorted(&fs, Path::new("/nope"), &set).unwrap().is_empty());
    }
}
