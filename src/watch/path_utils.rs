// src/watch/path_utils.rs

use std::path::Path;

/// `path` relative to `root`, with forward slashes.
///
/// Falls back to comparing canonical forms when the plain prefix does not
/// match (symlinked temp dirs, `/private/var` on macOS). Returns `None` if
/// the path is not under `root` either way.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(rel.to_string_lossy().replace('\\', "/"));
    }

    let root_canon = root.canonicalize().ok()?;
    let path_canon = path.canonicalize().ok()?;
    path_canon
        .strip_prefix(&root_canon)
        .ok()
        .map(|rel| rel.to_string_lossy().replace('\\', "/"))
}
