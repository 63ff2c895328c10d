// src/pipeline/naming.rs

//! Output file naming rules.

use std::path::{Path, PathBuf};

/// Marker inserted before the extension of minified artifacts.
pub const MIN_MARKER: &str = "min";

/// `index.pug` + `html` → `index.html`.
pub fn translate_extension(file_name: &Path, ext: &str) -> PathBuf {
    file_name.with_extension(ext)
}

/// `index.css` → `index.min.css`; `bundle` → `bundle.min`.
pub fn minified_name(path: &Path) -> PathBuf {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => path.with_extension(format!("{MIN_MARKER}.{ext}")),
        None => path.with_extension(MIN_MARKER),
    }
}
