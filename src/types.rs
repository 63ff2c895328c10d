use std::fmt;

use serde::Deserialize;

/// Behaviour when a change for a category arrives while that category's
/// watch binding is still running.
///
/// - `Queue`: remember the change and run the binding once more after the
///   current run finishes (default; at most `queue_length` pending runs).
/// - `Drop`: ignore changes that arrive while the binding is running.
/// - `Overlap`: start another run immediately, alongside the running one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OverlapPolicy {
    #[default]
    Queue,
    Drop,
    Overlap,
}

/// The four watched source categories, one per asset task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetKind {
    Template,
    Style,
    Script,
    Image,
}

impl AssetKind {
    pub const ALL: [AssetKind; 4] = [
        AssetKind::Template,
        AssetKind::Style,
        AssetKind::Script,
        AssetKind::Image,
    ];

    /// Name of the asset task that rebuilds this category.
    pub fn task_name(self) -> &'static str {
        match self {
            AssetKind::Template => "html",
            AssetKind::Style => "css",
            AssetKind::Script => "js",
            AssetKind::Image => "images",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssetKind::Template => "template",
            AssetKind::Style => "style",
            AssetKind::Script => "script",
            AssetKind::Image => "image",
        };
        f.write_str(s)
    }
}
