// src/watch/hash.rs

//! Content fingerprints for watched categories.
//!
//! With `use_hash` enabled a change event only triggers a rebuild when the
//! aggregate content of the category's watched files actually changed.
//! Fingerprints live in memory for the life of the watch session.

use std::collections::HashMap;

use anyhow::Result;
use blake3::Hasher;
use tracing::debug;

use crate::fs::FileSystem;
use crate::pipeline::sources::{collect_sorted, relative_slash_path};
use crate::types::AssetKind;
use crate::watch::patterns::CategoryWatchProfile;

/// blake3 hex digest of some bytes.
pub fn hash_bytes(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

/// Aggregate fingerprint over every watched file of a category.
///
/// Covers relative paths as well as contents, so renames and removals
/// change the fingerprint too.
pub fn category_fingerprint(fs: &dyn FileSystem, profile: &CategoryWatchProfile) -> Result<String> {
    let root = profile.source_dir();
    let files = collect_sorted(fs, root, profile.globset())?;

    let mut hasher = Hasher::new();
    for file in &files {
        let rel = relative_slash_path(root, file).unwrap_or_default();
        hasher.update(rel.as_bytes());
        hasher.update(&[0]);
        hasher.update(hash_bytes(&fs.read(file)?).as_bytes());
    }

    let hash = hasher.finalize().to_hex().to_string();
    debug!(kind = %profile.kind(), files = files.len(), hash = %hash, "computed category fingerprint");
    Ok(hash)
}

#[derive(Debug, Default)]
pub struct FingerprintStore {
    map: HashMap<AssetKind, String>,
}

impl FingerprintStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: AssetKind) -> Option<&str> {
        self.map.get(&kind).map(String::as_str)
    }

    /// Record `hash`; returns true if it differs from the previous one.
    pub fn update(&mut self, kind: AssetKind, hash: String) -> bool {
        match self.map.insert(kind, hash.clone()) {
            Some(old) => old != hash,
            None => true,
        }
    }
}
