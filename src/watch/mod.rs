// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Compiling per-category watch globs (`patterns.rs`).
//! - Describing what runs on a change (`binding.rs`).
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//! - Optional content hashing so touches without edits don't rebuild.
//!
//! It does not run tasks itself; it only turns filesystem changes into
//! [`RuntimeEvent::SourceChanged`](crate::engine::RuntimeEvent) triggers.

pub mod binding;
pub mod event_handler;
pub mod hash;
pub mod path_utils;
pub mod patterns;
pub mod watcher;

pub use binding::{standard_bindings, WatchBinding};
pub use event_handler::{process_file_change, ChangeContext};
pub use hash::{category_fingerprint, FingerprintStore};
pub use patterns::{build_profiles, matching_kinds, CategoryWatchProfile};
pub use watcher::{spawn_watcher, WatcherHandle};
