// src/engine/queue.rs

use std::collections::BTreeMap;

use tracing::debug;

use crate::types::AssetKind;

/// Reruns owed to categories whose sources changed while their binding was
/// running (`overlap = "queue"`).
///
/// Semantics:
/// - Each category keeps a count of pending reruns, capped at `max_pending`
///   (`queue_length`, default 1).
/// - Changes beyond the cap coalesce into the reruns already pending: the
///   next run rebuilds the whole category anyway, so it picks them up.
#[derive(Debug)]
pub struct TriggerQueue {
    max_pending: usize,
    pending: BTreeMap<AssetKind, usize>,
}

impl TriggerQueue {
    /// `max_pending` is clamped to at least 1.
    pub fn new(max_pending: usize) -> Self {
        Self {
            max_pending: max_pending.max(1),
            pending: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.values().all(|&n| n == 0)
    }

    pub fn pending(&self, kind: AssetKind) -> usize {
        self.pending.get(&kind).copied().unwrap_or(0)
    }

    /// Remember one more rerun for `kind`. Returns false if it coalesced.
    pub fn record(&mut self, kind: AssetKind) -> bool {
        let slot = self.pending.entry(kind).or_insert(0);
        if *slot >= self.max_pending {
            debug!(kind = %kind, pending = *slot, "rerun already queued; coalescing change");
            return false;
        }
        *slot += 1;
        debug!(kind = %kind, pending = *slot, "queued rerun");
        true
    }

    /// Take one pending rerun for `kind`, if any.
    pub fn take(&mut self, kind: AssetKind) -> bool {
        match self.pending.get_mut(&kind) {
            Some(n) if *n > 0 => {
                *n -= 1;
                true
            }
            _ => false,
        }
    }
}
