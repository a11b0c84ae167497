//! Ordering of concurrent remote mutations.
//!
//! Every request gets a monotonic id before it is sent. When its response
//! comes back it is only applied if nothing newer has already been applied
//! to the same resource, so the most recently issued request wins rather
//! than the slowest one.

use std::{
    collections::{BTreeSet, HashMap},
    hash::Hash,
    sync::atomic::{AtomicU64, Ordering},
};

/// Result of a cart or wishlist operation. Failures are reported to the
/// shopper through the notification center, never raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The backend accepted the change and the local cache now reflects it.
    Applied,
    /// Refused locally; no request was sent.
    Rejected,
    /// The backend answered, but a newer request had already been applied.
    Stale,
    /// The request failed; the cache is unchanged.
    Failed,
    /// No session user, so nothing was sent.
    Guest,
}

impl MutationOutcome {
    pub fn is_applied(self) -> bool {
        self == MutationOutcome::Applied
    }
}

#[derive(Debug, Default)]
pub struct RequestSequencer {
    issued: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids start at 1, so 0 can mean "nothing applied yet".
    pub fn next(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// Request ids in flight, the id of the last applied full snapshot, and the
/// highest id applied per key since then.
///
/// A key's mark is only kept while some request older than it is still in
/// flight; once none is, no stale answer for that key can arrive.
#[derive(Debug)]
pub struct Watermarks<K> {
    snapshot: u64,
    keys: HashMap<K, u64>,
    in_flight: BTreeSet<u64>,
}

impl<K> Default for Watermarks<K> {
    fn default() -> Self {
        Self {
            snapshot: 0,
            keys: HashMap::new(),
            in_flight: BTreeSet::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> Watermarks<K> {
    /// Records that request `seq` has been sent.
    pub fn begin(&mut self, seq: u64) {
        self.in_flight.insert(seq);
    }

    /// Records that request `seq` finished without touching the cache.
    pub fn settle(&mut self, seq: u64) {
        self.in_flight.remove(&seq);
        self.prune();
    }

    /// Accepts a full snapshot unless a newer snapshot was already applied.
    /// Returns the keys changed by requests newer than the snapshot: the
    /// caller keeps its cached value for those instead of the snapshot's.
    pub fn accept_snapshot(&mut self, seq: u64) -> Option<Vec<K>> {
        self.in_flight.remove(&seq);
        if seq < self.snapshot {
            self.prune();
            return None;
        }
        self.snapshot = seq;
        self.keys.retain(|_, mark| *mark > seq);
        let newer = self.keys.keys().cloned().collect();
        self.prune();
        Some(newer)
    }

    pub fn accept_key(&mut self, seq: u64, key: K) -> bool {
        self.in_flight.remove(&seq);
        let floor = self
            .keys
            .get(&key)
            .copied()
            .unwrap_or_default()
            .max(self.snapshot);
        let accepted = seq >= floor;
        if accepted {
            self.keys.insert(key, seq);
        }
        self.prune();
        accepted
    }

    pub fn tracked_keys(&self) -> usize {
        self.keys.len()
    }

    fn prune(&mut self) {
        let snapshot = self.snapshot;
        match self.in_flight.first().copied() {
            Some(oldest) => self.keys.retain(|_, mark| *mark > snapshot && *mark > oldest),
            None => self.keys.clear(),
        }
    }
}
