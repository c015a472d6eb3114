//! Cache Statistics Module
//!
//! Tracks cache activity with atomic counters recorded outside the map lock.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// Shared cache activity counters.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    expired: AtomicU64,
    corrupted: AtomicU64,
    stored: AtomicU64,
    skipped: AtomicU64,
    deleted: AtomicU64,
}

/// Point-in-time copy of [`CacheStats`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatsSnapshot {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that fell through (absent, stale or corrupt)
    pub misses: u64,
    /// Stale entries dropped on lookup or by a sweep
    pub expired: u64,
    /// Entries dropped because they could not be decoded
    pub corrupted: u64,
    /// Responses written to the cache
    pub stored: u64,
    /// Writes skipped (not cacheable or not encodable)
    pub skipped: u64,
    /// Explicit deletions
    pub deleted: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_expired(&self, count: u64) {
        self.expired.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_corrupted(&self) {
        self.corrupted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stored(&self) {
        self.stored.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_deleted(&self) {
        self.deleted.fetch_add(1, Ordering::Relaxed);
    }

    // == Snapshot ==
    /// Copies the counters, tagging them with the current entry count.
    pub fn snapshot(&self, total_entries: usize) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
            corrupted: self.corrupted.load(Ordering::Relaxed),
            stored: self.stored.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            deleted: self.deleted.load(Ordering::Relaxed),
            total_entries,
        }
    }
}

impl StatsSnapshot {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
