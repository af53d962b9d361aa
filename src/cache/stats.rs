//! Cache statistics: lock-free counters and read-only snapshots.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time snapshot of store accounting.
///
/// `hits`, `misses` and `expired` are monotonically increasing between
/// explicit resets; `total_keys` tracks the current live entry count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub expired: u64,
    pub total_keys: u64,
}

impl CacheStats {
    /// Fraction of lookups answered from cache; 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Shared mutable counters behind the snapshots.
///
/// Atomics rather than a guarded struct: increments happen on every lookup
/// and must stay cheap and safe under concurrent callers.
#[derive(Debug, Default)]
pub(crate) struct AtomicStats {
    hits: AtomicU64,
    misses: AtomicU64,
    expired: AtomicU64,
}

impl AtomicStats {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_expired(&self, count: u64) {
        self.expired.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.expired.store(0, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, total_keys: u64) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
            total_keys,
        }
    }
}

/// Administrative report combining configuration and counters, shaped for the
/// privileged stats surface.
#[derive(Debug, Clone, Serialize)]
pub struct CacheReport {
    pub size: usize,
    pub max_size: usize,
    pub default_ttl_secs: u64,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub total_keys: u64,
    pub expired_count: u64,
}
