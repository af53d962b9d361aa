//! Bounded in-memory TTL store.

use super::key::CacheKey;
use super::stats::{AtomicStats, CacheStats};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(value: String, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Configuration for a [`TtlStore`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Hard ceiling on live entries. `set` refuses new keys past this point.
    pub max_keys: usize,
    /// TTL applied when `set` is called without an explicit duration.
    pub default_ttl: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_keys: 1000,
            default_ttl: Duration::from_secs(3600),
        }
    }
}

impl StoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_keys(mut self, max_keys: usize) -> Self {
        self.max_keys = max_keys;
        self
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }
}

/// Bounded key→value store where every entry carries an expiry instant.
///
/// Expiry is enforced on every read: a lookup that observes an expired entry
/// removes it, counts it once in `expired`, and reports a miss — a logically
/// expired value is never returned even if no sweep has run. Capacity is a
/// hard ceiling rather than an eviction policy: writing a new key into a full
/// store is refused, existing entries are never displaced.
///
/// All operations take `&self`; the store is shared across callers behind an
/// `Arc` and is safe under concurrent access.
#[derive(Debug)]
pub struct TtlStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
    stats: AtomicStats,
    config: StoreConfig,
}

impl TtlStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            stats: AtomicStats::new(),
            config,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Look up a key. Counts a hit for a live entry, a miss for anything
    /// else; an expired entry found here is reclaimed on the spot.
    pub fn get(&self, key: &CacheKey) -> Option<String> {
        let now = Instant::now();
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        match entries.get(key.as_str()) {
            Some(entry) if !entry.is_expired(now) => {
                self.stats.record_hit();
                debug!(key = %key, "cache hit");
                Some(entry.value.clone())
            }
            Some(_) => {
                entries.remove(key.as_str());
                self.stats.record_expired(1);
                self.stats.record_miss();
                debug!(key = %key, "cache miss (expired)");
                None
            }
            None => {
                self.stats.record_miss();
                debug!(key = %key, "cache miss");
                None
            }
        }
    }

    /// Insert with the default TTL. See [`TtlStore::set_with_ttl`].
    pub fn set(&self, key: &CacheKey, value: impl Into<String>) -> bool {
        self.set_with_ttl(key, value, self.config.default_ttl)
    }

    /// Insert a value that expires after `ttl`.
    ///
    /// Returns `false` without writing when the store already holds
    /// `max_keys` live entries and `key` is not among them. Overwriting an
    /// existing key always succeeds and restarts its TTL from now.
    pub fn set_with_ttl(&self, key: &CacheKey, value: impl Into<String>, ttl: Duration) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        self.reclaim_expired(&mut entries);
        if !entries.contains_key(key.as_str()) && entries.len() >= self.config.max_keys {
            warn!(
                key = %key,
                max_keys = self.config.max_keys,
                "cache at capacity, refusing new key"
            );
            return false;
        }
        entries.insert(key.as_str().to_string(), CacheEntry::new(value.into(), ttl));
        true
    }

    /// Remove a key. Returns whether a live entry was present; an expired
    /// entry found here is reclaimed and reported as absent.
    pub fn delete(&self, key: &CacheKey) -> bool {
        let now = Instant::now();
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        match entries.remove(key.as_str()) {
            Some(entry) if entry.is_expired(now) => {
                self.stats.record_expired(1);
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    /// Atomically empty the store. Statistics are left untouched; resetting
    /// them is a separate administrative operation.
    pub fn flush_all(&self) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let removed = entries.len();
        entries.clear();
        debug!(removed, "cache flushed");
    }

    /// Sweep: reclaim every expired entry now, returning how many were
    /// removed. Each reclaimed entry is counted in `expired` exactly once;
    /// entries already reclaimed by a read or delete are not re-counted.
    pub fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        self.reclaim_expired(&mut entries)
    }

    fn reclaim_expired(&self, entries: &mut HashMap<String, CacheEntry>) -> usize {
        let now = Instant::now();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        let removed = before - entries.len();
        if removed > 0 {
            self.stats.record_expired(removed as u64);
            debug!(removed, "reclaimed expired cache entries");
        }
        removed
    }

    /// Count of live (unexpired) entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.values().filter(|e| !e.is_expired(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read-only snapshot of the counters; does not mutate anything.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.len() as u64)
    }

    /// Zero the hit/miss/expired counters. Store contents, and therefore the
    /// live key count, are unaffected.
    pub fn reset_stats(&self) {
        self.stats.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> CacheKey {
        CacheKey::new(name)
    }

    #[test]
    fn set_then_get_within_ttl_returns_value() {
        let store = TtlStore::new(StoreConfig::default());
        assert!(store.set_with_ttl(&key("k"), "v", Duration::from_secs(60)));
        assert_eq!(store.get(&key("k")).as_deref(), Some("v"));
        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 0);
    }

    #[test]
    fn expired_entry_reads_as_miss_without_a_sweep() {
        let store = TtlStore::new(StoreConfig::default());
        assert!(store.set_with_ttl(&key("k"), "v", Duration::from_millis(20)));
        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(store.get(&key("k")), None);
        let stats = store.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.expired, 1);
        assert_eq!(stats.total_keys, 0);
    }

    #[test]
    fn capacity_is_a_hard_ceiling_without_eviction() {
        let store = TtlStore::new(StoreConfig::new().with_max_keys(2));
        assert!(store.set(&key("a"), "1"));
        assert!(store.set(&key("b"), "2"));
        assert!(!store.set(&key("c"), "3"));
        // existing entries survive the refused write
        assert_eq!(store.get(&key("a")).as_deref(), Some("1"));
        assert_eq!(store.get(&key("b")).as_deref(), Some("2"));
        assert_eq!(store.get(&key("c")), None);
        // overwriting an existing key is always allowed
        assert!(store.set(&key("a"), "1b"));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn expired_entries_do_not_hold_capacity() {
        let store = TtlStore::new(StoreConfig::new().with_max_keys(1));
        assert!(store.set_with_ttl(&key("old"), "v", Duration::from_millis(10)));
        std::thread::sleep(Duration::from_millis(30));
        assert!(store.set(&key("new"), "w"));
        assert_eq!(store.stats().expired, 1);
    }

    #[test]
    fn delete_reports_presence_and_skips_expired() {
        let store = TtlStore::new(StoreConfig::default());
        store.set(&key("live"), "v");
        store.set_with_ttl(&key("dead"), "v", Duration::from_millis(10));
        std::thread::sleep(Duration::from_millis(30));
        assert!(store.delete(&key("live")));
        assert!(!store.delete(&key("dead")));
        assert!(!store.delete(&key("missing")));
        assert_eq!(store.stats().expired, 1);
    }

    #[test]
    fn purge_counts_each_expired_entry_exactly_once() {
        let store = TtlStore::new(StoreConfig::default());
        store.set_with_ttl(&key("a"), "1", Duration::from_millis(10));
        store.set_with_ttl(&key("b"), "2", Duration::from_millis(10));
        store.set(&key("c"), "3");
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(store.purge_expired(), 2);
        // idempotent: a second sweep finds nothing new
        assert_eq!(store.purge_expired(), 0);
        let stats = store.stats();
        assert_eq!(stats.expired, 2);
        assert_eq!(stats.total_keys, 1);
    }

    #[test]
    fn flush_all_empties_store_but_keeps_stats() {
        let store = TtlStore::new(StoreConfig::default());
        store.set(&key("a"), "1");
        store.get(&key("a"));
        store.get(&key("b"));
        store.flush_all();
        assert!(store.is_empty());
        assert_eq!(store.get(&key("a")), None);
        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
    }

    #[test]
    fn reset_stats_keeps_contents() {
        let store = TtlStore::new(StoreConfig::default());
        store.set(&key("a"), "1");
        store.get(&key("a"));
        store.get(&key("b"));
        store.reset_stats();
        let stats = store.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.expired, 0);
        assert_eq!(stats.total_keys, 1);
        assert_eq!(store.get(&key("a")).as_deref(), Some("1"));
    }

    #[test]
    fn stats_snapshot_does_not_mutate_counters() {
        let store = TtlStore::new(StoreConfig::default());
        store.set(&key("a"), "1");
        store.get(&key("a"));
        let first = store.stats();
        let second = store.stats();
        assert_eq!(first, second);
    }

    #[test]
    fn overwrite_restarts_ttl() {
        let store = TtlStore::new(StoreConfig::default());
        store.set_with_ttl(&key("k"), "v1", Duration::from_millis(30));
        std::thread::sleep(Duration::from_millis(20));
        store.set_with_ttl(&key("k"), "v2", Duration::from_secs(60));
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(store.get(&key("k")).as_deref(), Some("v2"));
    }
}
