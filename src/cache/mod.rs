//! Response caching: a bounded TTL store plus stable key derivation.
//!
//! Caching sits in front of every provider call to avoid paying for the same
//! completion twice. It is deliberately small and strict:
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`TtlStore`] | Bounded key→value store with per-entry expiry and hit/miss accounting |
//! | [`StoreConfig`] | Capacity ceiling and default TTL |
//! | [`CacheKeyBuilder`] | Derives `operation:model:fingerprint` keys |
//! | [`CacheStats`] / [`CacheReport`] | Counter snapshots for the admin surface |
//!
//! Two invariants matter more than anything else here: a logically expired
//! entry is never returned (check-on-read dominates any background sweep),
//! and a full store refuses new keys instead of evicting old ones — the
//! ceiling bounds memory, it is not an LRU policy.

mod key;
mod stats;
mod store;

pub use key::{CacheKey, CacheKeyBuilder};
pub use stats::{CacheReport, CacheStats};
pub use store::{StoreConfig, TtlStore};
