//! Generic TTL cache.
//!
//! One `ResourceCache` exists per resource type. Entries are never evicted in
//! the background; freshness is checked lazily by the reader. There is no size
//! bound, so the map grows with the number of distinct ids fetched.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// A cached value and the instant it was fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    pub value: V,
    pub fetched_at: Instant,
}

/// TTL-aware map from positive resource id to its last fetched value.
#[derive(Debug)]
pub struct ResourceCache<V> {
    entries: RwLock<HashMap<u64, CacheEntry<V>>>,
    ttl: Duration,
}

impl<V: Clone> ResourceCache<V> {
    /// Create an empty cache with the given TTL.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// The configured time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up an entry, fresh or expired.
    pub fn get(&self, id: u64) -> Option<CacheEntry<V>> {
        self.entries.read().get(&id).cloned()
    }

    /// Insert or wholesale replace the entry for `id`.
    pub fn put(&self, id: u64, value: V, now: Instant) {
        self.entries.write().insert(
            id,
            CacheEntry {
                value,
                fetched_at: now,
            },
        );
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// An entry is fresh while `now - fetched_at < ttl`.
    pub fn is_fresh(&self, entry: &CacheEntry<V>, now: Instant) -> bool {
        now.saturating_duration_since(entry.fetched_at) < self.ttl
    }

    /// Number of entries, including expired ones.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
