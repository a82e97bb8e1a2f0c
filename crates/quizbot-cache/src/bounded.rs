//! Count-bounded LRU cache.

use std::hash::Hash;
use std::num::NonZeroUsize;

use lru::LruCache;
use tracing::trace;

use crate::error::{CacheError, Result};

/// Recency-ordered key-value store holding at most `capacity` entries.
///
/// `get` and `set` both count as a use. When a new key arrives while the
/// cache is full, the least recently used entry is evicted. `has` is a pure
/// membership test and does not affect recency.
pub struct BoundedCache<K, V> {
    lru: LruCache<K, V>,
    evictions: u64,
}

impl<K: Hash + Eq, V> BoundedCache<K, V> {
    /// Create a cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Result<Self> {
        let cap = NonZeroUsize::new(capacity).ok_or(CacheError::ZeroCapacity)?;
        Ok(Self {
            lru: LruCache::new(cap),
            evictions: 0,
        })
    }

    /// Look up a key, promoting it to most recently used on a hit.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        self.lru.get(key)
    }

    /// Insert or replace a value, making it the most recently used entry.
    ///
    /// Returns the evicted least-recently-used entry, if the insert needed room.
    pub fn set(&mut self, key: K, value: V) -> Option<(K, V)> {
        // Replacing a key never evicts; `push` hands back the old pair instead.
        let replacing = self.lru.contains(&key);
        match self.lru.push(key, value) {
            Some(evicted) if !replacing => {
                self.evictions += 1;
                trace!(
                    size = self.lru.len(),
                    capacity = self.capacity(),
                    "Evicted least recently used entry"
                );
                Some(evicted)
            }
            _ => None,
        }
    }

    /// Membership test without touching recency.
    pub fn has(&self, key: &K) -> bool {
        self.lru.contains(key)
    }

    /// Remove a key. Returns whether it was present.
    pub fn delete(&mut self, key: &K) -> bool {
        self.lru.pop(key).is_some()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.lru.clear();
    }

    pub fn len(&self) -> usize {
        self.lru.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lru.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.lru.cap().get()
    }

    /// Keys from least to most recently used.
    pub fn keys_by_recency(&self) -> impl Iterator<Item = &K> {
        self.lru.iter().rev().map(|(k, _)| k)
    }

    pub fn stats(&self) -> BoundedCacheStats {
        let size = self.lru.len();
        let capacity = self.capacity();
        BoundedCacheStats {
            size,
            capacity,
            utilization_percent: size as f64 / capacity as f64 * 100.0,
            evictions: self.evictions,
        }
    }
}

/// Snapshot of a [`BoundedCache`].
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedCacheStats {
    /// Current number of entries.
    pub size: usize,

    /// Maximum number of entries.
    pub capacity: usize,

    /// `size / capacity` as a percentage.
    pub utilization_percent: f64,

    /// Entries evicted to make room since construction.
    pub evictions: u64,
}
