//! Byte-budgeted LRU cache for raw buffers.

use std::collections::HashMap;
use std::hash::Hash;

use bytes::Bytes;
use tracing::{debug, trace};

use crate::error::{CacheError, Result};

struct CachedBuffer {
    data: Bytes,
    /// Logical access time; larger is more recent.
    last_access: u64,
}

/// Cache bounded by the total byte length of its buffers.
///
/// A buffer larger than half the budget is never admitted, so one item cannot
/// monopolize the cache. Reads refresh an entry's access time; eviction scans
/// for the entry with the oldest access time. The scan is linear, which is
/// fine for the few hundred entries an image cache holds.
pub struct ByteBudgetedCache<K> {
    entries: HashMap<K, CachedBuffer>,
    max_size_bytes: usize,
    current_size_bytes: usize,
    access_clock: u64,
}

impl<K: Hash + Eq + Clone> ByteBudgetedCache<K> {
    /// Create a cache holding at most `max_size_bytes` of buffer data.
    pub fn new(max_size_bytes: usize) -> Result<Self> {
        if max_size_bytes == 0 {
            return Err(CacheError::ZeroBudget);
        }
        Ok(Self {
            entries: HashMap::new(),
            max_size_bytes,
            current_size_bytes: 0,
            access_clock: 0,
        })
    }

    fn tick(&mut self) -> u64 {
        self.access_clock += 1;
        self.access_clock
    }

    /// Largest buffer the cache will admit.
    pub fn max_item_bytes(&self) -> usize {
        self.max_size_bytes / 2
    }

    /// Look up a buffer, refreshing its access time on a hit.
    ///
    /// The returned `Bytes` shares the cached allocation.
    pub fn get(&mut self, key: &K) -> Option<Bytes> {
        let now = self.tick();
        let entry = self.entries.get_mut(key)?;
        entry.last_access = now;
        Some(entry.data.clone())
    }

    /// Insert a buffer, evicting the least recently accessed entries until it
    /// fits.
    ///
    /// Returns `false` without touching the cache when the buffer is larger
    /// than half the budget.
    pub fn set(&mut self, key: K, data: Bytes) -> bool {
        let size = data.len();
        if size > self.max_item_bytes() {
            debug!(
                size,
                max_item_bytes = self.max_item_bytes(),
                "Buffer too large for cache, not admitted"
            );
            return false;
        }

        // Take the old buffer out first so the eviction scan cannot pick it.
        if let Some(old) = self.entries.remove(&key) {
            self.current_size_bytes -= old.data.len();
        }

        while self.current_size_bytes + size > self.max_size_bytes {
            if !self.evict_oldest() {
                break;
            }
        }

        let now = self.tick();
        self.entries.insert(
            key,
            CachedBuffer {
                data,
                last_access: now,
            },
        );
        self.current_size_bytes += size;
        true
    }

    fn evict_oldest(&mut self) -> bool {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_access)
            .map(|(key, _)| key.clone());

        match oldest.and_then(|key| self.entries.remove(&key)) {
            Some(entry) => {
                self.current_size_bytes -= entry.data.len();
                trace!(
                    freed = entry.data.len(),
                    current_size_bytes = self.current_size_bytes,
                    "Evicted least recently accessed buffer"
                );
                true
            }
            None => false,
        }
    }

    /// Membership test without touching access time.
    pub fn has(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Remove a buffer. Returns whether it was present.
    pub fn delete(&mut self, key: &K) -> bool {
        match self.entries.remove(key) {
            Some(entry) => {
                self.current_size_bytes -= entry.data.len();
                true
            }
            None => false,
        }
    }

    /// Drop every buffer and reset the byte accounting.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.current_size_bytes = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn current_size_bytes(&self) -> usize {
        self.current_size_bytes
    }

    pub fn stats(&self) -> ByteCacheStats {
        ByteCacheStats {
            item_count: self.entries.len(),
            current_size_bytes: self.current_size_bytes,
            max_size_bytes: self.max_size_bytes,
            utilization_percent: self.current_size_bytes as f64 / self.max_size_bytes as f64
                * 100.0,
        }
    }
}

/// Snapshot of a [`ByteBudgetedCache`].
#[derive(Debug, Clone, PartialEq)]
pub struct ByteCacheStats {
    pub item_count: usize,
    pub current_size_bytes: usize,
    pub max_size_bytes: usize,
    pub utilization_percent: f64,
}
