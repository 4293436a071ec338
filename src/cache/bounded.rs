use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

use crate::engine::context::Clear;
use crate::foundation::error::{FramelaneError, FramelaneResult};

/// Hit/miss/eviction counters of a [`BoundedCache`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the table.
    pub hits: u64,
    /// Lookups that ran `compute`.
    pub misses: u64,
    /// Entries dropped because the table overflowed.
    pub evictions: u64,
}

/// Fixed-capacity map with FIFO eviction.
///
/// Overflow drops the oldest *inserted* key; lookups never reorder entries. The cache is not
/// synchronized: share it behind a `Mutex`, which also makes it a teardown hook through
/// [`Clear`].
#[derive(Debug)]
pub struct BoundedCache<K, V> {
    capacity: usize,
    map: HashMap<K, V>,
    order: VecDeque<K>,
    stats: CacheStats,
}

impl<K: Eq + Hash + Clone, V> BoundedCache<K, V> {
    /// Empty cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> FramelaneResult<Self> {
        if capacity == 0 {
            return Err(FramelaneError::validation("cache capacity must be >= 1"));
        }
        Ok(Self {
            capacity,
            map: HashMap::with_capacity(capacity + 1),
            order: VecDeque::with_capacity(capacity + 1),
            stats: CacheStats::default(),
        })
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current number of entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Return `true` when the cache holds nothing.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Counters since creation.
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Return `true` when `key` is cached.
    pub fn contains_key(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Look up without computing or touching the counters.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.map.get(key)
    }

    /// Look up, counting a hit when present. Misses are counted by the insert paths.
    pub fn lookup(&mut self, key: &K) -> Option<&V> {
        let value = self.map.get(key)?;
        self.stats.hits += 1;
        Some(value)
    }

    /// Keys from oldest to newest insertion.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.order.iter()
    }

    /// Insert or replace. Replacing keeps the key's original insertion position.
    pub fn insert(&mut self, key: K, value: V) {
        if self.map.insert(key.clone(), value).is_none() {
            self.order.push_back(key);
            self.evict_overflow();
        }
    }

    /// Cached value for `key`, computing and storing it on a miss.
    pub fn get_or_insert_with(&mut self, key: K, compute: impl FnOnce(&K) -> V) -> &V {
        if self.map.contains_key(&key) {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
            let value = compute(&key);
            self.map.insert(key.clone(), value);
            self.order.push_back(key.clone());
            self.evict_overflow();
        }
        &self.map[&key]
    }

    /// Fallible [`BoundedCache::get_or_insert_with`]. A failed compute stores nothing.
    pub fn try_get_or_insert_with(
        &mut self,
        key: K,
        compute: impl FnOnce(&K) -> FramelaneResult<V>,
    ) -> FramelaneResult<&V> {
        if self.map.contains_key(&key) {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
            let value = compute(&key)?;
            self.insert(key.clone(), value);
        }
        self.map
            .get(&key)
            .ok_or_else(|| FramelaneError::engine("cache entry vanished after insert"))
    }

    /// Drop `key`. Absent keys are ignored.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let value = self.map.remove(key)?;
        self.order.retain(|k| k != key);
        Some(value)
    }

    fn evict_overflow(&mut self) {
        while self.map.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.map.remove(&oldest);
            self.stats.evictions += 1;
        }
    }
}

impl<K, V> Clear for BoundedCache<K, V> {
    fn clear(&mut self) {
        self.map.clear();
        self.order.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/bounded.rs"]
mod tests;
