use std::hash::Hash;
use std::sync::Arc;

use crate::cache::bounded::{BoundedCache, CacheStats};
use crate::engine::context::Clear;
use crate::foundation::error::FramelaneResult;
use crate::source::FrameSource;

/// Shared derived stream.
pub type Stream = Arc<dyn FrameSource>;

type ComputeFn<K> = dyn Fn(&K) -> FramelaneResult<Stream> + Send + Sync;

/// Per-key memo of derived frame streams.
///
/// Each value may itself be an expensive pipeline, so the default capacity is small.
pub struct DynamicResultCache<K> {
    streams: BoundedCache<K, Stream>,
    compute: Arc<ComputeFn<K>>,
}

impl<K: Eq + Hash + Clone> DynamicResultCache<K> {
    /// Default number of cached streams.
    pub const DEFAULT_CAPACITY: usize = 3;

    /// Cache with [`Self::DEFAULT_CAPACITY`].
    pub fn new(
        compute: impl Fn(&K) -> FramelaneResult<Stream> + Send + Sync + 'static,
    ) -> FramelaneResult<Self> {
        Self::with_capacity(Self::DEFAULT_CAPACITY, compute)
    }

    /// Cache holding at most `capacity` streams.
    pub fn with_capacity(
        capacity: usize,
        compute: impl Fn(&K) -> FramelaneResult<Stream> + Send + Sync + 'static,
    ) -> FramelaneResult<Self> {
        Ok(Self {
            streams: BoundedCache::new(capacity)?,
            compute: Arc::new(compute),
        })
    }

    /// Stream for `key`, computed on first request and after eviction.
    pub fn get_stream(&mut self, key: K) -> FramelaneResult<Stream> {
        let compute = &self.compute;
        self.streams
            .try_get_or_insert_with(key, |k| compute(k))
            .map(Arc::clone)
    }

    /// Cached stream for `key`, counting a hit. Never computes.
    pub fn cached(&mut self, key: &K) -> Option<Stream> {
        self.streams.lookup(key).map(Arc::clone)
    }

    /// Handle to the compute function, for filling a miss without holding this cache.
    pub(crate) fn compute_fn(&self) -> Arc<ComputeFn<K>> {
        Arc::clone(&self.compute)
    }

    /// Store a stream computed for a miss. A stream stored for `key` in the meantime wins.
    pub(crate) fn fill(&mut self, key: K, stream: Stream) -> Stream {
        Arc::clone(self.streams.get_or_insert_with(key, |_| stream))
    }

    /// Drop the stream for `key`, if cached.
    pub fn remove(&mut self, key: &K) {
        self.streams.remove(key);
    }

    /// Cached stream count.
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    /// Return `true` when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// Counters of the underlying table.
    pub fn stats(&self) -> CacheStats {
        self.streams.stats()
    }
}

impl<K> Clear for DynamicResultCache<K> {
    fn clear(&mut self) {
        self.streams.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/dynamic.rs"]
mod tests;
