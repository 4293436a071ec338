use std::sync::{Arc, Mutex, PoisonError};

use crate::cache::bounded::{BoundedCache, CacheStats};
use crate::foundation::error::FramelaneResult;
use crate::source::{Frame, FrameSource, SourceInfo, check_index};

/// Per-frame decode cache in front of a source.
///
/// Computed frames are kept in a FIFO table keyed by index, so re-reading a recent index skips the
/// inner source. Frames share their payload, so a hit costs one refcount bump.
pub struct CachedSource<S> {
    inner: S,
    frames: Arc<Mutex<BoundedCache<u64, Frame>>>,
}

impl<S: FrameSource> CachedSource<S> {
    /// Default number of cached frames.
    pub const DEFAULT_CAPACITY: usize = 10;

    /// Cache up to `capacity` frames of `inner`.
    pub fn new(inner: S, capacity: usize) -> FramelaneResult<Self> {
        Ok(Self {
            inner,
            frames: Arc::new(Mutex::new(BoundedCache::new(capacity)?)),
        })
    }

    /// Counters of the frame table.
    pub fn stats(&self) -> CacheStats {
        self.lock().stats()
    }

    /// Number of cached frames.
    pub fn cached(&self) -> usize {
        self.lock().len()
    }

    /// Handle to register with an engine's teardown registry.
    pub fn teardown_hook(&self) -> Arc<Mutex<BoundedCache<u64, Frame>>> {
        Arc::clone(&self.frames)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BoundedCache<u64, Frame>> {
        self.frames.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: FrameSource> FrameSource for CachedSource<S> {
    fn info(&self) -> SourceInfo {
        self.inner.info()
    }

    fn fetch(&self, n: u64) -> FramelaneResult<Frame> {
        check_index(n, self.inner.len())?;
        if let Some(f) = self.lock().lookup(&n) {
            return Ok(f.clone());
        }
        // Decode unlocked; a concurrent miss on the same index decodes twice and keeps one.
        let frame = self.inner.fetch(n)?;
        let mut frames = self.lock();
        Ok(frames.get_or_insert_with(n, |_| frame).clone())
    }
}

/// Wrap `source` in a [`CachedSource`] with the default capacity.
pub fn cache_source<S: FrameSource>(source: S) -> FramelaneResult<CachedSource<S>> {
    CachedSource::new(source, CachedSource::<S>::DEFAULT_CAPACITY)
}

#[cfg(test)]
#[path = "../../tests/unit/cache/frames.rs"]
mod tests;
