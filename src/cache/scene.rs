use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::cache::dynamic::DynamicResultCache;
use crate::foundation::error::{FramelaneError, FramelaneResult};
use crate::source::{Frame, FrameSource, SourceInfo, check_index};

/// Validate scene boundaries for a source of length `len`.
///
/// Boundaries must be strictly ascending and below `len`; a missing leading `0` is prepended.
pub fn scene_bounds(mut bounds: Vec<u64>, len: u64) -> FramelaneResult<Vec<u64>> {
    if bounds.first() != Some(&0) {
        bounds.insert(0, 0);
    }
    if let Some(w) = bounds.windows(2).find(|w| w[0] >= w[1]) {
        return Err(FramelaneError::validation(format!(
            "scene boundaries must be strictly ascending, got {} then {}",
            w[0], w[1]
        )));
    }
    if len > 0
        && let Some(&last) = bounds.last()
        && last >= len
    {
        return Err(FramelaneError::validation(format!(
            "scene boundary {last} is outside a source of length {len}"
        )));
    }
    Ok(bounds)
}

/// Frame source that answers each index from a per-scene derived stream.
///
/// Frame `n` belongs to scene `i`, the largest `i` with `bounds[i] <= n`. The scene's stream is
/// requested from a [`DynamicResultCache`] and fetched at the absolute index `n`, so a cheap
/// per-scene transform is computed once per scene instead of once per frame.
pub struct SceneSource {
    info: SourceInfo,
    bounds: Vec<u64>,
    streams: Arc<Mutex<DynamicResultCache<usize>>>,
}

impl SceneSource {
    /// Build over `info.len` frames split at `bounds`.
    pub fn new(
        info: SourceInfo,
        bounds: Vec<u64>,
        streams: DynamicResultCache<usize>,
    ) -> FramelaneResult<Self> {
        let bounds = scene_bounds(bounds, info.len)?;
        tracing::debug!(len = info.len, scenes = bounds.len(), "scene source");
        Ok(Self {
            info,
            bounds,
            streams: Arc::new(Mutex::new(streams)),
        })
    }

    /// Scene id of absolute index `n`.
    pub fn scene_id(&self, n: u64) -> usize {
        self.bounds.partition_point(|&b| b <= n).saturating_sub(1)
    }

    /// Number of scenes.
    pub fn scenes(&self) -> usize {
        self.bounds.len()
    }

    /// Validated boundaries, starting at `0`.
    pub fn bounds(&self) -> &[u64] {
        &self.bounds
    }

    fn cache(&self) -> MutexGuard<'_, DynamicResultCache<usize>> {
        self.streams.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Handle to register with an engine's teardown registry.
    pub fn teardown_hook(&self) -> Arc<Mutex<DynamicResultCache<usize>>> {
        Arc::clone(&self.streams)
    }
}

impl FrameSource for SceneSource {
    fn info(&self) -> SourceInfo {
        self.info
    }

    fn fetch(&self, n: u64) -> FramelaneResult<Frame> {
        check_index(n, self.info.len)?;
        let scene = self.scene_id(n);
        // The lock is never held across `compute` or the stream fetch, so either may re-enter
        // this source.
        let cached = self.cache().cached(&scene);
        let stream = match cached {
            Some(stream) => stream,
            None => {
                let compute = self.cache().compute_fn();
                let stream = compute(&scene)?;
                self.cache().fill(scene, stream)
            }
        };
        if n >= stream.len() {
            return Err(FramelaneError::engine(format!(
                "scene {scene} stream has {} frames, frame {n} requested",
                stream.len()
            )));
        }
        stream.fetch(n)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/scene.rs"]
mod tests;
