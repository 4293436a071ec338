//! Bounded FIFO caches for decoded frames and derived per-key streams.
//!
//! None of these is consulted by the render pipeline itself; they sit beside it, wrap
//! [`FrameSource`](crate::FrameSource)s, and clear themselves when registered with an engine's
//! teardown registry.

/// FIFO table shared by every cache.
pub mod bounded;
/// Per-key derived stream memo.
pub mod dynamic;
/// Per-frame decode cache.
pub mod frames;
/// Scene-indexed derived source.
pub mod scene;

pub use bounded::{BoundedCache, CacheStats};
pub use dynamic::{DynamicResultCache, Stream};
pub use frames::{CachedSource, cache_source};
pub use scene::{SceneSource, scene_bounds};
