//! Framelane drives a concurrent frame scheduler over lane-partitioned index ranges and
//! reassembles out-of-order completions into strict index order.
//!
//! The public API is call-oriented:
//!
//! - Describe a [`FrameSource`] (or wrap one in a view or cache)
//! - Pick a [`FrameScheduler`], usually an [`Engine`]
//! - [`render`] it with [`RenderOpts`]: collect callback outcomes, stream into a [`FrameSink`],
//!   or drain with progress
//! - Search it for property matches with [`find_prop`] / [`find_prop_ranges`]
//! - Read keyframes and per-frame durations with [`Keyframes`] and [`Timecodes`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Bounded FIFO caches.
pub mod cache;
/// Sequential frame sinks.
pub mod encode;
/// The scheduling seam and the rayon-backed engine.
pub mod engine;
/// Lane-partitioned rendering.
pub mod render;
/// Keyframe detection.
pub mod scene;
/// Property range search.
pub mod search;
pub mod sentinel;
/// Frame sources and views.
pub mod source;
/// Per-frame duration collection.
pub mod timecodes;

pub use crate::foundation::core::{Fps, FrameIndex};
pub use crate::foundation::error::{FramelaneError, FramelaneResult};

pub use crate::cache::{BoundedCache, CacheStats, CachedSource, DynamicResultCache, SceneSource};
pub use crate::encode::{FrameSink, InMemorySink, RawSink, SinkConfig, Y4mSink};
pub use crate::engine::{Engine, EngineOpts, FrameScheduler, ScheduleJob, Teardown, TeardownHook};
pub use crate::render::{
    AsyncRenderConfig, AsyncRequests, Progress, RenderOpts, RenderOutput, RenderRequest,
    RenderStats, collect, collect_filtered, collect_marked, drain, render, render_to_sink,
};
pub use crate::scene::{Keyframes, KeyframesFormat, detect_scene_changes};
pub use crate::search::{
    CompareOp, PropPredicate, SearchOpts, coalesce_runs, find_prop, find_prop_ranges,
};
pub use crate::sentinel::{Marked, Sentinel};
pub use crate::timecodes::{Timecode, Timecodes};
pub use crate::source::{
    ColorFamily, FnSource, Frame, FrameFormat, FrameSource, NodeRef, PropMap, PropValue,
    SourceInfo,
};
