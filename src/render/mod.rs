//! Lane-partitioned rendering with ordered reassembly.
//!
//! A render call plans lanes over `[0, L)`, drives the [`FrameScheduler`](crate::FrameScheduler)
//! once per lane group, records each callback outcome by absolute index as frames complete, and
//! reassembles the outcomes in ascending order once every lane has finished.

/// Lane selection and per-call options.
pub mod config;
/// Index partitioning across lanes.
pub mod lanes;
/// Out-of-order result collection.
pub mod pending;
/// Render entry points.
pub mod pipeline;
/// Completion-driven progress reporting.
pub mod progress;

pub use config::{AsyncRenderConfig, AsyncRequests, RenderOpts};
pub use lanes::{LaneCtx, LanePlan, LaneSpec, Partition};
pub use pending::PendingResults;
pub use pipeline::{
    Destination, FrameCallback, RenderOutput, RenderRequest, RenderStats, collect,
    collect_filtered, collect_marked, drain, render, render_to_sink,
};
pub use progress::Progress;
