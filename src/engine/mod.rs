//! The scheduling seam between the render pipeline and whatever computes frames.
//!
//! The pipeline never spawns frame work itself. It hands a [`ScheduleJob`] to a
//! [`FrameScheduler`], which computes frames concurrently, runs the job's adapter on each
//! completion (any thread, any order), and then delivers adapted frames back to the caller in
//! strictly ascending index order.

use smallvec::SmallVec;

use crate::foundation::error::{FramelaneError, FramelaneResult};
use crate::source::{Frame, FrameSource};

/// Teardown registry for engine-derived state.
pub mod context;
/// Rayon-backed scheduler.
pub mod pool;

pub use context::{Clear, Teardown, TeardownHook};
pub use pool::{Engine, EngineOpts};

/// One frame per job input, in input order.
pub type LaneFrames = SmallVec<[Frame; 4]>;

/// Completion adapter: receives the job-local index and the frames of every input at that index,
/// and returns the frame to deliver downstream.
pub type Adapter<'a> = dyn Fn(u64, LaneFrames) -> FramelaneResult<Frame> + Sync + 'a;

/// Ordered-pull callback run on the calling thread.
pub type Pull<'a> = dyn FnMut(u64, Frame) -> FramelaneResult<()> + 'a;

/// A single scheduling call: compute `[0, len)` over every input.
pub struct ScheduleJob<'a> {
    /// Inputs of equal length; the adapter sees one frame per input.
    pub inputs: &'a [&'a dyn FrameSource],
    /// Completion adapter.
    pub adapter: &'a Adapter<'a>,
    /// Maximum in-flight requests. `0` lets the engine decide.
    pub prefetch: usize,
    /// Maximum completed-but-undelivered frames. `None` lets the engine decide.
    pub backlog: Option<usize>,
}

impl ScheduleJob<'_> {
    /// Validate the inputs and return the job length.
    pub fn validate(&self) -> FramelaneResult<u64> {
        let Some(first) = self.inputs.first() else {
            return Err(FramelaneError::config("schedule job needs at least one input"));
        };
        let len = first.len();
        if let Some(bad) = self.inputs.iter().position(|s| s.len() != len) {
            return Err(FramelaneError::config(format!(
                "schedule job inputs must share one length: input 0 has {len}, input {bad} has {}",
                self.inputs[bad].len()
            )));
        }
        Ok(len)
    }
}

/// The external engine's concurrent frame-computation contract.
///
/// Implementations must:
/// - invoke `job.adapter` exactly once per index in `[0, len)`, in any order, from any thread;
/// - call `pull` once per index, on the calling thread, in strictly ascending order;
/// - stop and return the first fetch/adapter/pull error without retrying.
pub trait FrameScheduler: Send + Sync {
    /// Run `job` to completion, delivering adapted frames to `pull` in order.
    fn schedule(&self, job: &ScheduleJob<'_>, pull: &mut Pull<'_>) -> FramelaneResult<()>;

    /// Number of frames the engine computes concurrently by default.
    fn default_prefetch(&self) -> usize {
        1
    }
}

impl<T: FrameScheduler + ?Sized> FrameScheduler for &T {
    fn schedule(&self, job: &ScheduleJob<'_>, pull: &mut Pull<'_>) -> FramelaneResult<()> {
        (**self).schedule(job, pull)
    }

    fn default_prefetch(&self) -> usize {
        (**self).default_prefetch()
    }
}
