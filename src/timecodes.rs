//! Per-frame durations read from `_DurationNum` / `_DurationDen` frame properties.

use crate::engine::FrameScheduler;
use crate::foundation::error::{FramelaneError, FramelaneResult};
use crate::render::config::RenderOpts;
use crate::render::pipeline::collect;
use crate::source::{Frame, FrameSource};

/// Numerator property of a frame's duration in seconds.
pub const DURATION_NUM: &str = "_DurationNum";
/// Denominator property of a frame's duration in seconds.
pub const DURATION_DEN: &str = "_DurationDen";

/// Duration of one frame, `numerator / denominator` seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timecode {
    /// Frame index.
    pub frame: u64,
    /// Duration numerator.
    pub numerator: u64,
    /// Duration denominator.
    pub denominator: u64,
}

impl Timecode {
    /// Duration in seconds.
    pub fn seconds(self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    /// Frame rate implied by the duration.
    pub fn fps(self) -> f64 {
        self.denominator as f64 / self.numerator as f64
    }

    /// `true` when both durations are the same rational value as written.
    pub fn same_duration(self, other: Self) -> bool {
        (self.numerator, self.denominator) == (other.numerator, other.denominator)
    }
}

/// Ordered per-frame durations of a source.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Timecodes(pub Vec<Timecode>);

impl Timecodes {
    /// Read every frame's duration through the render pipeline.
    ///
    /// A missing, non-integer, or non-positive duration fails at that frame.
    #[tracing::instrument(skip(scheduler, source, opts), fields(len = source.len()))]
    pub fn from_source(
        scheduler: &dyn FrameScheduler,
        source: &dyn FrameSource,
        opts: &RenderOpts,
    ) -> FramelaneResult<Self> {
        collect(scheduler, source, opts, |n, f| read_timecode(n, f)).map(Self)
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return `true` for an empty source.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Inclusive `(start, end)` runs of frames sharing one duration, with that duration.
    pub fn ranges(&self) -> Vec<((u64, u64), Timecode)> {
        let mut out: Vec<((u64, u64), Timecode)> = Vec::new();
        for tc in &self.0 {
            match out.last_mut() {
                Some(((_, end), run)) if run.same_duration(*tc) => *end = tc.frame,
                _ => out.push(((tc.frame, tc.frame), *tc)),
            }
        }
        out
    }
}

fn read_timecode(n: u64, f: &Frame) -> FramelaneResult<Timecode> {
    let positive = |key: &str| -> FramelaneResult<u64> {
        let v = f.prop_int(key).map_err(|e| e.at_frame(n))?;
        u64::try_from(v)
            .ok()
            .filter(|&v| v > 0)
            .ok_or_else(|| FramelaneError::Property {
                index: n,
                key: key.to_string(),
                reason: format!("duration must be positive, got {v}"),
            })
    };
    Ok(Timecode {
        frame: n,
        numerator: positive(DURATION_NUM)?,
        denominator: positive(DURATION_DEN)?,
    })
}

#[cfg(test)]
#[path = "../tests/unit/timecodes.rs"]
mod tests;
