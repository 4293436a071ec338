//! Frame sources: the frame-indexed, lazily computed streams the render pipeline consumes.
//!
//! A [`FrameSource`] never hands out ownership of engine internals; callers only see computed
//! [`Frame`] values and the source's static [`SourceInfo`].

use std::sync::Arc;

use crate::foundation::core::Fps;
use crate::foundation::error::{FramelaneError, FramelaneResult};

/// Frame payload, format, and properties.
pub mod frame;
pub mod views;

pub use frame::{ColorFamily, Frame, FrameFormat, NodeRef, PropMap, PropValue};

/// Static description of a source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceInfo {
    /// Number of frames.
    pub len: u64,
    /// Fixed frame format, or `None` when frames may vary.
    pub format: Option<FrameFormat>,
    /// Fixed `(width, height)`, or `None` when frames may vary.
    pub resolution: Option<(u32, u32)>,
    /// Nominal frame rate.
    pub fps: Fps,
}

impl SourceInfo {
    /// Info for a fixed-format source.
    pub fn fixed(len: u64, width: u32, height: u32, format: FrameFormat, fps: Fps) -> Self {
        Self {
            len,
            format: Some(format),
            resolution: Some((width, height)),
            fps,
        }
    }

    /// Same info with a different length.
    pub fn with_len(self, len: u64) -> Self {
        Self { len, ..self }
    }
}

/// Frame-indexed, lazily computed stream.
///
/// `fetch` may be called concurrently from engine worker threads and in any index order.
pub trait FrameSource: Send + Sync {
    /// Static source description.
    fn info(&self) -> SourceInfo;

    /// Compute frame `n`. `n >= len` is a usage error.
    fn fetch(&self, n: u64) -> FramelaneResult<Frame>;

    /// Number of frames.
    fn len(&self) -> u64 {
        self.info().len
    }

    /// Return `true` when the source has no frames.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S: FrameSource + ?Sized> FrameSource for Arc<S> {
    fn info(&self) -> SourceInfo {
        (**self).info()
    }

    fn fetch(&self, n: u64) -> FramelaneResult<Frame> {
        (**self).fetch(n)
    }
}

impl<S: FrameSource + ?Sized> FrameSource for &S {
    fn info(&self) -> SourceInfo {
        (**self).info()
    }

    fn fetch(&self, n: u64) -> FramelaneResult<Frame> {
        (**self).fetch(n)
    }
}

/// Validate `n` against a source length.
pub(crate) fn check_index(n: u64, len: u64) -> FramelaneResult<()> {
    if n >= len {
        return Err(FramelaneError::validation(format!(
            "frame index {n} out of range for source of length {len}"
        )));
    }
    Ok(())
}

/// Source backed by a closure producing frame `n`.
///
/// The closure is only called with in-range indices.
pub struct FnSource<F> {
    info: SourceInfo,
    produce: F,
}

impl<F> FnSource<F>
where
    F: Fn(u64) -> FramelaneResult<Frame> + Send + Sync,
{
    /// Wrap `produce` as a source described by `info`.
    pub fn new(info: SourceInfo, produce: F) -> Self {
        Self { info, produce }
    }
}

impl<F> FrameSource for FnSource<F>
where
    F: Fn(u64) -> FramelaneResult<Frame> + Send + Sync,
{
    fn info(&self) -> SourceInfo {
        self.info
    }

    fn fetch(&self, n: u64) -> FramelaneResult<Frame> {
        check_index(n, self.info.len)?;
        (self.produce)(n)
    }
}

/// Blank fixed-format source whose frames carry only a `_FrameNumber` prop.
pub fn blank_source(
    len: u64,
    width: u32,
    height: u32,
    format: FrameFormat,
    fps: Fps,
) -> FnSource<impl Fn(u64) -> FramelaneResult<Frame> + Send + Sync> {
    FnSource::new(
        SourceInfo::fixed(len, width, height, format, fps),
        move |n| {
            let number = i64::try_from(n)
                .map_err(|_| FramelaneError::validation("frame number exceeds i64"))?;
            Ok(Frame::blank(width, height, format).with_prop("_FrameNumber", number))
        },
    )
}

#[cfg(test)]
#[path = "../../tests/unit/source/mod.rs"]
mod tests;
