//! Derived sources that re-index or reshape another source without copying it.

use crate::foundation::error::{FramelaneError, FramelaneResult};
use crate::source::{Frame, FrameSource, SourceInfo, check_index};

/// Contiguous sub-range `[start, start + len)` of another source.
pub struct SliceView<S> {
    inner: S,
    start: u64,
    len: u64,
}

impl<S: FrameSource> SliceView<S> {
    /// Slice `inner` to `[start, start + len)`.
    pub fn new(inner: S, start: u64, len: u64) -> FramelaneResult<Self> {
        let inner_len = inner.len();
        let end = start
            .checked_add(len)
            .ok_or_else(|| FramelaneError::validation("slice end overflows u64"))?;
        if end > inner_len {
            return Err(FramelaneError::validation(format!(
                "slice [{start}, {end}) exceeds source length {inner_len}"
            )));
        }
        Ok(Self { inner, start, len })
    }

    /// Absolute index in the wrapped source.
    pub fn start(&self) -> u64 {
        self.start
    }
}

impl<S: FrameSource> FrameSource for SliceView<S> {
    fn info(&self) -> SourceInfo {
        self.inner.info().with_len(self.len)
    }

    fn fetch(&self, n: u64) -> FramelaneResult<Frame> {
        check_index(n, self.len)?;
        self.inner.fetch(self.start + n)
    }
}

/// Every `step`-th frame of another source starting at `offset` (`clip[offset::step]`),
/// truncated to `len` frames.
pub struct StrideView<S> {
    inner: S,
    offset: u64,
    step: u64,
    len: u64,
}

impl<S: FrameSource> StrideView<S> {
    /// Build a strided view of exactly `len` frames.
    pub fn new(inner: S, offset: u64, step: u64, len: u64) -> FramelaneResult<Self> {
        if step == 0 {
            return Err(FramelaneError::validation("stride step must be >= 1"));
        }
        if len > 0 {
            let last = (len - 1)
                .checked_mul(step)
                .and_then(|v| v.checked_add(offset))
                .ok_or_else(|| FramelaneError::validation("stride view overflows u64"))?;
            if last >= inner.len() {
                return Err(FramelaneError::validation(format!(
                    "stride view last index {last} exceeds source length {}",
                    inner.len()
                )));
            }
        }
        Ok(Self {
            inner,
            offset,
            step,
            len,
        })
    }
}

impl<S: FrameSource> FrameSource for StrideView<S> {
    fn info(&self) -> SourceInfo {
        self.inner.info().with_len(self.len)
    }

    fn fetch(&self, n: u64) -> FramelaneResult<Frame> {
        check_index(n, self.len)?;
        self.inner.fetch(self.offset + n * self.step)
    }
}

/// Crops every frame to its top-left pixel, keeping properties.
///
/// Used when a callback only reads properties, so no full-size payload has to travel back
/// through the scheduler.
pub struct OnePixelView<S> {
    inner: S,
}

impl<S: FrameSource> OnePixelView<S> {
    /// Wrap `inner`.
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

impl<S: FrameSource> FrameSource for OnePixelView<S> {
    fn info(&self) -> SourceInfo {
        let info = self.inner.info();
        SourceInfo {
            resolution: Some((1, 1)),
            ..info
        }
    }

    fn fetch(&self, n: u64) -> FramelaneResult<Frame> {
        Ok(self.inner.fetch(n)?.crop_one_pixel())
    }
}

/// Applies a per-frame transform to another source.
pub struct MapView<S, F> {
    inner: S,
    map: F,
}

impl<S, F> MapView<S, F>
where
    S: FrameSource,
    F: Fn(u64, Frame) -> FramelaneResult<Frame> + Send + Sync,
{
    /// Wrap `inner`, passing each fetched frame through `map`.
    pub fn new(inner: S, map: F) -> Self {
        Self { inner, map }
    }
}

impl<S, F> FrameSource for MapView<S, F>
where
    S: FrameSource,
    F: Fn(u64, Frame) -> FramelaneResult<Frame> + Send + Sync,
{
    fn info(&self) -> SourceInfo {
        self.inner.info()
    }

    fn fetch(&self, n: u64) -> FramelaneResult<Frame> {
        let frame = self.inner.fetch(n)?;
        (self.map)(n, frame)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/views.rs"]
mod tests;
