use std::io::Write;

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::FramelaneResult;
use crate::source::{Frame, FrameFormat};

/// Configuration provided to a [`FrameSink`] at the start of a sink render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Fixed frame format of every pushed frame.
    pub format: FrameFormat,
    /// Output frames-per-second.
    pub fps: Fps,
    /// Number of frames that will be pushed.
    pub len: u64,
}

/// Sink contract for consuming rendered frames in index order.
///
/// Ordering contract: `push_frame` is called in strictly increasing `FrameIndex` order, once per
/// index of the render range.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed. Rejecting the config aborts the render before
    /// the engine is touched.
    fn begin(&mut self, cfg: SinkConfig) -> FramelaneResult<()>;
    /// Push one frame in strictly increasing index order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &Frame) -> FramelaneResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> FramelaneResult<()>;
    /// Return `true` when the output carries its own framing (headers, per-frame markers).
    fn self_describing(&self) -> bool {
        false
    }
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    ended: bool,
    /// Frames in index order.
    pub(crate) frames: Vec<(FrameIndex, Frame)>,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[(FrameIndex, Frame)] {
        &self.frames
    }

    /// Return `true` once `end` has been called.
    pub fn is_ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> FramelaneResult<()> {
        self.cfg = Some(cfg);
        self.ended = false;
        self.frames.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Frame) -> FramelaneResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> FramelaneResult<()> {
        self.ended = true;
        Ok(())
    }
}

/// Headerless sink: each frame's planes are written back to back.
#[derive(Debug)]
pub struct RawSink<W> {
    out: W,
    written: u64,
}

impl<W: Write + Send> RawSink<W> {
    /// Wrap a writer.
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    /// Bytes written so far.
    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    /// Unwrap the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> FrameSink for RawSink<W> {
    fn begin(&mut self, _cfg: SinkConfig) -> FramelaneResult<()> {
        self.written = 0;
        Ok(())
    }

    fn push_frame(&mut self, _idx: FrameIndex, frame: &Frame) -> FramelaneResult<()> {
        write_planes(&mut self.out, frame)?;
        self.written += frame.data().len() as u64;
        Ok(())
    }

    fn end(&mut self) -> FramelaneResult<()> {
        self.out.flush()?;
        Ok(())
    }
}

pub(crate) fn write_planes<W: Write>(out: &mut W, frame: &Frame) -> FramelaneResult<()> {
    for plane in 0..frame.format.num_planes() {
        out.write_all(frame.plane(plane))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
