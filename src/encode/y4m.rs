use std::io::Write;

use crate::encode::sink::{FrameSink, SinkConfig, write_planes};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{FramelaneError, FramelaneResult};
use crate::source::{ColorFamily, Frame, FrameFormat};

/// YUV4MPEG2 stream sink.
///
/// Writes the stream header in `begin` and a `FRAME` marker before each frame's planes. Only
/// gray and YUV formats are representable; anything else is rejected in `begin`.
#[derive(Debug)]
pub struct Y4mSink<W> {
    out: W,
    cfg: Option<SinkConfig>,
}

impl<W: Write + Send> Y4mSink<W> {
    /// Wrap a writer.
    pub fn new(out: W) -> Self {
        Self { out, cfg: None }
    }

    /// Unwrap the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Y4M `C` tag for a format.
pub fn chroma_tag(format: FrameFormat) -> FramelaneResult<&'static str> {
    let tag = match (
        format.family,
        format.bytes_per_sample,
        format.subsampling_w,
        format.subsampling_h,
    ) {
        (ColorFamily::Gray, 1, _, _) => "mono",
        (ColorFamily::Gray, 2, _, _) => "mono16",
        (ColorFamily::Yuv, 1, 1, 1) => "420jpeg",
        (ColorFamily::Yuv, 1, 1, 0) => "422",
        (ColorFamily::Yuv, 1, 0, 0) => "444",
        (ColorFamily::Yuv, 1, 2, 0) => "411",
        (ColorFamily::Yuv, 2, 1, 1) => "420p16",
        (ColorFamily::Yuv, 2, 1, 0) => "422p16",
        (ColorFamily::Yuv, 2, 0, 0) => "444p16",
        _ => {
            return Err(FramelaneError::config(format!(
                "y4m output cannot carry {format:?}; only gray and yuv formats are supported"
            )));
        }
    };
    Ok(tag)
}

impl<W: Write + Send> FrameSink for Y4mSink<W> {
    fn begin(&mut self, cfg: SinkConfig) -> FramelaneResult<()> {
        let chroma = chroma_tag(cfg.format)?;
        writeln!(
            self.out,
            "YUV4MPEG2 W{} H{} F{}:{} Ip A0:0 C{chroma}",
            cfg.width, cfg.height, cfg.fps.num, cfg.fps.den
        )?;
        self.cfg = Some(cfg);
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Frame) -> FramelaneResult<()> {
        let Some(cfg) = self.cfg else {
            return Err(FramelaneError::engine("y4m sink received a frame before begin"));
        };
        if frame.format != cfg.format || (frame.width, frame.height) != (cfg.width, cfg.height) {
            return Err(FramelaneError::validation(format!(
                "frame {} is {}x{} {:?}, y4m stream is {}x{} {:?}",
                idx.0, frame.width, frame.height, frame.format, cfg.width, cfg.height, cfg.format
            )));
        }
        self.out.write_all(b"FRAME\n")?;
        write_planes(&mut self.out, frame)
    }

    fn end(&mut self) -> FramelaneResult<()> {
        self.out.flush()?;
        Ok(())
    }

    fn self_describing(&self) -> bool {
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/y4m.rs"]
mod tests;
