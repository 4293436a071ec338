//! Keyframe (scene change) detection over per-frame scene-change properties.

use std::io::Write;

use crate::engine::FrameScheduler;
use crate::foundation::error::{FramelaneError, FramelaneResult};
use crate::render::config::RenderOpts;
use crate::render::pipeline::{RenderRequest, render};
use crate::render::progress::Progress;
use crate::sentinel::{Marked, Sentinel};
use crate::source::{Frame, FrameSource};

/// Property set by WWXD-style detectors.
pub const WWXD_KEYS: &[&str] = &["Scenechange"];
/// Property set by SCXVID-style detectors.
pub const SCXVID_KEYS: &[&str] = &["_SceneChangePrev"];

/// Text layouts accepted by [`Keyframes::write_to`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyframesFormat {
    /// `# keyframe format v1` header, then one keyframe index per line.
    #[default]
    V1,
    /// XviD 2-pass stat file: one `i` (keyframe) or `b` line per frame up to `end_frame`.
    Xvid,
}

/// Sorted scene-start indices of a source, plus its length.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Keyframes {
    /// Ascending, deduplicated keyframe indices.
    pub frames: Vec<u64>,
    /// Length of the scanned source.
    pub end_frame: u64,
}

impl Keyframes {
    /// Build from arbitrary indices; they are sorted and deduplicated.
    pub fn new(mut frames: Vec<u64>, end_frame: u64) -> FramelaneResult<Self> {
        frames.sort_unstable();
        frames.dedup();
        if let Some(&last) = frames.last()
            && last >= end_frame
        {
            return Err(FramelaneError::validation(format!(
                "keyframe {last} is outside a source of length {end_frame}"
            )));
        }
        Ok(Self { frames, end_frame })
    }

    /// Scan `source` for frames whose every `keys` property equals `1`.
    ///
    /// A missing or non-integer property fails the scan at that frame.
    #[tracing::instrument(skip(scheduler, source, opts), fields(len = source.len()))]
    pub fn from_source(
        scheduler: &dyn FrameScheduler,
        source: &dyn FrameSource,
        keys: &[&str],
        opts: &RenderOpts,
    ) -> FramelaneResult<Self> {
        if keys.is_empty() {
            return Err(FramelaneError::config("keyframe detection needs at least one key"));
        }
        let callback = |n: u64, f: &Frame| -> FramelaneResult<Marked<u64>> {
            let cut = is_scene_change(f, keys).map_err(|e| e.at_frame(n))?;
            Ok(Sentinel::check(n, cut))
        };
        let request = RenderRequest::collect(&callback)
            .with_progress(Progress::label("Detecting scene changes"));
        let frames = render(scheduler, source, opts, request)?.values();
        tracing::debug!(keyframes = frames.len(), "scene changes detected");
        Self::new(frames, source.len())
    }

    /// Scene boundaries for [`SceneSource`](crate::cache::SceneSource): the keyframes with a
    /// leading `0`.
    pub fn scene_bounds(&self) -> Vec<u64> {
        let mut bounds = Vec::with_capacity(self.frames.len() + 1);
        if self.frames.first() != Some(&0) {
            bounds.push(0);
        }
        bounds.extend_from_slice(&self.frames);
        bounds
    }

    /// Inclusive `(start, end)` frame range of every scene.
    pub fn scenes(&self) -> Vec<(u64, u64)> {
        if self.end_frame == 0 {
            return Vec::new();
        }
        let bounds = self.scene_bounds();
        bounds
            .iter()
            .enumerate()
            .map(|(i, &start)| {
                let end = bounds.get(i + 1).copied().unwrap_or(self.end_frame);
                (start, end - 1)
            })
            .collect()
    }

    /// Write the keyframes as `format` text.
    pub fn write_to(&self, mut out: impl Write, format: KeyframesFormat) -> FramelaneResult<()> {
        match format {
            KeyframesFormat::V1 => {
                out.write_all(b"# keyframe format v1\nfps 0\n\n")?;
                for n in &self.frames {
                    writeln!(out, "{n}")?;
                }
            }
            KeyframesFormat::Xvid => {
                out.write_all(b"# XviD 2pass stat file\n")?;
                let mut keys = self.frames.iter().peekable();
                for n in 0..self.end_frame {
                    let key = keys.next_if_eq(&&n).is_some();
                    out.write_all(if key { b"\ni" } else { b"\nb" })?;
                }
            }
        }
        out.flush()?;
        Ok(())
    }

    /// Number of keyframes.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Return `true` when no keyframe was found.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// `true` when every key is present with integer value `1`.
pub fn is_scene_change(frame: &Frame, keys: &[&str]) -> FramelaneResult<bool> {
    for key in keys {
        if frame.prop_int(key)? != 1 {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Keyframes where the float `metric` property reaches `threshold`.
///
/// Frame 0 always starts a scene and is not reported unless it crosses the threshold itself.
#[tracing::instrument(skip(scheduler, source, opts), fields(len = source.len()))]
pub fn detect_scene_changes(
    scheduler: &dyn FrameScheduler,
    source: &dyn FrameSource,
    metric: &str,
    threshold: f64,
    opts: &RenderOpts,
) -> FramelaneResult<Keyframes> {
    let callback = |n: u64, f: &Frame| -> FramelaneResult<Marked<u64>> {
        let value = f.prop_float(metric).map_err(|e| e.at_frame(n))?;
        Ok(Sentinel::check(n, value >= threshold))
    };
    let request =
        RenderRequest::collect(&callback).with_progress(Progress::label("Detecting scene changes"));
    let frames = render(scheduler, source, opts, request)?.values();
    Keyframes::new(frames, source.len())
}

#[cfg(test)]
#[path = "../tests/unit/scene.rs"]
mod tests;
