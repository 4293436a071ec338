use crate::encode::sink::{FrameSink, SinkConfig};
use crate::engine::{Adapter, FrameScheduler, LaneFrames, ScheduleJob};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{FramelaneError, FramelaneResult};
use crate::render::config::{AsyncRenderConfig, RenderOpts};
use crate::render::lanes::{LanePlan, LaneSpec, Partition};
use crate::render::pending::PendingResults;
use crate::render::progress::{Progress, ProgressTracker};
use crate::sentinel::{Marked, Sentinel};
use crate::source::views::{OnePixelView, SliceView, StrideView};
use crate::source::{Frame, FrameSource};

/// Per-frame callback: absolute index and computed frame to a value or a marker.
///
/// Runs on engine worker threads as frames complete, in any order.
pub type FrameCallback<'a, R> = dyn Fn(u64, &Frame) -> FramelaneResult<Marked<R>> + Sync + 'a;

/// Where delivered frames go.
pub enum Destination<'a> {
    /// Frames are discarded after the callback and progress have seen them.
    Drain,
    /// Frames are written in ascending index order. Single lane only.
    Sink(&'a mut dyn FrameSink),
}

/// Everything a render call does besides computing frames.
pub struct RenderRequest<'a, R> {
    /// Frame destination.
    pub destination: Destination<'a>,
    /// Optional per-frame callback; when set, its outcomes are collected.
    pub callback: Option<&'a FrameCallback<'a, R>>,
    /// Optional progress reporting.
    pub progress: Option<Progress<'a>>,
}

impl<'a, R> RenderRequest<'a, R> {
    /// Drain-only request.
    pub fn drain() -> Self {
        Self {
            destination: Destination::Drain,
            callback: None,
            progress: None,
        }
    }

    /// Collect the outcomes of `callback`.
    pub fn collect(callback: &'a FrameCallback<'a, R>) -> Self {
        Self {
            callback: Some(callback),
            ..Self::drain()
        }
    }

    /// Write frames to `sink`.
    pub fn sink(sink: &'a mut dyn FrameSink) -> Self {
        Self {
            destination: Destination::Sink(sink),
            ..Self::drain()
        }
    }

    /// Also collect the outcomes of `callback`.
    pub fn with_callback(mut self, callback: &'a FrameCallback<'a, R>) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Report progress.
    pub fn with_progress(mut self, progress: Progress<'a>) -> Self {
        self.progress = Some(progress);
        self
    }
}

/// Counters describing a finished render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames in the source.
    pub frames_total: u64,
    /// Frames the engine delivered through its ordered pull, across every lane.
    pub frames_delivered: u64,
    /// Scheduled lanes, remainder included.
    pub lanes: usize,
    /// Callback outcomes that were values.
    pub values: u64,
    /// Callback outcomes that were markers.
    pub sentinels: u64,
    /// Whether the sink wrote a self-describing container. `false` without a sink.
    pub self_describing: bool,
}

/// Result of [`render`].
#[derive(Debug)]
pub struct RenderOutput<R> {
    /// Ordered callback outcomes, one per index; `None` when no callback was given.
    pub results: Option<Vec<Marked<R>>>,
    /// Counters.
    pub stats: RenderStats,
}

impl<R> RenderOutput<R> {
    /// Ordered values with every marker stripped.
    pub fn values(self) -> Vec<R> {
        self.results
            .map(|r| Sentinel::filter(r).collect())
            .unwrap_or_default()
    }
}

/// Render every frame of `source` through `scheduler`.
///
/// Configuration errors are raised before the engine is touched and before the sink's `begin`.
/// With a callback, the result covers every index in `[0, L)` in ascending order or the call
/// fails with a reassembly error; any fetch, callback or sink failure aborts the whole call.
#[tracing::instrument(skip_all, fields(len = source.len()))]
pub fn render<R: Send>(
    scheduler: &dyn FrameScheduler,
    source: &dyn FrameSource,
    opts: &RenderOpts,
    request: RenderRequest<'_, R>,
) -> FramelaneResult<RenderOutput<R>> {
    let RenderRequest {
        destination,
        callback,
        progress,
    } = request;
    let config = opts.async_config();
    let info = source.info();
    let len = info.len;

    let mut sink = match destination {
        Destination::Drain => None,
        Destination::Sink(sink) => {
            let cfg = sink_config(source, config.as_ref())?;
            sink.begin(cfg)?;
            tracing::debug!(
                width = cfg.width,
                height = cfg.height,
                self_describing = sink.self_describing(),
                "sink opened"
            );
            Some(sink)
        }
    };

    let one_pixel = config.is_some_and(|c| c.one_pixel_frame);
    let cropped;
    let src: &dyn FrameSource = if one_pixel && info.resolution != Some((1, 1)) {
        cropped = OnePixelView::new(source);
        &cropped
    } else {
        source
    };

    let plan = LanePlan::new(len, config.as_ref());
    tracing::debug!(
        partition = ?plan.partition,
        chunk = plan.chunk,
        lanes = plan.scheduled_lanes(),
        one_pixel,
        "lane plan"
    );

    let pending = callback.map(|_| PendingResults::new(len)).transpose()?;
    let tracker = ProgressTracker::new(progress, len);

    let record = |index: u64, frame: &Frame| -> FramelaneResult<()> {
        if let (Some(cb), Some(pending)) = (callback, pending.as_ref()) {
            pending.record(index, cb(index, frame)?)?;
        }
        tracker.advance();
        Ok(())
    };

    let mut delivered = match plan.partition {
        Partition::Single => run_lane(scheduler, src, None, &record, opts, sink.as_deref_mut())?,
        Partition::Interleaved => run_interleaved(scheduler, src, &plan.lanes, &record, opts)?,
        Partition::Stacked => run_stacked(scheduler, src, &plan.lanes, &record, opts)?,
    };
    if let Some(rem) = &plan.remainder {
        delivered += run_lane(scheduler, src, Some(rem), &record, opts, None)?;
    }

    let self_describing = sink.as_deref().is_some_and(|s| s.self_describing());
    if let Some(sink) = sink.as_deref_mut() {
        sink.end()?;
    }
    tracker.finish();

    let results = pending.map(PendingResults::finish).transpose()?;
    let sentinels = results
        .as_ref()
        .map(|r| r.iter().filter(|m| m.is_sentinel()).count() as u64)
        .unwrap_or(0);
    let values = results.as_ref().map(|r| r.len() as u64).unwrap_or(0) - sentinels;

    Ok(RenderOutput {
        results,
        stats: RenderStats {
            frames_total: len,
            frames_delivered: delivered,
            lanes: plan.scheduled_lanes(),
            values,
            sentinels,
            self_describing,
        },
    })
}

/// Collect `callback(index, frame)` for every frame, in index order.
pub fn collect<R, F>(
    scheduler: &dyn FrameScheduler,
    source: &dyn FrameSource,
    opts: &RenderOpts,
    callback: F,
) -> FramelaneResult<Vec<R>>
where
    R: Send,
    F: Fn(u64, &Frame) -> FramelaneResult<R> + Sync,
{
    let cb = |n: u64, f: &Frame| callback(n, f).map(Marked::Value);
    let out = render(scheduler, source, opts, RenderRequest::collect(&cb))?;
    Ok(out.values())
}

/// Collect marked outcomes for every frame, markers included, in index order.
pub fn collect_marked<R, F>(
    scheduler: &dyn FrameScheduler,
    source: &dyn FrameSource,
    opts: &RenderOpts,
    callback: F,
) -> FramelaneResult<Vec<Marked<R>>>
where
    R: Send,
    F: Fn(u64, &Frame) -> FramelaneResult<Marked<R>> + Sync,
{
    let out = render(scheduler, source, opts, RenderRequest::collect(&callback))?;
    Ok(out.results.unwrap_or_default())
}

/// Collect marked outcomes and strip every marker.
pub fn collect_filtered<R, F>(
    scheduler: &dyn FrameScheduler,
    source: &dyn FrameSource,
    opts: &RenderOpts,
    callback: F,
) -> FramelaneResult<Vec<R>>
where
    R: Send,
    F: Fn(u64, &Frame) -> FramelaneResult<Marked<R>> + Sync,
{
    collect_marked(scheduler, source, opts, callback).map(|v| Sentinel::filter(v).collect())
}

/// Write every frame of `source` to `sink` in index order.
pub fn render_to_sink(
    scheduler: &dyn FrameScheduler,
    source: &dyn FrameSource,
    opts: &RenderOpts,
    sink: &mut dyn FrameSink,
    progress: Option<Progress<'_>>,
) -> FramelaneResult<RenderStats> {
    let mut request = RenderRequest::<()>::sink(sink);
    request.progress = progress;
    render(scheduler, source, opts, request).map(|o| o.stats)
}

/// Compute every frame of `source` and discard it, reporting progress.
pub fn drain(
    scheduler: &dyn FrameScheduler,
    source: &dyn FrameSource,
    opts: &RenderOpts,
    progress: Option<Progress<'_>>,
) -> FramelaneResult<RenderStats> {
    let mut request = RenderRequest::<()>::drain();
    request.progress = progress;
    render(scheduler, source, opts, request).map(|o| o.stats)
}

fn sink_config(
    source: &dyn FrameSource,
    config: Option<&AsyncRenderConfig>,
) -> FramelaneResult<SinkConfig> {
    if let Some(c) = config {
        if c.one_pixel_frame {
            return Err(FramelaneError::config(
                "one_pixel_frame cannot be combined with a sink destination",
            ));
        }
        if c.is_multi_lane() {
            return Err(FramelaneError::config(format!(
                "a sink destination requires a single lane, got {} lanes",
                c.lanes
            )));
        }
    }
    let info = source.info();
    let (Some(format), Some((width, height))) = (info.format, info.resolution) else {
        return Err(FramelaneError::config(
            "a sink destination requires a source with a fixed format and resolution",
        ));
    };
    if info.len == 0 {
        return Err(FramelaneError::config(
            "a sink destination requires a non-empty source",
        ));
    }
    Ok(SinkConfig {
        width,
        height,
        format,
        fps: info.fps,
        len: info.len,
    })
}

fn first_frame(frames: LaneFrames) -> FramelaneResult<Frame> {
    frames
        .into_iter()
        .next()
        .ok_or_else(|| FramelaneError::engine("engine completed a frame with no inputs"))
}

type Record<'a> = dyn Fn(u64, &Frame) -> FramelaneResult<()> + Sync + 'a;

/// One scheduling call over `inputs`; returns the number of frames pulled.
fn schedule<'s>(
    scheduler: &dyn FrameScheduler,
    inputs: &[&dyn FrameSource],
    adapter: &Adapter<'_>,
    opts: &RenderOpts,
    mut sink: Option<&mut (dyn FrameSink + 's)>,
) -> FramelaneResult<u64> {
    let job = ScheduleJob {
        inputs,
        adapter,
        prefetch: opts.prefetch,
        backlog: opts.backlog,
    };
    let mut delivered = 0u64;
    scheduler.schedule(&job, &mut |n: u64, frame: Frame| -> FramelaneResult<()> {
        if let Some(sink) = sink.as_deref_mut() {
            sink.push_frame(FrameIndex(n), &frame)?;
        }
        delivered += 1;
        Ok(())
    })?;
    Ok(delivered)
}

/// Single lane over the whole source, or over a contiguous slice of it.
fn run_lane<'s>(
    scheduler: &dyn FrameScheduler,
    src: &dyn FrameSource,
    lane: Option<&LaneSpec>,
    record: &Record<'_>,
    opts: &RenderOpts,
    sink: Option<&mut (dyn FrameSink + 's)>,
) -> FramelaneResult<u64> {
    let Some(lane) = lane else {
        let adapter = |n: u64, frames: LaneFrames| -> FramelaneResult<Frame> {
            let frame = first_frame(frames)?;
            record(n, &frame)?;
            Ok(frame)
        };
        return schedule(scheduler, &[src], &adapter, opts, sink);
    };

    let ctx = lane.ctx;
    let view = SliceView::new(src, ctx.shift, lane.len)?;
    let adapter = |n: u64, frames: LaneFrames| -> FramelaneResult<Frame> {
        let frame = first_frame(frames)?;
        record(ctx.absolute(n), &frame)?;
        Ok(frame)
    };
    schedule(scheduler, &[&view], &adapter, opts, sink)
}

/// All interleaved lanes as inputs of one shared scheduling call.
fn run_interleaved(
    scheduler: &dyn FrameScheduler,
    src: &dyn FrameSource,
    lanes: &[LaneSpec],
    record: &Record<'_>,
    opts: &RenderOpts,
) -> FramelaneResult<u64> {
    if lanes.is_empty() {
        return Ok(0);
    }
    let views = lanes
        .iter()
        .map(|l| StrideView::new(src, l.ctx.shift, l.ctx.stride, l.len))
        .collect::<FramelaneResult<Vec<_>>>()?;
    let inputs: Vec<&dyn FrameSource> = views.iter().map(|v| v as &dyn FrameSource).collect();

    let adapter = |n: u64, frames: LaneFrames| -> FramelaneResult<Frame> {
        if frames.len() != lanes.len() {
            return Err(FramelaneError::engine(format!(
                "engine completed {} lane frames, expected {}",
                frames.len(),
                lanes.len()
            )));
        }
        let mut first = None;
        for (lane, frame) in lanes.iter().zip(frames) {
            record(lane.ctx.absolute(n), &frame)?;
            first.get_or_insert(frame);
        }
        first.ok_or_else(|| FramelaneError::engine("engine completed a frame with no inputs"))
    };
    // One pull per local index; each carries one frame per lane.
    let pulled = schedule(scheduler, &inputs, &adapter, opts, None)?;
    Ok(pulled * lanes.len() as u64)
}

/// Each stacked lane in its own scheduling call, all running concurrently.
fn run_stacked(
    scheduler: &dyn FrameScheduler,
    src: &dyn FrameSource,
    lanes: &[LaneSpec],
    record: &Record<'_>,
    opts: &RenderOpts,
) -> FramelaneResult<u64> {
    if rayon::current_thread_index().is_some() {
        // Nested render on a worker: scoped lane threads would block it while they wait for
        // the pool, so the lanes run one after another here.
        return lanes.iter().try_fold(0u64, |delivered, lane| {
            Ok(delivered + run_lane(scheduler, src, Some(lane), record, opts, None)?)
        });
    }
    std::thread::scope(|scope| {
        let handles: Vec<_> = lanes
            .iter()
            .map(|lane| scope.spawn(move || run_lane(scheduler, src, Some(lane), record, opts, None)))
            .collect();

        let mut delivered = 0u64;
        let mut first_err = None;
        for h in handles {
            match h.join() {
                Ok(Ok(n)) => delivered += n,
                Ok(Err(e)) => {
                    first_err.get_or_insert(e);
                }
                Err(_) => {
                    first_err.get_or_insert(FramelaneError::engine("render lane thread panicked"));
                }
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(delivered),
        }
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
