use std::collections::HashMap;
use std::sync::{Arc, mpsc};

use rayon::prelude::*;

use crate::engine::context::{Teardown, TeardownHook};
use crate::engine::{FrameScheduler, LaneFrames, Pull, ScheduleJob};
use crate::foundation::error::{FramelaneError, FramelaneResult};
use crate::source::Frame;

/// Options for [`Engine`].
#[derive(Clone, Debug, Default)]
pub struct EngineOpts {
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
}

/// Frame scheduler backed by a dedicated rayon thread pool.
///
/// Each scheduling call dispatches waves of `prefetch` indices onto the pool. Workers fetch,
/// run the adapter, and send completions over a bounded channel; the calling thread reorders
/// them and pulls in ascending index order.
///
/// The engine also owns the teardown registry for caches that hold engine-derived state.
pub struct Engine {
    pool: rayon::ThreadPool,
    teardown: Teardown,
}

impl Engine {
    /// Build an engine with its own thread pool.
    pub fn new(opts: EngineOpts) -> FramelaneResult<Self> {
        Ok(Self {
            pool: build_thread_pool(opts.threads)?,
            teardown: Teardown::new(),
        })
    }

    /// Worker thread count.
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Register a hook (typically a cache) to be cleared on [`Engine::shutdown`].
    pub fn register_teardown<H: TeardownHook + 'static>(&self, hook: &Arc<H>) {
        self.teardown.register(hook);
    }

    /// Run the shutdown sequence: every registered hook is fired once and unregistered.
    ///
    /// Returns the number of hooks that ran. Calling it again is a no-op until new hooks register.
    pub fn shutdown(&self) -> usize {
        let fired = self.teardown.fire();
        tracing::info!(hooks = fired, "engine teardown");
        fired
    }
}

#[derive(Debug)]
struct Completion {
    index: u64,
    frame: Frame,
}

enum Delivery {
    Complete,
    Disconnected { delivered: u64 },
}

impl FrameScheduler for Engine {
    #[tracing::instrument(skip_all, fields(inputs = job.inputs.len()))]
    fn schedule(&self, job: &ScheduleJob<'_>, pull: &mut Pull<'_>) -> FramelaneResult<()> {
        let len = job.validate()?;
        if len == 0 {
            return Ok(());
        }

        let wave = if job.prefetch == 0 {
            self.default_prefetch()
        } else {
            job.prefetch
        } as u64;
        let cap = job
            .backlog
            .unwrap_or_else(|| (wave as usize).saturating_mul(2))
            .max(1);
        if self.pool.current_thread_index().is_some() {
            // Called from one of our own workers (a nested render): waiting on the pool here
            // could leave no worker free to make progress.
            tracing::debug!(len, "nested schedule, running inline on the worker");
            return run_inline(job, len, pull);
        }
        tracing::debug!(len, wave, cap, "scheduling frames");

        std::thread::scope(|scope| -> FramelaneResult<()> {
            let (tx, rx) = mpsc::sync_channel::<Completion>(cap);
            let pool = &self.pool;
            let producer = scope.spawn(move || produce(pool, job, len, wave, tx));

            let delivered = deliver_in_order(rx, len, pull);
            let produced = producer
                .join()
                .map_err(|_| FramelaneError::engine("engine producer thread panicked"))?;

            // A consumer error is the root cause of any producer send failure.
            match (delivered?, produced) {
                (_, Err(e)) => Err(e),
                (Delivery::Complete, Ok(())) => Ok(()),
                (Delivery::Disconnected { delivered }, Ok(())) => Err(FramelaneError::engine(
                    format!("engine stopped after delivering {delivered} of {len} frames"),
                )),
            }
        })
    }

    fn default_prefetch(&self) -> usize {
        self.threads().max(1)
    }
}

fn fetch_inputs(job: &ScheduleJob<'_>, n: u64) -> FramelaneResult<LaneFrames> {
    job.inputs.iter().map(|src| src.fetch(n)).collect()
}

fn run_inline(job: &ScheduleJob<'_>, len: u64, pull: &mut Pull<'_>) -> FramelaneResult<()> {
    for n in 0..len {
        let frame = (job.adapter)(n, fetch_inputs(job, n)?)?;
        pull(n, frame)?;
    }
    Ok(())
}

fn produce(
    pool: &rayon::ThreadPool,
    job: &ScheduleJob<'_>,
    len: u64,
    wave: u64,
    tx: mpsc::SyncSender<Completion>,
) -> FramelaneResult<()> {
    let mut wave_start = 0u64;
    while wave_start < len {
        let wave_end = wave_start.saturating_add(wave).min(len);
        pool.install(|| {
            (wave_start..wave_end).into_par_iter().try_for_each_with(
                tx.clone(),
                |tx, n| -> FramelaneResult<()> {
                    let frame = (job.adapter)(n, fetch_inputs(job, n)?)?;
                    tx.send(Completion { index: n, frame }).map_err(|_| {
                        FramelaneError::engine("frame consumer is not accepting frames")
                    })
                },
            )
        })?;
        wave_start = wave_end;
    }
    Ok(())
}

fn deliver_in_order(
    rx: mpsc::Receiver<Completion>,
    len: u64,
    pull: &mut Pull<'_>,
) -> FramelaneResult<Delivery> {
    let mut next = 0u64;
    let mut pending = HashMap::<u64, Frame>::new();
    while next < len {
        if let Some(frame) = pending.remove(&next) {
            pull(next, frame)?;
            next += 1;
            continue;
        }

        let Ok(msg) = rx.recv() else {
            return Ok(Delivery::Disconnected { delivered: next });
        };
        if msg.index < next || pending.insert(msg.index, msg.frame).is_some() {
            return Err(FramelaneError::engine(format!(
                "engine completed frame {} more than once",
                msg.index
            )));
        }
    }
    Ok(Delivery::Complete)
}

fn build_thread_pool(threads: Option<usize>) -> FramelaneResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(FramelaneError::validation(
            "engine 'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("framelane-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| FramelaneError::engine(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/engine/pool.rs"]
mod tests;
