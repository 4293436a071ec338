use std::sync::{Mutex, PoisonError};
use std::time::Instant;

/// Progress reporting selected when a render call is built.
pub enum Progress<'a> {
    /// Default indication: labelled `tracing` info lines every 10% and at completion.
    Label(String),
    /// Called once per completed frame.
    Tick(Box<dyn FnMut() + Send + 'a>),
    /// Called once per completed frame with `(completed, total)`.
    Counter(Box<dyn FnMut(u64, u64) + Send + 'a>),
}

impl<'a> Progress<'a> {
    /// Labelled default indication.
    pub fn label(label: impl Into<String>) -> Self {
        Self::Label(label.into())
    }

    /// Per-frame `(completed, total)` callback.
    pub fn counter(f: impl FnMut(u64, u64) + Send + 'a) -> Self {
        Self::Counter(Box::new(f))
    }

    /// Per-frame no-argument callback.
    pub fn tick(f: impl FnMut() + Send + 'a) -> Self {
        Self::Tick(Box::new(f))
    }
}

impl std::fmt::Debug for Progress<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Label(l) => f.debug_tuple("Label").field(l).finish(),
            Self::Tick(_) => f.write_str("Tick(..)"),
            Self::Counter(_) => f.write_str("Counter(..)"),
        }
    }
}

struct TrackerState<'a> {
    progress: Progress<'a>,
    completed: u64,
    next_decile: u64,
}

/// Completion-driven progress, safe to advance from engine worker threads.
pub(crate) struct ProgressTracker<'a> {
    state: Option<Mutex<TrackerState<'a>>>,
    total: u64,
    started: Instant,
}

impl<'a> ProgressTracker<'a> {
    pub(crate) fn new(progress: Option<Progress<'a>>, total: u64) -> Self {
        if let Some(Progress::Label(label)) = &progress {
            tracing::info!(label = %label, total, "render started");
        }
        Self {
            state: progress.map(|progress| {
                Mutex::new(TrackerState {
                    progress,
                    completed: 0,
                    next_decile: 1,
                })
            }),
            total,
            started: Instant::now(),
        }
    }

    pub(crate) fn advance(&self) {
        let Some(state) = &self.state else {
            return;
        };
        let mut guard = state.lock().unwrap_or_else(PoisonError::into_inner);
        let st = &mut *guard;
        st.completed += 1;
        let completed = st.completed;
        let total = self.total;
        match &mut st.progress {
            Progress::Tick(f) => f(),
            Progress::Counter(f) => f(completed, total),
            Progress::Label(label) => {
                if total > 0 && completed * 10 >= st.next_decile * total && completed < total {
                    log_label(label, completed, total, self.started);
                    st.next_decile = completed * 10 / total + 1;
                }
            }
        }
    }

    pub(crate) fn finish(&self) {
        let Some(state) = &self.state else {
            return;
        };
        let st = state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Progress::Label(label) = &st.progress {
            log_label(label, st.completed, self.total, self.started);
        }
    }
}

fn log_label(label: &str, completed: u64, total: u64, started: Instant) {
    let secs = started.elapsed().as_secs_f64();
    let fps = if secs > 0.0 {
        completed as f64 / secs
    } else {
        0.0
    };
    let percent = if total == 0 {
        100.0
    } else {
        completed as f64 * 100.0 / total as f64
    };
    tracing::info!(
        label = %label,
        completed,
        total,
        percent = format_args!("{percent:>3.02}"),
        fps = format_args!("{fps:.02}"),
        "render progress"
    );
}

#[cfg(test)]
#[path = "../../tests/unit/render/progress.rs"]
mod tests;
