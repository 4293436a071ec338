//! Whole-source scans for frames whose properties satisfy a predicate.
//!
//! A search is an ordinary collecting render whose callback answers `index` or a marker, so the
//! matching indices come back in ascending order regardless of completion order. That ordering is
//! what makes [`coalesce_runs`] sound.

use std::cmp::Ordering;
use std::str::FromStr;

use crate::engine::FrameScheduler;
use crate::foundation::error::{FramelaneError, FramelaneResult};
use crate::render::config::{AsyncRenderConfig, RenderOpts};
use crate::render::pipeline::collect_filtered;
use crate::sentinel::Sentinel;
use crate::source::views::MapView;
use crate::source::{Frame, FrameSource, PropValue};

/// Comparison operator applied as `prop <op> reference`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompareOp {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl CompareOp {
    /// Apply to the ordering of `prop` relative to the reference. Unordered values (NaN) only
    /// satisfy [`CompareOp::Ne`].
    pub fn holds(self, ord: Option<Ordering>) -> bool {
        match (self, ord) {
            (Self::Ne, None) => true,
            (_, None) => false,
            (Self::Eq, Some(o)) => o.is_eq(),
            (Self::Ne, Some(o)) => o.is_ne(),
            (Self::Lt, Some(o)) => o.is_lt(),
            (Self::Le, Some(o)) => o.is_le(),
            (Self::Gt, Some(o)) => o.is_gt(),
            (Self::Ge, Some(o)) => o.is_ge(),
        }
    }

    fn is_equality(self) -> bool {
        matches!(self, Self::Eq | Self::Ne)
    }
}

impl FromStr for CompareOp {
    type Err = FramelaneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "==" => Self::Eq,
            "!=" => Self::Ne,
            "<" => Self::Lt,
            "<=" => Self::Le,
            ">" => Self::Gt,
            ">=" => Self::Ge,
            other => {
                return Err(FramelaneError::validation(format!(
                    "unknown comparison operator '{other}'"
                )));
            }
        })
    }
}

/// `frame.props[key] <op> reference`.
#[derive(Clone, Debug, PartialEq)]
pub struct PropPredicate {
    key: String,
    op: CompareOp,
    reference: PropValue,
}

impl PropPredicate {
    /// Build a predicate. Node references only support `==` and `!=`.
    pub fn new(
        key: impl Into<String>,
        op: CompareOp,
        reference: impl Into<PropValue>,
    ) -> FramelaneResult<Self> {
        let reference = reference.into();
        if matches!(reference, PropValue::Node(_)) && !op.is_equality() {
            return Err(FramelaneError::config(format!(
                "node references cannot be compared with {op:?}"
            )));
        }
        Ok(Self {
            key: key.into(),
            op,
            reference,
        })
    }

    /// Property key read from each frame.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Evaluate against `frame`, attributing property errors to `index`.
    ///
    /// A missing or wrongly typed property is an error, never a non-match.
    pub fn evaluate(&self, frame: &Frame, index: u64) -> FramelaneResult<bool> {
        self.compare(frame).map_err(|e| e.at_frame(index))
    }

    fn compare(&self, frame: &Frame) -> FramelaneResult<bool> {
        let key = self.key.as_str();
        let ord = match &self.reference {
            PropValue::Int(r) => Some(frame.prop_int(key)?.cmp(r)),
            PropValue::Float(r) => frame.prop_float(key)?.partial_cmp(r),
            PropValue::Str(r) => Some(frame.prop_str(key)?.cmp(r.as_str())),
            PropValue::Node(r) => Some(if frame.prop_node(key)? == *r {
                Ordering::Equal
            } else {
                Ordering::Less
            }),
        };
        Ok(self.op.holds(ord))
    }
}

/// Per-frame transform applied before the predicate, typically to embed a measurement as a
/// property.
pub type Probe = dyn Fn(u64, Frame) -> FramelaneResult<Frame> + Send + Sync;

/// Render options of a search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SearchOpts {
    /// Lane config. Searches read properties only, so frames are cropped to 1x1 by default.
    pub config: AsyncRenderConfig,
    /// Maximum in-flight frame requests. `0` lets the engine decide.
    pub prefetch: usize,
    /// Maximum completed-but-undelivered frames. `None` lets the engine decide.
    pub backlog: Option<usize>,
}

impl Default for SearchOpts {
    fn default() -> Self {
        Self {
            config: AsyncRenderConfig {
                one_pixel_frame: true,
                ..AsyncRenderConfig::default()
            },
            prefetch: 0,
            backlog: None,
        }
    }
}

impl SearchOpts {
    fn render_opts(&self) -> RenderOpts {
        RenderOpts {
            prefetch: self.prefetch,
            backlog: self.backlog,
            ..RenderOpts::with_config(self.config)
        }
    }
}

/// Ascending indices of every frame satisfying `predicate`.
#[tracing::instrument(skip(scheduler, source, probe), fields(len = source.len()))]
pub fn find_prop(
    scheduler: &dyn FrameScheduler,
    source: &dyn FrameSource,
    predicate: &PropPredicate,
    opts: &SearchOpts,
    probe: Option<&Probe>,
) -> FramelaneResult<Vec<u64>> {
    let check = |n: u64, f: &Frame| -> FramelaneResult<_> {
        Ok(Sentinel::check(n, predicate.evaluate(f, n)?))
    };
    let found = match probe {
        Some(probe) => {
            let probed = MapView::new(source, |n: u64, f: Frame| probe(n, f));
            collect_filtered(scheduler, &probed, &opts.render_opts(), check)?
        }
        None => collect_filtered(scheduler, source, &opts.render_opts(), check)?,
    };
    tracing::debug!(matches = found.len(), "search finished");
    Ok(found)
}

/// Inclusive `(start, end)` runs of matching frames at least `min_length` long.
pub fn find_prop_ranges(
    scheduler: &dyn FrameScheduler,
    source: &dyn FrameSource,
    predicate: &PropPredicate,
    opts: &SearchOpts,
    probe: Option<&Probe>,
    min_length: u64,
) -> FramelaneResult<Vec<(u64, u64)>> {
    let found = find_prop(scheduler, source, predicate, opts, probe)?;
    Ok(coalesce_runs(&found, min_length))
}

/// Merge ascending indices into inclusive runs of consecutive values, dropping runs shorter than
/// `min_length`.
pub fn coalesce_runs(indices: &[u64], min_length: u64) -> Vec<(u64, u64)> {
    let mut runs = Vec::new();
    let mut iter = indices.iter().copied();
    let Some(first) = iter.next() else {
        return runs;
    };
    let (mut start, mut end) = (first, first);
    for i in iter {
        if end.checked_add(1) == Some(i) {
            end = i;
            continue;
        }
        if end - start + 1 >= min_length {
            runs.push((start, end));
        }
        (start, end) = (i, i);
    }
    if end - start + 1 >= min_length {
        runs.push((start, end));
    }
    runs
}

#[cfg(test)]
#[path = "../tests/unit/search.rs"]
mod tests;
