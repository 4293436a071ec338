use std::sync::{Mutex, PoisonError};

use crate::foundation::error::{FramelaneError, FramelaneResult};
use crate::sentinel::Marked;

/// Index -> callback outcome map, filled out of order by lane adapters.
///
/// Every index records its outcome, markers included, so that [`PendingResults::finish`] can tell
/// a dropped frame apart from a frame that deliberately produced no result.
pub struct PendingResults<R> {
    slots: Mutex<Vec<Option<Marked<R>>>>,
}

impl<R: Send> PendingResults<R> {
    /// Empty map for `[0, len)`.
    pub fn new(len: u64) -> FramelaneResult<Self> {
        let n = usize::try_from(len).map_err(|_| {
            FramelaneError::validation(format!("cannot collect {len} results on this platform"))
        })?;
        let mut slots = Vec::with_capacity(n);
        slots.resize_with(n, || None);
        Ok(Self {
            slots: Mutex::new(slots),
        })
    }

    /// Record the outcome for absolute `index`.
    pub fn record(&self, index: u64, outcome: Marked<R>) -> FramelaneResult<()> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let len = slots.len();
        let slot = usize::try_from(index)
            .ok()
            .and_then(|i| slots.get_mut(i))
            .ok_or_else(|| {
                FramelaneError::engine(format!(
                    "lane produced index {index} outside the render range of {len}"
                ))
            })?;
        if slot.is_some() {
            return Err(FramelaneError::DuplicateResult { index });
        }
        *slot = Some(outcome);
        Ok(())
    }

    /// Reassemble in ascending index order, failing if any index has no outcome.
    pub fn finish(self) -> FramelaneResult<Vec<Marked<R>>> {
        let slots = self
            .slots
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        let expected = slots.len() as u64;

        let mut missing = 0u64;
        let mut first_missing = None;
        for (i, s) in slots.iter().enumerate() {
            if s.is_none() {
                missing += 1;
                first_missing.get_or_insert(i as u64);
            }
        }
        if let Some(first_missing) = first_missing {
            tracing::error!(expected, missing, first_missing, "render reassembly failed");
            return Err(FramelaneError::Reassembly {
                expected,
                missing,
                first_missing,
            });
        }

        Ok(slots.into_iter().flatten().collect())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pending.rs"]
mod tests;
