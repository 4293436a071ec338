//! "No result for this index" markers returned from per-frame callbacks.

use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_ID: AtomicU32 = AtomicU32::new(1);

/// Identity-compared marker meaning "no result for this index".
///
/// Two sentinels are equal only when they come from the same constructor call; the name is a
/// debugging label and never takes part in comparison.
#[derive(Clone, Copy, Debug)]
pub struct Sentinel {
    id: u32,
    name: &'static str,
}

impl PartialEq for Sentinel {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Sentinel {}

impl std::hash::Hash for Sentinel {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Sentinel {
    /// The default marker.
    pub const NONE: Sentinel = Sentinel { id: 0, name: "none" };

    /// Mint a new marker, distinct from every other one including those with the same name.
    pub fn named(name: &'static str) -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            name,
        }
    }

    /// Debug label.
    pub fn name(self) -> &'static str {
        self.name
    }

    /// `value` when `cond` holds, otherwise [`Sentinel::NONE`].
    pub fn check<T>(value: T, cond: bool) -> Marked<T> {
        Self::NONE.mark_unless(value, cond)
    }

    /// `value` when `cond` holds, otherwise this marker.
    pub fn mark_unless<T>(self, value: T, cond: bool) -> Marked<T> {
        if cond {
            Marked::Value(value)
        } else {
            Marked::Sentinel(self)
        }
    }

    /// Strip every marker, keeping values in their original order.
    pub fn filter<T, I>(items: I) -> impl Iterator<Item = T>
    where
        I: IntoIterator<Item = Marked<T>>,
    {
        items.into_iter().filter_map(Marked::into_value)
    }

    /// Strip only this marker, leaving values and other markers in place.
    pub fn filter_only<T, I>(self, items: I) -> impl Iterator<Item = Marked<T>>
    where
        I: IntoIterator<Item = Marked<T>>,
    {
        items.into_iter().filter(move |m| !m.is(self))
    }
}

/// A callback outcome: a real value or a marker.
#[derive(Clone, Debug, PartialEq)]
pub enum Marked<T> {
    /// A real result.
    Value(T),
    /// No result for this index.
    Sentinel(Sentinel),
}

impl<T> Marked<T> {
    /// Return `true` for any marker.
    pub fn is_sentinel(&self) -> bool {
        matches!(self, Self::Sentinel(_))
    }

    /// Return `true` when this is exactly `sentinel`.
    pub fn is(&self, sentinel: Sentinel) -> bool {
        matches!(self, Self::Sentinel(s) if *s == sentinel)
    }

    /// Convert to `Some(value)` or `None` for markers.
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Value(v) => Some(v),
            Self::Sentinel(_) => None,
        }
    }

    /// Map the value, keeping markers.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Marked<U> {
        match self {
            Self::Value(v) => Marked::Value(f(v)),
            Self::Sentinel(s) => Marked::Sentinel(s),
        }
    }
}

impl<T> From<T> for Marked<T> {
    fn from(v: T) -> Self {
        Self::Value(v)
    }
}

#[cfg(test)]
#[path = "../tests/unit/sentinel.rs"]
mod tests;
