/// Convenience result type used across framelane.
pub type FramelaneResult<T> = Result<T, FramelaneError>;

/// Top-level error taxonomy used by render, cache, and search APIs.
#[derive(thiserror::Error, Debug)]
pub enum FramelaneError {
    /// Incompatible options detected at call entry, before the engine is touched.
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid user-provided values (ranges, bounds, rates, indices).
    #[error("validation error: {0}")]
    Validation(String),

    /// Failure raised by the scheduling engine or by a source while producing a frame.
    #[error("engine error: {0}")]
    Engine(String),

    /// A finished render whose result map does not cover every requested index.
    #[error(
        "reassembly error: {missing} of {expected} frame results missing (first missing index {first_missing})"
    )]
    Reassembly {
        /// Number of indices the render was asked to produce.
        expected: u64,
        /// Number of indices with no recorded result.
        missing: u64,
        /// Smallest index with no recorded result.
        first_missing: u64,
    },

    /// A lane delivered a result for an index that already had one.
    #[error("reassembly error: frame {index} was delivered more than once")]
    DuplicateResult {
        /// Absolute frame index delivered twice.
        index: u64,
    },

    /// Missing or wrongly typed frame property.
    #[error("frame property error: key '{key}': {reason}")]
    FrameProp {
        /// Property key.
        key: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A property error attributed to a specific frame index.
    #[error("property error at frame {index}: key '{key}': {reason}")]
    Property {
        /// Absolute frame index being inspected.
        index: u64,
        /// Property key.
        key: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Errors when serializing or deserializing configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// IO failure while writing to a sink.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FramelaneError {
    /// Build a [`FramelaneError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`FramelaneError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FramelaneError::Engine`] value.
    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine(msg.into())
    }

    /// Build a [`FramelaneError::FrameProp`] value.
    pub fn frame_prop(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FrameProp {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`FramelaneError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Attach a frame index to a [`FramelaneError::FrameProp`] error.
    ///
    /// Other variants are returned unchanged.
    pub fn at_frame(self, index: u64) -> Self {
        match self {
            Self::FrameProp { key, reason } => Self::Property { index, key, reason },
            other => other,
        }
    }

    /// Return `true` for the fatal reassembly family.
    pub fn is_reassembly(&self) -> bool {
        matches!(self, Self::Reassembly { .. } | Self::DuplicateResult { .. })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
