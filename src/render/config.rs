use crate::foundation::error::{FramelaneError, FramelaneResult};

/// Lane configuration for asynchronous rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AsyncRenderConfig {
    /// Number of lanes. `<= 1` collapses to the single-lane path.
    pub lanes: u32,
    /// Crop frames to 1x1 before they reach the callback. Only valid when the callback reads
    /// properties alone, and never together with a sink.
    pub one_pixel_frame: bool,
    /// Give each lane a contiguous slice of the input ("stacked") instead of a stride
    /// ("interleaved"). Ignored when `one_pixel_frame` is set.
    pub parallel_input: bool,
}

impl Default for AsyncRenderConfig {
    fn default() -> Self {
        Self {
            lanes: 2,
            one_pixel_frame: false,
            parallel_input: false,
        }
    }
}

impl AsyncRenderConfig {
    /// Config with `lanes` lanes and default flags.
    pub fn with_lanes(lanes: u32) -> Self {
        Self {
            lanes,
            ..Self::default()
        }
    }

    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json(s: &str) -> FramelaneResult<Self> {
        serde_json::from_str(s).map_err(|e| FramelaneError::serde(e.to_string()))
    }

    /// Return `true` when more than one lane is requested.
    pub fn is_multi_lane(&self) -> bool {
        self.lanes > 1
    }

    /// Return `true` when lanes own contiguous input slices.
    pub fn is_stacked(&self) -> bool {
        self.parallel_input && !self.one_pixel_frame
    }
}

/// Loose selector for asynchronous rendering: off, on, a lane count, or a full config.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum AsyncRequests {
    /// `false` renders without an async config; `true` uses a single async lane.
    Toggle(bool),
    /// Lane count; `<= 1` renders without an async config.
    Lanes(u32),
    /// Explicit config.
    Config(AsyncRenderConfig),
}

impl Default for AsyncRequests {
    fn default() -> Self {
        Self::Toggle(false)
    }
}

impl AsyncRequests {
    /// Normalise into an optional config.
    pub fn into_config(self) -> Option<AsyncRenderConfig> {
        match self {
            Self::Toggle(false) => None,
            Self::Toggle(true) => Some(AsyncRenderConfig::with_lanes(1)),
            Self::Lanes(n) if n <= 1 => None,
            Self::Lanes(n) => Some(AsyncRenderConfig::with_lanes(n)),
            Self::Config(c) => Some(c),
        }
    }
}

impl From<AsyncRenderConfig> for AsyncRequests {
    fn from(c: AsyncRenderConfig) -> Self {
        Self::Config(c)
    }
}

/// Per-call render options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderOpts {
    /// Maximum in-flight frame requests per scheduling call. `0` lets the engine decide.
    pub prefetch: usize,
    /// Maximum completed-but-undelivered frames. `None` lets the engine decide.
    pub backlog: Option<usize>,
    /// Lane selection.
    pub requests: AsyncRequests,
}

impl RenderOpts {
    /// Options rendering through `config`.
    pub fn with_config(config: AsyncRenderConfig) -> Self {
        Self {
            requests: AsyncRequests::Config(config),
            ..Self::default()
        }
    }

    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json(s: &str) -> FramelaneResult<Self> {
        serde_json::from_str(s).map_err(|e| FramelaneError::serde(e.to_string()))
    }

    /// Effective async config, if any.
    pub fn async_config(&self) -> Option<AsyncRenderConfig> {
        self.requests.into_config()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/config.rs"]
mod tests;
