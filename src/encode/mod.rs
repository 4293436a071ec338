//! Sequential frame destinations for sink renders.

/// Frame sink trait and headerless sinks.
pub mod sink;
/// YUV4MPEG2 output.
pub mod y4m;

pub use sink::{FrameSink, InMemorySink, RawSink, SinkConfig};
pub use y4m::Y4mSink;
