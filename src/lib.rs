pub type Error = Box<dyn std::error::Error + Send + Sync + 'static>;

pub use {
    backend::{Backend, BackendConfig, ConfiguredBackend, JsonLinesBackend, MemoryBackend},
    builder::Builder,
    datum::{Dimension, MetricDatum, MetricDescriptor},
    dimensions::DimensionSet,
    emitter::{Config, Emitter, TimingGuard, STANDARD_RESOLUTION},
    shared::SharedEmitter,
    sink::{BufferedSink, Direct, Sink},
    timer::Timer,
    unit::Unit,
};

/// Maximum number of MetricDatum CloudWatch accepts in a single PutMetricData call
pub const PAGE_SIZE: usize = 20;

/// Name of the dimension carrying the per-emitter stream id
pub const STREAM_ID_DIMENSION: &str = "MetricStreamId";

pub mod backend;
mod builder;
mod datum;
mod dimensions;
mod emitter;
mod shared;
pub mod sink;
mod timer;
mod unit;
#[cfg(test)]
mod test;
