//! # Emitter
//!
//! Fluent metrics emitter returned from metrics_cloudwatch_buffered::Builder

use super::{
    backend::Backend,
    datum::{Dimension, MetricDatum, MetricDescriptor},
    dimensions::DimensionSet,
    sink::Sink,
    timer::Timer,
    unit::Unit,
    Error,
};
use chrono::{DateTime, Utc};
use metrics::SharedString;
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use tracing::{error, warn};

/// Default CloudWatch storage resolution in seconds, 1 means high resolution
pub const STANDARD_RESOLUTION: u32 = 60;

/// Configuration via Builder
pub struct Config {
    pub namespace: Option<SharedString>,
    pub stream_id: SharedString,
    pub storage_resolution: u32,
    pub default_dimensions: Vec<(SharedString, SharedString)>,
}

/// Fluent CloudWatch metrics emitter
///
/// Every emit call fans out into one detail record per active dimension, carrying only that
/// dimension, plus one summary record carrying all of them. CloudWatch can then answer both
/// per-dimension and combined queries.
///
/// Use [Builder](super::Builder) to construct
///
/// # Example
/// ```
/// let mut metrics = metrics_cloudwatch_buffered::Builder::new()
///     .namespace("MyApplication")
///     .backend(metrics_cloudwatch_buffered::MemoryBackend::new())
///     .init()
///     .unwrap();
///
/// metrics.with_dimension("Method", "Default").count("requests", None).unwrap();
/// metrics.flush().unwrap();
/// ```
pub struct Emitter<S> {
    sink: S,
    namespace: Option<SharedString>,
    storage_resolution: u32,
    dimensions: DimensionSet,
    timers: HashMap<String, Timer>,
}

impl<S: Sink> Emitter<S> {
    pub fn new(sink: S, config: Config) -> Self {
        let mut dimensions = DimensionSet::new(config.stream_id);
        for (name, value) in config.default_dimensions {
            dimensions.with_dimension(name, value);
        }

        Self {
            sink,
            namespace: config.namespace,
            storage_resolution: config.storage_resolution,
            dimensions,
            timers: HashMap::new(),
        }
    }

    /// Sets the namespace, must be set before anything is emitted
    pub fn with_namespace(&mut self, namespace: impl Into<SharedString>) -> &mut Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Sets the storage resolution of every following record
    pub fn with_storage_resolution(&mut self, storage_resolution: u32) -> &mut Self {
        self.storage_resolution = storage_resolution;
        self
    }

    pub fn storage_resolution(&self) -> u32 {
        self.storage_resolution
    }

    /// Replaces the stream id and its MetricStreamId dimension
    pub fn with_stream_id(&mut self, stream_id: impl Into<SharedString>) -> &mut Self {
        self.dimensions.with_stream_id(stream_id);
        self
    }

    pub fn stream_id(&self) -> &str {
        self.dimensions.stream_id()
    }

    /// Adds or replaces a dimension sent with every following metric
    pub fn with_dimension(&mut self, name: impl Into<SharedString>, value: impl Into<SharedString>) -> &mut Self {
        self.dimensions.with_dimension(name, value);
        self
    }

    pub fn without_dimension(&mut self, name: &str) -> &mut Self {
        self.dimensions.without_dimension(name);
        self
    }

    pub fn dimension_exists(&self, name: &str) -> bool {
        self.dimensions.dimension_exists(name)
    }

    pub fn dimension_value(&self, name: &str) -> Option<&str> {
        self.dimensions.dimension_value(name)
    }

    /// See [DimensionSet::push_dimensions]
    pub fn push_dimensions(&mut self) -> &mut Self {
        self.dimensions.push_dimensions();
        self
    }

    /// See [DimensionSet::pop_dimensions]
    pub fn pop_dimensions(&mut self) -> Result<&mut Self, Error> {
        self.dimensions.pop_dimensions()?;
        Ok(self)
    }

    pub fn dimensions(&self) -> &DimensionSet {
        &self.dimensions
    }

    /// Starts (or restarts) a named timer
    pub fn with_timer(&mut self, name: impl Into<String>) -> &mut Self {
        self.timers.insert(name.into(), Timer::start());
        self
    }

    pub fn without_timer(&mut self, name: &str) -> &mut Self {
        self.timers.remove(name);
        self
    }

    pub fn timer(&self, name: &str) -> Option<&Timer> {
        self.timers.get(name)
    }

    /// Emit a value stamped with the current time
    pub fn emit(&mut self, metric_name: impl Into<SharedString>, value: f64, unit: Unit) -> Result<&mut Self, Error> {
        self.emit_at(metric_name, value, unit, Utc::now())
    }

    /// Emit a value with an explicit timestamp
    pub fn emit_at(
        &mut self,
        metric_name: impl Into<SharedString>,
        value: f64,
        unit: Unit,
        timestamp: DateTime<Utc>,
    ) -> Result<&mut Self, Error> {
        let namespace = self.namespace.clone().ok_or("namespace missing")?;
        let records = self.records(metric_name.into(), value, unit, timestamp);
        self.sink.accept(&namespace, records)?;
        Ok(self)
    }

    /// One detail record per dimension, then the summary record
    fn records(&self, metric_name: SharedString, value: f64, unit: Unit, timestamp: DateTime<Utc>) -> Vec<MetricDatum> {
        let datum = |dimensions: Vec<Dimension>| MetricDatum {
            metric_name: metric_name.clone(),
            dimensions,
            timestamp,
            value,
            unit,
            storage_resolution: self.storage_resolution,
        };

        let mut records = Vec::with_capacity(self.dimensions.len() + 1);
        records.extend(self.dimensions.iter().map(|d| datum(vec![d.clone()])));
        records.push(datum(self.dimensions.as_slice().to_vec()));
        records
    }

    /// Emit the milliseconds elapsed on a timer, keyed by `timer_name` or else `metric_name`
    /// * An unknown timer is logged and nothing is emitted
    pub fn elapsed(&mut self, metric_name: impl Into<SharedString>, timer_name: Option<&str>) -> Result<&mut Self, Error> {
        let metric_name = metric_name.into();
        let elapsed = self.timers.get(timer_name.unwrap_or(&metric_name)).map(Timer::elapsed_ms);

        match elapsed {
            Some(ms) => self.emit(metric_name, ms, Unit::Milliseconds),
            None => {
                warn!("No timer named {}", timer_name.unwrap_or(&metric_name));
                Ok(self)
            }
        }
    }

    /// Runs `f` and emits how long it took in milliseconds
    /// * Emitted exactly once, also when `f` panics
    pub fn time<T>(&mut self, metric_name: impl Into<SharedString>, f: impl FnOnce(&mut Self) -> T) -> Result<T, Error> {
        let mut guard = self.timing(metric_name);
        let output = f(&mut *guard);
        guard.finish()?;
        Ok(output)
    }

    /// Starts timing a scope, the elapsed milliseconds are emitted when the guard is finished or dropped
    pub fn timing(&mut self, metric_name: impl Into<SharedString>) -> TimingGuard<'_, S> {
        TimingGuard {
            emitter: self,
            metric_name: Some(metric_name.into()),
            timer: Timer::start(),
        }
    }

    /// Push everything still buffered to the backend
    pub fn flush(&mut self) -> Result<&mut Self, Error> {
        self.sink.flush()?;
        Ok(self)
    }

    /// Metrics the backend knows under the current namespace
    pub fn list_metrics(&mut self, metric_name: &str) -> Result<Vec<MetricDescriptor>, Error> {
        let namespace = self.namespace.clone().ok_or("namespace missing")?;
        self.sink.backend_mut().list_metrics(&namespace, metric_name)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

macro_rules! unit_methods {
    ($($name:ident => $unit:ident),* $(,)?) => {
        impl<S: Sink> Emitter<S> {
            $(
                #[doc = concat!("Emit `value` as [Unit::", stringify!($unit), "], 1 when `None`")]
                pub fn $name(
                    &mut self,
                    metric_name: impl Into<SharedString>,
                    value: impl Into<Option<f64>>,
                ) -> Result<&mut Self, Error> {
                    self.emit(metric_name, value.into().unwrap_or(1.0), Unit::$unit)
                }
            )*
        }
    };
}

unit_methods! {
    count => Count,
    count_per_second => CountPerSecond,
    percent => Percent,
    seconds => Seconds,
    milliseconds => Milliseconds,
    microseconds => Microseconds,
    bytes => Bytes,
    kilobytes => Kilobytes,
    megabytes => Megabytes,
    gigabytes => Gigabytes,
    terabytes => Terabytes,
    bytes_per_second => BytesPerSecond,
    kilobytes_per_second => KilobytesPerSecond,
    megabytes_per_second => MegabytesPerSecond,
    gigabytes_per_second => GigabytesPerSecond,
    terabytes_per_second => TerabytesPerSecond,
    bits => Bits,
    kilobits => Kilobits,
    megabits => Megabits,
    gigabits => Gigabits,
    terabits => Terabits,
    bits_per_second => BitsPerSecond,
    kilobits_per_second => KilobitsPerSecond,
    megabits_per_second => MegabitsPerSecond,
    gigabits_per_second => GigabitsPerSecond,
    terabits_per_second => TerabitsPerSecond,
}

/// Scope timer from [Emitter::timing], derefs to the emitter so it can keep emitting inside the scope
pub struct TimingGuard<'a, S: Sink> {
    emitter: &'a mut Emitter<S>,
    metric_name: Option<SharedString>,
    timer: Timer,
}

impl<S: Sink> TimingGuard<'_, S> {
    /// Emit the elapsed time now and return any error instead of logging it
    pub fn finish(mut self) -> Result<(), Error> {
        match self.metric_name.take() {
            Some(name) => self.emitter.emit(name, self.timer.elapsed_ms(), Unit::Milliseconds).map(|_| ()),
            None => Ok(()),
        }
    }
}

impl<S: Sink> Deref for TimingGuard<'_, S> {
    type Target = Emitter<S>;

    fn deref(&self) -> &Emitter<S> {
        self.emitter
    }
}

impl<S: Sink> DerefMut for TimingGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut Emitter<S> {
        self.emitter
    }
}

impl<S: Sink> Drop for TimingGuard<'_, S> {
    fn drop(&mut self) {
        if let Some(name) = self.metric_name.take() {
            if let Err(e) = self.emitter.emit(name.clone(), self.timer.elapsed_ms(), Unit::Milliseconds) {
                error!("Failed to emit timing metric {name}: {e}");
            }
        }
    }
}
