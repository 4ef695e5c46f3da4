//! # Backend
//!
//! The remote "put a page of records" primitive and the implementations shipped with this crate
//!
//! A backend is only ever handed pages of at most [PAGE_SIZE](super::PAGE_SIZE) records by
//! [BufferedSink](super::BufferedSink). Failures are returned untouched to the caller of
//! `emit`/`flush`, retry policy belongs to the application.

use super::{
    datum::{MetricDatum, MetricDescriptor, PutMetricData},
    Error,
};
use metrics::SharedString;
use tracing::debug;

/// Remote metrics service
pub trait Backend {
    /// Ship one page of records for a namespace
    fn put_batch(&mut self, namespace: &str, records: &[MetricDatum]) -> Result<(), Error>;

    /// Read-side query, passed straight through by the emitter
    fn list_metrics(&mut self, namespace: &str, metric_name: &str) -> Result<Vec<MetricDescriptor>, Error>;
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn put_batch(&mut self, namespace: &str, records: &[MetricDatum]) -> Result<(), Error> {
        (**self).put_batch(namespace, records)
    }

    fn list_metrics(&mut self, namespace: &str, metric_name: &str) -> Result<Vec<MetricDescriptor>, Error> {
        (**self).list_metrics(namespace, metric_name)
    }
}

/// Explicit settings used to construct a backend when no handle is given to the [Builder](super::Builder)
#[derive(Clone, Debug, Default)]
pub struct BackendConfig {
    /// Alternate named credential set
    pub profile: Option<SharedString>,
}

/// A backend that can be built from a [BackendConfig]
pub trait ConfiguredBackend: Backend + Sized {
    fn from_config(config: &BackendConfig) -> Result<Self, Error>;
}

/// Remember the distinct (name, dimensions) combinations seen in a namespace
fn remember(known: &mut Vec<MetricDescriptor>, namespace: &str, records: &[MetricDatum]) {
    for record in records {
        let seen = known.iter().any(|d| {
            d.namespace == namespace && *d.metric_name == *record.metric_name && d.dimensions == record.dimensions
        });
        if !seen {
            known.push(MetricDescriptor {
                namespace: namespace.to_string(),
                metric_name: record.metric_name.to_string(),
                dimensions: record.dimensions.clone(),
            });
        }
    }
}

fn lookup(known: &[MetricDescriptor], namespace: &str, metric_name: &str) -> Vec<MetricDescriptor> {
    known
        .iter()
        .filter(|d| d.namespace == namespace && d.metric_name == metric_name)
        .cloned()
        .collect()
}

/// Keeps every page in memory, useful for tests and for inspecting what would have been sent
#[derive(Debug, Default)]
pub struct MemoryBackend {
    calls: Vec<(String, Vec<MetricDatum>)>,
    known: Vec<MetricDescriptor>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every put_batch call received, oldest first, as (namespace, page)
    pub fn calls(&self) -> &[(String, Vec<MetricDatum>)] {
        &self.calls
    }

    /// Total number of records received across all calls
    pub fn records(&self) -> usize {
        self.calls.iter().map(|(_, page)| page.len()).sum()
    }
}

impl Backend for MemoryBackend {
    fn put_batch(&mut self, namespace: &str, records: &[MetricDatum]) -> Result<(), Error> {
        remember(&mut self.known, namespace, records);
        self.calls.push((namespace.to_string(), records.to_vec()));
        Ok(())
    }

    fn list_metrics(&mut self, namespace: &str, metric_name: &str) -> Result<Vec<MetricDescriptor>, Error> {
        Ok(lookup(&self.known, namespace, metric_name))
    }
}

impl ConfiguredBackend for MemoryBackend {
    fn from_config(_config: &BackendConfig) -> Result<Self, Error> {
        Ok(Self::new())
    }
}

/// Writes each page as one PutMetricData JSON document per line to an implementation of
/// [std::io::Write], for a log forwarding agent to pick up
///
/// # Example
/// ```
/// let backend = metrics_cloudwatch_buffered::JsonLinesBackend::new(Vec::<u8>::new());
/// ```
pub struct JsonLinesBackend<W> {
    writer: W,
    profile: Option<SharedString>,
    known: Vec<MetricDescriptor>,
}

impl<W: std::io::Write> JsonLinesBackend<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            profile: None,
            known: Vec::new(),
        }
    }

    /// Tags every document with the credential profile the forwarding agent should ship it under
    pub fn with_profile(mut self, profile: impl Into<SharedString>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: std::io::Write> Backend for JsonLinesBackend<W> {
    fn put_batch(&mut self, namespace: &str, records: &[MetricDatum]) -> Result<(), Error> {
        let document = PutMetricData {
            namespace,
            profile: self.profile.as_deref(),
            metric_data: records,
        };

        serde_json::to_writer(&mut self.writer, &document)?;
        writeln!(self.writer)?;
        self.writer.flush()?;

        debug!("Wrote {} metrics for namespace {namespace}", records.len());
        remember(&mut self.known, namespace, records);
        Ok(())
    }

    fn list_metrics(&mut self, namespace: &str, metric_name: &str) -> Result<Vec<MetricDescriptor>, Error> {
        Ok(lookup(&self.known, namespace, metric_name))
    }
}

impl ConfiguredBackend for JsonLinesBackend<std::io::Stdout> {
    fn from_config(config: &BackendConfig) -> Result<Self, Error> {
        let mut backend = Self::new(std::io::stdout());
        backend.profile = config.profile.clone();
        Ok(backend)
    }
}

impl ConfiguredBackend for JsonLinesBackend<Vec<u8>> {
    fn from_config(config: &BackendConfig) -> Result<Self, Error> {
        let mut backend = Self::new(Vec::new());
        backend.profile = config.profile.clone();
        Ok(backend)
    }
}
