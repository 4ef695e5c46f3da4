//! # Sink
//!
//! Where the [Emitter](super::Emitter) hands its records: straight to the backend with [Direct],
//! or through the paging buffer of [BufferedSink]
//!
//! Neither sink is thread safe, wrap the emitter in a [SharedEmitter](super::SharedEmitter) to
//! share it across threads.

use super::{backend::Backend, datum::MetricDatum, Error, PAGE_SIZE};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Receives the records built by each emit call
pub trait Sink {
    type Backend: Backend;

    /// Take ownership of the records produced by a single emit call
    fn accept(&mut self, namespace: &str, records: Vec<MetricDatum>) -> Result<(), Error>;

    /// Push everything still held to the backend
    fn flush(&mut self) -> Result<(), Error>;

    fn backend(&self) -> &Self::Backend;

    fn backend_mut(&mut self) -> &mut Self::Backend;
}

/// Unbuffered sink, one backend call per emit
pub struct Direct<B> {
    backend: B,
}

impl<B: Backend> Direct<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn into_inner(self) -> B {
        self.backend
    }
}

impl<B: Backend> Sink for Direct<B> {
    type Backend = B;

    fn accept(&mut self, namespace: &str, records: Vec<MetricDatum>) -> Result<(), Error> {
        if records.is_empty() {
            return Ok(());
        }
        debug!("Sending {} metrics to namespace {namespace}", records.len());
        self.backend.put_batch(namespace, &records)
    }

    fn flush(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn backend(&self) -> &B {
        &self.backend
    }

    fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

/// Packs records into as few backend calls as possible
///
/// * Records are queued per namespace and shipped in submission order
/// * Complete pages are shipped as soon as they fill, partial pages wait for [flush](Sink::flush)
/// * At most `max_items` records are held across all namespaces, the excess of a submission
///   that doesn't fit is logged and dropped
///
/// Re-use the same instance, a fresh sink per emit buffers nothing.
pub struct BufferedSink<B> {
    backend: B,
    buffers: BTreeMap<String, Vec<MetricDatum>>,
    max_items: usize,
    page_size: usize,
}

impl<B: Backend> BufferedSink<B> {
    /// Creates a sink holding up to 5 pages with the backend's page size
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            buffers: BTreeMap::new(),
            max_items: PAGE_SIZE * 5,
            page_size: PAGE_SIZE,
        }
    }

    /// Sets the total number of records held across all namespaces
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    /// Overrides the backend page size, only meant for testing
    /// * Clamped to at least 1
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of records waiting across all namespaces
    pub fn len(&self) -> usize {
        self.buffers.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records waiting for a namespace, oldest first
    pub fn pending(&self, namespace: &str) -> &[MetricDatum] {
        self.buffers.get(namespace).map(Vec::as_slice).unwrap_or_default()
    }

    /// Ship every complete page, and the remainder too when `send_partial` is set
    ///
    /// Stops at the first backend error and returns it. Pages shipped before the error are gone
    /// from the queue, the failed page and everything after it stay queued.
    pub fn flush_pages(&mut self, send_partial: bool) -> Result<(), Error> {
        let mut result = Ok(());

        for (namespace, buffer) in self.buffers.iter_mut() {
            result = ship(&mut self.backend, namespace, buffer, self.page_size, send_partial);
            if result.is_err() {
                break;
            }
        }

        self.buffers.retain(|_, buffer| !buffer.is_empty());
        result
    }

    pub fn into_inner(self) -> B {
        self.backend
    }
}

/// Ships pages from the front of a namespace queue and drains whatever was accepted
fn ship<B: Backend>(
    backend: &mut B,
    namespace: &str,
    buffer: &mut Vec<MetricDatum>,
    page_size: usize,
    send_partial: bool,
) -> Result<(), Error> {
    let mut shipped = 0;
    let mut result = Ok(());

    while buffer.len() - shipped >= page_size || (send_partial && shipped < buffer.len()) {
        let end = (shipped + page_size).min(buffer.len());
        debug!("Sending {} metrics to namespace {namespace}", end - shipped);
        if let Err(e) = backend.put_batch(namespace, &buffer[shipped..end]) {
            result = Err(e);
            break;
        }
        shipped = end;
    }

    buffer.drain(..shipped);
    result
}

impl<B: Backend> Sink for BufferedSink<B> {
    type Backend = B;

    fn accept(&mut self, namespace: &str, mut records: Vec<MetricDatum>) -> Result<(), Error> {
        let allowed = self.max_items.saturating_sub(self.len());

        if allowed < records.len() {
            warn!("Dropping {} out of {} metrics", records.len() - allowed, records.len());
            records.truncate(allowed);
        }

        if !records.is_empty() {
            self.buffers.entry(namespace.to_string()).or_default().extend(records);
        }

        // clear as much as possible without sending a partial page
        self.flush_pages(false)
    }

    fn flush(&mut self) -> Result<(), Error> {
        self.flush_pages(true)
    }

    fn backend(&self) -> &B {
        &self.backend
    }

    fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}
