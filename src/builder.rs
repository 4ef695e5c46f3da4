use super::{
    backend::{Backend, BackendConfig, ConfiguredBackend},
    emitter::{Config, Emitter, STANDARD_RESOLUTION},
    sink::{BufferedSink, Direct},
    Error, PAGE_SIZE,
};
use metrics::SharedString;

/// Builder for the buffered CloudWatch metrics Emitter
///
/// * With [backend](Self::backend) set, use [init](Self::init) or [init_unbuffered](Self::init_unbuffered)
/// * Without one, [init_from_profile](Self::init_from_profile) builds it from the [profile](Self::profile)
///
/// # Example
/// ```
///  let metrics = metrics_cloudwatch_buffered::Builder::new()
///      .namespace("MyApplication")
///      .backend(metrics_cloudwatch_buffered::JsonLinesBackend::new(std::io::stdout()))
///      .init()
///      .unwrap();
/// ```
pub struct Builder<B> {
    namespace: Option<SharedString>,
    backend: Option<B>,
    profile: Option<SharedString>,
    max_items: usize,
    page_size: usize,
    storage_resolution: u32,
    stream_id: Option<SharedString>,
    default_dimensions: Vec<(SharedString, SharedString)>,
}

impl<B: Backend> Builder<B> {
    pub fn new() -> Self {
        Builder {
            namespace: None,
            backend: None,
            profile: None,
            max_items: PAGE_SIZE * 5,
            page_size: PAGE_SIZE,
            storage_resolution: STANDARD_RESOLUTION,
            stream_id: None,
            default_dimensions: Vec::new(),
        }
    }

    /// Sets the CloudWatch namespace for all metrics
    /// * Can also be set later with [Emitter::with_namespace], emitting without one returns Err("namespace missing")
    pub fn namespace(self, namespace: impl Into<SharedString>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            ..self
        }
    }

    /// Uses an explicit backend client instead of building one from the profile
    pub fn backend(self, backend: B) -> Self {
        Self {
            backend: Some(backend),
            ..self
        }
    }

    /// Alternate named credential set handed to [ConfiguredBackend::from_config]
    /// * Only used by [init_from_profile](Self::init_from_profile) when no backend is given
    pub fn profile(self, profile: impl Into<SharedString>) -> Self {
        Self {
            profile: Some(profile.into()),
            ..self
        }
    }

    /// Maximum number of records buffered across all namespaces, defaults to 5 pages
    pub fn max_items(self, max_items: usize) -> Self {
        Self { max_items, ..self }
    }

    /// Records per backend call, defaults to what CloudWatch accepts
    /// * Only meant for testing
    pub fn page_size(self, page_size: usize) -> Self {
        Self { page_size, ..self }
    }

    /// Storage resolution in seconds, 1 for high resolution metrics
    pub fn storage_resolution(self, storage_resolution: u32) -> Self {
        Self {
            storage_resolution,
            ..self
        }
    }

    /// Sets the MetricStreamId dimension value instead of a random UUID
    pub fn stream_id(self, stream_id: impl Into<SharedString>) -> Self {
        Self {
            stream_id: Some(stream_id.into()),
            ..self
        }
    }

    /// Adds a dimension (name, value) that will be sent with each metric
    /// * This method can be called multiple times, a repeated name replaces the earlier value
    pub fn with_dimension(mut self, name: impl Into<SharedString>, value: impl Into<SharedString>) -> Self {
        self.default_dimensions.push((name.into(), value.into()));
        self
    }

    /// Private helper for consuming the builder into emitter configuration and a backend
    fn build(self) -> Result<(Config, B, usize, usize), Error> {
        if self.page_size == 0 {
            return Err("page_size must be at least 1".into());
        }

        let backend = self.backend.ok_or("backend missing")?;

        let config = Config {
            namespace: self.namespace,
            stream_id: self
                .stream_id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string().into()),
            storage_resolution: self.storage_resolution,
            default_dimensions: self.default_dimensions,
        };

        Ok((config, backend, self.max_items, self.page_size))
    }

    /// Build an emitter that packs records into full pages
    pub fn init(self) -> Result<Emitter<BufferedSink<B>>, Error> {
        let (config, backend, max_items, page_size) = self.build()?;
        let sink = BufferedSink::new(backend)
            .with_max_items(max_items)
            .with_page_size(page_size);
        Ok(Emitter::new(sink, config))
    }

    /// Build an emitter that calls the backend on every emit
    pub fn init_unbuffered(self) -> Result<Emitter<Direct<B>>, Error> {
        let (config, backend, _, _) = self.build()?;
        Ok(Emitter::new(Direct::new(backend), config))
    }
}

impl<B: ConfiguredBackend> Builder<B> {
    /// Builds the backend from the profile unless one was given
    fn resolve_backend(self) -> Result<Self, Error> {
        match self.backend {
            Some(_) => Ok(self),
            None => {
                let backend = B::from_config(&BackendConfig {
                    profile: self.profile.clone(),
                })?;
                Ok(self.backend(backend))
            }
        }
    }

    /// Like [init](Self::init), constructing the backend from the profile when none was given
    pub fn init_from_profile(self) -> Result<Emitter<BufferedSink<B>>, Error> {
        self.resolve_backend()?.init()
    }

    /// Like [init_unbuffered](Self::init_unbuffered), constructing the backend from the profile when none was given
    pub fn init_unbuffered_from_profile(self) -> Result<Emitter<Direct<B>>, Error> {
        self.resolve_backend()?.init_unbuffered()
    }
}

impl<B: Backend> Default for Builder<B> {
    fn default() -> Self {
        Self::new()
    }
}
