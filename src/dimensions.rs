//! # Dimensions
//!
//! Ordered, name-unique dimension set with push/pop scoping

use super::{datum::Dimension, Error, STREAM_ID_DIMENSION};
use metrics::SharedString;

/// Ordered collection of unique-named dimensions attached to every emitted metric
///
/// Insertion order is preserved and decides the order of the per-dimension detail records.
/// Re-adding a name moves it to the end.
#[derive(Clone, Debug)]
pub struct DimensionSet {
    entries: Vec<Dimension>,
    stack: Vec<Vec<Dimension>>,
    stream_id: SharedString,
}

impl DimensionSet {
    /// Creates a set holding only the stream id dimension
    pub fn new(stream_id: impl Into<SharedString>) -> Self {
        let stream_id = stream_id.into();
        let mut set = Self {
            entries: Vec::new(),
            stack: Vec::new(),
            stream_id: stream_id.clone(),
        };
        set.with_dimension(STREAM_ID_DIMENSION, stream_id);
        set
    }

    /// Replaces the stream id and its dimension
    pub fn with_stream_id(&mut self, stream_id: impl Into<SharedString>) -> &mut Self {
        self.stream_id = stream_id.into();
        let value = self.stream_id.clone();
        self.with_dimension(STREAM_ID_DIMENSION, value)
    }

    pub fn stream_id(&self) -> &str {
        &self.stream_id
    }

    /// Adds or replaces a dimension, it always ends up last
    pub fn with_dimension(&mut self, name: impl Into<SharedString>, value: impl Into<SharedString>) -> &mut Self {
        let dimension = Dimension::new(name, value);
        self.entries.retain(|d| *d.name != *dimension.name);
        self.entries.push(dimension);
        self
    }

    /// Removes a dimension, no-op if it isn't present
    pub fn without_dimension(&mut self, name: &str) -> &mut Self {
        self.entries.retain(|d| &*d.name != name);
        self
    }

    pub fn dimension_exists(&self, name: &str) -> bool {
        self.entries.iter().any(|d| &*d.name == name)
    }

    pub fn dimension_value(&self, name: &str) -> Option<&str> {
        self.entries.iter().find(|d| &*d.name == name).map(|d| &*d.value)
    }

    /// Saves the current dimensions and starts over with only the stream id dimension
    pub fn push_dimensions(&mut self) -> &mut Self {
        let saved = std::mem::take(&mut self.entries);
        self.stack.push(saved);
        let stream_id = self.stream_id.clone();
        self.with_stream_id(stream_id)
    }

    /// Restores the dimensions saved by the matching [push_dimensions](Self::push_dimensions)
    /// * Everything added since the push is discarded
    /// * Popping with nothing pushed is a caller bug and returns Err("dimension stack underflow")
    pub fn pop_dimensions(&mut self) -> Result<&mut Self, Error> {
        self.entries = self.stack.pop().ok_or("dimension stack underflow")?;
        Ok(self)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Dimension> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[Dimension] {
        &self.entries
    }
}
