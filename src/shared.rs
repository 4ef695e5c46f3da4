//! # Shared
//!
//! [Emitter] and its sinks are single threaded. [SharedEmitter] puts one behind a mutex so a
//! handle can be cloned into every thread that emits.

use super::{emitter::Emitter, sink::Sink, Error};
use std::sync::{Arc, Mutex, PoisonError};

/// Cloneable, thread safe handle to an [Emitter]
pub struct SharedEmitter<S> {
    inner: Arc<Mutex<Emitter<S>>>,
}

impl<S: Sink> SharedEmitter<S> {
    pub fn new(emitter: Emitter<S>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(emitter)),
        }
    }

    /// Run `f` with exclusive access to the emitter
    /// * A panic in an earlier caller doesn't lock everyone else out, the emitter stays usable
    pub fn with<T>(&self, f: impl FnOnce(&mut Emitter<S>) -> T) -> T {
        let mut emitter = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut emitter)
    }

    pub fn flush(&self) -> Result<(), Error> {
        self.with(|emitter| emitter.flush().map(|_| ()))
    }
}

impl<S> Clone for SharedEmitter<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: Sink> From<Emitter<S>> for SharedEmitter<S> {
    fn from(emitter: Emitter<S>) -> Self {
        Self::new(emitter)
    }
}
