//! Output sinks.
//!
//! A sink receives each batch by value as soon as it is complete. Sink
//! errors abort the run and are returned to the caller unchanged.

use fakegen_core::Batch;
use std::error::Error as StdError;

/// Error raised by a sink; wraps whatever the sink failed with.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct SinkError {
    inner: Box<dyn StdError + Send + Sync + 'static>,
}

impl SinkError {
    /// Wrap a sink's own error.
    pub fn new<E>(error: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync + 'static>>,
    {
        Self {
            inner: error.into(),
        }
    }

    /// The wrapped error.
    pub fn get_ref(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.inner.as_ref()
    }

    /// Unwrap into the sink's own error.
    pub fn into_inner(self) -> Box<dyn StdError + Send + Sync + 'static> {
        self.inner
    }
}

/// Destination for generated batches.
pub trait BatchSink {
    /// Take ownership of one batch.
    fn accept(&mut self, batch: Batch) -> Result<(), SinkError>;

    /// Called once after the last batch of a run that was not aborted.
    fn finish(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

impl<S: BatchSink + ?Sized> BatchSink for &mut S {
    fn accept(&mut self, batch: Batch) -> Result<(), SinkError> {
        (**self).accept(batch)
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        (**self).finish()
    }
}

impl<S: BatchSink + ?Sized> BatchSink for Box<S> {
    fn accept(&mut self, batch: Batch) -> Result<(), SinkError> {
        (**self).accept(batch)
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        (**self).finish()
    }
}

/// Sink that keeps every batch in memory. Intended for tests and previews.
#[derive(Debug, Default)]
pub struct CollectSink {
    /// Batches received, in order
    pub batches: Vec<Batch>,
    /// Whether `finish` was called
    pub finished: bool,
}

impl CollectSink {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total rows received.
    pub fn row_count(&self) -> usize {
        self.batches.iter().map(Batch::len).sum()
    }

    /// All rows received, flattened in order.
    pub fn into_rows(self) -> Vec<fakegen_core::Row> {
        self.batches.into_iter().flat_map(|b| b.rows).collect()
    }
}

impl BatchSink for CollectSink {
    fn accept(&mut self, batch: Batch) -> Result<(), SinkError> {
        self.batches.push(batch);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.finished = true;
        Ok(())
    }
}
