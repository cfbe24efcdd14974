//! Record sinks.
//!
//! A [`RecordSink`] accepts validated records one at a time and is flushed
//! once at end of stream. Any retry or batching policy belongs to the sink;
//! the importer treats every error as fatal.

use crate::Result;

/// Destination for validated records.
///
/// # Lifecycle
///
/// 1. `write()` once per valid record, in input order
/// 2. `flush()` once after the source is exhausted
pub trait RecordSink<R> {
    /// Accepts one record.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Write`] if the record cannot be stored.
    fn write(&mut self, record: &R) -> Result<()>;

    /// Persists anything still buffered.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Write`] if buffered records cannot be stored.
    fn flush(&mut self) -> Result<()>;
}

impl<R, S: RecordSink<R> + ?Sized> RecordSink<R> for &mut S {
    fn write(&mut self, record: &R) -> Result<()> {
        (**self).write(record)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

impl<R, S: RecordSink<R> + ?Sized> RecordSink<R> for Box<S> {
    fn write(&mut self, record: &R) -> Result<()> {
        (**self).write(record)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

/// Sink that keeps records in memory.
#[derive(Debug, Clone)]
pub struct MemorySink<R> {
    records: Vec<R>,
    flushes: usize,
}

impl<R> Default for MemorySink<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            flushes: 0,
        }
    }
}

impl<R> MemorySink<R> {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the records written so far.
    #[must_use]
    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Consumes the sink, returning its records.
    #[must_use]
    pub fn into_records(self) -> Vec<R> {
        self.records
    }

    /// Returns how many times the sink was flushed.
    #[must_use]
    pub const fn flush_count(&self) -> usize {
        self.flushes
    }
}

impl<R: Clone> RecordSink<R> for MemorySink<R> {
    fn write(&mut self, record: &R) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.flushes += 1;
        Ok(())
    }
}

/// Sink that counts records and stores nothing (dry runs).
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardSink {
    written: usize,
}

impl DiscardSink {
    /// Creates a discarding sink.
    #[must_use]
    pub const fn new() -> Self {
        Self { written: 0 }
    }

    /// Returns how many records were accepted.
    #[must_use]
    pub const fn written(&self) -> usize {
        self.written
    }
}

impl<R> RecordSink<R> for DiscardSink {
    fn write(&mut self, _record: &R) -> Result<()> {
        self.written += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
