//! Record import service.
//!
//! Orchestrates a single sequential pass over a line source: each line is
//! parsed, validated, and written before the next one is read.
//!
//! # Failure policy
//!
//! | Failure | Effect |
//! |---------|--------|
//! | Line cannot be parsed | reported, line skipped |
//! | Record fails validation | reported, line skipped |
//! | Source read fails | run aborted with [`Error::Read`] |
//! | Sink write or flush fails | run aborted with [`Error::Write`] |
//! | Context cancelled | run aborted with [`Error::Cancelled`] |

use crate::io::formats::Formatter;
use crate::io::reader::LineSource;
use crate::io::schema::Record;
use crate::io::services::error_handler::ErrorHandler;
use crate::io::sink::RecordSink;
use crate::io::validation::Validator;
use crate::{Error, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// Maximum number of per-line messages kept in an [`ImportSummary`].
pub const MAX_REPORTED_ERRORS: usize = 100;

/// Cancellation handle for an import run.
///
/// Clones share the same flag, so one clone can be handed to a signal
/// handler while another is passed to [`Importer::import`].
#[derive(Debug, Clone, Default)]
pub struct ImportContext {
    cancelled: Arc<AtomicBool>,
}

impl ImportContext {
    /// Creates a context that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. The importer stops before reading the next line.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Progress callback for import operations.
pub type ProgressCallback = Box<dyn Fn(&ImportProgress) + Send>;

/// Progress information during import.
#[derive(Debug, Clone, Default)]
pub struct ImportProgress {
    /// Lines processed so far.
    pub processed: usize,
    /// Records written so far.
    pub imported: usize,
    /// Lines skipped because they failed to parse or validate.
    pub skipped_invalid: usize,
    /// Physical line number of the line just processed.
    pub current_line: usize,
}

/// Result of an import run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Lines processed (every non-blank line read).
    pub total_lines: usize,
    /// Records written to the sink.
    pub imported: usize,
    /// Lines that could not be parsed.
    pub format_errors: usize,
    /// Lines whose record failed validation.
    pub validation_errors: usize,
    /// First [`MAX_REPORTED_ERRORS`] per-line error messages.
    pub errors: Vec<String>,
}

impl ImportSummary {
    /// Creates an empty summary.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            total_lines: 0,
            imported: 0,
            format_errors: 0,
            validation_errors: 0,
            errors: Vec::new(),
        }
    }

    /// Returns the number of lines skipped for any reason.
    #[must_use]
    pub const fn skipped(&self) -> usize {
        self.format_errors + self.validation_errors
    }

    /// Returns whether any line was skipped.
    #[must_use]
    pub const fn has_errors(&self) -> bool {
        self.skipped() > 0
    }

    fn record_error(&mut self, message: String) {
        if self.errors.len() < MAX_REPORTED_ERRORS {
            self.errors.push(message);
        }
    }
}

/// Imports records from a line source into a sink.
///
/// The formatter and validator are shared trait objects; the sink is owned
/// and can be recovered with [`Importer::into_sink`].
pub struct Importer<R: Record, S: RecordSink<R>> {
    formatter: Box<dyn Formatter<R>>,
    validator: Box<dyn Validator<R>>,
    sink: S,
    handler: ErrorHandler,
    progress: Option<ProgressCallback>,
}

impl<R: Record, S: RecordSink<R>> Importer<R, S> {
    /// Creates an importer.
    pub fn new(
        formatter: Box<dyn Formatter<R>>,
        validator: impl Validator<R> + 'static,
        sink: S,
        handler: ErrorHandler,
    ) -> Self {
        Self {
            formatter,
            validator: Box::new(validator),
            sink,
            handler,
            progress: None,
        }
    }

    /// Sets a callback invoked after every processed line.
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Returns the sink.
    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Consumes the importer, returning its sink.
    #[must_use]
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Runs the import to end of stream.
    ///
    /// Each line is counted, parsed, validated, and written in order. Lines
    /// that fail to parse or validate are reported through the error handler
    /// and skipped. When the source is exhausted the sink is flushed once.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] if the context is cancelled, or the
    /// source's [`Error::Read`] / the sink's [`Error::Write`]. Nothing after
    /// a failed write is written, and the sink is not flushed.
    pub fn import(
        &mut self,
        ctx: &ImportContext,
        source: &mut dyn LineSource,
    ) -> Result<ImportSummary> {
        let span = tracing::info_span!(
            "import",
            run_id = %self.handler.context().run_id,
            file_name = self.handler.context().file_name.as_deref().unwrap_or("-"),
        );
        let _enter = span.enter();
        let start = Instant::now();

        let mut summary = ImportSummary::new();
        let mut progress = ImportProgress::default();

        loop {
            if ctx.is_cancelled() {
                tracing::warn!(
                    lines = summary.total_lines,
                    imported = summary.imported,
                    "Import cancelled"
                );
                return Err(Error::Cancelled);
            }

            let Some(line) = source.next_line()? else {
                break;
            };
            summary.total_lines += 1;
            metrics::counter!("import_lines_total").increment(1);

            match self.formatter.parse(&line) {
                Err(error) => {
                    summary.format_errors += 1;
                    let message = self.handler.format_error(&line, &error);
                    summary.record_error(message);
                },
                Ok(record) => {
                    let validation = self.validator.validate(&record);
                    if validation.is_valid() {
                        self.sink.write(&record).inspect_err(|e| {
                            tracing::error!(line_no = line.line_number, error = %e, "Write failed, aborting import");
                        })?;
                        summary.imported += 1;
                        metrics::counter!("import_records_written_total").increment(1);
                    } else {
                        summary.validation_errors += 1;
                        let message = self
                            .handler
                            .validation_error(&line, &validation.violations);
                        summary.record_error(message);
                    }
                },
            }

            progress.processed = summary.total_lines;
            progress.imported = summary.imported;
            progress.skipped_invalid = summary.skipped();
            progress.current_line = line.line_number;
            if let Some(ref cb) = self.progress {
                cb(&progress);
            }
        }

        self.sink.flush()?;

        tracing::info!(
            total_lines = summary.total_lines,
            imported = summary.imported,
            format_errors = summary.format_errors,
            validation_errors = summary.validation_errors,
            duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Import completed"
        );

        Ok(summary)
    }
}
