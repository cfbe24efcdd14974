//! Import/export I/O subsystem.
//!
//! Reads record files line by line, converts lines into typed records, and
//! hands valid records to a sink.
//!
//! # Architecture
//!
//! - **Line sources** implement [`LineSource`] and yield [`RawLine`](crate::models::RawLine)s
//! - **Formatters** implement [`Formatter`] for every [`Record`], one per [`Layout`]
//! - **Validation** checks records against per-field [`Rule`]s
//! - **Sinks** implement [`RecordSink`] and receive valid records
//! - **Services** orchestrate the pipeline ([`Importer`]) and render records
//!   back into a layout ([`ExportService`])
//!
//! # Supported Layouts
//!
//! | Layout | Separator | Booleans | Dates |
//! |--------|-----------|----------|-------|
//! | Delimiter | `,` (configurable) | `TRUE`/`FALSE` | `YYYY-MM-DD` |
//! | Fixed-width | column widths | `true`/`false` | `YYYY-MM-DD` |

pub mod formats;
pub mod reader;
pub mod schema;
pub mod services;
pub mod sink;
pub mod validation;

// Re-exports for convenience
pub use formats::{FormatError, Formatter, Layout, create_formatter};
pub use reader::{FileLineReader, LineSource};
pub use schema::{FieldSpec, Record, Schema, Value};
pub use services::export::{ExportResult, ExportService};
pub use services::import::{ImportContext, ImportProgress, ImportSummary, Importer};
pub use sink::{DiscardSink, MemorySink, RecordSink};
pub use validation::{RecordValidator, Rule, ValidationResult, Validator, Violation};
