//! Import and export service implementations.
//!
//! Orchestrates line parsing, validation, and storage operations.

pub mod error_handler;
pub mod export;
pub mod import;

pub use error_handler::{ErrorContext, ErrorHandler};
pub use export::{ExportResult, ExportService};
pub use import::{ImportContext, ImportProgress, ImportSummary, Importer, ProgressCallback};
