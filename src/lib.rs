//! # user-import
//!
//! Batch importer for user record files.
//!
//! Reads a delimiter-separated or fixed-width file line by line, converts each
//! line into a typed record, validates it, and writes valid records into a
//! keyed store. Malformed lines and validation failures are logged and
//! skipped; only read and write failures abort a run.
//!
//! ## Pipeline
//!
//! | Stage | Module | Failure mode |
//! |-------|--------|--------------|
//! | Read | [`io::reader`] | fatal ([`Error::Read`]) |
//! | Parse | [`io::formats`] | per line, logged ([`io::FormatError`]) |
//! | Validate | [`io::validation`] | per line, logged |
//! | Write | [`io::sink`], [`storage`] | fatal ([`Error::Write`]) |
//!
//! ## Example
//!
//! ```rust,ignore
//! use user_import::io::{
//!     FileLineReader, ImportContext, Importer, Layout, MemorySink, create_formatter,
//! };
//! use user_import::io::services::error_handler::{ErrorContext, ErrorHandler};
//! use user_import::io::validation::RecordValidator;
//! use user_import::models::User;
//!
//! let mut reader = FileLineReader::open("export/delimiter.csv")?;
//! let mut importer = Importer::new(
//!     create_formatter::<User>(Layout::delimiter()),
//!     RecordValidator::for_users(),
//!     MemorySink::new(),
//!     ErrorHandler::new(ErrorContext::new("import users", "dev")),
//! );
//! let summary = importer.import(&ImportContext::new(), &mut reader)?;
//! println!("{} of {} lines imported", summary.imported, summary.total_lines);
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

pub mod config;
pub mod io;
pub mod models;
pub mod observability;
pub mod storage;

pub use config::ImportConfig;
pub use io::{ImportContext, ImportSummary, Importer, Layout};
pub use models::{RawLine, User};

/// Error type for import operations.
///
/// Per-line problems (unparseable lines, validation failures) are not
/// represented here; they are reported through the import error handler and
/// never abort a run.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Unknown layout names, bad delimiters, unparseable config values |
/// | `OperationFailed` | Config or log file I/O, schema creation, observability init |
/// | `Read` | The source file cannot be opened or a line cannot be read |
/// | `Write` | The sink rejects a record or fails to flush |
/// | `Cancelled` | The run's cancellation flag was raised |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// Reading the source failed.
    ///
    /// Raised when:
    /// - The input file does not exist or cannot be opened
    /// - An I/O error or invalid UTF-8 is hit mid-stream
    #[error("read failed at line {line}: {cause}")]
    Read {
        /// Line number being read when the failure occurred (0 when opening).
        line: usize,
        /// The underlying cause.
        cause: String,
    },

    /// Writing to the sink failed.
    ///
    /// Raised when:
    /// - The destination store rejects an insert
    /// - A batch commit or the final flush fails
    #[error("write failed: {cause}")]
    Write {
        /// The underlying cause.
        cause: String,
    },

    /// The import was cancelled before reaching end of stream.
    #[error("import cancelled")]
    Cancelled,
}

/// Result type alias for import operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidInput("unknown layout".to_string());
        assert_eq!(err.to_string(), "invalid input: unknown layout");

        let err = Error::OperationFailed {
            operation: "open_store".to_string(),
            cause: "locked".to_string(),
        };
        assert_eq!(err.to_string(), "operation 'open_store' failed: locked");

        let err = Error::Read {
            line: 3,
            cause: "stream did not contain valid UTF-8".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "read failed at line 3: stream did not contain valid UTF-8"
        );

        let err = Error::Write {
            cause: "disk full".to_string(),
        };
        assert_eq!(err.to_string(), "write failed: disk full");
        assert_eq!(Error::Cancelled.to_string(), "import cancelled");
    }
}
