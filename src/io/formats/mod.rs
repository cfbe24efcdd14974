//! Line formatters.
//!
//! Each layout implements [`Formatter`] for every [`Record`] type, driven by
//! the record's static [`Schema`](crate::io::schema::Schema).

pub mod delimited;
pub mod fixed_width;

use crate::io::schema::Record;
use crate::models::RawLine;
use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

pub use delimited::DelimitedFormatter;
pub use fixed_width::FixedWidthFormatter;

/// A line that could not be converted into a record.
///
/// Format errors are reported per line and never stop an import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatError {
    /// Line the error occurred on.
    pub line_number: usize,
    /// Field that failed to convert, if the failure is field-specific.
    pub field: Option<String>,
    /// Description of the problem.
    pub message: String,
}

impl FormatError {
    /// Creates an error that is not tied to a single field.
    #[must_use]
    pub fn line(line_number: usize, message: impl Into<String>) -> Self {
        Self {
            line_number,
            field: None,
            message: message.into(),
        }
    }

    /// Creates an error for a specific field.
    #[must_use]
    pub fn field(line_number: usize, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            line_number,
            field: Some(field.into()),
            message: message.into(),
        }
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(
                f,
                "line {} field '{field}': {}",
                self.line_number, self.message
            ),
            None => write!(f, "line {}: {}", self.line_number, self.message),
        }
    }
}

impl std::error::Error for FormatError {}

/// Converts between raw lines and typed records.
pub trait Formatter<R: Record> {
    /// Parses one line into a record.
    ///
    /// # Errors
    ///
    /// Returns a [`FormatError`] if the line does not match the layout or a
    /// field cannot be converted.
    fn parse(&self, line: &RawLine) -> std::result::Result<R, FormatError>;

    /// Renders a record as one line, without a terminator.
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be represented in this layout.
    fn format(&self, record: &R) -> Result<String>;
}

/// Line layout of an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Fields separated by a single-byte delimiter.
    Delimiter {
        /// Separator byte.
        delimiter: u8,
    },
    /// Fields at fixed byte offsets.
    FixedWidth,
}

impl Default for Layout {
    fn default() -> Self {
        Self::delimiter()
    }
}

impl Layout {
    /// Comma-separated layout.
    #[must_use]
    pub const fn delimiter() -> Self {
        Self::Delimiter { delimiter: b',' }
    }

    /// Replaces the separator of a delimiter layout.
    ///
    /// Has no effect on fixed-width layouts.
    ///
    /// # Errors
    ///
    /// Returns an error if the separator is not a single ASCII character
    /// other than a quote or line break.
    pub fn with_delimiter(self, delimiter: char) -> Result<Self> {
        if !delimiter.is_ascii() || matches!(delimiter, '"' | '\n' | '\r') {
            return Err(Error::InvalidInput(format!(
                "Unsupported delimiter: {delimiter:?}"
            )));
        }
        // ASCII checked above
        #[allow(clippy::cast_possible_truncation)]
        let byte = delimiter as u8;
        Ok(match self {
            Self::Delimiter { .. } => Self::Delimiter { delimiter: byte },
            Self::FixedWidth => Self::FixedWidth,
        })
    }

    /// Returns the conventional file name for this layout.
    #[must_use]
    pub const fn default_file_name(&self) -> &'static str {
        match self {
            Self::Delimiter { .. } => "delimiter.csv",
            Self::FixedWidth => "fixedlength.csv",
        }
    }
}

impl FromStr for Layout {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "delimiter" | "delimited" | "csv" => Ok(Self::delimiter()),
            "tsv" => Ok(Self::Delimiter { delimiter: b'\t' }),
            "fixed-width" | "fixed_width" | "fixedwidth" | "fixed" | "fixedlength" => {
                Ok(Self::FixedWidth)
            },
            _ => Err(Error::InvalidInput(format!("Unknown layout: {s}"))),
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delimiter { .. } => write!(f, "delimiter"),
            Self::FixedWidth => write!(f, "fixed-width"),
        }
    }
}

/// Creates a formatter for the given layout.
#[must_use]
pub fn create_formatter<R: Record>(layout: Layout) -> Box<dyn Formatter<R>> {
    match layout {
        Layout::Delimiter { delimiter } => Box::new(DelimitedFormatter::new(delimiter)),
        Layout::FixedWidth => Box::new(FixedWidthFormatter::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;

    #[test]
    fn test_layout_from_str() {
        assert_eq!(Layout::from_str("delimiter").unwrap(), Layout::delimiter());
        assert_eq!(Layout::from_str("CSV").unwrap(), Layout::delimiter());
        assert_eq!(
            Layout::from_str("tsv").unwrap(),
            Layout::Delimiter { delimiter: b'\t' }
        );
        assert_eq!(Layout::from_str("fixed-width").unwrap(), Layout::FixedWidth);
        assert_eq!(Layout::from_str("FixedLength").unwrap(), Layout::FixedWidth);
        assert!(Layout::from_str("xml").is_err());
    }

    #[test]
    fn test_layout_display_and_file_name() {
        assert_eq!(Layout::delimiter().to_string(), "delimiter");
        assert_eq!(Layout::FixedWidth.to_string(), "fixed-width");
        assert_eq!(Layout::delimiter().default_file_name(), "delimiter.csv");
        assert_eq!(Layout::FixedWidth.default_file_name(), "fixedlength.csv");
    }

    #[test]
    fn test_with_delimiter() {
        assert_eq!(
            Layout::delimiter().with_delimiter('|').unwrap(),
            Layout::Delimiter { delimiter: b'|' }
        );
        assert_eq!(
            Layout::FixedWidth.with_delimiter(';').unwrap(),
            Layout::FixedWidth
        );
        assert!(Layout::delimiter().with_delimiter('"').is_err());
        assert!(Layout::delimiter().with_delimiter('é').is_err());
    }

    #[test]
    fn test_format_error_display() {
        let err = FormatError::field(4, "date_of_birth", "'x' is not a date");
        assert_eq!(
            err.to_string(),
            "line 4 field 'date_of_birth': 'x' is not a date"
        );
        let err = FormatError::line(2, "expected 6 fields, found 3");
        assert_eq!(err.to_string(), "line 2: expected 6 fields, found 3");
    }

    #[test]
    fn test_create_formatter_dispatch() {
        let sample = RawLine::new(1, "10,abraham59E,rory30@example.com,975-283-2267,TRUE,2019-02-20");
        let delimited = create_formatter::<User>(Layout::delimiter());
        assert_eq!(delimited.parse(&sample).unwrap().id, "10");

        // Same text sliced at fixed offsets instead of split on commas.
        let fixed = create_formatter::<User>(Layout::FixedWidth);
        assert_eq!(fixed.parse(&sample).unwrap().id, "10,abraham59");
    }
}
