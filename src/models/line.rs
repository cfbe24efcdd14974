//! Raw input lines.

use std::fmt;

/// A single line read from the source file.
///
/// Created by a line source, consumed once by a formatter, and discarded
/// after the record has been validated and written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    /// 1-based physical line number in the source file.
    pub line_number: usize,
    /// Line text without its trailing line terminator.
    pub text: String,
}

impl RawLine {
    /// Creates a new raw line.
    #[must_use]
    pub fn new(line_number: usize, text: impl Into<String>) -> Self {
        Self {
            line_number,
            text: text.into(),
        }
    }
}

impl fmt::Display for RawLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.line_number, self.text)
    }
}
