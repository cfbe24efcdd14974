//! Delimiter-separated layout.
//!
//! Fields appear in schema order with no header row. Quoting follows CSV
//! rules, so a field may contain the delimiter when it is quoted. Booleans
//! are written as `TRUE`/`FALSE`.

use crate::io::formats::{FormatError, Formatter};
use crate::io::schema::{BoolStyle, Record};
use crate::models::RawLine;
use crate::{Error, Result};

/// Formatter for delimiter-separated lines.
#[derive(Debug, Clone, Copy)]
pub struct DelimitedFormatter {
    delimiter: u8,
}

impl Default for DelimitedFormatter {
    fn default() -> Self {
        Self::new(b',')
    }
}

impl DelimitedFormatter {
    /// Creates a formatter splitting on the given byte.
    #[must_use]
    pub const fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Returns the separator byte.
    #[must_use]
    pub const fn delimiter(&self) -> u8 {
        self.delimiter
    }

    /// Splits one line into its fields.
    fn split(&self, line: &RawLine) -> std::result::Result<csv::StringRecord, FormatError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .from_reader(line.text.as_bytes());

        let mut record = csv::StringRecord::new();
        let has_record = reader
            .read_record(&mut record)
            .map_err(|e| FormatError::line(line.line_number, e.to_string()))?;
        if !has_record {
            return Err(FormatError::line(line.line_number, "line is empty"));
        }

        // A bare '\r' ends a csv record, so a line may hold a second one.
        let mut rest = csv::StringRecord::new();
        let has_more = reader
            .read_record(&mut rest)
            .map_err(|e| FormatError::line(line.line_number, e.to_string()))?;
        if has_more {
            return Err(FormatError::line(
                line.line_number,
                format!(
                    "unexpected content after record: '{}'",
                    rest.iter().collect::<Vec<_>>().join(",")
                ),
            ));
        }
        Ok(record)
    }
}

impl<R: Record> Formatter<R> for DelimitedFormatter {
    fn parse(&self, line: &RawLine) -> std::result::Result<R, FormatError> {
        let schema = R::schema();
        let fields = self.split(line)?;

        if fields.len() != schema.len() {
            return Err(FormatError::line(
                line.line_number,
                format!("expected {} fields, found {}", schema.len(), fields.len()),
            ));
        }

        let values = schema
            .fields()
            .iter()
            .zip(fields.iter())
            .map(|(field, raw)| {
                field.parse_value(raw.trim())
                    .map_err(|message| FormatError::field(line.line_number, field.name, message))
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        R::from_values(values).map_err(|message| FormatError::line(line.line_number, message))
    }

    fn format(&self, record: &R) -> Result<String> {
        let schema = R::schema();
        let values = record.to_values();
        let rendered: Vec<String> = schema
            .fields()
            .iter()
            .zip(values.iter())
            .map(|(field, value)| field.render_exact(value, BoolStyle::Upper))
            .collect::<Result<_>>()?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .delimiter(self.delimiter)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        writer
            .write_record(&rendered)
            .map_err(|e| Error::OperationFailed {
                operation: "format_delimited".to_string(),
                cause: e.to_string(),
            })?;
        let bytes = writer.into_inner().map_err(|e| Error::OperationFailed {
            operation: "format_delimited".to_string(),
            cause: e.to_string(),
        })?;

        let mut line = String::from_utf8(bytes).map_err(|e| Error::OperationFailed {
            operation: "format_delimited".to_string(),
            cause: e.to_string(),
        })?;
        if line.ends_with('\n') {
            line.pop();
        }
        Ok(line)
    }
}
