//! Fixed-width layout.
//!
//! Each field occupies `width` bytes at a cumulative offset given by the
//! schema, padded with spaces on the side its alignment leaves free.
//! Booleans are written as lowercase `true`/`false`.
//!
//! Lines shorter than the layout are accepted: fields starting past the end
//! of the line are read as empty. Non-blank content past the last field is
//! rejected.

use crate::io::formats::{FormatError, Formatter};
use crate::io::schema::{Align, BoolStyle, Record};
use crate::models::RawLine;
use crate::{Error, Result};

/// Formatter for fixed-width lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedWidthFormatter;

impl FixedWidthFormatter {
    /// Creates a fixed-width formatter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

/// Returns the bytes `start..end` of `text`, clamped to its length.
fn column(text: &str, start: usize, end: usize) -> Option<&str> {
    if start >= text.len() {
        return Some("");
    }
    text.get(start..end.min(text.len()))
}

impl<R: Record> Formatter<R> for FixedWidthFormatter {
    fn parse(&self, line: &RawLine) -> std::result::Result<R, FormatError> {
        let schema = R::schema();
        let text = line.text.as_str();
        let mut values = Vec::with_capacity(schema.len());
        let mut offset = 0;

        for field in schema.fields() {
            let end = offset + field.width;
            let raw = column(text, offset, end).ok_or_else(|| {
                FormatError::field(
                    line.line_number,
                    field.name,
                    format!("bytes {offset}..{end} split a multi-byte character"),
                )
            })?;
            let value = field
                .parse_value(raw.trim())
                .map_err(|message| FormatError::field(line.line_number, field.name, message))?;
            values.push(value);
            offset = end;
        }

        if let Some(rest) = text.get(offset..) {
            if !rest.trim().is_empty() {
                return Err(FormatError::line(
                    line.line_number,
                    format!("unexpected content after byte {offset}: '{}'", rest.trim()),
                ));
            }
        } else if text.len() > offset {
            return Err(FormatError::line(
                line.line_number,
                format!("byte {offset} splits a multi-byte character"),
            ));
        }

        R::from_values(values).map_err(|message| FormatError::line(line.line_number, message))
    }

    fn format(&self, record: &R) -> Result<String> {
        let schema = R::schema();
        let values = record.to_values();
        let mut line = String::with_capacity(schema.record_width());

        for (field, value) in schema.fields().iter().zip(values.iter()) {
            let rendered = field.render_exact(value, BoolStyle::Lower)?;
            if rendered.len() > field.width {
                return Err(Error::InvalidInput(format!(
                    "Field '{}' value '{rendered}' is {} bytes, wider than its {}-byte column",
                    field.name,
                    rendered.len(),
                    field.width
                )));
            }
            let padding = " ".repeat(field.width - rendered.len());
            match field.align {
                Align::Left => {
                    line.push_str(&rendered);
                    line.push_str(&padding);
                },
                Align::Right => {
                    line.push_str(&padding);
                    line.push_str(&rendered);
                },
            }
        }

        Ok(line)
    }
}
