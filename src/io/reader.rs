//! Line sources.
//!
//! A [`LineSource`] yields [`RawLine`]s one at a time until it returns
//! `Ok(None)`, the end-of-stream marker the importer uses to trigger its final
//! flush.

use crate::models::RawLine;
use crate::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// UTF-8 byte order mark some editors write at the start of a file.
const BOM: char = '\u{feff}';

/// Sequential source of raw lines.
///
/// Sources are finite and cannot be restarted mid-stream.
pub trait LineSource {
    /// Reads the next non-blank line.
    ///
    /// Returns `Ok(None)` when the source is exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Read`] if the underlying reader fails.
    fn next_line(&mut self) -> Result<Option<RawLine>>;
}

/// Line source over any buffered reader.
///
/// Strips `\n` and `\r\n` terminators and a leading byte order mark, and
/// skips whitespace-only lines while keeping physical line numbers.
pub struct FileLineReader<R: BufRead> {
    reader: R,
    line_number: usize,
    buffer: String,
}

impl FileLineReader<BufReader<File>> {
    /// Opens a file for reading.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Read`] if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::Read {
            line: 0,
            cause: format!("{}: {e}", path.display()),
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> FileLineReader<R> {
    /// Wraps a buffered reader.
    #[must_use]
    pub const fn new(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
            buffer: String::new(),
        }
    }

    /// Returns the number of physical lines consumed so far.
    #[must_use]
    pub const fn lines_read(&self) -> usize {
        self.line_number
    }
}

impl<R: BufRead> LineSource for FileLineReader<R> {
    fn next_line(&mut self) -> Result<Option<RawLine>> {
        loop {
            self.buffer.clear();
            let bytes = self
                .reader
                .read_line(&mut self.buffer)
                .map_err(|e| Error::Read {
                    line: self.line_number + 1,
                    cause: e.to_string(),
                })?;
            if bytes == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let mut text = self.buffer.trim_end_matches(['\n', '\r']);
            if self.line_number == 1 {
                text = text.strip_prefix(BOM).unwrap_or(text);
            }
            if text.trim().is_empty() {
                tracing::trace!(line = self.line_number, "Skipping blank line");
                continue;
            }
            return Ok(Some(RawLine::new(self.line_number, text)));
        }
    }
}
