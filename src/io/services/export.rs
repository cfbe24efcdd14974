//! Record export service.
//!
//! Renders stored records back into an import layout, one line per record.
//! Exported files can be fed straight back into the importer.

use crate::io::formats::{Layout, create_formatter};
use crate::io::schema::Record;
use crate::{Error, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Result of an export operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResult {
    /// Number of records written.
    pub exported: usize,
    /// Layout used for export.
    pub layout: Layout,
    /// Output path (if file export).
    pub output_path: Option<String>,
}

impl ExportResult {
    /// Creates a new export result.
    #[must_use]
    pub const fn new(layout: Layout) -> Self {
        Self {
            exported: 0,
            layout,
            output_path: None,
        }
    }

    /// Returns whether any records were exported.
    #[must_use]
    pub const fn has_exports(&self) -> bool {
        self.exported > 0
    }
}

/// Service for writing records in an import layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportService {
    layout: Layout,
}

impl ExportService {
    /// Creates an export service for the given layout.
    #[must_use]
    pub const fn new(layout: Layout) -> Self {
        Self { layout }
    }

    /// Exports records to a file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or a record cannot be
    /// rendered in the layout.
    pub fn export_to_file<R: Record>(
        &self,
        records: impl IntoIterator<Item = R>,
        path: &Path,
    ) -> Result<ExportResult> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| Error::OperationFailed {
                operation: "create_export_dir".to_string(),
                cause: e.to_string(),
            })?;
        }
        let file = File::create(path).map_err(|e| Error::OperationFailed {
            operation: "create_export_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

        let mut result = self.export_to_writer(records, BufWriter::new(file))?;
        result.output_path = Some(path.display().to_string());
        Ok(result)
    }

    /// Exports records to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails or a record cannot be rendered in
    /// the layout.
    pub fn export_to_writer<R: Record, W: Write>(
        &self,
        records: impl IntoIterator<Item = R>,
        mut writer: W,
    ) -> Result<ExportResult> {
        let formatter = create_formatter::<R>(self.layout);
        let mut result = ExportResult::new(self.layout);

        for record in records {
            let line = formatter.format(&record)?;
            writeln!(writer, "{line}").map_err(|e| Error::OperationFailed {
                operation: "write_export".to_string(),
                cause: e.to_string(),
            })?;
            result.exported += 1;
        }

        writer.flush().map_err(|e| Error::OperationFailed {
            operation: "flush_export".to_string(),
            cause: e.to_string(),
        })?;

        tracing::debug!(exported = result.exported, layout = %self.layout, "Export finished");
        Ok(result)
    }
}
