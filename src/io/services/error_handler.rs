//! Per-line error reporting.
//!
//! Format and validation failures do not stop an import. They are logged
//! with the run's static context fields (application, environment, file name,
//! run id) and the offending line number, counted in metrics, and summarised
//! as a message for the [`ImportSummary`](super::import::ImportSummary).

use crate::io::formats::FormatError;
use crate::io::validation::Violation;
use crate::models::RawLine;
use uuid::Uuid;

/// Static fields attached to every reported line error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Application name (e.g. `import users`).
    pub app: String,
    /// Deployment environment (e.g. `dev`).
    pub env: String,
    /// Name of the file being imported.
    pub file_name: Option<String>,
    /// Identifier of this import run.
    pub run_id: String,
}

impl ErrorContext {
    /// Creates a context with a fresh run id and no file name.
    #[must_use]
    pub fn new(app: impl Into<String>, env: impl Into<String>) -> Self {
        Self {
            app: app.into(),
            env: env.into(),
            file_name: None,
            run_id: Uuid::now_v7().to_string(),
        }
    }

    /// Sets the file name.
    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Replaces the generated run id.
    #[must_use]
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = run_id.into();
        self
    }

    fn file_name(&self) -> &str {
        self.file_name.as_deref().unwrap_or("-")
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new("user-import", "dev")
    }
}

/// Logs recoverable per-line failures.
#[derive(Debug, Clone, Default)]
pub struct ErrorHandler {
    context: ErrorContext,
}

impl ErrorHandler {
    /// Creates a handler for the given context.
    #[must_use]
    pub const fn new(context: ErrorContext) -> Self {
        Self { context }
    }

    /// Returns the handler's context.
    #[must_use]
    pub const fn context(&self) -> &ErrorContext {
        &self.context
    }

    /// Reports a line that could not be parsed.
    ///
    /// Returns the summary message for the line.
    pub fn format_error(&self, line: &RawLine, error: &FormatError) -> String {
        tracing::error!(
            app = %self.context.app,
            env = %self.context.env,
            file_name = %self.context.file_name(),
            run_id = %self.context.run_id,
            line_no = line.line_number,
            field = error.field.as_deref().unwrap_or("-"),
            raw = %line.text,
            "Cannot parse line: {}",
            error.message
        );
        metrics::counter!("import_format_errors_total").increment(1);

        match &error.field {
            Some(field) => format!("Line {}: {field}: {}", line.line_number, error.message),
            None => format!("Line {}: {}", line.line_number, error.message),
        }
    }

    /// Reports a parsed line whose record failed validation.
    ///
    /// Returns the summary message for the line.
    pub fn validation_error(&self, line: &RawLine, violations: &[Violation]) -> String {
        let joined = violations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");

        tracing::error!(
            app = %self.context.app,
            env = %self.context.env,
            file_name = %self.context.file_name(),
            run_id = %self.context.run_id,
            line_no = line.line_number,
            violations = violations.len(),
            "Invalid record: {joined}"
        );
        metrics::counter!("import_validation_errors_total").increment(1);

        format!("Line {}: {joined}", line.line_number)
    }
}
