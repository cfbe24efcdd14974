//! Configuration management.
//!
//! Settings are layered, later sources winning:
//!
//! 1. Built-in defaults
//! 2. A TOML file (`--config PATH`, or `user-import/config.toml` in the
//!    platform config directory)
//! 3. `USER_IMPORT_*` environment variables (a `.env` file is loaded first)
//! 4. Command-line flags
//!
//! ```toml
//! [import]
//! layout = "fixed-width"
//! delimiter = ","
//! batch_size = 500
//!
//! [store]
//! path = "users.db"
//!
//! [context]
//! app = "nightly import"
//! env = "dev"
//!
//! [logging]
//! format = "json"
//! level = "info"
//! file = "logs/import.log"
//! ```

use crate::io::Layout;
use crate::io::services::ErrorContext;
use crate::observability::{LogFormat, LoggingConfig};
use crate::storage::DEFAULT_BATCH_SIZE;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming the store path.
pub const ENV_DB: &str = "USER_IMPORT_DB";
/// Environment variable naming the layout.
pub const ENV_LAYOUT: &str = "USER_IMPORT_LAYOUT";
/// Environment variable for the batch size.
pub const ENV_BATCH_SIZE: &str = "USER_IMPORT_BATCH_SIZE";
/// Environment variable for the application name in error logs.
pub const ENV_APP: &str = "USER_IMPORT_APP";
/// Environment variable for the environment name in error logs.
pub const ENV_ENV: &str = "USER_IMPORT_ENV";
/// Environment variable for the log format.
pub const ENV_LOG_FORMAT: &str = "USER_IMPORT_LOG_FORMAT";
/// Environment variable for the log level.
pub const ENV_LOG_LEVEL: &str = "USER_IMPORT_LOG_LEVEL";

/// Directory holding data files when no path is given on the command line.
pub const DEFAULT_DATA_DIR: &str = "export";

/// Main configuration for an import run.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// Layout of the input file.
    pub layout: Layout,
    /// Records committed per store transaction.
    pub batch_size: usize,
    /// Path to the `SQLite` store.
    pub store_path: PathBuf,
    /// Application name attached to error logs.
    pub app: String,
    /// Environment name attached to error logs.
    pub env: String,
    /// Logging configuration.
    pub logging: LoggingConfig,
    /// Config files that were loaded, in order.
    pub config_sources: Vec<PathBuf>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Import section.
    pub import: Option<ConfigFileImport>,
    /// Store section.
    pub store: Option<ConfigFileStore>,
    /// Context section.
    pub context: Option<ConfigFileContext>,
    /// Logging section.
    pub logging: Option<ConfigFileLogging>,
}

/// Import section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileImport {
    /// Layout name.
    pub layout: Option<String>,
    /// Delimiter character for delimiter layouts.
    pub delimiter: Option<String>,
    /// Batch size.
    pub batch_size: Option<usize>,
}

/// Store section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileStore {
    /// Database path.
    pub path: Option<String>,
}

/// Context section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileContext {
    /// Application name.
    pub app: Option<String>,
    /// Environment name.
    pub env: Option<String>,
}

/// Logging section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileLogging {
    /// `pretty` or `json`.
    pub format: Option<String>,
    /// Default filter directive.
    pub level: Option<String>,
    /// Log file path.
    pub file: Option<String>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            layout: Layout::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            store_path: PathBuf::from("users.db"),
            app: "user-import".to_string(),
            env: "dev".to_string(),
            logging: LoggingConfig::default(),
            config_sources: Vec::new(),
        }
    }
}

impl ImportConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or holds an
    /// invalid value.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

        let file: ConfigFile = toml::from_str(&contents).map_err(|e| Error::OperationFailed {
            operation: "parse_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

        let mut config = Self::from_config_file(file)?;
        config.config_sources.push(path.to_path_buf());
        Ok(config)
    }

    /// Returns the default config file location, if the platform has one.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        directories::BaseDirs::new()
            .map(|dirs| dirs.config_dir().join("user-import").join("config.toml"))
    }

    /// Loads configuration from the default location.
    ///
    /// Returns default configuration if no config file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but is invalid.
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Loads configuration from `path` if given, otherwise from the default
    /// location, then applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file or an override is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load_default()?,
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Converts a `ConfigFile` to `ImportConfig`.
    fn from_config_file(file: ConfigFile) -> Result<Self> {
        let mut config = Self::default();

        if let Some(import) = file.import {
            if let Some(layout) = import.layout {
                config.layout = layout.parse()?;
            }
            if let Some(delimiter) = import.delimiter {
                config.layout = config.layout.with_delimiter(parse_delimiter(&delimiter)?)?;
            }
            if let Some(batch_size) = import.batch_size {
                config.batch_size = batch_size;
            }
        }
        if let Some(store) = file.store {
            if let Some(path) = store.path {
                config.store_path = PathBuf::from(path);
            }
        }
        if let Some(context) = file.context {
            if let Some(app) = context.app {
                config.app = app;
            }
            if let Some(env) = context.env {
                config.env = env;
            }
        }
        if let Some(logging) = file.logging {
            if let Some(format) = logging.format {
                config.logging.format = format.parse()?;
            }
            if let Some(level) = logging.level {
                config.logging.level = level;
            }
            config.logging.file = logging.file.map(PathBuf::from);
        }

        config.validate()?;
        Ok(config)
    }

    /// Applies `USER_IMPORT_*` overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if an override holds an invalid value.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Applies `USER_IMPORT_*` overrides read through `lookup`.
    ///
    /// Empty values are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if an override holds an invalid value.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = get(ENV_DB) {
            self.store_path = PathBuf::from(path);
        }
        if let Some(layout) = get(ENV_LAYOUT) {
            self.layout = layout.parse()?;
        }
        if let Some(batch_size) = get(ENV_BATCH_SIZE) {
            self.batch_size = batch_size.trim().parse().map_err(|_| {
                Error::InvalidInput(format!("{ENV_BATCH_SIZE} is not a number: {batch_size}"))
            })?;
        }
        if let Some(app) = get(ENV_APP) {
            self.app = app;
        }
        if let Some(env) = get(ENV_ENV) {
            self.env = env;
        }
        if let Some(format) = get(ENV_LOG_FORMAT) {
            self.logging.format = format.parse()?;
        }
        if let Some(level) = get(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }

        self.validate()
    }

    /// Checks cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the batch size is zero.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::InvalidInput(
                "batch_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Sets the layout.
    #[must_use]
    pub const fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Sets the store path.
    #[must_use]
    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = path.into();
        self
    }

    /// Sets the batch size.
    #[must_use]
    pub const fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Returns the data file used when none is named: `export/` plus the
    /// layout's conventional file name.
    #[must_use]
    pub fn default_data_file(&self) -> PathBuf {
        Path::new(DEFAULT_DATA_DIR).join(self.layout.default_file_name())
    }

    /// Builds the error-log context for a run over `file_name`.
    #[must_use]
    pub fn error_context(&self, file_name: impl Into<String>) -> ErrorContext {
        ErrorContext::new(&self.app, &self.env).with_file_name(file_name)
    }
}

/// Parses a delimiter given as text. Accepts a single character or `\t`.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] unless the text is exactly one character.
pub fn parse_delimiter(text: &str) -> Result<char> {
    if text == "\\t" {
        return Ok('\t');
    }
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(Error::InvalidInput(format!(
            "delimiter must be a single character: {text:?}"
        ))),
    }
}
