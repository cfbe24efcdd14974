//! Binary entry point for user-import.
//!
//! This binary provides the CLI interface for importing user record files
//! into a `SQLite` store.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

mod commands;

use clap::{Parser, Subcommand};
use commands::{apply_layout_flags, cmd_config, cmd_export, cmd_import, cmd_parse};
use std::path::PathBuf;
use std::process::ExitCode;
use user_import::observability;
use user_import::{ImportConfig, Result};

/// user-import - Batch importer for delimiter and fixed-width user files.
#[derive(Parser)]
#[command(name = "user-import")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Import a user file into the store.
    Import {
        /// File to import [default: export/<layout file name>].
        file: Option<PathBuf>,

        /// Layout: delimiter or fixed-width.
        #[arg(short, long)]
        layout: Option<String>,

        /// Field separator for the delimiter layout.
        #[arg(short, long)]
        delimiter: Option<String>,

        /// Path to the `SQLite` store.
        #[arg(long)]
        db: Option<PathBuf>,

        /// Records committed per transaction.
        #[arg(long)]
        batch_size: Option<usize>,

        /// Parse and validate without writing to the store.
        #[arg(long)]
        dry_run: bool,

        /// Print Prometheus metrics after the run.
        #[arg(long)]
        metrics: bool,
    },

    /// Parse and validate a single line, printing the result as JSON.
    Parse {
        /// The line to check.
        #[arg(allow_hyphen_values = true)]
        line: String,

        /// Layout: delimiter or fixed-width.
        #[arg(short, long)]
        layout: Option<String>,

        /// Field separator for the delimiter layout.
        #[arg(short, long)]
        delimiter: Option<String>,
    },

    /// Export every stored user in a layout.
    Export {
        /// Output file path [default: export/<layout file name>].
        output: Option<PathBuf>,

        /// Layout: delimiter or fixed-width.
        #[arg(short, long)]
        layout: Option<String>,

        /// Field separator for the delimiter layout.
        #[arg(short, long)]
        delimiter: Option<String>,

        /// Path to the `SQLite` store.
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Show configuration.
    Config {
        /// Show current configuration.
        #[arg(long)]
        show: bool,
    },
}

/// Main entry point.
fn main() -> ExitCode {
    let cli = Cli::parse();

    // A missing .env file is not an error
    let _ = dotenvy::dotenv();

    let mut config = match ImportConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };
    config.logging.verbose = cli.verbose;

    if let Err(e) = observability::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli.command, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
fn run_command(command: Commands, mut config: ImportConfig) -> Result<()> {
    match command {
        Commands::Import {
            file,
            layout,
            delimiter,
            db,
            batch_size,
            dry_run,
            metrics,
        } => {
            config = apply_layout_flags(config, layout.as_deref(), delimiter.as_deref())?;
            if let Some(db) = db {
                config = config.with_store_path(db);
            }
            if let Some(batch_size) = batch_size {
                config = config.with_batch_size(batch_size);
            }
            config.validate()?;
            let file = file.unwrap_or_else(|| config.default_data_file());
            cmd_import(&config, &file, dry_run, metrics)
        },

        Commands::Parse {
            line,
            layout,
            delimiter,
        } => {
            config = apply_layout_flags(config, layout.as_deref(), delimiter.as_deref())?;
            cmd_parse(&config, &line)
        },

        Commands::Export {
            output,
            layout,
            delimiter,
            db,
        } => {
            config = apply_layout_flags(config, layout.as_deref(), delimiter.as_deref())?;
            if let Some(db) = db {
                config = config.with_store_path(db);
            }
            let output = output.unwrap_or_else(|| config.default_data_file());
            cmd_export(&config, &output)
        },

        Commands::Config { show } => {
            cmd_config(&config, show);
            Ok(())
        },
    }
}
