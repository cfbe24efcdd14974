//! Import and export command handlers.

use std::io::Write;
use std::path::Path;

use user_import::io::services::{ErrorHandler, ExportService, ImportProgress, ProgressCallback};
use user_import::io::validation::RecordValidator;
use user_import::io::{DiscardSink, FileLineReader, create_formatter};
use user_import::models::User;
use user_import::observability::install_recorder;
use user_import::storage::{SqliteUserSink, UserStore};
use user_import::{Error, ImportConfig, ImportContext, ImportSummary, Importer, Result};

/// Lines between progress updates.
const PROGRESS_EVERY: usize = 1000;

/// Executes the import command.
pub fn cmd_import(
    config: &ImportConfig,
    file: &Path,
    dry_run: bool,
    show_metrics: bool,
) -> Result<()> {
    let metrics = if show_metrics {
        Some(install_recorder()?)
    } else {
        None
    };

    let file_name = file.file_name().map_or_else(
        || file.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    );
    let handler = ErrorHandler::new(config.error_context(file_name));

    // Ctrl-C stops the run before the next line; nothing buffered is flushed
    let ctx = ImportContext::new();
    let signal_ctx = ctx.clone();
    ctrlc::set_handler(move || signal_ctx.cancel()).map_err(|e| Error::OperationFailed {
        operation: "install_signal_handler".to_string(),
        cause: e.to_string(),
    })?;

    let mut reader = FileLineReader::open(file)?;
    let formatter = create_formatter::<User>(config.layout);

    let (summary, stored) = if dry_run {
        let mut importer = Importer::new(
            formatter,
            RecordValidator::for_users(),
            DiscardSink::new(),
            handler,
        )
        .with_progress(progress_callback());
        (importer.import(&ctx, &mut reader)?, None)
    } else {
        let sink = SqliteUserSink::open(&config.store_path, config.batch_size)?;
        let mut importer =
            Importer::new(formatter, RecordValidator::for_users(), sink, handler)
                .with_progress(progress_callback());
        let summary = importer.import(&ctx, &mut reader)?;
        let stored = importer.sink().count()?;
        (summary, Some(stored))
    };

    // Clear progress line
    if summary.total_lines >= PROGRESS_EVERY {
        eprintln!();
    }

    print_summary(config, &summary, stored, dry_run);

    if let Some(handle) = metrics {
        println!();
        print!("{}", handle.render());
    }

    Ok(())
}

fn progress_callback() -> ProgressCallback {
    Box::new(|progress: &ImportProgress| {
        if progress.processed % PROGRESS_EVERY != 0 {
            return;
        }
        eprint!(
            "\rProcessing: {} - Imported: {}, Invalid: {}",
            progress.processed, progress.imported, progress.skipped_invalid,
        );
        let _ = std::io::stderr().flush();
    })
}

fn print_summary(
    config: &ImportConfig,
    summary: &ImportSummary,
    stored: Option<usize>,
    dry_run: bool,
) {
    if dry_run {
        println!("Dry run completed (no changes made):");
    } else {
        println!("Import completed:");
    }

    println!("  Layout:            {}", config.layout);
    println!("  Imported:          {}", summary.imported);
    println!("  Invalid (format):  {}", summary.format_errors);
    println!("  Invalid (rules):   {}", summary.validation_errors);
    println!("  Total processed:   {}", summary.total_lines);
    if let Some(stored) = stored {
        println!(
            "  Stored users:      {stored} ({})",
            config.store_path.display()
        );
    }

    if !summary.errors.is_empty() {
        println!();
        println!("Errors ({}):", summary.skipped());
        for error in summary.errors.iter().take(10) {
            println!("  - {error}");
        }
        if summary.skipped() > 10 {
            println!("  ... and {} more", summary.skipped() - 10);
        }
    }
}

/// Executes the export command.
pub fn cmd_export(config: &ImportConfig, output: &Path) -> Result<()> {
    if !config.store_path.exists() {
        return Err(Error::InvalidInput(format!(
            "Store not found: {}",
            config.store_path.display()
        )));
    }

    let store = SqliteUserSink::open(&config.store_path, config.batch_size)?;
    let users = store.list()?;
    let result = ExportService::new(config.layout).export_to_file(users, output)?;

    println!("Export completed:");
    println!("  Exported: {}", result.exported);
    println!("  Layout:   {}", result.layout);
    println!("  Output:   {}", output.display());

    Ok(())
}
