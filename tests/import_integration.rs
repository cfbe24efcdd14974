//! Integration tests for importing files into the `SQLite` store.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tempfile::TempDir;
use user_import::io::services::{ErrorContext, ErrorHandler, ExportService};
use user_import::io::validation::RecordValidator;
use user_import::io::{
    FileLineReader, ImportProgress, Layout, MemorySink, RecordSink, create_formatter,
};
use user_import::models::User;
use user_import::storage::{SqliteUserSink, UserStore};
use user_import::{Error, ImportContext, ImportSummary, Importer, Result};

const DELIMITED_SAMPLE: &str = "10,abraham59E,rory30@example.com,975-283-2267,TRUE,2019-02-20";
const FIXED_SAMPLE: &str = "00000000001 abraham59             rory30@example.com        975-283-2267 true2019-02-20";

fn write_file(dir: &TempDir, name: &str, lines: &[&str]) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    path
}

fn handler(file: &Path) -> ErrorHandler {
    ErrorHandler::new(
        ErrorContext::new("import users", "test")
            .with_file_name(file.file_name().unwrap().to_string_lossy()),
    )
}

fn import_into<S: RecordSink<User>>(
    layout: Layout,
    file: &Path,
    sink: S,
    ctx: &ImportContext,
) -> (Result<ImportSummary>, S) {
    let mut importer = Importer::new(
        create_formatter::<User>(layout),
        RecordValidator::for_users(),
        sink,
        handler(file),
    );
    let mut reader = FileLineReader::open(file).unwrap();
    let result = importer.import(ctx, &mut reader);
    (result, importer.into_sink())
}

/// Sink that fails on the nth write and records what it accepted.
#[derive(Default)]
struct FailingSink {
    fail_on: usize,
    written: Vec<String>,
    flushed: bool,
}

impl RecordSink<User> for FailingSink {
    fn write(&mut self, record: &User) -> Result<()> {
        if self.written.len() + 1 == self.fail_on {
            return Err(Error::Write {
                cause: "disk full".to_string(),
            });
        }
        self.written.push(record.id.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.flushed = true;
        Ok(())
    }
}

#[test]
fn test_delimited_sample_into_sqlite() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "delimiter.csv", &[DELIMITED_SAMPLE]);
    let sink = SqliteUserSink::open(dir.path().join("users.db"), 500).unwrap();

    let (result, sink) = import_into(Layout::delimiter(), &file, sink, &ImportContext::new());
    let summary = result.unwrap();

    assert_eq!(summary.total_lines, 1);
    assert_eq!(summary.imported, 1);
    assert_eq!(sink.count().unwrap(), 1);

    let user = sink.get("10").unwrap().unwrap();
    assert_eq!(user.username, "abraham59E");
    assert!(user.active);
    assert_eq!(user.date_of_birth, NaiveDate::from_ymd_opt(2019, 2, 20));
}

#[test]
fn test_fixed_width_sample_into_sqlite() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "fixedlength.csv", &[FIXED_SAMPLE]);
    let sink = SqliteUserSink::in_memory(500).unwrap();

    let (result, sink) = import_into(Layout::FixedWidth, &file, sink, &ImportContext::new());
    assert_eq!(result.unwrap().imported, 1);

    let user = sink.get("00000000001").unwrap().unwrap();
    assert_eq!(user.username, "abraham59");
    assert_eq!(user.email, "rory30@example.com");
    assert_eq!(user.phone, "975-283-2267");
    assert!(user.active);
}

#[test]
fn test_bad_lines_are_skipped() {
    let dir = TempDir::new().unwrap();
    let file = write_file(
        &dir,
        "delimiter.csv",
        &[
            DELIMITED_SAMPLE,
            "11,too,few",
            "12,bob,bob@example.com,975-283-2268,maybe,2019-02-20",
            "",
            "13,carol,not-an-email,975-283-2269,FALSE,2001-01-01",
            "14,dave,dave@example.com,975-283-2270,FALSE,1999-12-31",
        ],
    );
    let sink = SqliteUserSink::in_memory(2).unwrap();

    let (result, sink) = import_into(Layout::delimiter(), &file, sink, &ImportContext::new());
    let summary = result.unwrap();

    // The blank line is not counted
    assert_eq!(summary.total_lines, 5);
    assert_eq!(summary.imported, 2);
    assert_eq!(summary.format_errors, 2);
    assert_eq!(summary.validation_errors, 1);
    assert_eq!(summary.errors.len(), 3);
    assert!(summary.errors[0].starts_with("Line 2:"));
    assert!(summary.errors[2].starts_with("Line 5:"));

    let ids: Vec<_> = sink.list().unwrap().into_iter().map(|u| u.id).collect();
    assert_eq!(ids, vec!["10", "14"]);
}

#[test]
fn test_write_failure_aborts_without_flush() {
    let dir = TempDir::new().unwrap();
    let lines: Vec<String> = (1..=5)
        .map(|i| format!("{i},user{i},user{i}@example.com,975-283-226{i},TRUE,2019-02-20"))
        .collect();
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let file = write_file(&dir, "delimiter.csv", &refs);

    let sink = FailingSink {
        fail_on: 3,
        ..FailingSink::default()
    };
    let (result, sink) = import_into(Layout::delimiter(), &file, sink, &ImportContext::new());

    assert!(matches!(result, Err(Error::Write { .. })));
    assert_eq!(sink.written, vec!["1", "2"]);
    assert!(!sink.flushed);
}

#[test]
fn test_empty_file() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "empty.csv", &[]);

    let (result, sink) = import_into(
        Layout::delimiter(),
        &file,
        MemorySink::<User>::new(),
        &ImportContext::new(),
    );
    let summary = result.unwrap();

    assert_eq!((summary.total_lines, summary.imported), (0, 0));
    assert_eq!(sink.flush_count(), 1);
}

#[test]
fn test_carriage_return_separated_file_is_not_silently_truncated() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("delimiter.csv");
    std::fs::write(
        &file,
        "1,ann,ann@example.com,975-283-2267,TRUE,1990-05-06\r\
         2,bob,bob@example.com,975-283-2268,FALSE,1991-06-07\r\
         3,cat,cat@example.com,975-283-2269,TRUE,1992-07-08\r",
    )
    .unwrap();

    let (result, sink) = import_into(
        Layout::delimiter(),
        &file,
        MemorySink::<User>::new(),
        &ImportContext::new(),
    );
    let summary = result.unwrap();

    // One physical line holding three records is rejected, not read as one.
    assert_eq!(summary.total_lines, 1);
    assert_eq!(summary.imported, 0);
    assert_eq!(summary.format_errors, 1);
    assert!(summary.errors[0].contains("unexpected content after record"));
    assert!(sink.records().is_empty());
}

#[test]
fn test_byte_order_mark_is_stripped() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("delimiter.csv");
    std::fs::write(&file, format!("\u{feff}{DELIMITED_SAMPLE}\n")).unwrap();

    let (result, sink) = import_into(
        Layout::delimiter(),
        &file,
        MemorySink::<User>::new(),
        &ImportContext::new(),
    );

    assert_eq!(result.unwrap().imported, 1);
    assert_eq!(sink.records()[0].id, "10");
}

#[test]
fn test_missing_file_is_read_error() {
    let err = FileLineReader::open("/nonexistent/delimiter.csv")
        .err()
        .unwrap();
    assert!(matches!(err, Error::Read { line: 0, .. }));
}

#[test]
fn test_cancelled_before_start() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "delimiter.csv", &[DELIMITED_SAMPLE]);
    let ctx = ImportContext::new();
    ctx.cancel();

    let (result, sink) = import_into(Layout::delimiter(), &file, MemorySink::<User>::new(), &ctx);

    assert!(matches!(result, Err(Error::Cancelled)));
    assert!(sink.records().is_empty());
    assert_eq!(sink.flush_count(), 0);
}

#[test]
fn test_cancelled_mid_run() {
    let dir = TempDir::new().unwrap();
    let lines: Vec<String> = (1..=5)
        .map(|i| format!("{i},user{i},,975-283-226{i},TRUE,2019-02-20"))
        .collect();
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let file = write_file(&dir, "delimiter.csv", &refs);

    let ctx = ImportContext::new();
    let signal = ctx.clone();
    let mut importer = Importer::new(
        create_formatter::<User>(Layout::delimiter()),
        RecordValidator::for_users(),
        MemorySink::new(),
        handler(&file),
    )
    .with_progress(Box::new(move |progress: &ImportProgress| {
        if progress.processed == 2 {
            signal.cancel();
        }
    }));

    let mut reader = FileLineReader::open(&file).unwrap();
    let result = importer.import(&ctx, &mut reader);

    assert!(matches!(result, Err(Error::Cancelled)));
    assert_eq!(importer.sink().records().len(), 2);
    assert_eq!(importer.sink().flush_count(), 0);
}

#[test]
fn test_unflushed_batch_is_not_committed() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("users.db");
    let lines: Vec<String> = (1..=3)
        .map(|i| format!("{i},user{i},,975-283-226{i},TRUE,2019-02-20"))
        .collect();
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let file = write_file(&dir, "delimiter.csv", &refs);

    let ctx = ImportContext::new();
    let signal = ctx.clone();
    let mut importer = Importer::new(
        create_formatter::<User>(Layout::delimiter()),
        RecordValidator::for_users(),
        SqliteUserSink::open(&db, 2).unwrap(),
        handler(&file),
    )
    .with_progress(Box::new(move |progress: &ImportProgress| {
        if progress.processed == 3 {
            signal.cancel();
        }
    }));
    let mut reader = FileLineReader::open(&file).unwrap();
    assert!(matches!(importer.import(&ctx, &mut reader), Err(Error::Cancelled)));
    drop(importer);

    // Only the first full batch reached the database
    let store = SqliteUserSink::open(&db, 2).unwrap();
    assert_eq!(store.count().unwrap(), 2);
}

#[test]
fn test_export_then_reimport() {
    let dir = TempDir::new().unwrap();
    let file = write_file(
        &dir,
        "delimiter.csv",
        &[
            DELIMITED_SAMPLE,
            "11,bob,,975-283-2268,FALSE,1980-07-04",
        ],
    );
    let (result, store) = import_into(
        Layout::delimiter(),
        &file,
        SqliteUserSink::in_memory(500).unwrap(),
        &ImportContext::new(),
    );
    assert_eq!(result.unwrap().imported, 2);

    let exported = dir.path().join("out").join("fixedlength.csv");
    let users = store.list().unwrap();
    let export = ExportService::new(Layout::FixedWidth)
        .export_to_file(users.clone(), &exported)
        .unwrap();
    assert_eq!(export.exported, 2);

    let (result, sink) = import_into(
        Layout::FixedWidth,
        &exported,
        MemorySink::<User>::new(),
        &ImportContext::new(),
    );
    assert_eq!(result.unwrap().imported, 2);
    assert_eq!(sink.into_records(), users);
}
