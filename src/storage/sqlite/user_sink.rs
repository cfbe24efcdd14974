//! `SQLite`-backed user store.

use crate::io::sink::RecordSink;
use crate::models::{DATE_FORMAT, User};
use crate::storage::UserStore;
use crate::storage::sqlite::open_connection;
use crate::{Error, Result};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::instrument;

/// Default number of records committed per transaction.
pub const DEFAULT_BATCH_SIZE: usize = 500;

const INSERT_USER: &str = "INSERT OR REPLACE INTO users (id, username, email, phone, active, date_of_birth)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

const SELECT_USER: &str = "SELECT id, username, email, phone, active, date_of_birth FROM users";

/// User sink that persists records into a `SQLite` `users` table.
///
/// Records are buffered and committed in batches of `batch_size`, one
/// transaction per batch. [`RecordSink::flush`] commits whatever is still
/// buffered. Inserts replace an existing row with the same `id`.
///
/// Reads through [`UserStore`] only see committed rows.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id TEXT PRIMARY KEY,
///     username TEXT NOT NULL,
///     email TEXT NOT NULL,
///     phone TEXT NOT NULL,
///     active INTEGER NOT NULL,
///     date_of_birth TEXT
/// )
/// ```
pub struct SqliteUserSink {
    conn: Connection,
    db_path: Option<PathBuf>,
    batch_size: usize,
    pending: Vec<User>,
    committed: usize,
}

impl SqliteUserSink {
    /// Opens (or creates) a store at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if `batch_size` is zero or the database cannot be
    /// opened or initialized.
    pub fn open(path: impl Into<PathBuf>, batch_size: usize) -> Result<Self> {
        let db_path = path.into();
        let conn = open_connection(Some(db_path.as_path()))?;
        Self::with_connection(conn, Some(db_path), batch_size)
    }

    /// Creates an in-memory store (useful for testing and dry runs).
    ///
    /// # Errors
    ///
    /// Returns an error if `batch_size` is zero or the schema cannot be
    /// created.
    pub fn in_memory(batch_size: usize) -> Result<Self> {
        let conn = open_connection(None)?;
        Self::with_connection(conn, None, batch_size)
    }

    fn with_connection(conn: Connection, db_path: Option<PathBuf>, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(Error::InvalidInput(
                "batch size must be at least 1".to_string(),
            ));
        }

        let sink = Self {
            conn,
            db_path,
            batch_size,
            pending: Vec::with_capacity(batch_size.min(DEFAULT_BATCH_SIZE)),
            committed: 0,
        };
        sink.initialize()?;
        Ok(sink)
    }

    fn initialize(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS users (
                    id TEXT PRIMARY KEY,
                    username TEXT NOT NULL,
                    email TEXT NOT NULL,
                    phone TEXT NOT NULL,
                    active INTEGER NOT NULL,
                    date_of_birth TEXT
                );
                CREATE INDEX IF NOT EXISTS idx_users_username ON users(username);",
            )
            .map_err(|e| Error::OperationFailed {
                operation: "create_users_table".to_string(),
                cause: e.to_string(),
            })
    }

    /// Returns the database path (None for in-memory).
    #[must_use]
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Returns the configured batch size.
    #[must_use]
    pub const fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Returns the number of records buffered but not yet committed.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Returns the number of records committed by this sink.
    #[must_use]
    pub const fn committed(&self) -> usize {
        self.committed
    }

    /// Commits buffered records in a single transaction.
    ///
    /// On failure the transaction is rolled back and the buffer is kept.
    #[instrument(skip(self), fields(operation = "commit", backend = "sqlite", rows = self.pending.len()))]
    fn commit_pending(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let start = Instant::now();
        let result = Self::insert_all(&mut self.conn, &self.pending);
        let status = if result.is_ok() { "success" } else { "error" };
        metrics::counter!("store_commits_total", "backend" => "sqlite", "status" => status)
            .increment(1);
        metrics::histogram!("store_commit_duration_ms", "backend" => "sqlite")
            .record(start.elapsed().as_secs_f64() * 1000.0);
        result?;

        let rows = self.pending.len();
        self.committed += rows;
        self.pending.clear();
        tracing::debug!(rows, committed = self.committed, "Committed batch");
        Ok(())
    }

    fn insert_all(conn: &mut Connection, users: &[User]) -> Result<()> {
        let write_error = |e: rusqlite::Error| Error::Write {
            cause: e.to_string(),
        };

        let tx = conn.transaction().map_err(write_error)?;
        {
            let mut stmt = tx.prepare_cached(INSERT_USER).map_err(write_error)?;
            for user in users {
                stmt.execute(params![
                    user.id,
                    user.username,
                    user.email,
                    user.phone,
                    user.active,
                    user.date_of_birth.map(|d| d.format(DATE_FORMAT).to_string()),
                ])
                .map_err(|e| Error::Write {
                    cause: format!("insert user '{}': {e}", user.id),
                })?;
            }
        }
        tx.commit().map_err(write_error)
    }

    fn query_error(operation: &str) -> impl Fn(rusqlite::Error) -> Error + '_ {
        move |e| Error::OperationFailed {
            operation: operation.to_string(),
            cause: e.to_string(),
        }
    }
}

type UserRow = (String, String, String, String, bool, Option<String>);

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn user_from_row((id, username, email, phone, active, date_of_birth): UserRow) -> Result<User> {
    let date_of_birth = date_of_birth
        .filter(|d| !d.is_empty())
        .map(|d| {
            NaiveDate::parse_from_str(&d, DATE_FORMAT).map_err(|e| Error::OperationFailed {
                operation: "decode_user".to_string(),
                cause: format!("user '{id}' has invalid date_of_birth '{d}': {e}"),
            })
        })
        .transpose()?;

    Ok(User {
        id,
        username,
        email,
        phone,
        active,
        date_of_birth,
    })
}

impl RecordSink<User> for SqliteUserSink {
    fn write(&mut self, record: &User) -> Result<()> {
        self.pending.push(record.clone());
        if self.pending.len() >= self.batch_size {
            self.commit_pending()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.commit_pending()
    }
}

impl UserStore for SqliteUserSink {
    fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .map_err(Self::query_error("count_users"))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    fn get(&self, id: &str) -> Result<Option<User>> {
        let row = self
            .conn
            .query_row(&format!("{SELECT_USER} WHERE id = ?1"), params![id], read_row)
            .optional()
            .map_err(Self::query_error("get_user"))?;
        row.map(user_from_row).transpose()
    }

    fn list(&self) -> Result<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_USER} ORDER BY rowid"))
            .map_err(Self::query_error("list_users"))?;
        let rows = stmt
            .query_map([], read_row)
            .map_err(Self::query_error("list_users"))?;

        let mut users = Vec::new();
        for row in rows {
            users.push(user_from_row(row.map_err(Self::query_error("list_users"))?)?);
        }
        Ok(users)
    }
}
