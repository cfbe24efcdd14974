//! Connection setup for the `SQLite` store.

use crate::{Error, Result};
use rusqlite::Connection;
use std::path::Path;

/// Opens a `SQLite` database, or an in-memory one when `path` is `None`.
///
/// Parent directories of a file database are created as needed. The returned
/// connection is already passed through [`configure_connection`].
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if the directory or database cannot be
/// created.
pub fn open_connection(path: Option<&Path>) -> Result<Connection> {
    let conn = match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| Error::OperationFailed {
                    operation: "create_store_dir".to_string(),
                    cause: format!("{}: {e}", parent.display()),
                })?;
            }
            Connection::open(path).map_err(|e| Error::OperationFailed {
                operation: "open_sqlite".to_string(),
                cause: format!("{}: {e}", path.display()),
            })?
        },
        None => Connection::open_in_memory().map_err(|e| Error::OperationFailed {
            operation: "open_sqlite_in_memory".to_string(),
            cause: e.to_string(),
        })?,
    };

    configure_connection(&conn)?;
    Ok(conn)
}

/// Configures a `SQLite` connection for bulk loading.
///
/// # Configuration Applied
///
/// - **WAL mode**: readers of the store are not blocked by an import in progress
/// - **NORMAL synchronous**: one fsync per committed batch rather than per row
/// - **`busy_timeout`**: waits up to 5 seconds for a competing writer
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if the busy timeout cannot be set.
pub fn configure_connection(conn: &Connection) -> Result<()> {
    // journal_mode answers with a row ("wal", or "memory" for in-memory
    // databases), so its result is ignored rather than checked.
    let _ = conn.pragma_update(None, "journal_mode", "WAL");
    let _ = conn.pragma_update(None, "synchronous", "NORMAL");
    conn.pragma_update(None, "busy_timeout", 5000)
        .map_err(|e| Error::OperationFailed {
            operation: "configure_sqlite".to_string(),
            cause: e.to_string(),
        })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let conn = open_connection(None).unwrap();
        let timeout: i64 = conn
            .query_row("PRAGMA busy_timeout", [], |row| row.get(0))
            .unwrap();
        assert_eq!(timeout, 5000);
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("users.db");
        let conn = open_connection(Some(path.as_path())).unwrap();
        drop(conn);
        assert!(path.exists());
    }

    #[test]
    fn test_open_file_uses_wal() {
        let dir = tempfile::tempdir().unwrap();
        let conn = open_connection(Some(dir.path().join("users.db").as_path())).unwrap();
        let mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }
}
