//! Destination store for imported records.
//!
//! Writing goes through [`RecordSink`](crate::io::sink::RecordSink); reading
//! back (for export and verification) goes through [`UserStore`].

// Dropping the connection a few statements early buys nothing here.
#![allow(clippy::significant_drop_tightening)]

pub mod sqlite;

pub use sqlite::{DEFAULT_BATCH_SIZE, SqliteUserSink};

use crate::Result;
use crate::models::User;

/// Read access to stored users.
pub trait UserStore {
    /// Returns the number of stored users.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    fn count(&self) -> Result<usize>;

    /// Looks up a user by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried or the row is corrupt.
    fn get(&self, id: &str) -> Result<Option<User>>;

    /// Returns every stored user in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried or a row is corrupt.
    fn list(&self) -> Result<Vec<User>>;
}
