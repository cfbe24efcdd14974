//! `SQLite` store for imported users.
//!
//! ## Module Structure
//!
//! - [`connection`]: opening and pragma configuration
//! - [`user_sink`]: the batched [`SqliteUserSink`]

mod connection;
mod user_sink;

pub use connection::{configure_connection, open_connection};
pub use user_sink::{DEFAULT_BATCH_SIZE, SqliteUserSink};
