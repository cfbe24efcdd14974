//! Data models for user-import.
//!
//! This module contains the record types that flow through the import
//! pipeline.

mod line;
mod user;

pub use line::RawLine;
pub use user::{DATE_FORMAT, User};
