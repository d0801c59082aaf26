//! Database module
//!
//! SQLite connection pooling and schema migrations for the local
//! conversion-history store.

pub mod connection;
pub mod migrations;

pub use connection::{Database, DbError, DbResult};
