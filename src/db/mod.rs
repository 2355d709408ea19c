//! Database module
//!
//! SQLite pool handle and schema migrations for the price store.

pub mod connection;
pub mod migrations;

pub use connection::{Database, DbError, DbResult};
