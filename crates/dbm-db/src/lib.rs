//! dbm-db - Database abstraction layer for dbmarshal
//!
//! This crate provides the `Database` trait used by the migration engine and
//! its implementations for MySQL (the production target) and DuckDB (local
//! files and tests).

pub mod duckdb;
pub mod error;
pub mod mysql;
pub mod traits;

pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use mysql::MySqlBackend;
pub use traits::{Database, DatabaseCatalog, DatabaseCore};
