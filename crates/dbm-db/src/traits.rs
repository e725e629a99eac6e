//! Database trait definitions

use crate::error::DbResult;
use async_trait::async_trait;
use dbm_core::{StaticKind, StaticName};

/// Statement execution and transaction control.
///
/// Implementations must be Send + Sync for async operation. A backend wraps
/// exactly one connection; statements are issued strictly one after another.
#[async_trait]
pub trait DatabaseCore: Send + Sync {
    /// Execute a single statement, returns affected rows
    async fn execute(&self, sql: &str) -> DbResult<usize>;

    /// Execute a script that may contain several statements
    async fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// First column of the first row as an integer (`None` for no row or NULL)
    async fn query_i64(&self, sql: &str) -> DbResult<Option<i64>>;

    /// First column of every row as integers, NULLs skipped
    async fn query_i64s(&self, sql: &str) -> DbResult<Vec<i64>>;

    /// First column of every row as text, NULLs skipped
    async fn query_strings(&self, sql: &str) -> DbResult<Vec<String>>;

    /// Start a transaction
    async fn begin(&self) -> DbResult<()>;

    /// Commit the open transaction
    async fn commit(&self) -> DbResult<()>;

    /// Roll back the open transaction
    async fn rollback(&self) -> DbResult<()>;

    /// Database type identifier for logging and dialect choices
    fn db_type(&self) -> &'static str;

    /// Schema that owns the managed procedures and triggers
    fn current_schema(&self) -> &str;

    /// Close the connection; later calls fail with `ConnectionClosed`
    async fn close(&self) -> DbResult<()>;
}

/// Introspection and removal of stored procedures and triggers.
#[async_trait]
pub trait DatabaseCatalog: Send + Sync {
    /// Names of the live objects of `kind` owned by `schema`, sorted
    async fn list_statics(&self, kind: StaticKind, schema: &str) -> DbResult<Vec<StaticName>>;

    /// `CREATE` statement that recreates the live object
    async fn static_definition(&self, kind: StaticKind, name: &StaticName) -> DbResult<String>;

    /// Drop the live object
    async fn drop_static(&self, kind: StaticKind, name: &StaticName) -> DbResult<()>;

    /// Whether a table named `table` exists in `schema`
    async fn table_exists(&self, schema: &str, table: &str) -> DbResult<bool>;
}

/// Full database abstraction used by the migration engine.
pub trait Database: DatabaseCore + DatabaseCatalog {}

impl<T: DatabaseCore + DatabaseCatalog + ?Sized> Database for T {}
