//! DuckDB database backend implementation
//!
//! DuckDB has no stored procedures or triggers. Scalar macros stand in for
//! procedures (`CREATE MACRO` / `DROP MACRO`); the trigger catalog is always
//! empty.

use crate::error::{DbError, DbResult};
use crate::traits::{DatabaseCatalog, DatabaseCore};
use async_trait::async_trait;
use dbm_core::sql_utils::{escape_sql_string, quote_ident};
use dbm_core::{StaticKind, StaticName};
use duckdb::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Schema DuckDB objects are created in by default.
const DEFAULT_SCHEMA: &str = "main";

/// DuckDB database backend
pub struct DuckDbBackend {
    conn: Mutex<Option<Connection>>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self::from_connection(conn))
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Ok(Self::from_connection(conn))
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(Some(conn)),
        }
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Option<Connection>>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    /// Run `body` against the open connection.
    fn with_conn<T>(&self, body: impl FnOnce(&Connection) -> DbResult<T>) -> DbResult<T> {
        let guard = self.lock()?;
        let conn = guard.as_ref().ok_or(DbError::ConnectionClosed)?;
        body(conn)
    }

    /// Execute SQL synchronously
    fn execute_sync(&self, sql: &str) -> DbResult<usize> {
        self.with_conn(|conn| Ok(conn.execute(sql, [])?))
    }

    /// Execute batch SQL synchronously
    fn execute_batch_sync(&self, sql: &str) -> DbResult<()> {
        self.with_conn(|conn| Ok(conn.execute_batch(sql)?))
    }

    fn not_implemented(feature: &str) -> DbError {
        DbError::NotImplemented {
            backend: "duckdb".to_string(),
            feature: feature.to_string(),
        }
    }
}

#[async_trait]
impl DatabaseCore for DuckDbBackend {
    async fn execute(&self, sql: &str) -> DbResult<usize> {
        self.execute_sync(sql)
    }

    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.execute_batch_sync(sql)
    }

    async fn query_i64(&self, sql: &str) -> DbResult<Option<i64>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let mut rows = stmt.query([])?;
            let value = match rows.next()? {
                Some(row) => row.get::<_, Option<i64>>(0)?,
                None => None,
            };
            Ok(value)
        })
    }

    async fn query_i64s(&self, sql: &str) -> DbResult<Vec<i64>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let values = stmt
                .query_map([], |row| row.get::<_, Option<i64>>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(values.into_iter().flatten().collect())
        })
    }

    async fn query_strings(&self, sql: &str) -> DbResult<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let values = stmt
                .query_map([], |row| row.get::<_, Option<String>>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(values.into_iter().flatten().collect())
        })
    }

    async fn begin(&self) -> DbResult<()> {
        self.execute_batch_sync("BEGIN TRANSACTION")
    }

    async fn commit(&self) -> DbResult<()> {
        self.execute_batch_sync("COMMIT")
    }

    async fn rollback(&self) -> DbResult<()> {
        self.execute_batch_sync("ROLLBACK")
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }

    fn current_schema(&self) -> &str {
        DEFAULT_SCHEMA
    }

    async fn close(&self) -> DbResult<()> {
        let conn = self.lock()?.take();
        match conn {
            Some(conn) => conn.close().map_err(|(_, e)| DbError::from(e)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DatabaseCatalog for DuckDbBackend {
    async fn list_statics(&self, kind: StaticKind, schema: &str) -> DbResult<Vec<StaticName>> {
        match kind {
            StaticKind::Procedure => {
                let sql = format!(
                    "SELECT DISTINCT function_name FROM duckdb_functions() \
                     WHERE function_type = 'macro' AND NOT internal AND schema_name = '{}' \
                     ORDER BY function_name",
                    escape_sql_string(schema)
                );
                let names = self.query_strings(&sql).await?;
                Ok(names.into_iter().filter_map(StaticName::try_new).collect())
            }
            StaticKind::Trigger => Ok(Vec::new()),
        }
    }

    async fn static_definition(&self, kind: StaticKind, name: &StaticName) -> DbResult<String> {
        match kind {
            StaticKind::Procedure => {
                let sql = format!(
                    "SELECT 'CREATE MACRO ' || function_name || '(' || \
                     COALESCE(array_to_string(parameters, ', '), '') || ') AS ' || macro_definition \
                     FROM duckdb_functions() \
                     WHERE function_type = 'macro' AND NOT internal \
                     AND schema_name = '{}' AND function_name = '{}' LIMIT 1",
                    DEFAULT_SCHEMA,
                    escape_sql_string(name)
                );
                self.query_strings(&sql)
                    .await?
                    .into_iter()
                    .next()
                    .ok_or_else(|| DbError::DefinitionNotFound {
                        kind: kind.to_string(),
                        name: name.to_string(),
                    })
            }
            StaticKind::Trigger => Err(Self::not_implemented("triggers")),
        }
    }

    async fn drop_static(&self, kind: StaticKind, name: &StaticName) -> DbResult<()> {
        match kind {
            StaticKind::Procedure => {
                self.execute_batch_sync(&format!("DROP MACRO {}", quote_ident(name)))
            }
            StaticKind::Trigger => Err(Self::not_implemented("triggers")),
        }
    }

    async fn table_exists(&self, schema: &str, table: &str) -> DbResult<bool> {
        let sql = format!(
            "SELECT COUNT(*) FROM duckdb_tables() WHERE schema_name = '{}' AND table_name = '{}'",
            escape_sql_string(schema),
            escape_sql_string(table)
        );
        Ok(self.query_i64(&sql).await?.unwrap_or(0) > 0)
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
