//! MySQL database backend implementation
//!
//! Every statement goes through the text protocol (`sqlx::raw_sql`) so that
//! revision scripts may contain several statements and procedure bodies with
//! `BEGIN ... END` blocks run exactly as written.

use crate::error::{DbError, DbResult};
use crate::traits::{DatabaseCatalog, DatabaseCore};
use async_trait::async_trait;
use dbm_core::sql_utils::{escape_sql_string, quote_mysql_ident};
use dbm_core::{ConnectionProfile, StaticKind, StaticName};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{ConnectOptions, Connection, Row};
use tokio::sync::Mutex;

/// Column of `SHOW CREATE PROCEDURE` / `SHOW CREATE TRIGGER` holding the
/// statement text.
const SHOW_CREATE_STATEMENT_COLUMN: usize = 2;

/// MySQL database backend over a single connection
pub struct MySqlBackend {
    conn: Mutex<Option<MySqlConnection>>,
    database: String,
}

impl MySqlBackend {
    /// Connect using the host, credentials and database of `profile`.
    pub async fn connect(profile: &ConnectionProfile) -> DbResult<Self> {
        let options = MySqlConnectOptions::new()
            .host(&profile.hostname)
            .port(profile.port)
            .username(&profile.username)
            .password(&profile.password)
            .database(&profile.database);
        let conn = options.connect().await.map_err(|e| {
            DbError::ConnectionError(format!(
                "{e} ({}@{}:{}/{})",
                profile.username, profile.hostname, profile.port, profile.database
            ))
        })?;
        log::debug!(
            "Connected to mysql://{}:{}/{}",
            profile.hostname,
            profile.port,
            profile.database
        );
        Ok(Self {
            conn: Mutex::new(Some(conn)),
            database: profile.database.clone(),
        })
    }

    async fn fetch_all(&self, sql: &str) -> DbResult<Vec<MySqlRow>> {
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or(DbError::ConnectionClosed)?;
        Ok(sqlx::Executor::fetch_all(conn, sqlx::raw_sql(sql)).await?)
    }

    async fn run(&self, sql: &str) -> DbResult<u64> {
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or(DbError::ConnectionClosed)?;
        let result = sqlx::Executor::execute(conn, sqlx::raw_sql(sql)).await?;
        Ok(result.rows_affected())
    }
}

/// Read a text column without type checking.
///
/// Catalog and `SHOW` output may come back with binary collations, which
/// sqlx refuses to decode as `String`; raw bytes always decode.
fn text_column(row: &MySqlRow, index: usize) -> DbResult<Option<String>> {
    let bytes: Option<Vec<u8>> = row.try_get_unchecked(index)?;
    Ok(bytes.map(|b| String::from_utf8_lossy(&b).into_owned()))
}

/// Remove the `DEFINER=user@host` clause from a `SHOW CREATE` statement so
/// the exported definition can be replayed by any account with CREATE
/// ROUTINE / TRIGGER privileges.
pub(crate) fn strip_definer(statement: &str) -> String {
    const CLAUSE: &str = " DEFINER=";
    let upper = statement.to_ascii_uppercase();
    let Some(start) = upper.find(CLAUSE) else {
        return statement.to_string();
    };

    // The clause ends at the first whitespace outside a quoted identifier.
    let mut quote: Option<char> = None;
    let mut end = statement.len();
    for (offset, c) in statement[start + CLAUSE.len()..].char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '`' || c == '\'' || c == '"' => quote = Some(c),
            None if c.is_whitespace() => {
                end = start + CLAUSE.len() + offset;
                break;
            }
            None => {}
        }
    }

    format!("{}{}", &statement[..start], &statement[end..])
}

#[async_trait]
impl DatabaseCore for MySqlBackend {
    async fn execute(&self, sql: &str) -> DbResult<usize> {
        Ok(self.run(sql).await? as usize)
    }

    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.run(sql).await?;
        Ok(())
    }

    async fn query_i64(&self, sql: &str) -> DbResult<Option<i64>> {
        let rows = self.fetch_all(sql).await?;
        match rows.first() {
            Some(row) => Ok(row.try_get_unchecked::<Option<i64>, _>(0)?),
            None => Ok(None),
        }
    }

    async fn query_i64s(&self, sql: &str) -> DbResult<Vec<i64>> {
        let rows = self.fetch_all(sql).await?;
        let mut values = Vec::with_capacity(rows.len());
        for row in &rows {
            if let Some(value) = row.try_get_unchecked::<Option<i64>, _>(0)? {
                values.push(value);
            }
        }
        Ok(values)
    }

    async fn query_strings(&self, sql: &str) -> DbResult<Vec<String>> {
        let rows = self.fetch_all(sql).await?;
        let mut values = Vec::with_capacity(rows.len());
        for row in &rows {
            if let Some(value) = text_column(row, 0)? {
                values.push(value);
            }
        }
        Ok(values)
    }

    async fn begin(&self) -> DbResult<()> {
        self.run("START TRANSACTION").await?;
        Ok(())
    }

    async fn commit(&self) -> DbResult<()> {
        self.run("COMMIT").await?;
        Ok(())
    }

    async fn rollback(&self) -> DbResult<()> {
        self.run("ROLLBACK").await?;
        Ok(())
    }

    fn db_type(&self) -> &'static str {
        "mysql"
    }

    fn current_schema(&self) -> &str {
        &self.database
    }

    async fn close(&self) -> DbResult<()> {
        let conn = self.conn.lock().await.take();
        if let Some(conn) = conn {
            conn.close().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl DatabaseCatalog for MySqlBackend {
    async fn list_statics(&self, kind: StaticKind, schema: &str) -> DbResult<Vec<StaticName>> {
        let schema = escape_sql_string(schema);
        let sql = match kind {
            StaticKind::Procedure => format!(
                "SELECT ROUTINE_NAME FROM information_schema.ROUTINES \
                 WHERE ROUTINE_SCHEMA = '{schema}' AND ROUTINE_TYPE = 'PROCEDURE' \
                 ORDER BY ROUTINE_NAME"
            ),
            StaticKind::Trigger => format!(
                "SELECT TRIGGER_NAME FROM information_schema.TRIGGERS \
                 WHERE TRIGGER_SCHEMA = '{schema}' ORDER BY TRIGGER_NAME"
            ),
        };
        let names = self.query_strings(&sql).await?;
        Ok(names.into_iter().filter_map(StaticName::try_new).collect())
    }

    async fn static_definition(&self, kind: StaticKind, name: &StaticName) -> DbResult<String> {
        let sql = format!("SHOW CREATE {} {}", kind.keyword(), quote_mysql_ident(name));
        let rows = self.fetch_all(&sql).await?;
        // The statement column is NULL when the account lacks privileges to
        // read the body.
        let statement = match rows.first() {
            Some(row) => text_column(row, SHOW_CREATE_STATEMENT_COLUMN)?,
            None => None,
        };
        statement
            .map(|s| strip_definer(&s))
            .ok_or_else(|| DbError::DefinitionNotFound {
                kind: kind.to_string(),
                name: name.to_string(),
            })
    }

    async fn drop_static(&self, kind: StaticKind, name: &StaticName) -> DbResult<()> {
        let sql = format!("DROP {} IF EXISTS {}", kind.keyword(), quote_mysql_ident(name));
        self.run(&sql).await?;
        Ok(())
    }

    async fn table_exists(&self, schema: &str, table: &str) -> DbResult<bool> {
        let sql = format!(
            "SELECT COUNT(*) FROM information_schema.TABLES \
             WHERE TABLE_SCHEMA = '{}' AND TABLE_NAME = '{}'",
            escape_sql_string(schema),
            escape_sql_string(table)
        );
        Ok(self.query_i64(&sql).await?.unwrap_or(0) > 0)
    }
}

#[cfg(test)]
#[path = "mysql_test.rs"]
mod tests;
