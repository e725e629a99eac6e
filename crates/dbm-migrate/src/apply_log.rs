//! The `dbmarshal_log` ledger.
//!
//! One row per attempted revision. A row whose `completed` column is NULL was
//! interrupted after the insert and before the script finished.

use dbm_core::sql_utils::escape_sql_string;
use dbm_core::{Revision, RevisionId};
use dbm_db::{Database, DbResult};

/// Name of the ledger table in the target database.
pub const LOG_TABLE: &str = "dbmarshal_log";

const MYSQL_LOG_TABLE_DDL: &str = "CREATE TABLE IF NOT EXISTS `dbmarshal_log` (
    `change_number` BIGINT NOT NULL,
    `started` TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    `completed` TIMESTAMP NULL DEFAULT NULL,
    `description` VARCHAR(500) NOT NULL,
    PRIMARY KEY (`change_number`)
) ENGINE=InnoDB";

const PORTABLE_LOG_TABLE_DDL: &str = "CREATE TABLE IF NOT EXISTS dbmarshal_log (
    change_number BIGINT NOT NULL PRIMARY KEY,
    started TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    completed TIMESTAMP,
    description VARCHAR(500) NOT NULL
)";

/// The ledger as read by `status` and before the `apply` safety gate.
///
/// A missing table reads as an empty ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerState {
    pub exists: bool,
    pub watermark: u64,
    pub completed_watermark: u64,
    pub completed_count: u64,
    pub interrupted: Vec<u64>,
}

/// Ledger operations against a connected database.
pub struct ApplyLog<'a> {
    db: &'a dyn Database,
}

impl<'a> ApplyLog<'a> {
    pub fn new(db: &'a dyn Database) -> Self {
        Self { db }
    }

    /// Create the ledger table if it does not exist yet.
    pub async fn ensure_table(&self) -> DbResult<()> {
        let ddl = match self.db.db_type() {
            "mysql" => MYSQL_LOG_TABLE_DDL,
            _ => PORTABLE_LOG_TABLE_DDL,
        };
        self.db.execute_batch(ddl).await
    }

    /// Whether the ledger table exists in the connection's schema.
    pub async fn exists(&self) -> DbResult<bool> {
        self.db.table_exists(self.db.current_schema(), LOG_TABLE).await
    }

    /// Read the ledger without creating it.
    pub async fn read_state(&self) -> DbResult<LedgerState> {
        if !self.exists().await? {
            return Ok(LedgerState::default());
        }
        Ok(LedgerState {
            exists: true,
            watermark: self.high_watermark().await?,
            completed_watermark: self.completed_watermark().await?,
            completed_count: self.completed_count().await?,
            interrupted: self.interrupted().await?,
        })
    }

    /// Highest change number in the ledger, completed or not; 0 when empty.
    pub async fn high_watermark(&self) -> DbResult<u64> {
        self.max_change_number(&format!(
            "SELECT COALESCE(MAX(change_number), 0) FROM {LOG_TABLE}"
        ))
        .await
    }

    /// Highest change number whose script completed; 0 when none has.
    pub async fn completed_watermark(&self) -> DbResult<u64> {
        self.max_change_number(&format!(
            "SELECT COALESCE(MAX(change_number), 0) FROM {LOG_TABLE} WHERE completed IS NOT NULL"
        ))
        .await
    }

    /// Change numbers of rows left behind by an interrupted run, ascending.
    pub async fn interrupted(&self) -> DbResult<Vec<u64>> {
        let values = self
            .db
            .query_i64s(&format!(
                "SELECT change_number FROM {LOG_TABLE} WHERE completed IS NULL ORDER BY change_number"
            ))
            .await?;
        Ok(values.into_iter().map(to_change_number).collect())
    }

    /// Number of completed rows.
    pub async fn completed_count(&self) -> DbResult<u64> {
        let count = self
            .db
            .query_i64(&format!(
                "SELECT COUNT(*) FROM {LOG_TABLE} WHERE completed IS NOT NULL"
            ))
            .await?;
        Ok(count.map(to_change_number).unwrap_or(0))
    }

    /// Insert the in-flight row for `revision`.
    pub async fn begin(&self, revision: &Revision) -> DbResult<()> {
        let sql = format!(
            "INSERT INTO {LOG_TABLE} (change_number, started, completed, description) \
             VALUES ({}, CURRENT_TIMESTAMP, NULL, '{}')",
            revision.id,
            escape_sql_string(&revision.display_name)
        );
        self.db.execute(&sql).await?;
        Ok(())
    }

    /// Stamp the row for `revision` as completed.
    pub async fn complete(&self, revision: &Revision) -> DbResult<()> {
        let sql = format!(
            "UPDATE {LOG_TABLE} SET completed = CURRENT_TIMESTAMP WHERE change_number = {}",
            revision.id
        );
        self.db.execute(&sql).await?;
        Ok(())
    }

    /// Delete the row for `id`, if any.
    pub async fn discard(&self, id: RevisionId) -> DbResult<()> {
        let sql = format!("DELETE FROM {LOG_TABLE} WHERE change_number = {id}");
        self.db.execute(&sql).await?;
        Ok(())
    }

    async fn max_change_number(&self, sql: &str) -> DbResult<u64> {
        let value = self.db.query_i64(sql).await?;
        Ok(value.map(to_change_number).unwrap_or(0))
    }
}

/// Negative values cannot be written by this tool; treat them as 0.
fn to_change_number(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

#[cfg(test)]
#[path = "apply_log_test.rs"]
mod tests;
