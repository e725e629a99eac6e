//! Revision runner.
//!
//! Executes outstanding revisions in ascending order inside one transaction,
//! recording each in the apply log.

use crate::apply_log::ApplyLog;
use crate::error::{MigrateError, MigrateResult};
use dbm_core::{Revision, RevisionId, RevisionStore};
use dbm_db::Database;

/// Applies revisions from a [`RevisionStore`] to a database.
pub struct Runner<'a> {
    db: &'a dyn Database,
    store: &'a RevisionStore,
}

impl<'a> Runner<'a> {
    pub fn new(db: &'a dyn Database, store: &'a RevisionStore) -> Self {
        Self { db, store }
    }

    /// Revisions above `watermark`, with bodies, ascending.
    pub fn outstanding(&self, watermark: u64) -> MigrateResult<Vec<Revision>> {
        Ok(self.store.load_from(watermark.saturating_add(1))?)
    }

    /// Apply `revisions` as one batch in a transaction of its own.
    ///
    /// Any failure rolls back the whole batch and removes the log row of the
    /// revision that was running.
    pub async fn apply(&self, revisions: &[Revision]) -> MigrateResult<Vec<RevisionId>> {
        let ledger = ApplyLog::new(self.db);
        let watermark = ledger.high_watermark().await?;
        check_order(revisions, watermark)?;

        self.db.begin().await?;
        let outcome = match self.apply_in_transaction(revisions).await {
            Ok(applied) => self.db.commit().await.map(|()| applied).map_err(Into::into),
            Err(e) => Err(e),
        };
        match outcome {
            Ok(applied) => Ok(applied),
            Err(e) => Err(roll_back(self.db, e).await),
        }
    }

    /// Apply `revisions` inside a transaction the caller has opened.
    pub(crate) async fn apply_in_transaction(
        &self,
        revisions: &[Revision],
    ) -> MigrateResult<Vec<RevisionId>> {
        let ledger = ApplyLog::new(self.db);
        let mut applied = Vec::with_capacity(revisions.len());
        for revision in revisions {
            log::info!("Applying revision {} ({})", revision.id, revision.display_name);
            ledger.begin(revision)
                .await
                .map_err(|source| MigrateError::ApplyLog {
                    action: "insert",
                    revision: revision.id,
                    source,
                })?;
            self.db
                .execute_batch(&revision.script)
                .await
                .map_err(|source| MigrateError::RevisionFailed {
                    revision: revision.id,
                    display_name: revision.display_name.clone(),
                    source,
                })?;
            ledger.complete(revision)
                .await
                .map_err(|source| MigrateError::ApplyLog {
                    action: "update",
                    revision: revision.id,
                    source,
                })?;
            applied.push(revision.id);
        }
        Ok(applied)
    }
}

/// Reject batches that are not strictly ascending above `watermark`.
pub(crate) fn check_order(revisions: &[Revision], watermark: u64) -> MigrateResult<()> {
    let mut after = watermark;
    for revision in revisions {
        if revision.id.get() <= after {
            return Err(MigrateError::OutOfOrder {
                revision: revision.id,
                after,
            });
        }
        after = revision.id.get();
    }
    Ok(())
}

/// Roll back the open transaction after `error`, then delete the in-flight
/// log row. Cleanup failures are logged; `error` is always returned.
pub(crate) async fn roll_back(db: &dyn Database, error: MigrateError) -> MigrateError {
    if let Err(e) = db.rollback().await {
        log::error!("Rollback failed: {e}");
    }
    if let Some(revision) = error.in_flight_revision() {
        if let Err(e) = ApplyLog::new(db).discard(revision).await {
            log::warn!("Could not remove log row for revision {revision}: {e}");
        }
    }
    error
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
