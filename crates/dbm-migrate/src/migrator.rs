//! The `status`, `apply` and `export_statics` commands.

use crate::apply_log::{ApplyLog, LOG_TABLE};
use crate::catalog::LiveStatics;
use crate::confirm::Confirm;
use crate::error::{MigrateError, MigrateResult};
use crate::reconciler::{CreateSummary, DropSummary, Reconciler, StaticSurvey};
use crate::report::{AppliedRevision, ApplyReport, ExportReport, ExportedStatic, StatusReport};
use crate::runner::{check_order, roll_back, Runner};
use dbm_core::{MigrationsRoot, Revision, StaticKind};
use dbm_db::Database;

/// Runs commands for one migrations root against one open connection.
pub struct Migrator<'a> {
    db: &'a dyn Database,
    root: MigrationsRoot,
}

impl<'a> Migrator<'a> {
    pub fn new(db: &'a dyn Database, root: MigrationsRoot) -> Self {
        Self { db, root }
    }

    pub fn root(&self) -> &MigrationsRoot {
        &self.root
    }

    /// Report the ledger, pending revisions and static object counts.
    ///
    /// Makes no changes; a missing log table reads as an empty ledger.
    pub async fn status(&self) -> MigrateResult<StatusReport> {
        let revision_store = self.root.revision_store();
        let revisions = revision_store.list_available()?;
        let highest_available = revision_store.highest_available()?;
        let declared = self.root.static_store().list_declared()?;

        let state = ApplyLog::new(self.db).read_state().await?;
        if !state.exists {
            log::debug!("No {LOG_TABLE} table yet; nothing has been applied");
        }

        let live = LiveStatics::list(self.db, self.db.current_schema()).await?;
        let survey = StaticSurvey::new(declared, live);
        let mismatch = survey.detect_mismatch();
        if mismatch {
            log::warn!("{}", survey.mismatch_question());
        }

        Ok(StatusReport {
            watermark: state.watermark,
            completed_watermark: state.completed_watermark,
            applied_count: state.completed_count,
            interrupted: state.interrupted,
            highest_available,
            outstanding: revisions
                .iter()
                .map(|r| r.id)
                .filter(|id| id.get() > state.watermark)
                .collect(),
            declared_procedures: survey.declared.count(StaticKind::Procedure),
            declared_triggers: survey.declared.count(StaticKind::Trigger),
            live: survey.live,
            mismatch,
        })
    }

    /// Rebuild the static layer and apply outstanding revisions.
    ///
    /// Files are validated before the database is touched. Dropping live
    /// statics, recreating declared ones and every revision share a single
    /// transaction; on failure it is rolled back and the in-flight log row
    /// is removed.
    pub async fn apply(&self, confirm: &mut dyn Confirm) -> MigrateResult<ApplyReport> {
        let revision_store = self.root.revision_store();
        revision_store.list_available()?;
        let declared = self.root.static_store().list_declared()?;

        let ledger = ApplyLog::new(self.db);
        let state = ledger.read_state().await?;
        let previous_watermark = state.watermark;
        if !state.interrupted.is_empty() {
            log::warn!(
                "Log rows {:?} never completed; revisions at or below {previous_watermark} are treated as applied",
                state.interrupted
            );
        }

        let live = LiveStatics::list(self.db, self.db.current_schema()).await?;
        let survey = StaticSurvey::new(declared, live);
        if survey.detect_mismatch() {
            let question = survey.mismatch_question();
            log::warn!("{question}");
            if !confirm.confirm(&question) {
                log::info!("Apply aborted; nothing was changed");
                return Err(MigrateError::SafetyGateDeclined);
            }
        }

        let runner = Runner::new(self.db, &revision_store);
        let revisions = runner.outstanding(previous_watermark)?;
        check_order(&revisions, previous_watermark)?;

        if !state.exists {
            ledger.ensure_table().await?;
        }
        self.db.begin().await?;
        let outcome = self.reconcile_and_run(&survey, &runner, &revisions).await;
        let (dropped, created) = match outcome {
            Ok(summaries) => summaries,
            Err(e) => return Err(roll_back(self.db, e).await),
        };

        let applied: Vec<AppliedRevision> = revisions
            .iter()
            .map(|r| AppliedRevision {
                id: r.id,
                display_name: r.display_name.clone(),
            })
            .collect();
        let watermark = applied
            .last()
            .map(|r| r.id.get())
            .unwrap_or(previous_watermark);
        log::info!(
            "Dropped {} procedure(s) and {} trigger(s), created {} procedure(s) and {} trigger(s), applied {} revision(s)",
            dropped.procedures_dropped,
            dropped.triggers_dropped,
            created.procedures_created,
            created.triggers_created,
            applied.len()
        );

        Ok(ApplyReport {
            previous_watermark,
            watermark,
            dropped,
            created,
            applied,
        })
    }

    async fn reconcile_and_run(
        &self,
        survey: &StaticSurvey,
        runner: &Runner<'_>,
        revisions: &[Revision],
    ) -> MigrateResult<(DropSummary, CreateSummary)> {
        let reconciler = Reconciler::new(self.db);
        let dropped = reconciler.drop_all(&survey.live).await?;
        let created = reconciler.recreate_all(&survey.declared).await?;
        runner.apply_in_transaction(revisions).await?;
        self.db.commit().await?;
        Ok((dropped, created))
    }

    /// Write the definition of every live procedure and trigger into the
    /// statics directory, replacing files of the same name.
    pub async fn export_statics(&self) -> MigrateResult<ExportReport> {
        let store = self.root.static_store();
        let live = LiveStatics::list(self.db, self.db.current_schema()).await?;

        let mut report = ExportReport::default();
        for kind in StaticKind::ALL {
            for name in live.names(kind) {
                let definition = self.db.static_definition(kind, name).await?;
                let path = store.write_definition(kind, name, &definition)?;
                log::debug!("Exported {kind} {name} to {}", path.display());
                report.written.push(ExportedStatic {
                    kind,
                    name: name.clone(),
                    path,
                });
            }
        }
        log::info!(
            "Exported {} procedure(s) and {} trigger(s) to {}",
            report.count(StaticKind::Procedure),
            report.count(StaticKind::Trigger),
            store.dir().display()
        );
        Ok(report)
    }
}

#[cfg(test)]
#[path = "migrator_test.rs"]
mod tests;
