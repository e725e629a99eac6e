//! Drop-and-recreate reconciliation of procedures and triggers.
//!
//! The files under `statics/` are the source of truth. Every apply drops each
//! live object and recreates the declared ones; nothing is diffed.

use crate::catalog::LiveStatics;
use crate::error::{MigrateError, MigrateResult};
use dbm_core::{DeclaredStatics, StaticKind};
use dbm_db::Database;
use serde::Serialize;

/// Declared and live static objects, captured before any mutation.
#[derive(Debug, Clone)]
pub struct StaticSurvey {
    pub declared: DeclaredStatics,
    pub live: LiveStatics,
}

impl StaticSurvey {
    pub fn new(declared: DeclaredStatics, live: LiveStatics) -> Self {
        Self { declared, live }
    }

    /// True when reconciliation would drop live objects that have no
    /// declared replacement of their kind.
    ///
    /// Fires when either kind has no declared files (not only when both are
    /// missing) and the schema holds any live procedure or trigger.
    pub fn detect_mismatch(&self) -> bool {
        let declared_gap = self.declared.count(StaticKind::Procedure) == 0
            || self.declared.count(StaticKind::Trigger) == 0;
        declared_gap && !self.live.is_empty()
    }

    /// Confirmation question shown to the operator when the gate fires.
    pub fn mismatch_question(&self) -> String {
        format!(
            "{} procedure file(s) and {} trigger file(s) declared, but the database has \
             {} procedure(s) and {} trigger(s). Live objects without a file will be dropped. Continue?",
            self.declared.count(StaticKind::Procedure),
            self.declared.count(StaticKind::Trigger),
            self.live.count(StaticKind::Procedure),
            self.live.count(StaticKind::Trigger),
        )
    }
}

/// Objects removed by [`Reconciler::drop_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DropSummary {
    pub procedures_dropped: usize,
    pub triggers_dropped: usize,
}

/// Objects created by [`Reconciler::recreate_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CreateSummary {
    pub procedures_created: usize,
    pub triggers_created: usize,
}

/// Runs the static layer rebuild. Callers own the surrounding transaction.
pub struct Reconciler<'a> {
    db: &'a dyn Database,
}

impl<'a> Reconciler<'a> {
    pub fn new(db: &'a dyn Database) -> Self {
        Self { db }
    }

    /// Drop every live procedure, then every live trigger.
    pub async fn drop_all(&self, live: &LiveStatics) -> MigrateResult<DropSummary> {
        let mut summary = DropSummary::default();
        for kind in StaticKind::ALL {
            for name in live.names(kind) {
                log::debug!("Dropping {kind} {name}");
                self.db.drop_static(kind, name).await.map_err(|source| {
                    MigrateError::StaticDropFailed {
                        kind,
                        name: name.clone(),
                        source,
                    }
                })?;
                match kind {
                    StaticKind::Procedure => summary.procedures_dropped += 1,
                    StaticKind::Trigger => summary.triggers_dropped += 1,
                }
            }
        }
        Ok(summary)
    }

    /// Execute every declared script, procedures first.
    pub async fn recreate_all(&self, declared: &DeclaredStatics) -> MigrateResult<CreateSummary> {
        let mut summary = CreateSummary::default();
        for definition in declared.iter() {
            log::debug!("Creating {} {}", definition.kind, definition.name);
            self.db
                .execute_batch(&definition.script)
                .await
                .map_err(|source| MigrateError::StaticCreateFailed {
                    kind: definition.kind,
                    file_name: definition.file_name.clone(),
                    source,
                })?;
            match definition.kind {
                StaticKind::Procedure => summary.procedures_created += 1,
                StaticKind::Trigger => summary.triggers_created += 1,
            }
        }
        Ok(summary)
    }
}

#[cfg(test)]
#[path = "reconciler_test.rs"]
mod tests;
