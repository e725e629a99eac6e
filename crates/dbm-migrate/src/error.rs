//! Error types for the migration engine.

use dbm_core::{CoreError, RevisionId, StaticKind, StaticName};
use dbm_db::DbError;
use thiserror::Error;

/// Broad error category, used by callers to pick an exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed files or profile; raised before any database mutation
    Configuration,
    /// Connection or SQL failure; the current transaction was rolled back
    Database,
    /// Operator declined the destructive static reconciliation
    SafetyGateDeclined,
}

/// Migration engine errors.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Filesystem or profile problem (M001).
    #[error("[M001] Configuration error: {0}")]
    Config(#[from] CoreError),

    /// Database error outside a specific script (M002).
    #[error("[M002] Database error: {0}")]
    Database(#[from] DbError),

    /// Apply log bookkeeping failed (M003).
    #[error("[M003] Apply log {action} failed for revision {revision}: {source}")]
    ApplyLog {
        action: &'static str,
        revision: RevisionId,
        #[source]
        source: DbError,
    },

    /// A revision script failed (M004).
    #[error("[M004] Revision {revision} ({display_name}) failed: {source}")]
    RevisionFailed {
        revision: RevisionId,
        display_name: String,
        #[source]
        source: DbError,
    },

    /// Dropping a live static object failed (M005).
    #[error("[M005] Failed to drop {kind} '{name}': {source}")]
    StaticDropFailed {
        kind: StaticKind,
        name: StaticName,
        #[source]
        source: DbError,
    },

    /// Creating a declared static object failed (M006).
    #[error("[M006] Failed to create {kind} from '{file_name}': {source}")]
    StaticCreateFailed {
        kind: StaticKind,
        file_name: String,
        #[source]
        source: DbError,
    },

    /// Operator declined the mismatch confirmation (M007).
    #[error("[M007] Aborted: live static objects would be dropped without replacement and the operator declined")]
    SafetyGateDeclined,

    /// A revision at or below the watermark, or out of ascending order (M008).
    #[error("[M008] Revision {revision} cannot run after {after}")]
    OutOfOrder { revision: RevisionId, after: u64 },
}

/// Result type alias for [`MigrateError`].
pub type MigrateResult<T> = Result<T, MigrateError>;

impl MigrateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MigrateError::Config(_) | MigrateError::OutOfOrder { .. } => {
                ErrorKind::Configuration
            }
            MigrateError::SafetyGateDeclined => ErrorKind::SafetyGateDeclined,
            MigrateError::Database(_)
            | MigrateError::ApplyLog { .. }
            | MigrateError::RevisionFailed { .. }
            | MigrateError::StaticDropFailed { .. }
            | MigrateError::StaticCreateFailed { .. } => ErrorKind::Database,
        }
    }

    /// Underlying database error, if any.
    pub fn db_error(&self) -> Option<&DbError> {
        match self {
            MigrateError::Database(e)
            | MigrateError::ApplyLog { source: e, .. }
            | MigrateError::RevisionFailed { source: e, .. }
            | MigrateError::StaticDropFailed { source: e, .. }
            | MigrateError::StaticCreateFailed { source: e, .. } => Some(e),
            MigrateError::Config(_)
            | MigrateError::OutOfOrder { .. }
            | MigrateError::SafetyGateDeclined => None,
        }
    }

    /// Revision whose log row was in flight when the error occurred.
    pub(crate) fn in_flight_revision(&self) -> Option<RevisionId> {
        match self {
            MigrateError::ApplyLog { revision, .. } | MigrateError::RevisionFailed { revision, .. } => {
                Some(*revision)
            }
            _ => None,
        }
    }
}
