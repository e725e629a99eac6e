//! Migration engine for dbmarshal.
//!
//! Applies numbered revision scripts in order, tracking them in the
//! `dbmarshal_log` table, and rebuilds stored procedures and triggers from
//! the `statics/` directory on every apply.

pub mod apply_log;
pub mod catalog;
pub mod confirm;
pub mod error;
pub mod migrator;
pub mod reconciler;
pub mod report;
pub mod runner;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;

pub use apply_log::{ApplyLog, LedgerState, LOG_TABLE};
pub use catalog::LiveStatics;
pub use confirm::Confirm;
pub use error::{ErrorKind, MigrateError, MigrateResult};
pub use migrator::Migrator;
pub use reconciler::{CreateSummary, DropSummary, Reconciler, StaticSurvey};
pub use report::{AppliedRevision, ApplyReport, ExportReport, ExportedStatic, StatusReport};
pub use runner::Runner;
