//! Command results.

use crate::catalog::LiveStatics;
use crate::reconciler::{CreateSummary, DropSummary};
use dbm_core::{RevisionId, StaticKind, StaticName};
use serde::Serialize;
use std::path::PathBuf;

/// Read-only summary produced by `status`.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    /// Highest change number in the log, completed or not
    pub watermark: u64,
    /// Highest change number whose script completed
    pub completed_watermark: u64,
    /// Number of completed log rows
    pub applied_count: u64,
    /// Log rows left by an interrupted run
    pub interrupted: Vec<u64>,
    /// Highest revision file on disk, 0 if none
    pub highest_available: u64,
    /// Revisions above the watermark
    pub outstanding: Vec<RevisionId>,
    pub declared_procedures: usize,
    pub declared_triggers: usize,
    pub live: LiveStatics,
    /// Whether `apply` would ask for confirmation before dropping
    pub mismatch: bool,
}

/// A revision executed by `apply`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedRevision {
    pub id: RevisionId,
    pub display_name: String,
}

/// Result of a committed `apply`.
#[derive(Debug, Clone, Serialize)]
pub struct ApplyReport {
    pub previous_watermark: u64,
    pub watermark: u64,
    pub dropped: DropSummary,
    pub created: CreateSummary,
    pub applied: Vec<AppliedRevision>,
}

/// A definition written by `export_statics`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedStatic {
    pub kind: StaticKind,
    pub name: StaticName,
    pub path: PathBuf,
}

/// Result of `export_statics`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExportReport {
    pub written: Vec<ExportedStatic>,
}

impl ExportReport {
    pub fn count(&self, kind: StaticKind) -> usize {
        self.written.iter().filter(|e| e.kind == kind).count()
    }
}
