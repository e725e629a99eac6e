//! Error types for dbm-core

use thiserror::Error;

/// Core error type for dbmarshal.
///
/// Every variant is a configuration problem: it is raised while reading the
/// migrations directory or a connection profile, before any database work.
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Revision filename is not `<digits>.sql`
    #[error("[C001] Malformed revision filename '{file_name}': {reason}")]
    MalformedRevisionName { file_name: String, reason: String },

    /// C002: Two revision files resolve to the same identifier
    #[error("[C002] Duplicate revision {id}: '{first}' and '{second}'")]
    DuplicateRevision {
        id: u64,
        first: String,
        second: String,
    },

    /// C003: Revision still carries an undo section
    #[error("[C003] Revision '{file_name}' contains an undo marker ('{marker}'); undo sections are not supported, split the script or remove the section")]
    UnsupportedUndoMarker {
        file_name: String,
        marker: &'static str,
    },

    /// C004: Static file name without a known prefix
    #[error("[C004] Invalid static file name '{file_name}': expected 'sproc__<name>.sql' or 'trigger__<name>.sql'")]
    InvalidStaticFileName { file_name: String },

    /// C005: Expected directory is missing
    #[error("[C005] Directory not found: {path}")]
    DirectoryNotFound { path: String },

    /// C006: Profile alias has no saved profile
    #[error("[C006] No profile saved under alias '{alias}' (looked in {path})")]
    ProfileNotFound { alias: String, path: String },

    /// C007: Profile alias is not usable as a file name
    #[error("[C007] Invalid profile alias '{alias}': only letters, digits, '_' and '-' are allowed")]
    InvalidAlias { alias: String },

    /// C008: Profile file could not be parsed
    #[error("[C008] Failed to parse profile {path}: {source}")]
    ProfileParse {
        path: String,
        source: serde_yaml::Error,
    },

    /// C009: Home directory for profiles could not be determined
    #[error("[C009] Could not determine the dbmarshal home directory: {0}")]
    HomeNotFound(String),

    /// C010: IO error with file path context
    #[error("[C010] Failed to access '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// C011: YAML serialization error
    #[error("[C011] YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        CoreError::IoWithPath {
            path: path.display().to_string(),
            source,
        }
    }
}
