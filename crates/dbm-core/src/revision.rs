//! Revision identifiers and script bodies.
//!
//! A revision file is named `<N>.sql` where `<N>` is a strictly positive
//! decimal integer. The integer is the revision's identity and its position
//! in the apply order.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// File extension shared by revision and static scripts.
pub const SCRIPT_EXTENSION: &str = ".sql";

/// Marker that split a revision into forward and undo halves in older
/// layouts. Revisions carrying it are rejected.
pub const UNDO_MARKER: &str = "-- //@UNDO";

/// Numeric identity of a revision, parsed from its filename stem.
///
/// Ordering is numeric, so `2.sql` sorts before `10.sql`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RevisionId(u64);

impl RevisionId {
    /// Largest identifier the log's BIGINT `change_number` column can hold.
    pub const MAX: u64 = i64::MAX as u64;

    /// Create an identifier, returning `None` for zero or above [`Self::MAX`].
    pub fn new(value: u64) -> Option<Self> {
        if value == 0 || value > Self::MAX {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Return the raw integer value.
    pub fn get(self) -> u64 {
        self.0
    }

    /// Parse a revision filename such as `12.sql`.
    ///
    /// The stem must consist of ASCII digits only (no sign, whitespace or
    /// suffix) and must not be zero.
    pub fn parse(file_name: &str) -> CoreResult<Self> {
        let malformed = |reason: &str| CoreError::MalformedRevisionName {
            file_name: file_name.to_string(),
            reason: reason.to_string(),
        };

        let stem = file_name
            .strip_suffix(SCRIPT_EXTENSION)
            .ok_or_else(|| malformed("missing .sql extension"))?;
        if stem.is_empty() {
            return Err(malformed("empty revision number"));
        }
        if !stem.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed("revision number must contain digits only"));
        }
        let value: u64 = stem
            .parse()
            .map_err(|_| malformed("revision number is out of range"))?;
        if value > Self::MAX {
            return Err(malformed("revision number is out of range"));
        }
        Self::new(value).ok_or_else(|| malformed("revision number must be greater than zero"))
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A revision file found in the revisions directory, without its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionFile {
    /// Parsed identity
    pub id: RevisionId,
    /// Original filename, e.g. `12.sql`
    pub file_name: String,
    /// Absolute path to the script
    pub path: PathBuf,
}

/// A revision with its script body loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    pub id: RevisionId,
    /// Original filename, recorded as the log entry description
    pub display_name: String,
    /// Raw SQL text
    pub script: String,
}

#[cfg(test)]
#[path = "revision_test.rs"]
mod tests;
