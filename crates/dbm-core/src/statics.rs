//! Static object definitions: stored procedures and triggers.
//!
//! Static files are classified purely by filename prefix:
//! `sproc__<name>.sql` declares a procedure, `trigger__<name>.sql` a trigger.

use crate::error::{CoreError, CoreResult};
use crate::newtype_string::define_newtype_string;
use crate::revision::SCRIPT_EXTENSION;
use serde::{Deserialize, Serialize};
use std::fmt;

define_newtype_string! {
    /// Name of a stored procedure or trigger.
    pub struct StaticName;
}

/// Kind of static database object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaticKind {
    Procedure,
    Trigger,
}

impl StaticKind {
    /// All kinds, in the order they are reported.
    pub const ALL: [StaticKind; 2] = [StaticKind::Procedure, StaticKind::Trigger];

    /// Filename prefix that marks a file as this kind.
    pub fn prefix(self) -> &'static str {
        match self {
            StaticKind::Procedure => "sproc__",
            StaticKind::Trigger => "trigger__",
        }
    }

    /// SQL keyword for the object type (`PROCEDURE` / `TRIGGER`).
    pub fn keyword(self) -> &'static str {
        match self {
            StaticKind::Procedure => "PROCEDURE",
            StaticKind::Trigger => "TRIGGER",
        }
    }

    /// File name a definition of this kind is stored under.
    pub fn file_name(self, name: &StaticName) -> String {
        format!("{}{}{}", self.prefix(), name, SCRIPT_EXTENSION)
    }

    /// Classify a file name, returning its kind and object name.
    ///
    /// Fails with `InvalidStaticFileName` when the name has neither prefix,
    /// lacks the `.sql` extension, or has an empty object name.
    pub fn classify(file_name: &str) -> CoreResult<(StaticKind, StaticName)> {
        let invalid = || CoreError::InvalidStaticFileName {
            file_name: file_name.to_string(),
        };

        let (kind, rest) = StaticKind::ALL
            .iter()
            .find_map(|kind| file_name.strip_prefix(kind.prefix()).map(|rest| (*kind, rest)))
            .ok_or_else(invalid)?;
        let name = rest.strip_suffix(SCRIPT_EXTENSION).ok_or_else(invalid)?;
        let name = StaticName::try_new(name).ok_or_else(invalid)?;
        Ok((kind, name))
    }
}

impl fmt::Display for StaticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaticKind::Procedure => write!(f, "procedure"),
            StaticKind::Trigger => write!(f, "trigger"),
        }
    }
}

/// A static object declared by a file in the statics directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticDefinition {
    pub kind: StaticKind,
    pub name: StaticName,
    /// Original filename
    pub file_name: String,
    /// Full `CREATE ...` script
    pub script: String,
}

#[cfg(test)]
#[path = "statics_test.rs"]
mod tests;
