//! Migrations directory layout: `<root>/revisions` and `<root>/statics`.

use crate::error::{CoreError, CoreResult};
use crate::revision_store::RevisionStore;
use crate::static_store::StaticStore;
use std::path::{Path, PathBuf};

/// Subdirectory holding numbered revision scripts.
pub const REVISIONS_DIR: &str = "revisions";

/// Subdirectory holding static object definitions.
pub const STATICS_DIR: &str = "statics";

/// Root of a migrations tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationsRoot {
    root: PathBuf,
}

impl MigrationsRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn revisions_dir(&self) -> PathBuf {
        self.root.join(REVISIONS_DIR)
    }

    pub fn statics_dir(&self) -> PathBuf {
        self.root.join(STATICS_DIR)
    }

    pub fn revision_store(&self) -> RevisionStore {
        RevisionStore::new(self.revisions_dir())
    }

    pub fn static_store(&self) -> StaticStore {
        StaticStore::new(self.statics_dir())
    }

    /// Check that the root and both subdirectories exist.
    pub fn ensure_exists(&self) -> CoreResult<()> {
        for dir in [self.root.clone(), self.revisions_dir(), self.statics_dir()] {
            if !dir.is_dir() {
                return Err(CoreError::DirectoryNotFound {
                    path: dir.display().to_string(),
                });
            }
        }
        Ok(())
    }
}
