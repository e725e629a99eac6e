//! Filesystem-backed revision discovery.
//!
//! Every call re-reads the directory; nothing is cached between calls.

use crate::error::{CoreError, CoreResult};
use crate::revision::{Revision, RevisionFile, RevisionId, SCRIPT_EXTENSION, UNDO_MARKER};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Reads numbered revision scripts from a directory.
#[derive(Debug, Clone)]
pub struct RevisionStore {
    dir: PathBuf,
}

impl RevisionStore {
    /// Create a store over `dir` (usually `<root>/revisions`).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory this store reads from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// List all revision files in ascending identifier order.
    ///
    /// Entries that do not end in `.sql` are ignored. A `.sql` entry whose
    /// stem is not a positive integer fails with `MalformedRevisionName`, and
    /// two files resolving to the same identifier fail with
    /// `DuplicateRevision`.
    pub fn list_available(&self) -> CoreResult<Vec<RevisionFile>> {
        if !self.dir.is_dir() {
            return Err(CoreError::DirectoryNotFound {
                path: self.dir.display().to_string(),
            });
        }

        let mut found: BTreeMap<RevisionId, RevisionFile> = BTreeMap::new();
        for entry in std::fs::read_dir(&self.dir).map_err(|e| CoreError::io(&self.dir, e))? {
            let entry = entry.map_err(|e| CoreError::io(&self.dir, e))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                log::warn!("Skipping non UTF-8 file name in {}", self.dir.display());
                continue;
            };
            if !file_name.ends_with(SCRIPT_EXTENSION) {
                continue;
            }

            let id = RevisionId::parse(file_name)?;
            let file = RevisionFile {
                id,
                file_name: file_name.to_string(),
                path: path.clone(),
            };
            if let Some(existing) = found.insert(id, file) {
                let (first, second) = order_names(&existing.file_name, file_name);
                return Err(CoreError::DuplicateRevision {
                    id: id.get(),
                    first,
                    second,
                });
            }
        }

        Ok(found.into_values().collect())
    }

    /// Load every revision with identifier `>= start_inclusive`, with bodies,
    /// in ascending order.
    pub fn load_from(&self, start_inclusive: u64) -> CoreResult<Vec<Revision>> {
        self.list_available()?
            .into_iter()
            .filter(|file| file.id.get() >= start_inclusive)
            .map(load_revision)
            .collect()
    }

    /// Highest available identifier, or 0 when the directory has no revisions.
    pub fn highest_available(&self) -> CoreResult<u64> {
        Ok(self
            .list_available()?
            .last()
            .map(|file| file.id.get())
            .unwrap_or(0))
    }
}

fn load_revision(file: RevisionFile) -> CoreResult<Revision> {
    let script = std::fs::read_to_string(&file.path).map_err(|e| CoreError::io(&file.path, e))?;
    if script.contains(UNDO_MARKER) {
        return Err(CoreError::UnsupportedUndoMarker {
            file_name: file.file_name,
            marker: UNDO_MARKER,
        });
    }
    Ok(Revision {
        id: file.id,
        display_name: file.file_name,
        script,
    })
}

/// Directory iteration order is unspecified; sort so the error is stable.
fn order_names(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

#[cfg(test)]
#[path = "revision_store_test.rs"]
mod tests;
