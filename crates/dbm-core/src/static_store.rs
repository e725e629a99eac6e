//! Filesystem-backed static object definitions.

use crate::error::{CoreError, CoreResult};
use crate::statics::{StaticDefinition, StaticKind, StaticName};
use std::path::{Path, PathBuf};

/// Declared static definitions, sorted by kind then name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclaredStatics {
    definitions: Vec<StaticDefinition>,
}

impl DeclaredStatics {
    pub fn new(mut definitions: Vec<StaticDefinition>) -> Self {
        definitions.sort_by(|a, b| (a.kind, &a.name).cmp(&(b.kind, &b.name)));
        Self { definitions }
    }

    /// Number of declared definitions of `kind`.
    pub fn count(&self, kind: StaticKind) -> usize {
        self.of_kind(kind).count()
    }

    /// Definitions of one kind.
    pub fn of_kind(&self, kind: StaticKind) -> impl Iterator<Item = &StaticDefinition> {
        self.definitions.iter().filter(move |d| d.kind == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StaticDefinition> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Reads and writes `sproc__*.sql` / `trigger__*.sql` files.
#[derive(Debug, Clone)]
pub struct StaticStore {
    dir: PathBuf,
}

impl StaticStore {
    /// Create a store over `dir` (usually `<root>/statics`).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load every declared definition with its script body.
    ///
    /// Any file without a recognised prefix aborts with
    /// `InvalidStaticFileName`; the whole directory is classified before any
    /// body is read. Subdirectories are ignored.
    pub fn list_declared(&self) -> CoreResult<DeclaredStatics> {
        if !self.dir.is_dir() {
            return Err(CoreError::DirectoryNotFound {
                path: self.dir.display().to_string(),
            });
        }

        let mut classified = Vec::new();
        for entry in std::fs::read_dir(&self.dir).map_err(|e| CoreError::io(&self.dir, e))? {
            let entry = entry.map_err(|e| CoreError::io(&self.dir, e))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy().into_owned();
            let (kind, name) = StaticKind::classify(&file_name)?;
            classified.push((kind, name, file_name, path));
        }

        let definitions = classified
            .into_iter()
            .map(|(kind, name, file_name, path)| {
                let script =
                    std::fs::read_to_string(&path).map_err(|e| CoreError::io(&path, e))?;
                Ok(StaticDefinition {
                    kind,
                    name,
                    file_name,
                    script,
                })
            })
            .collect::<CoreResult<Vec<_>>>()?;

        Ok(DeclaredStatics::new(definitions))
    }

    /// Write a definition to `<dir>/<prefix><name>.sql`, creating the
    /// directory if needed and replacing any existing file.
    pub fn write_definition(
        &self,
        kind: StaticKind,
        name: &StaticName,
        script: &str,
    ) -> CoreResult<PathBuf> {
        std::fs::create_dir_all(&self.dir).map_err(|e| CoreError::io(&self.dir, e))?;
        let path = self.dir.join(kind.file_name(name));
        let mut body = script.trim_end().to_string();
        body.push('\n');
        std::fs::write(&path, body).map_err(|e| CoreError::io(&path, e))?;
        Ok(path)
    }
}

#[cfg(test)]
#[path = "static_store_test.rs"]
mod tests;
