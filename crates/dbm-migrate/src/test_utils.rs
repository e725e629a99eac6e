//! Shared test utilities for dbm-migrate
//!
//! [`CatalogDb`] runs ordinary SQL on in-memory DuckDB and records
//! MySQL-style `CREATE PROCEDURE` / `CREATE TRIGGER` scripts in a
//! transaction-aware catalog of its own, so reconciliation can be exercised
//! without a MySQL server.

use async_trait::async_trait;
use dbm_core::{MigrationsRoot, StaticKind, StaticName};
use dbm_db::{DatabaseCatalog, DatabaseCore, DbError, DbResult, DuckDbBackend};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;
use tempfile::TempDir;

type Objects = BTreeMap<(StaticKind, StaticName), String>;

#[derive(Default)]
struct Catalog {
    objects: Objects,
    snapshot: Option<Objects>,
}

/// In-memory database with procedure and trigger support.
pub struct CatalogDb {
    inner: DuckDbBackend,
    catalog: Mutex<Catalog>,
}

impl CatalogDb {
    pub fn new() -> Self {
        Self {
            inner: DuckDbBackend::in_memory().unwrap(),
            catalog: Mutex::new(Catalog::default()),
        }
    }

    /// Define a live object outside any transaction.
    pub fn seed(&self, kind: StaticKind, name: &str, script: &str) {
        let name = StaticName::try_new(name).unwrap();
        self.catalog
            .lock()
            .unwrap()
            .objects
            .insert((kind, name), script.to_string());
    }

    /// Sorted names of the live objects of `kind`.
    pub fn live_names(&self, kind: StaticKind) -> Vec<String> {
        self.catalog
            .lock()
            .unwrap()
            .objects
            .keys()
            .filter(|(k, _)| *k == kind)
            .map(|(_, name)| name.to_string())
            .collect()
    }

    /// Script a live object was created from.
    pub fn live_script(&self, kind: StaticKind, name: &str) -> Option<String> {
        let name = StaticName::try_new(name)?;
        self.catalog.lock().unwrap().objects.get(&(kind, name)).cloned()
    }

    /// Underlying DuckDB connection, for assertions on ordinary tables.
    pub fn inner(&self) -> &DuckDbBackend {
        &self.inner
    }
}

impl Default for CatalogDb {
    fn default() -> Self {
        Self::new()
    }
}

/// Kind and name of a `CREATE PROCEDURE` / `CREATE TRIGGER` script.
fn parse_create(script: &str) -> Option<(StaticKind, StaticName)> {
    let mut words = script.split_whitespace();
    if !words.next()?.eq_ignore_ascii_case("CREATE") {
        return None;
    }
    let keyword = words.next()?;
    let kind = StaticKind::ALL
        .into_iter()
        .find(|kind| keyword.eq_ignore_ascii_case(kind.keyword()))?;
    let raw = words.next()?;
    let name = raw.split('(').next()?.trim_matches('`');
    Some((kind, StaticName::try_new(name)?))
}

fn execution_error(message: String) -> DbError {
    DbError::ExecutionError {
        code: Some("1304".to_string()),
        message,
    }
}

#[async_trait]
impl DatabaseCore for CatalogDb {
    async fn execute(&self, sql: &str) -> DbResult<usize> {
        self.inner.execute(sql).await
    }

    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        let Some((kind, name)) = parse_create(sql) else {
            return self.inner.execute_batch(sql).await;
        };
        let mut catalog = self.catalog.lock().unwrap();
        if catalog.objects.contains_key(&(kind, name.clone())) {
            return Err(execution_error(format!("{} {name} already exists", kind.keyword())));
        }
        catalog.objects.insert((kind, name), sql.to_string());
        Ok(())
    }

    async fn query_i64(&self, sql: &str) -> DbResult<Option<i64>> {
        self.inner.query_i64(sql).await
    }

    async fn query_i64s(&self, sql: &str) -> DbResult<Vec<i64>> {
        self.inner.query_i64s(sql).await
    }

    async fn query_strings(&self, sql: &str) -> DbResult<Vec<String>> {
        self.inner.query_strings(sql).await
    }

    async fn begin(&self) -> DbResult<()> {
        self.inner.begin().await?;
        let mut catalog = self.catalog.lock().unwrap();
        catalog.snapshot = Some(catalog.objects.clone());
        Ok(())
    }

    async fn commit(&self) -> DbResult<()> {
        self.inner.commit().await?;
        self.catalog.lock().unwrap().snapshot = None;
        Ok(())
    }

    async fn rollback(&self) -> DbResult<()> {
        {
            let mut catalog = self.catalog.lock().unwrap();
            if let Some(snapshot) = catalog.snapshot.take() {
                catalog.objects = snapshot;
            }
        }
        self.inner.rollback().await
    }

    fn db_type(&self) -> &'static str {
        self.inner.db_type()
    }

    fn current_schema(&self) -> &str {
        self.inner.current_schema()
    }

    async fn close(&self) -> DbResult<()> {
        self.inner.close().await
    }
}

#[async_trait]
impl DatabaseCatalog for CatalogDb {
    async fn list_statics(&self, kind: StaticKind, _schema: &str) -> DbResult<Vec<StaticName>> {
        Ok(self
            .catalog
            .lock()
            .unwrap()
            .objects
            .keys()
            .filter(|(k, _)| *k == kind)
            .map(|(_, name)| name.clone())
            .collect())
    }

    async fn static_definition(&self, kind: StaticKind, name: &StaticName) -> DbResult<String> {
        self.catalog
            .lock()
            .unwrap()
            .objects
            .get(&(kind, name.clone()))
            .cloned()
            .ok_or_else(|| DbError::DefinitionNotFound {
                kind: kind.to_string(),
                name: name.to_string(),
            })
    }

    async fn drop_static(&self, kind: StaticKind, name: &StaticName) -> DbResult<()> {
        self.catalog
            .lock()
            .unwrap()
            .objects
            .remove(&(kind, name.clone()));
        Ok(())
    }

    async fn table_exists(&self, schema: &str, table: &str) -> DbResult<bool> {
        self.inner.table_exists(schema, table).await
    }
}

/// A temporary migrations root with `revisions/` and `statics/`.
pub struct Fixture {
    _dir: TempDir,
    root: MigrationsRoot,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = MigrationsRoot::new(dir.path());
        std::fs::create_dir_all(root.revisions_dir()).unwrap();
        std::fs::create_dir_all(root.statics_dir()).unwrap();
        Self { _dir: dir, root }
    }

    pub fn root(&self) -> &MigrationsRoot {
        &self.root
    }

    pub fn write_revision(&self, id: u64, sql: &str) {
        write(&self.root.revisions_dir().join(format!("{id}.sql")), sql);
    }

    pub fn write_static(&self, file_name: &str, sql: &str) {
        write(&self.root.statics_dir().join(file_name), sql);
    }

    pub fn static_file(&self, file_name: &str) -> Option<String> {
        std::fs::read_to_string(self.root.statics_dir().join(file_name)).ok()
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

fn write(path: &Path, contents: &str) {
    std::fs::write(path, contents).unwrap();
}

/// Confirmation stub that records every question and answers `answer`.
pub struct ScriptedConfirm {
    pub answer: bool,
    pub questions: Vec<String>,
}

impl ScriptedConfirm {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            questions: Vec::new(),
        }
    }
}

impl crate::Confirm for ScriptedConfirm {
    fn confirm(&mut self, question: &str) -> bool {
        self.questions.push(question.to_string());
        self.answer
    }
}
