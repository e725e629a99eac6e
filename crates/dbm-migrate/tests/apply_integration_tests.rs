//! Integration tests for the apply cycle.
//!
//! Each test builds a migrations tree in a temp directory and drives the
//! public `Migrator` API against an in-memory catalog database.

use dbm_core::StaticKind;
use dbm_db::DatabaseCore;
use dbm_migrate::test_utils::{CatalogDb, Fixture, ScriptedConfirm};
use dbm_migrate::{ApplyLog, ErrorKind, MigrateError, Migrator};

// ── Helpers ────────────────────────────────────────────────────────────

fn migrator<'a>(db: &'a CatalogDb, fixture: &Fixture) -> Migrator<'a> {
    Migrator::new(db, fixture.root().clone())
}

fn accept() -> ScriptedConfirm {
    ScriptedConfirm::answering(true)
}

fn decline() -> ScriptedConfirm {
    ScriptedConfirm::answering(false)
}

async fn completed_change_numbers(db: &CatalogDb) -> Vec<i64> {
    db.query_i64s(
        "SELECT change_number FROM dbmarshal_log WHERE completed IS NOT NULL ORDER BY change_number",
    )
    .await
    .unwrap()
}

async fn row_count(db: &CatalogDb, table: &str) -> i64 {
    db.query_i64(&format!("SELECT CAST(COUNT(*) AS BIGINT) FROM {table}"))
        .await
        .unwrap()
        .unwrap()
}

// ── Revisions ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_sparse_revisions_apply_in_one_batch() {
    let fixture = Fixture::new();
    fixture.write_revision(1, "CREATE TABLE accounts (id INTEGER, name VARCHAR)");
    fixture.write_revision(3, "INSERT INTO accounts VALUES (1, 'a')");
    fixture.write_revision(5, "INSERT INTO accounts VALUES (2, 'b')");
    let db = CatalogDb::new();

    let report = migrator(&db, &fixture).apply(&mut accept()).await.unwrap();

    assert_eq!(report.watermark, 5);
    assert_eq!(completed_change_numbers(&db).await, vec![1, 3, 5]);
    assert_eq!(ApplyLog::new(&db).high_watermark().await.unwrap(), 5);
    assert_eq!(row_count(&db, "accounts").await, 2);

    let again = migrator(&db, &fixture).apply(&mut accept()).await.unwrap();
    assert!(again.applied.is_empty());
    assert_eq!(again.watermark, 5);
    assert_eq!(row_count(&db, "accounts").await, 2);
}

#[tokio::test]
async fn test_numeric_order_not_lexical() {
    let fixture = Fixture::new();
    fixture.write_revision(10, "INSERT INTO steps VALUES (10)");
    fixture.write_revision(2, "CREATE TABLE steps (n INTEGER)");
    let db = CatalogDb::new();

    let report = migrator(&db, &fixture).apply(&mut accept()).await.unwrap();

    let order: Vec<u64> = report.applied.iter().map(|r| r.id.get()).collect();
    assert_eq!(order, vec![2, 10]);
}

#[tokio::test]
async fn test_failed_revision_discards_whole_batch() {
    let fixture = Fixture::new();
    fixture.write_revision(1, "CREATE TABLE accounts (id INTEGER)");
    fixture.write_revision(3, "INSERT INTO accounts VALUES (1)");
    fixture.write_revision(5, "INSERT INTO no_such_table VALUES (1)");
    let db = CatalogDb::new();

    let err = migrator(&db, &fixture).apply(&mut accept()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Database);
    assert!(err.db_error().is_some());
    assert!(matches!(err, MigrateError::RevisionFailed { .. }));
    assert_eq!(
        db.query_i64("SELECT CAST(COUNT(*) AS BIGINT) FROM dbmarshal_log")
            .await
            .unwrap(),
        Some(0)
    );
    assert!(db.execute("SELECT * FROM accounts").await.is_err());
}

#[tokio::test]
async fn test_new_revision_applies_on_top_of_previous_run() {
    let fixture = Fixture::new();
    fixture.write_revision(1, "CREATE TABLE accounts (id INTEGER)");
    let db = CatalogDb::new();
    migrator(&db, &fixture).apply(&mut accept()).await.unwrap();

    fixture.write_revision(2, "INSERT INTO accounts VALUES (7)");
    let report = migrator(&db, &fixture).apply(&mut accept()).await.unwrap();

    assert_eq!(report.previous_watermark, 1);
    assert_eq!(report.watermark, 2);
    assert_eq!(report.applied.len(), 1);
    assert_eq!(completed_change_numbers(&db).await, vec![1, 2]);
}

#[tokio::test]
async fn test_empty_ledger_reports_everything_outstanding() {
    let fixture = Fixture::new();
    fixture.write_revision(4, "SELECT 4");
    fixture.write_revision(1, "SELECT 1");
    let db = CatalogDb::new();

    let status = migrator(&db, &fixture).status().await.unwrap();

    assert_eq!(status.watermark, 0);
    let outstanding: Vec<u64> = status.outstanding.iter().map(|id| id.get()).collect();
    assert_eq!(outstanding, vec![1, 4]);
}

// ── Statics ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_declared_statics_replace_live_set() {
    let fixture = Fixture::new();
    fixture.write_static("sproc__a.sql", "CREATE PROCEDURE a() BEGIN SELECT 1; END");
    fixture.write_static(
        "trigger__b.sql",
        "CREATE TRIGGER b AFTER INSERT ON accounts FOR EACH ROW SET @n = 1",
    );
    let db = CatalogDb::new();
    db.seed(StaticKind::Procedure, "old", "CREATE PROCEDURE old() BEGIN END");
    let mut confirm = accept();

    let report = migrator(&db, &fixture).apply(&mut confirm).await.unwrap();

    assert!(confirm.questions.is_empty());
    assert_eq!(report.dropped.procedures_dropped, 1);
    assert_eq!(report.created.procedures_created, 1);
    assert_eq!(report.created.triggers_created, 1);
    assert_eq!(db.live_names(StaticKind::Procedure), vec!["a"]);
    assert_eq!(db.live_names(StaticKind::Trigger), vec!["b"]);
}

#[tokio::test]
async fn test_statics_rebuilt_on_every_apply() {
    let fixture = Fixture::new();
    fixture.write_static("sproc__a.sql", "CREATE PROCEDURE a() BEGIN SELECT 1; END");
    fixture.write_static("trigger__b.sql", "CREATE TRIGGER b AFTER INSERT ON x FOR EACH ROW SET @n = 1");
    let db = CatalogDb::new();
    migrator(&db, &fixture).apply(&mut accept()).await.unwrap();

    fixture.write_static("sproc__a.sql", "CREATE PROCEDURE a() BEGIN SELECT 2; END");
    let report = migrator(&db, &fixture).apply(&mut accept()).await.unwrap();

    assert_eq!(report.dropped.procedures_dropped, 1);
    assert_eq!(report.dropped.triggers_dropped, 1);
    assert_eq!(
        db.live_script(StaticKind::Procedure, "a").unwrap(),
        "CREATE PROCEDURE a() BEGIN SELECT 2; END"
    );
}

#[tokio::test]
async fn test_declined_mismatch_changes_nothing() {
    let fixture = Fixture::new();
    fixture.write_revision(1, "CREATE TABLE accounts (id INTEGER)");
    let db = CatalogDb::new();
    db.seed(StaticKind::Procedure, "legacy", "CREATE PROCEDURE legacy() BEGIN END");
    let mut confirm = decline();

    let migrator = migrator(&db, &fixture);
    assert!(migrator.status().await.unwrap().mismatch);
    let err = migrator.apply(&mut confirm).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::SafetyGateDeclined);
    assert_eq!(confirm.questions.len(), 1);
    assert_eq!(db.live_names(StaticKind::Procedure), vec!["legacy"]);
    assert!(!ApplyLog::new(&db).exists().await.unwrap());
    assert!(db.execute("SELECT * FROM accounts").await.is_err());
}

#[tokio::test]
async fn test_revision_failure_restores_statics() {
    let fixture = Fixture::new();
    fixture.write_revision(1, "DROP TABLE missing_table");
    fixture.write_static("sproc__new.sql", "CREATE PROCEDURE new() BEGIN END");
    fixture.write_static("trigger__t.sql", "CREATE TRIGGER t AFTER INSERT ON x FOR EACH ROW SET @n = 1");
    let db = CatalogDb::new();
    db.seed(StaticKind::Procedure, "old", "CREATE PROCEDURE old() BEGIN END");

    let err = migrator(&db, &fixture).apply(&mut accept()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Database);
    assert_eq!(db.live_names(StaticKind::Procedure), vec!["old"]);
    assert!(db.live_names(StaticKind::Trigger).is_empty());
}

// ── Export ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_export_then_apply_recreates_objects() {
    let procedure = "CREATE PROCEDURE p(IN n INT)\nBEGIN\n  SELECT n;\nEND";
    let trigger = "CREATE TRIGGER t BEFORE INSERT ON accounts FOR EACH ROW SET NEW.id = NEW.id + 1";

    let source = CatalogDb::new();
    source.seed(StaticKind::Procedure, "p", procedure);
    source.seed(StaticKind::Trigger, "t", trigger);
    let fixture = Fixture::new();

    let exported = migrator(&source, &fixture).export_statics().await.unwrap();
    assert_eq!(exported.written.len(), 2);
    assert!(fixture.static_file("sproc__p.sql").is_some());
    assert!(fixture.static_file("trigger__t.sql").is_some());

    let target = CatalogDb::new();
    migrator(&target, &fixture).apply(&mut accept()).await.unwrap();

    // Exported files end with a newline
    let recreated = |kind, name| target.live_script(kind, name).unwrap().trim_end().to_string();
    assert_eq!(recreated(StaticKind::Procedure, "p"), procedure);
    assert_eq!(recreated(StaticKind::Trigger, "t"), trigger);
}
