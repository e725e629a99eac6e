use super::*;
use dbm_core::RevisionId;
use dbm_db::{DatabaseCore, DuckDbBackend};

fn revision(id: u64) -> Revision {
    Revision {
        id: RevisionId::new(id).unwrap(),
        display_name: format!("{id}.sql"),
        script: String::new(),
    }
}

async fn ledger_db() -> DuckDbBackend {
    let db = DuckDbBackend::in_memory().unwrap();
    ApplyLog::new(&db).ensure_table().await.unwrap();
    db
}

#[tokio::test]
async fn test_ensure_table_is_idempotent() {
    let db = ledger_db().await;
    let log = ApplyLog::new(&db);
    log.ensure_table().await.unwrap();
    log.ensure_table().await.unwrap();
    assert_eq!(log.high_watermark().await.unwrap(), 0);
}

#[tokio::test]
async fn test_empty_ledger_watermarks_are_zero() {
    let db = ledger_db().await;
    let log = ApplyLog::new(&db);
    assert_eq!(log.high_watermark().await.unwrap(), 0);
    assert_eq!(log.completed_watermark().await.unwrap(), 0);
    assert_eq!(log.completed_count().await.unwrap(), 0);
    assert!(log.interrupted().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_begin_and_complete() {
    let db = ledger_db().await;
    let log = ApplyLog::new(&db);

    log.begin(&revision(1)).await.unwrap();
    assert_eq!(log.high_watermark().await.unwrap(), 1);
    assert_eq!(log.completed_watermark().await.unwrap(), 0);
    assert_eq!(log.interrupted().await.unwrap(), vec![1]);

    log.complete(&revision(1)).await.unwrap();
    assert_eq!(log.completed_watermark().await.unwrap(), 1);
    assert_eq!(log.completed_count().await.unwrap(), 1);
    assert!(log.interrupted().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_high_watermark_counts_interrupted_rows() {
    let db = ledger_db().await;
    let log = ApplyLog::new(&db);

    log.begin(&revision(2)).await.unwrap();
    log.complete(&revision(2)).await.unwrap();
    log.begin(&revision(7)).await.unwrap();

    assert_eq!(log.high_watermark().await.unwrap(), 7);
    assert_eq!(log.completed_watermark().await.unwrap(), 2);
    assert_eq!(log.interrupted().await.unwrap(), vec![7]);
}

#[tokio::test]
async fn test_discard_removes_row() {
    let db = ledger_db().await;
    let log = ApplyLog::new(&db);

    log.begin(&revision(4)).await.unwrap();
    log.discard(RevisionId::new(4).unwrap()).await.unwrap();
    assert_eq!(log.high_watermark().await.unwrap(), 0);

    // Discarding a missing row is a no-op
    log.discard(RevisionId::new(9).unwrap()).await.unwrap();
}

#[tokio::test]
async fn test_description_is_escaped() {
    let db = ledger_db().await;
    let log = ApplyLog::new(&db);

    let mut rev = revision(3);
    rev.display_name = "it's.sql".to_string();
    log.begin(&rev).await.unwrap();

    let descriptions = db
        .query_strings("SELECT description FROM dbmarshal_log")
        .await
        .unwrap();
    assert_eq!(descriptions, vec!["it's.sql".to_string()]);
}

#[tokio::test]
async fn test_rollback_removes_rows() {
    let db = ledger_db().await;
    let log = ApplyLog::new(&db);

    db.begin().await.unwrap();
    log.begin(&revision(1)).await.unwrap();
    log.complete(&revision(1)).await.unwrap();
    db.rollback().await.unwrap();

    assert_eq!(log.high_watermark().await.unwrap(), 0);
}

#[tokio::test]
async fn test_read_state_without_table_is_empty_and_creates_nothing() {
    let db = DuckDbBackend::in_memory().unwrap();
    let log = ApplyLog::new(&db);

    assert!(!log.exists().await.unwrap());
    assert_eq!(log.read_state().await.unwrap(), LedgerState::default());
    assert!(!log.exists().await.unwrap());
}

#[tokio::test]
async fn test_read_state_collects_ledger() {
    let db = ledger_db().await;
    let log = ApplyLog::new(&db);

    log.begin(&revision(1)).await.unwrap();
    log.complete(&revision(1)).await.unwrap();
    log.begin(&revision(5)).await.unwrap();

    let state = log.read_state().await.unwrap();
    assert_eq!(
        state,
        LedgerState {
            exists: true,
            watermark: 5,
            completed_watermark: 1,
            completed_count: 1,
            interrupted: vec![5],
        }
    );
}
