use super::*;
use std::fs;
use tempfile::TempDir;

fn store_with(files: &[(&str, &str)]) -> (TempDir, RevisionStore) {
    let dir = tempfile::tempdir().unwrap();
    for (name, body) in files {
        fs::write(dir.path().join(name), body).unwrap();
    }
    let store = RevisionStore::new(dir.path());
    (dir, store)
}

#[test]
fn test_list_available_sorted_numerically() {
    let (_dir, store) = store_with(&[
        ("10.sql", "SELECT 10;"),
        ("2.sql", "SELECT 2;"),
        ("1.sql", "SELECT 1;"),
    ]);

    let ids: Vec<u64> = store
        .list_available()
        .unwrap()
        .iter()
        .map(|f| f.id.get())
        .collect();
    assert_eq!(ids, vec![1, 2, 10]);
}

#[test]
fn test_list_available_ignores_other_extensions() {
    let (dir, store) = store_with(&[
        ("1.sql", "SELECT 1;"),
        ("README.md", "notes"),
        ("2.sql.bak", "old"),
    ]);
    fs::create_dir(dir.path().join("3.sql")).unwrap();

    let files = store.list_available().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].file_name, "1.sql");
}

#[test]
fn test_list_available_malformed_name() {
    let (_dir, store) = store_with(&[("1.sql", ""), ("add_users.sql", "")]);
    let err = store.list_available().unwrap_err();
    assert!(matches!(err, CoreError::MalformedRevisionName { .. }));
}

#[test]
fn test_list_available_duplicate_identifier() {
    let (_dir, store) = store_with(&[("1.sql", ""), ("01.sql", "")]);
    match store.list_available().unwrap_err() {
        CoreError::DuplicateRevision { id, first, second } => {
            assert_eq!(id, 1);
            assert_eq!(first, "01.sql");
            assert_eq!(second, "1.sql");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_list_available_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let store = RevisionStore::new(dir.path().join("revisions"));
    assert!(matches!(
        store.list_available().unwrap_err(),
        CoreError::DirectoryNotFound { .. }
    ));
}

#[test]
fn test_load_from_filters_and_reads_bodies() {
    let (_dir, store) = store_with(&[
        ("1.sql", "CREATE TABLE a (id INT);"),
        ("3.sql", "CREATE TABLE b (id INT);"),
        ("5.sql", "CREATE TABLE c (id INT);"),
    ]);

    let revisions = store.load_from(2).unwrap();
    assert_eq!(revisions.len(), 2);
    assert_eq!(revisions[0].id.get(), 3);
    assert_eq!(revisions[0].display_name, "3.sql");
    assert_eq!(revisions[0].script, "CREATE TABLE b (id INT);");
    assert_eq!(revisions[1].id.get(), 5);
}

#[test]
fn test_load_from_past_end_is_empty() {
    let (_dir, store) = store_with(&[("1.sql", "SELECT 1;")]);
    assert!(store.load_from(2).unwrap().is_empty());
}

#[test]
fn test_load_from_rejects_undo_marker() {
    let (_dir, store) = store_with(&[(
        "1.sql",
        "CREATE TABLE a (id INT);\n-- //@UNDO\nDROP TABLE a;",
    )]);
    let err = store.load_from(1).unwrap_err();
    assert!(matches!(err, CoreError::UnsupportedUndoMarker { .. }));
}

#[test]
fn test_highest_available() {
    let (_dir, store) = store_with(&[("4.sql", ""), ("12.sql", ""), ("7.sql", "")]);
    assert_eq!(store.highest_available().unwrap(), 12);
}

#[test]
fn test_highest_available_empty() {
    let (_dir, store) = store_with(&[]);
    assert_eq!(store.highest_available().unwrap(), 0);
}
