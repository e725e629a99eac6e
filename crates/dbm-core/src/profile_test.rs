use super::*;

fn sample_profile() -> ConnectionProfile {
    ConnectionProfile {
        hostname: "db.internal".to_string(),
        port: 3306,
        username: "deploy".to_string(),
        password: "s3cret".to_string(),
        database: "shop".to_string(),
        directory: PathBuf::from("/srv/shop/db"),
        driver: Driver::Mysql,
    }
}

#[test]
fn test_parse_minimal_profile_defaults() {
    let yaml = r#"
hostname: localhost
username: root
password: ""
database: shop
directory: /tmp/db
"#;
    let profile: ConnectionProfile = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(profile.port, 3306);
    assert_eq!(profile.driver, Driver::Mysql);
    assert_eq!(profile.migrations_root().revisions_dir(), PathBuf::from("/tmp/db/revisions"));
    assert_eq!(profile.migrations_root().statics_dir(), PathBuf::from("/tmp/db/statics"));
}

#[test]
fn test_parse_profile_rejects_unknown_fields() {
    let yaml = r#"
hostname: localhost
username: root
password: ""
database: shop
directory: /tmp/db
schema: nope
"#;
    assert!(serde_yaml::from_str::<ConnectionProfile>(yaml).is_err());
}

#[test]
fn test_parse_duckdb_driver() {
    let yaml = r#"
hostname: ""
username: ""
password: ""
database: /tmp/local.duckdb
directory: /tmp/db
driver: duckdb
"#;
    let profile: ConnectionProfile = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(profile.driver, Driver::Duckdb);
}

#[test]
fn test_masked_password() {
    assert_eq!(sample_profile().masked_password(), "******");
}

#[test]
fn test_alias_validation() {
    assert!(ProfileAlias::parse("prod").is_ok());
    assert!(ProfileAlias::parse("shop_staging-2").is_ok());
    assert!(ProfileAlias::parse("").is_err());
    assert!(ProfileAlias::parse("../etc").is_err());
    assert!(ProfileAlias::parse("has space").is_err());
}

#[test]
fn test_save_and_load_round_trip() {
    let home = tempfile::tempdir().unwrap();
    let store = ProfileStore::new(home.path().join("profiles"));
    let alias = ProfileAlias::parse("prod").unwrap();

    let path = store.save(&alias, &sample_profile()).unwrap();
    assert_eq!(path, home.path().join("profiles").join("prod.yml"));

    let loaded = store.load(&alias).unwrap();
    assert_eq!(loaded, sample_profile());
}

#[cfg(unix)]
#[test]
fn test_saved_profile_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let home = tempfile::tempdir().unwrap();
    let store = ProfileStore::new(home.path());
    let alias = ProfileAlias::parse("prod").unwrap();
    let path = store.save(&alias, &sample_profile()).unwrap();

    let mode = std::fs::metadata(path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[cfg(unix)]
#[test]
fn test_resaving_narrows_existing_profile_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let home = tempfile::tempdir().unwrap();
    let store = ProfileStore::new(home.path());
    let alias = ProfileAlias::parse("prod").unwrap();
    let path = store.profile_path(&alias);
    std::fs::write(&path, "stale").unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

    store.save(&alias, &sample_profile()).unwrap();

    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
    assert_eq!(store.load(&alias).unwrap(), sample_profile());
}

#[test]
fn test_load_missing_profile() {
    let home = tempfile::tempdir().unwrap();
    let store = ProfileStore::new(home.path());
    let alias = ProfileAlias::parse("missing").unwrap();
    assert!(matches!(
        store.load(&alias).unwrap_err(),
        CoreError::ProfileNotFound { .. }
    ));
}

#[test]
fn test_load_corrupt_profile() {
    let home = tempfile::tempdir().unwrap();
    let store = ProfileStore::new(home.path());
    let alias = ProfileAlias::parse("broken").unwrap();
    std::fs::write(store.profile_path(&alias), "hostname: [unclosed").unwrap();
    assert!(matches!(
        store.load(&alias).unwrap_err(),
        CoreError::ProfileParse { .. }
    ));
}

#[test]
fn test_migrations_root_ensure_exists() {
    let dir = tempfile::tempdir().unwrap();
    let root = MigrationsRoot::new(dir.path());
    assert!(root.ensure_exists().is_err());

    std::fs::create_dir(root.revisions_dir()).unwrap();
    std::fs::create_dir(root.statics_dir()).unwrap();
    assert!(root.ensure_exists().is_ok());
}
