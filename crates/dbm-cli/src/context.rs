//! Runtime context for CLI commands

use anyhow::Result;
use dbm_core::{ConnectionProfile, Driver, ProfileAlias, ProfileStore};
use dbm_db::{Database, DuckDbBackend, MySqlBackend};
use dbm_migrate::{MigrateError, Migrator};

use crate::cli::GlobalArgs;
use crate::commands::common::{config_failure, failure};

/// Profile store selected by `--home` / `DBMARSHAL_HOME`, else `~/.dbmarshal`.
pub(crate) fn profile_store(global: &GlobalArgs) -> Result<ProfileStore> {
    match &global.home {
        Some(home) => Ok(ProfileStore::new(home)),
        None => ProfileStore::from_env().map_err(config_failure),
    }
}

/// Load the profile saved under `alias`.
pub(crate) fn load_profile(
    alias: &str,
    global: &GlobalArgs,
) -> Result<(ProfileAlias, ConnectionProfile)> {
    let alias = ProfileAlias::parse(alias).map_err(config_failure)?;
    let profile = profile_store(global)?
        .load(&alias)
        .map_err(config_failure)?;
    Ok((alias, profile))
}

/// An open connection for one command, plus the profile it came from.
pub(crate) struct Session {
    pub alias: ProfileAlias,
    pub profile: ConnectionProfile,
    pub db: Box<dyn Database>,
}

impl Session {
    /// Load the profile and connect with its driver.
    pub async fn open(alias: &str, global: &GlobalArgs) -> Result<Self> {
        let (alias, profile) = load_profile(alias, global)?;
        let db: Box<dyn Database> = match profile.driver {
            Driver::Mysql => Box::new(
                MySqlBackend::connect(&profile)
                    .await
                    .map_err(|e| failure(MigrateError::Database(e)))?,
            ),
            Driver::Duckdb => Box::new(
                DuckDbBackend::new(&profile.database)
                    .map_err(|e| failure(MigrateError::Database(e)))?,
            ),
        };
        log::debug!("Opened {} connection for profile '{alias}'", db.db_type());
        Ok(Self { alias, profile, db })
    }

    pub fn migrator(&self) -> Migrator<'_> {
        Migrator::new(self.db.as_ref(), self.profile.migrations_root())
    }

    /// Close the connection. Failures are logged, never returned.
    pub async fn close(self) {
        if let Err(e) = self.db.close().await {
            log::warn!("Failed to close connection for '{}': {e}", self.alias);
        }
    }
}
