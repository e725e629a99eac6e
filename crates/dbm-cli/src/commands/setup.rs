//! Setup command implementation

use anyhow::Result;
use dbm_core::{ConnectionProfile, Driver, ProfileAlias};

use crate::cli::{DriverArg, GlobalArgs, SetupArgs};
use crate::commands::common::config_failure;
use crate::context::profile_store;

/// Execute the setup command
pub async fn execute(args: &SetupArgs, global: &GlobalArgs) -> Result<()> {
    let alias = ProfileAlias::parse(&args.alias).map_err(config_failure)?;
    let profile = ConnectionProfile {
        hostname: args.hostname.clone(),
        port: args.port,
        username: args.username.clone(),
        password: args.password.clone(),
        database: args.database.clone(),
        directory: args.directory.clone(),
        driver: match args.driver {
            DriverArg::Mysql => Driver::Mysql,
            DriverArg::Duckdb => Driver::Duckdb,
        },
    };

    // Refuse to save a profile whose migrations tree is incomplete
    profile
        .migrations_root()
        .ensure_exists()
        .map_err(config_failure)?;

    let path = profile_store(global)?
        .save(&alias, &profile)
        .map_err(config_failure)?;
    println!("Saved profile '{alias}' to {}", path.display());
    Ok(())
}
