//! Describe command implementation

use anyhow::Result;

use crate::cli::{AliasArgs, GlobalArgs};
use crate::context::load_profile;

/// Execute the describe command
pub async fn execute(args: &AliasArgs, global: &GlobalArgs) -> Result<()> {
    let (alias, profile) = load_profile(&args.alias, global)?;

    println!("Profile: {alias}");
    println!("  driver:    {}", profile.driver);
    println!("  hostname:  {}", profile.hostname);
    println!("  port:      {}", profile.port);
    println!("  username:  {}", profile.username);
    println!("  password:  {}", profile.masked_password());
    println!("  database:  {}", profile.database);
    println!("  directory: {}", profile.directory.display());
    Ok(())
}
