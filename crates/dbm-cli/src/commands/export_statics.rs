//! Export-statics command implementation

use anyhow::Result;
use dbm_core::StaticKind;

use crate::cli::{AliasArgs, GlobalArgs};
use crate::commands::common::failure;
use crate::context::Session;

/// Execute the export-statics command
pub async fn execute(args: &AliasArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::open(&args.alias, global).await?;
    let result = session.migrator().export_statics().await;
    session.close().await;
    let report = result.map_err(failure)?;

    for exported in &report.written {
        println!("  Wrote {}", exported.path.display());
    }
    println!(
        "Exported {} procedure(s) and {} trigger(s)",
        report.count(StaticKind::Procedure),
        report.count(StaticKind::Trigger)
    );
    Ok(())
}
