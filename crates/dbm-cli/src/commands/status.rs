//! Status command implementation

use anyhow::{Context, Result};
use dbm_core::StaticKind;
use dbm_migrate::StatusReport;

use crate::cli::{GlobalArgs, OutputFormat, StatusArgs};
use crate::commands::common::failure;
use crate::context::Session;

/// Execute the status command
pub async fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::open(&args.alias, global).await?;
    let header = format!(
        "Status for '{}' ({} {})",
        session.alias, session.profile.driver, session.profile.database
    );
    let result = session.migrator().status().await;
    session.close().await;
    let report = result.map_err(failure)?;

    match args.output {
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&report).context("Failed to serialize status")?;
            println!("{json}");
        }
        OutputFormat::Text => {
            println!("{header}");
            print_report(&report);
        }
    }
    Ok(())
}

fn print_report(report: &StatusReport) {
    println!("  Log watermark:     {}", report.watermark);
    println!("  Completed through: {}", report.completed_watermark);
    println!("  Applied revisions: {}", report.applied_count);
    println!("  Highest revision:  {}", report.highest_available);
    if report.outstanding.is_empty() {
        println!("  Outstanding:       0");
    } else {
        let ids: Vec<String> = report.outstanding.iter().map(|id| id.to_string()).collect();
        println!(
            "  Outstanding:       {} ({})",
            report.outstanding.len(),
            ids.join(", ")
        );
    }
    println!(
        "  Static files:      {} procedure(s), {} trigger(s)",
        report.declared_procedures, report.declared_triggers
    );
    println!(
        "  Live statics:      {} procedure(s), {} trigger(s)",
        report.live.count(StaticKind::Procedure),
        report.live.count(StaticKind::Trigger)
    );

    if !report.interrupted.is_empty() {
        let ids: Vec<String> = report.interrupted.iter().map(u64::to_string).collect();
        println!(
            "WARNING: log rows {} were started but never completed",
            ids.join(", ")
        );
    }
    if report.mismatch {
        println!(
            "WARNING: live procedures or triggers have no matching static files; \
             apply will ask before dropping them"
        );
    }
}
