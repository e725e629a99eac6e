//! Apply command implementation

use anyhow::Result;
use dbm_migrate::Confirm;
use std::io::{BufRead, Write};

use crate::cli::{AliasArgs, GlobalArgs};
use crate::commands::common::failure;
use crate::context::Session;

/// Asks on stderr and reads the answer from stdin. End of input means no.
struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, question: &str) -> bool {
        eprint!("{question} [y/N] ");
        let _ = std::io::stderr().flush();
        let mut answer = String::new();
        match std::io::stdin().lock().read_line(&mut answer) {
            Ok(0) | Err(_) => false,
            Ok(_) => is_yes(&answer),
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Execute the apply command
pub async fn execute(args: &AliasArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::open(&args.alias, global).await?;
    let result = session.migrator().apply(&mut StdinConfirm).await;
    session.close().await;
    let report = result.map_err(failure)?;

    println!(
        "Statics: dropped {} procedure(s) and {} trigger(s), created {} procedure(s) and {} trigger(s)",
        report.dropped.procedures_dropped,
        report.dropped.triggers_dropped,
        report.created.procedures_created,
        report.created.triggers_created
    );
    if report.applied.is_empty() {
        println!("No outstanding revisions (watermark {})", report.watermark);
    } else {
        for revision in &report.applied {
            println!("  Applied {}", revision.display_name);
        }
        println!(
            "Applied {} revision(s), watermark {} -> {}",
            report.applied.len(),
            report.previous_watermark,
            report.watermark
        );
    }
    Ok(())
}
