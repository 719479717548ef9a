use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::{self, CommandReport};

#[derive(Debug, Parser)]
#[command(
    name = "save-sync",
    version,
    about = "Reconcile the save index with the save files on disk"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Restore missing index entries, drop stale ones, and persist on change.
    Sync {
        /// Run the pass but leave the stored index untouched.
        #[arg(long)]
        dry_run: bool,
        #[arg(long)]
        json: bool,
    },
    /// Show resolved paths, config, and per-slot presence.
    Status {
        #[arg(long)]
        json: bool,
    },
    /// Report slots whose index entry disagrees with the disk.
    Verify {
        /// Fail when any slot is out of sync.
        #[arg(long)]
        strict: bool,
        #[arg(long)]
        json: bool,
    },
}

fn print_report(report: &CommandReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    let verdict = if report.ok { "ok" } else { "failed" };
    println!("{}: {verdict}", report.command);
    for detail in &report.details {
        println!("  {detail}");
    }
    for issue in &report.issues {
        println!("  issue: {issue}");
    }
    Ok(())
}

/// Returns whether the report came back clean.
pub fn run() -> Result<bool> {
    let cli = Cli::parse();
    let (report, json) = match cli.command {
        Command::Sync { dry_run, json } => (
            commands::sync::run(&commands::sync::SyncOptions { dry_run })?,
            json,
        ),
        Command::Status { json } => (commands::status::run()?, json),
        Command::Verify { strict, json } => (
            commands::verify::run(&commands::verify::VerifyOptions { strict })?,
            json,
        ),
    };
    print_report(&report, json)?;
    Ok(report.ok)
}
