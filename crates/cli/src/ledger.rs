//! `combimatch ledger` — finalized combinations kept between runs.

use std::path::PathBuf;

use clap::Subcommand;
use combimatch_config::Settings;
use combimatch_recon::Ledger;

use crate::CliError;

#[derive(Subcommand)]
pub enum LedgerCommands {
    /// List finalized combinations and their total
    #[command(after_help = "\
Examples:
  combimatch ledger show
  combimatch ledger show --ledger march.json --json")]
    Show {
        /// Ledger file (default from settings)
        #[arg(long)]
        ledger: Option<PathBuf>,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Forget every finalized combination
    Clear {
        /// Ledger file (default from settings)
        #[arg(long)]
        ledger: Option<PathBuf>,
    },
}

pub fn cmd_ledger(settings: &Settings, command: LedgerCommands) -> Result<(), CliError> {
    match command {
        LedgerCommands::Show { ledger, json } => {
            let path = ledger.unwrap_or_else(|| settings.ledger_file());
            cmd_ledger_show(&Ledger::load(&path)?, json)
        }
        LedgerCommands::Clear { ledger } => {
            let path = ledger.unwrap_or_else(|| settings.ledger_file());
            let mut loaded = Ledger::load(&path)?;
            let removed = loaded.len();
            loaded.clear();
            loaded.save(&path)?;
            eprintln!("cleared {} finalized combinations from {}", removed, path.display());
            Ok(())
        }
    }
}

fn cmd_ledger_show(ledger: &Ledger, json: bool) -> Result<(), CliError> {
    if json {
        let report = serde_json::json!({
            "count": ledger.len(),
            "total": ledger.total(),
            "entries": ledger.entries(),
        });
        let json_str = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
        return Ok(());
    }

    if ledger.is_empty() {
        println!("no combinations finalized yet");
        return Ok(());
    }

    for entry in ledger.entries() {
        let positions: Vec<String> = entry
            .combination
            .items_in_original_order()
            .iter()
            .map(|i| i.position.to_string())
            .collect();
        println!(
            "#{:<3} {}  [{}]",
            entry.finalized_at + 1,
            entry.combination,
            positions.join(" ")
        );
    }
    println!("{} finalized, total sum {}", ledger.len(), ledger.total());
    Ok(())
}
