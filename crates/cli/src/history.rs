//! `sheetsum history` — past results, newest first.

use std::path::PathBuf;

use clap::Subcommand;

use sheetsum_config::{HistoryStore, Settings};

use crate::exit_codes::EXIT_HISTORY_IO;
use crate::{print_json, CliError};

#[derive(Subcommand)]
pub enum HistoryCommands {
    /// List recorded results
    #[command(after_help = "\
Examples:
  sheetsum history list
  sheetsum history list --limit 5 --json")]
    List {
        /// Show at most this many entries
        #[arg(long)]
        limit: Option<usize>,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete all recorded results
    Clear,
}

pub fn cmd_history(cmd: HistoryCommands, settings: &Settings, path: PathBuf) -> Result<(), CliError> {
    let store = HistoryStore::new(path).with_limit(settings.history_limit);

    match cmd {
        HistoryCommands::List { limit, json } => {
            let mut entries = store.load();
            if let Some(limit) = limit {
                entries.truncate(limit);
            }

            if json {
                return print_json(&entries);
            }
            if entries.is_empty() {
                println!("No history.");
                return Ok(());
            }
            for entry in &entries {
                println!(
                    "{}  {:<24} {:<24} {:>14}",
                    entry.time,
                    entry.file_name,
                    entry.sheet_name,
                    settings.format_result(entry.result)
                );
            }
            Ok(())
        }
        HistoryCommands::Clear => {
            store
                .clear()
                .map_err(|e| CliError::new(EXIT_HISTORY_IO, e))?;
            println!("History cleared.");
            Ok(())
        }
    }
}
