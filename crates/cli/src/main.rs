// sheetsum CLI - rule-based totals over spreadsheet files

mod calc;
mod exit_codes;
mod history;
mod sheets;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use exit_codes::{EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "sheetsum")]
#[command(about = "Sum cells, rows and columns across spreadsheets with layered row filters")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Settings file to use instead of the per-user one
    #[arg(long = "config", value_name = "PATH", global = true, env = "SHEETSUM_CONFIG")]
    config_file: Option<PathBuf>,

    /// History file to use instead of the configured one
    #[arg(long = "history", value_name = "PATH", global = true, env = "SHEETSUM_HISTORY")]
    history_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a rule set against spreadsheet files
    #[command(after_help = "\
Examples:
  sheetsum calc totals.toml
  sheetsum calc totals.toml extra.xlsx --label 'March close'
  sheetsum calc totals.toml --trace
  sheetsum calc totals.toml --json --no-history")]
    Calc {
        /// Rule set (.toml)
        rules: PathBuf,

        /// Additional files to load, after those listed in the rule set
        files: Vec<PathBuf>,

        /// Label recorded in history (defaults to the rule set name)
        #[arg(long)]
        label: Option<String>,

        /// Output JSON (total, label, per-rule steps)
        #[arg(long)]
        json: bool,

        /// Do not record the result in history
        #[arg(long)]
        no_history: bool,

        /// Print how each rule contributed
        #[arg(long)]
        trace: bool,

        /// Skip files that fail to load instead of stopping
        #[arg(long)]
        keep_going: bool,
    },

    /// List the sheets of a file with a short preview
    #[command(after_help = "\
Examples:
  sheetsum sheets sales.xlsx
  sheetsum sheets export.csv --json")]
    Sheets {
        file: PathBuf,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or clear calculation history
    #[command(subcommand)]
    History(history::HistoryCommands),
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // Also routes `log` records from the library crates
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = match &cli.config_file {
        Some(path) => sheetsum_config::Settings::load_from(path),
        None => sheetsum_config::Settings::load(),
    };
    let history_path = cli.history_file.unwrap_or_else(|| settings.history_file());

    let result = match cli.command {
        None => {
            // No subcommand = show help
            eprintln!("Usage: sheetsum <command> [options]");
            eprintln!("       sheetsum --help for more information");
            Ok(())
        }
        Some(Commands::Calc {
            rules,
            files,
            label,
            json,
            no_history,
            trace,
            keep_going,
        }) => calc::cmd_calc(
            &settings,
            calc::CalcArgs {
                rules,
                files,
                label,
                json,
                history: (!no_history).then_some(history_path),
                trace,
                keep_going,
            },
        ),
        Some(Commands::Sheets { file, json }) => sheets::cmd_sheets(file, json),
        Some(Commands::History(cmd)) => history::cmd_history(cmd, &settings, history_path),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self::new(EXIT_ERROR, msg)
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Print `value` as pretty JSON on stdout.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| CliError::other(e.to_string()))?;
    println!("{}", json);
    Ok(())
}
