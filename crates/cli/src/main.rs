// CombiMatch CLI - find subsets of amounts that add up to a target

mod exit_codes;
mod find;
mod ledger;
mod parse;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use combimatch_config::{InputMode, Settings};
use combimatch_recon::config::{MAX_COMBINATION_SIZE, MAX_RESULTS_LIMIT};
use combimatch_recon::ReconError;

use exit_codes::{recon_exit_code, EXIT_IO, EXIT_PARSE, EXIT_SUCCESS, EXIT_USAGE};
use ledger::LedgerCommands;

#[derive(Parser)]
#[command(name = "combimatch")]
#[command(about = "Find combinations of amounts that add up to a target")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// More log output on stderr (-v debug, -vv trace). RUST_LOG also works.
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Settings file (default: <config dir>/combimatch/settings.json)
    #[arg(long, global = true, env = "COMBIMATCH_SETTINGS", value_name = "FILE")]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for combinations that sum to the target
    #[command(after_help = "\
Examples:
  combimatch find invoices.txt --target 1500
  combimatch find --target 499.99 --tolerance 0.05 < amounts.txt
  combimatch find bank.csv --mode csv --column Amount --target 1200 --json
  combimatch find amounts.txt --target 500 --stream --max-results 5
  combimatch find amounts.txt --target 500 --ledger ledger.json --finalize 1")]
    Find {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        search: SearchArgs,

        /// Print matches as they are found instead of a sorted table
        #[arg(long)]
        stream: bool,

        /// Output JSON to stdout instead of the human table
        #[arg(long)]
        json: bool,

        /// Ledger file of finalized combinations (default from settings)
        #[arg(long)]
        ledger: Option<PathBuf>,

        /// Finalize the N-th listed result (1-based) into the ledger
        #[arg(long, value_name = "N")]
        finalize: Option<usize>,
    },

    /// Report feasibility and size pruning without searching
    #[command(after_help = "\
Examples:
  combimatch check amounts.txt --target 1500
  combimatch check amounts.txt --target 1500 --min-size 2 --max-size 20 --json")]
    Check {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        search: SearchArgs,

        /// Ledger file whose consumed items are left out
        #[arg(long)]
        ledger: Option<PathBuf>,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Inspect or reset finalized combinations
    #[command(subcommand)]
    Ledger(LedgerCommands),
}

#[derive(Args)]
pub struct InputArgs {
    /// Input file (omit to read from stdin)
    pub input: Option<PathBuf>,

    /// How the input is split into amounts (default from settings)
    #[arg(long, short = 'm')]
    pub mode: Option<ModeArg>,

    /// CSV column: header name or letter (csv mode)
    #[arg(long, short = 'c')]
    pub column: Option<String>,

    /// CSV file has no header row (csv mode)
    #[arg(long)]
    pub no_headers: bool,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Target sum
    #[arg(long, short = 't', allow_hyphen_values = true)]
    pub target: String,

    /// Accept sums within this distance of the target
    #[arg(long)]
    pub tolerance: Option<String>,

    /// Smallest combination size
    #[arg(long)]
    pub min_size: Option<usize>,

    /// Largest combination size
    #[arg(long)]
    pub max_size: Option<usize>,

    /// Keep at most this many results
    #[arg(long)]
    pub max_results: Option<usize>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Line,
    Comma,
    Csv,
}

impl From<ModeArg> for InputMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Line => InputMode::Line,
            ModeArg::Comma => InputMode::Comma,
            ModeArg::Csv => InputMode::Csv,
        }
    }
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  combimatch-recon ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  combimatch-recon ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

fn init_logging(verbose: u8) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    match verbose {
        0 => {}
        1 => {
            builder.filter_level(log::LevelFilter::Debug);
        }
        _ => {
            builder.filter_level(log::LevelFilter::Trace);
        }
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = match &cli.settings {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };

    let result = match cli.command {
        None => {
            // No subcommand = show help
            eprintln!("Usage: combimatch <command> [options]");
            eprintln!("       combimatch --help for more information");
            Ok(())
        }
        Some(Commands::Find { input, search, stream, json, ledger, finalize }) => {
            find::cmd_find(&settings, input, search, stream, json, ledger, finalize)
        }
        Some(Commands::Check { input, search, ledger, json }) => {
            find::cmd_check(&settings, input, search, ledger, json)
        }
        Some(Commands::Ledger(command)) => ledger::cmd_ledger(&settings, command),
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

    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(EXIT_IO, msg)
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::new(EXIT_PARSE, msg)
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ReconError> for CliError {
    fn from(err: ReconError) -> Self {
        let code = recon_exit_code(&err);
        let hint = match &err {
            ReconError::InvalidParams(_) => Some(format!(
                "sizes must be within 1..={MAX_COMBINATION_SIZE}, max results within 1..={MAX_RESULTS_LIMIT}"
            )),
            ReconError::MissingColumn { .. } => {
                Some("pass a header name or a column letter with --column".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }
}
