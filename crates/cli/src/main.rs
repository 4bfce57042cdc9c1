// storelink CLI - link store registries against ZIP boundaries and
// a healthy-store reference list, then optionally rate the result.

mod exit_codes;
mod link;
mod rate;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{EXIT_SUCCESS, EXIT_USAGE};

/// Environment variable read by the logger (e.g. STORELINK_LOG=debug).
const LOG_ENV_VAR: &str = "STORELINK_LOG";

#[derive(Parser)]
#[command(name = "storelink")]
#[command(about = "Link store registries to ZIP boundaries and a healthy-store list")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// Log pipeline stages to stderr (overridden by STORELINK_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run linkage from a TOML config file and write the annotated CSV
    #[command(after_help = "\
Examples:
  storelink link nyc.link.toml
  storelink link nyc.link.toml --json
  storelink link nyc.link.toml --output stores.csv")]
    Link {
        /// Path to the .link.toml config file
        config: PathBuf,

        /// Print the JSON run report to stdout
        #[arg(long)]
        json: bool,

        /// Write the CSV here instead of [output].csv
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Check a config and the column layout of its sources without writing output
    #[command(after_help = "\
Examples:
  storelink validate nyc.link.toml")]
    Validate {
        /// Path to the .link.toml config file
        config: PathBuf,
    },

    /// Add AI health and economy ratings to a store CSV
    #[command(after_help = "\
Examples:
  storelink rate \"NYC Food Stamp Stores.csv\"
  storelink rate stores.csv --output rated.csv --limit 25
  STORELINK_OPENAI_KEY=sk-... storelink rate stores.csv --model gpt-4o")]
    Rate(rate::RateArgs),
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  storelink-linkage ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  storelink-linkage ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::new().filter_or(LOG_ENV_VAR, default_level))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        None => {
            // No subcommand = show usage
            eprintln!("Usage: storelink <command> [options]");
            eprintln!("       storelink --help for more information");
            Err(CliError {
                code: EXIT_USAGE,
                message: String::new(),
                hint: None,
            })
        }
        Some(Commands::Link { config, json, output }) => link::cmd_link(config, json, output),
        Some(Commands::Validate { config }) => link::cmd_validate(config),
        Some(Commands::Rate(args)) => rate::cmd_rate(args),
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

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
