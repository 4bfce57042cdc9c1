//! `storelink rate`: AI health and economy ratings for a store CSV.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use storelink_enrich::key::DEFAULT_KEY_FILE;
use storelink_enrich::{get_api_key, rate_table, OpenAiClient, RatingOptions, DEFAULT_MODEL};
use storelink_io::csv::{read_table, write_table};

use crate::exit_codes::{EXIT_ERROR, EXIT_IO, EXIT_MISSING_KEY};
use crate::CliError;

#[derive(Args)]
pub struct RateArgs {
    /// Store CSV to rate (normally the output of `storelink link`)
    pub input: PathBuf,

    /// Write the rated CSV here instead of overwriting the input
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Chat model name
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Pause between API calls, in milliseconds
    #[arg(long, default_value_t = 150)]
    pub delay_ms: u64,

    /// Rate only the first N rows (0 = all)
    #[arg(long, default_value_t = 0)]
    pub limit: usize,

    /// Points added to the health score of stores flagged healthy
    #[arg(long, default_value_t = 3.0)]
    pub healthy_bonus: f64,

    /// API key (otherwise STORELINK_OPENAI_KEY, then the key file)
    #[arg(long)]
    pub api_key: Option<String>,

    /// File holding the API key
    #[arg(long, default_value = DEFAULT_KEY_FILE)]
    pub key_file: PathBuf,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, env = "STORELINK_OPENAI_BASE_URL")]
    pub base_url: Option<String>,
}

pub fn cmd_rate(args: RateArgs) -> Result<(), CliError> {
    // Resolve the key before touching the input
    let lookup = get_api_key(args.api_key.as_deref(), &args.key_file);
    let source = lookup.source;
    let api_key = lookup.require().map_err(|e| {
        CliError::new(EXIT_MISSING_KEY, e.to_string()).with_hint(format!(
            "pass --api-key, set STORELINK_OPENAI_KEY, or put the key in {}",
            args.key_file.display()
        ))
    })?;
    log::info!("using API key from {}", source.as_str());

    let mut table = read_table(&args.input, None)
        .map_err(|e| CliError::new(EXIT_IO, format!("cannot read {e}")))?;

    let client = match args.base_url {
        Some(base_url) => OpenAiClient::with_base_url(api_key, args.model, base_url),
        None => OpenAiClient::new(api_key, args.model),
    }
    .map_err(|e| CliError::new(EXIT_ERROR, e.to_string()))?;

    let options = RatingOptions {
        limit: args.limit,
        delay: Duration::from_millis(args.delay_ms),
        healthy_bonus: args.healthy_bonus,
    };

    eprintln!("rating {} with {}", args.input.display(), client.model());
    let summary = rate_table(&mut table, &client, &options);

    let output = args.output.unwrap_or(args.input);
    write_table(&output, &table)
        .map_err(|e| CliError::new(EXIT_IO, format!("cannot write output: {e}")))?;
    eprintln!("wrote {}", output.display());

    eprintln!(
        "{} rows considered: {} scored, {} defaulted, {} unavailable, {} already rated",
        summary.considered, summary.scored, summary.defaulted, summary.unavailable, summary.skipped,
    );

    Ok(())
}
