//! CLI argument definitions for coinfeed.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `current` | Ingest one current snapshot per coin |
//! | `history` | Resume every coin from its backend checkpoint through today |
//! | `backfill` | Ingest the last N days for every coin |
//! | `checkpoints` | Print each coin's last valid date |
//! | `coins` | Print the coin catalog |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--config` | `COINFEED_CONFIG` | JSON config file |
//! | `--upstream-url` | CoinGecko v3 | Upstream API base URL |
//! | `--backend-url` | `http://localhost:8080/api/v1/coins` | Ingestion backend URL |
//! | `--max-retries` | `10` | Attempts per unit of work |
//! | `--rate-limit-ms` | `5000` | Spacing between upstream units |
//! | `--backoff-ms` | rate limit | Retry backoff step |
//! | `--coin` | all | Restrict the catalog (repeatable) |
//! | `--log-level` | `RUST_LOG` or `info` | Log filter directive |
//! | `--pretty` | `false` | Pretty-print JSON output |
//!
//! # Examples
//!
//! ```bash
//! coinfeed current
//! coinfeed history --coin bitcoin --coin ethereum
//! coinfeed backfill --days 30 --rate-limit-ms 2000
//! COINFEED_BACKEND_URL=http://backend:8080/api/v1/coins coinfeed checkpoints --pretty
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Coinfeed - CoinGecko to backend ingestion client
#[derive(Debug, Parser)]
#[command(
    name = "coinfeed",
    author,
    version,
    about = "CoinGecko market-data ingestion client",
    long_about = "Coinfeed polls CoinGecko for a fixed catalog of coins, normalizes every \
response into one flat record and posts it to an ingestion backend.\n\
\n\
Settings come from the defaults, then an optional --config file, then the \
COINFEED_UPSTREAM_URL, COINFEED_BACKEND_URL and COINGECKO_API_KEY environment \
variables, then the flags below."
)]
pub struct Cli {
    /// JSON config file; absent keys keep their defaults.
    #[arg(long, global = true, env = "COINFEED_CONFIG")]
    pub config: Option<PathBuf>,

    /// Upstream API base URL.
    #[arg(long, global = true)]
    pub upstream_url: Option<String>,

    /// Ingestion backend URL.
    #[arg(long, global = true)]
    pub backend_url: Option<String>,

    /// Attempts per unit of work, the first one included.
    #[arg(long, global = true)]
    pub max_retries: Option<u32>,

    /// Minimum spacing between upstream units in milliseconds.
    #[arg(long, global = true)]
    pub rate_limit_ms: Option<u64>,

    /// Linear retry backoff step in milliseconds; defaults to the rate limit.
    #[arg(long, global = true)]
    pub backoff_ms: Option<u64>,

    /// Restrict the run to these catalog coin ids.
    #[arg(long = "coin", global = true, value_name = "COIN_ID")]
    pub coins: Vec<String>,

    /// Log filter directive, e.g. `debug` or `coinfeed_core=trace`.
    ///
    /// Overrides RUST_LOG.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Ingest the current snapshot of every coin.
    Current,

    /// Resume historical ingestion from each coin's backend checkpoint.
    ///
    /// Coins without a checkpoint start 365 days back. The pass stops if a
    /// checkpoint cannot be read.
    History,

    /// Ingest a fixed window of the most recent days for every coin.
    ///
    /// # Examples
    ///
    ///   coinfeed backfill --days 7
    Backfill(BackfillArgs),

    /// Print the backend's last valid date for every coin.
    Checkpoints,

    /// Print the configured coin catalog.
    Coins,
}

/// Arguments for the `backfill` command.
#[derive(Debug, Args)]
pub struct BackfillArgs {
    /// Number of days to fetch, today included.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub days: u32,
}
