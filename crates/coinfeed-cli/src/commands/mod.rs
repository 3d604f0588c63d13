mod backfill;
mod checkpoints;
mod coins;
mod current;
mod history;

use std::sync::Arc;

use coinfeed_core::{CoinId, HttpClient, IngestConfig, Orchestrator, ReqwestHttpClient};
use serde_json::Value;
use tracing::debug;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<Value, CliError> {
    let config = load_config(cli, |key| std::env::var(key).ok())?;
    debug!(
        upstream = %config.upstream_url,
        backend = %config.backend_url,
        coins = config.coins.len(),
        "configuration resolved"
    );

    let http_client: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());

    match &cli.command {
        Command::Current => current::run(&Orchestrator::from_config(http_client, &config)).await,
        Command::History => history::run(&Orchestrator::from_config(http_client, &config)).await,
        Command::Backfill(args) => {
            backfill::run(args, &Orchestrator::from_config(http_client, &config)).await
        }
        Command::Checkpoints => checkpoints::run(http_client, &config).await,
        Command::Coins => coins::run(&config),
    }
}

/// Defaults, then `--config`, then environment (through `lookup`), then flags.
pub fn load_config(
    cli: &Cli,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<IngestConfig, CliError> {
    let mut config = match &cli.config {
        Some(path) => IngestConfig::from_file(path)?,
        None => IngestConfig::default(),
    }
    .with_overrides_from(lookup);

    if let Some(url) = &cli.upstream_url {
        config.upstream_url = url.clone();
    }
    if let Some(url) = &cli.backend_url {
        config.backend_url = url.clone();
    }
    if let Some(max_retries) = cli.max_retries {
        config.max_retries = max_retries;
    }
    if let Some(rate_limit_ms) = cli.rate_limit_ms {
        config.rate_limit_delay_ms = rate_limit_ms;
    }
    if let Some(backoff_ms) = cli.backoff_ms {
        config.backoff_step_ms = Some(backoff_ms);
    }
    if !cli.coins.is_empty() {
        let ids = cli
            .coins
            .iter()
            .map(|raw| CoinId::parse(raw))
            .collect::<Result<Vec<_>, _>>()?;
        config.coins = config.coins.restrict_to(&ids)?;
    }

    config.validate()?;
    Ok(config)
}
