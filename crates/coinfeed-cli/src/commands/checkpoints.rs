use std::collections::BTreeMap;
use std::sync::Arc;

use coinfeed_core::{BackendGateway, HttpClient, IngestConfig, Transport};
use serde::Serialize;
use serde_json::Value;

use crate::error::CliError;

#[derive(Debug, Serialize)]
struct CheckpointReport {
    backend_url: String,
    /// Coins absent from the map have no checkpoint.
    checkpoints: BTreeMap<String, String>,
    missing: Vec<String>,
}

pub async fn run(
    http_client: Arc<dyn HttpClient>,
    config: &IngestConfig,
) -> Result<Value, CliError> {
    let gateway = BackendGateway::new(
        Transport::new(http_client).with_timeout(config.request_timeout()),
        &config.backend_url,
    );
    let found = gateway.last_valid_dates(&config.coins).await?;

    let missing = config
        .coins
        .ids()
        .filter(|id| !found.contains_key(*id))
        .map(ToString::to_string)
        .collect();
    let checkpoints = found
        .into_iter()
        .map(|(id, date)| (id.to_string(), date.to_string()))
        .collect();

    Ok(serde_json::to_value(CheckpointReport {
        backend_url: gateway.base_url().to_owned(),
        checkpoints,
        missing,
    })?)
}
