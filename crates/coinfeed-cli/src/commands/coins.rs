use coinfeed_core::IngestConfig;
use serde_json::{json, Value};

use crate::error::CliError;

pub fn run(config: &IngestConfig) -> Result<Value, CliError> {
    Ok(json!({
        "count": config.coins.len(),
        "coins": serde_json::to_value(&config.coins)?,
    }))
}
