use coinfeed_core::Orchestrator;
use serde_json::{json, Value};

use crate::error::CliError;

pub async fn run(orchestrator: &Orchestrator) -> Result<Value, CliError> {
    let summary = orchestrator.run_current().await;
    Ok(json!({ "pass": "current", "summary": summary }))
}
