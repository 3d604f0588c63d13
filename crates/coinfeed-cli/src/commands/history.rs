use coinfeed_core::Orchestrator;
use serde_json::{json, Value};

use crate::error::CliError;

pub async fn run(orchestrator: &Orchestrator) -> Result<Value, CliError> {
    let today = orchestrator.today();
    let summary = orchestrator.run_history().await?;
    Ok(json!({
        "pass": "history",
        "through": today.to_string(),
        "summary": summary,
    }))
}
