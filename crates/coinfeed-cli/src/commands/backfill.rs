use coinfeed_core::Orchestrator;
use serde_json::{json, Value};

use crate::cli::BackfillArgs;
use crate::error::CliError;

pub async fn run(args: &BackfillArgs, orchestrator: &Orchestrator) -> Result<Value, CliError> {
    let summary = orchestrator.run_backfill(args.days).await?;
    Ok(json!({
        "pass": "backfill",
        "days": args.days,
        "summary": summary,
    }))
}
