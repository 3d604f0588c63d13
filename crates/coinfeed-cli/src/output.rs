use std::io::{self, Write};

use serde_json::Value;

use crate::error::CliError;

/// Writes one JSON document to stdout. Logs go to stderr.
pub fn render(payload: &Value, pretty: bool) -> Result<(), CliError> {
    let rendered = if pretty {
        serde_json::to_string_pretty(payload)?
    } else {
        serde_json::to_string(payload)?
    };

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{rendered}")?;
    handle.flush()?;
    Ok(())
}
