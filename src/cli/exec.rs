//! Exec subcommand implementation.
//!
//! Feeds a JSON argument list straight to [`ScanExecutor::execute`] and
//! prints the response envelope, the same way an embedding host would.

use crate::error::{CliError, CliResult};
use crate::executor::ScanExecutor;
use clap::Parser;
use serde_json::Value;

/// Run a scan from a JSON argument list.
#[derive(Parser, Debug)]
pub struct ExecCommand {
    /// Argument list, e.g. '["10.0.0.1", "10.0.0.20", "22,80", 30]'
    #[arg(value_name = "ARGS", default_value = "[]")]
    pub args: String,

    /// Pretty-print the envelope
    #[arg(long)]
    pub pretty: bool,
}

impl ExecCommand {
    /// Execute the exec command.
    pub async fn execute(&self) -> CliResult<()> {
        let args = parse_args(&self.args)?;
        let response = ScanExecutor::new().execute(&args).await;
        let json = if self.pretty {
            response.to_json_pretty()?
        } else {
            response.to_json()?
        };
        println!("{json}");
        Ok(())
    }
}

/// Decode the argument list; a lone scalar counts as a one-element list.
pub fn parse_args(raw: &str) -> CliResult<Vec<Value>> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| CliError::InvalidArguments(format!("argument list is not JSON: {e}")))?;
    Ok(match value {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => vec![other],
    })
}
