//! Stdout sink for root reports.

use async_trait::async_trait;
use bp_error::{OutputError, Result};
use bp_traits::ResultSink;
use bp_types::RootReport;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Output format for stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON Lines format - one report per line (default)
    #[default]
    Jsonl,

    /// Pretty-printed JSON
    Json,
}

/// Prints each [`RootReport`] to stdout.
///
/// JSONL output is one report per line, suitable for piping to `jq`.
pub struct StdoutSink {
    format: OutputFormat,
}

impl StdoutSink {
    /// Create a new StdoutSink with the specified format.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Create a new StdoutSink with JSONL format (default).
    pub fn jsonl() -> Self {
        Self::new(OutputFormat::Jsonl)
    }

    /// Create a new StdoutSink with pretty-printed JSON format.
    pub fn json() -> Self {
        Self::new(OutputFormat::Json)
    }

    fn render(&self, report: &RootReport) -> Result<String> {
        let rendered = match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report),
            OutputFormat::Jsonl => serde_json::to_string(report),
        };
        Ok(rendered.map_err(|e| OutputError::Serialize(e.to_string()))?)
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::jsonl()
    }
}

#[async_trait]
impl ResultSink for StdoutSink {
    async fn record(&self, report: &RootReport) -> Result<()> {
        let output = self.render(report)?;
        println!("{output}");
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        std::io::stdout()
            .flush()
            .map_err(|e| OutputError::Io(format!("Failed to flush stdout: {e}")))?;
        Ok(())
    }
}
