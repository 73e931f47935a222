//! CLI argument definitions for bp-audit.

use std::path::PathBuf;

use bp_auditor::AuditMode;
use bp_auditor::output::OutputFormat;
use bp_cli_common::{LogLevel, parse_positive_usize};
use clap::{Parser, ValueEnum};

/// Audit object-storage buckets for unauthorized write and delete access.
///
/// Reads a list of roots (`gs://bucket/` or `s3://bucket/prefix/`), crawls
/// every folder under each root and tries to upload, then delete, a probe
/// object in each one. Vulnerable folders are appended to result files in the
/// output directory, or printed as JSON reports.
///
/// ## Examples
///
/// Audit public GCS buckets anonymously:
///   bp-audit -i listOfOpenBuckets.txt -t testfile --anonymous
///
/// Probe only the listed folders, without crawling:
///   bp-audit -i folders.txt --mode direct
///
/// Against LocalStack, printing JSONL reports:
///   bp-audit -i roots.txt --s3-endpoint http://localhost:4566 --destination stdout
#[derive(Parser, Debug)]
#[command(name = "bp-audit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    // === Input ===
    /// File listing the roots to audit, one per line
    #[arg(short = 'i', long, default_value = "listOfOpenBuckets.txt")]
    pub roots_file: PathBuf,

    /// Local file uploaded into each folder to test write access
    #[arg(short = 't', long, default_value = "testfile")]
    pub probe_file: PathBuf,

    /// Crawl each root, or probe the listed folders directly
    #[arg(long, value_enum, default_value = "crawl")]
    pub mode: ModeArg,

    // === Storage Configuration ===
    /// Custom S3-compatible endpoint URL (GCS interop, LocalStack)
    #[arg(long, env = "BP_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// AWS region
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Access key ID
    #[arg(long, env = "AWS_ACCESS_KEY_ID")]
    pub access_key: Option<String>,

    /// Secret access key
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY")]
    pub secret_key: Option<String>,

    /// AWS profile name
    #[arg(long, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    /// Send unsigned requests, as an unauthenticated caller
    #[arg(long, env = "BP_ANONYMOUS")]
    pub anonymous: bool,

    // === Resilience Options ===
    /// Per-call timeout in seconds (must be >= 1)
    #[arg(long, default_value = "30", value_parser = parse_positive_u64)]
    pub timeout_secs: u64,

    /// Retries for transient gateway errors
    #[arg(long, default_value = "3")]
    pub max_retries: u32,

    /// Minimum delay between gateway calls in milliseconds (0 disables pacing)
    #[arg(long, default_value = "250")]
    pub min_interval_ms: u64,

    // === Parallelism Options ===
    /// Maximum concurrent list calls per crawl round (must be >= 1)
    #[arg(long, default_value = "8", value_parser = parse_positive_usize)]
    pub max_concurrent_lists: usize,

    /// Maximum concurrent folder probes per root (must be >= 1)
    #[arg(long, default_value = "4", value_parser = parse_positive_usize)]
    pub max_concurrent_probes: usize,

    // === Destination Options ===
    /// Where results go
    #[arg(long, value_enum, default_value = "files")]
    pub destination: DestinationType,

    /// Directory for result files (destination=files)
    #[arg(short = 'o', long, env = "BP_OUTPUT_DIR", default_value = "output")]
    pub output_dir: PathBuf,

    /// Output format for stdout destination
    #[arg(long, value_enum, default_value = "jsonl")]
    pub output_format: OutputFormatArg,

    // === Logging Options ===
    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

/// Audit mode argument.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    /// Crawl every folder under each root
    Crawl,
    /// Probe each listed folder as-is
    Direct,
}

impl From<ModeArg> for AuditMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Crawl => AuditMode::Crawl,
            ModeArg::Direct => AuditMode::Direct,
        }
    }
}

/// Destination type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DestinationType {
    /// Append vulnerable paths to result files
    Files,
    /// Print one report per root to stdout
    Stdout,
}

/// Output format argument.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    /// JSON Lines (one report per line)
    Jsonl,
    /// Pretty-printed JSON
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Jsonl => OutputFormat::Jsonl,
            OutputFormatArg::Json => OutputFormat::Json,
        }
    }
}

/// Parse a positive u64 (>= 1).
fn parse_positive_u64(s: &str) -> Result<u64, String> {
    let value: u64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if value < 1 {
        return Err(format!("{} is not in 1..", value));
    }
    Ok(value)
}
