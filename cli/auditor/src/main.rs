//! bp-audit CLI
//!
//! Object-storage write/delete access audit.

use bp_cli_common::{format_duration, format_number, init_logging};
use clap::Parser;

mod args;
mod run;

use args::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    // Logs go to stderr, so stdout stays clean for JSON reports
    init_logging(args.log_level)?;

    let stats = match run::execute(args).await {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(2);
        }
    };

    eprintln!();
    eprintln!("Audit completed:");
    eprintln!(
        "  Roots audited:        {}",
        format_number(stats.roots_audited as u64)
    );
    eprintln!(
        "  Roots not listable:   {}",
        format_number(stats.roots_not_listable as u64)
    );
    eprintln!(
        "  Folders probed:       {}",
        format_number(stats.folders_probed as u64)
    );
    eprintln!(
        "  Write-vulnerable:     {}",
        format_number(stats.write_vulnerable as u64)
    );
    eprintln!(
        "  Delete-vulnerable:    {}",
        format_number(stats.delete_vulnerable as u64)
    );
    eprintln!(
        "  Ambiguous:            {}",
        format_number(stats.ambiguous as u64)
    );
    eprintln!("  Errors:               {}", stats.error_count());

    if let Some(duration) = stats.duration().and_then(|d| d.to_std().ok()) {
        eprintln!("  Duration:             {}", format_duration(duration));

        if let Some(fps) = stats.folders_per_second() {
            eprintln!("  Throughput:           {:.1} folders/sec", fps);
        }
    }

    if stats.has_errors() {
        if stats.gateway_errors > 0 {
            eprintln!(
                "  Gateway calls failed after retries: {}",
                stats.gateway_errors
            );
        }
        for error in &stats.errors {
            eprintln!("  Error: {}", error);
        }
        std::process::exit(4); // Partial failure
    }

    Ok(())
}
