//! Main execution logic for bp-audit.

use anyhow::{Result, bail};
use bp_auditor::gateway::{
    GCS_INTEROP_ENDPOINT, GatewayConfig, PacingConfig, ResilientGateway, RetryConfig, S3Gateway,
    create_s3_client,
};
use bp_auditor::output::{FileSink, StdoutSink};
use bp_auditor::{AuditConfig, AuditStats, Auditor, load_roots};
use bp_traits::ResultSink;
use bp_types::{FolderPath, ProbeObject, Scheme};
use std::time::Duration;
use tracing::info;

use crate::args::{Cli, DestinationType};

/// Execute the audit with the provided arguments.
///
/// The probe file and the roots list are validated before any network call.
pub async fn execute(args: Cli) -> Result<AuditStats> {
    let probe_object = ProbeObject::load(&args.probe_file)?;
    let roots = load_roots(&args.roots_file).await?;

    info!(
        roots_file = %args.roots_file.display(),
        roots = roots.len(),
        probe_object = %probe_object.name(),
        "Loaded input"
    );

    let gateway_config = build_gateway_config(&args, &roots)?;
    let client = create_s3_client(&gateway_config).await?;

    let gateway = ResilientGateway::new(S3Gateway::new(client))
        .with_retry(RetryConfig::new().with_max_retries(args.max_retries))
        .with_pacing(&PacingConfig::new().with_min_interval_ms(args.min_interval_ms))
        .with_timeout(Duration::from_secs(gateway_config.timeout_secs));

    let config = AuditConfig::new()
        .with_mode(args.mode.into())
        .with_max_concurrent_lists(args.max_concurrent_lists)
        .with_max_concurrent_probes(args.max_concurrent_probes);

    let stats = match args.destination {
        DestinationType::Files => {
            let sink = FileSink::new(&args.output_dir);
            info!(
                write_results = %sink.write_path().display(),
                delete_results = %sink.delete_path().display(),
                "Writing results"
            );
            run_audit(gateway, sink, probe_object, config, &roots).await?
        }
        DestinationType::Stdout => {
            let sink = StdoutSink::new(args.output_format.into());
            run_audit(gateway, sink, probe_object, config, &roots).await?
        }
    };

    Ok(stats)
}

/// Build the gateway configuration for the schemes found in the input.
///
/// `gs://` roots go through the GCS interop endpoint unless an explicit
/// endpoint is set. Mixing schemes needs an explicit endpoint, since one
/// client serves the whole run.
fn build_gateway_config(args: &Cli, roots: &[FolderPath]) -> Result<GatewayConfig> {
    let mut config = GatewayConfig::new()
        .with_anonymous(args.anonymous)
        .with_timeout(args.timeout_secs);

    match (&args.s3_endpoint, single_scheme(roots)?) {
        (Some(endpoint), _) => config = config.with_endpoint(endpoint),
        (None, Some(Scheme::Gs)) => config = config.with_endpoint(GCS_INTEROP_ENDPOINT),
        (None, _) => {}
    }

    if let Some(region) = &args.region {
        config = config.with_region(region);
    }

    if let (Some(access_key), Some(secret_key)) = (&args.access_key, &args.secret_key) {
        config = config.with_credentials(access_key, secret_key);
    }

    if let Some(profile) = &args.profile {
        config = config.with_profile(profile);
    }

    Ok(config)
}

/// The one scheme used by all roots; errors on a mix.
fn single_scheme(roots: &[FolderPath]) -> Result<Option<Scheme>> {
    let mut schemes = roots.iter().map(FolderPath::scheme);
    let Some(first) = schemes.next() else {
        return Ok(None);
    };
    if schemes.any(|s| s != first) {
        bail!(
            "Roots mix gs:// and s3:// schemes; audit them in separate runs or set --s3-endpoint"
        );
    }
    Ok(Some(first))
}

/// Run the audit with a specific sink type.
async fn run_audit<S: ResultSink>(
    gateway: ResilientGateway<S3Gateway>,
    sink: S,
    probe_object: ProbeObject,
    config: AuditConfig,
    roots: &[FolderPath],
) -> Result<AuditStats> {
    let auditor = Auditor::new(gateway, sink, probe_object, config);
    let stats = auditor.run(roots).await?;
    Ok(stats)
}
