//! Audit orchestration across roots.

use bp_error::Result;
use bp_traits::{ResultSink, StorageGateway};
use bp_types::{FolderPath, ProbeObject, ProbeVerdict, RootReport, RootStatus};
use futures::{StreamExt, stream};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::config::{AuditConfig, AuditMode};
use crate::crawler::{CrawlOutcome, FolderCrawler};
use crate::prober::CapabilityProber;
use crate::stats::AuditStats;

/// Per-root result lists.
///
/// Created for one root and consumed into its [`RootReport`], so nothing
/// carries over to the next root.
struct RootAccumulator {
    root: FolderPath,
    folders_discovered: usize,
    verdicts: Vec<ProbeVerdict>,
    write_vulnerable: Vec<FolderPath>,
    delete_vulnerable: Vec<FolderPath>,
    ambiguous: Vec<FolderPath>,
}

impl RootAccumulator {
    fn new(root: FolderPath, folders_discovered: usize) -> Self {
        Self {
            root,
            folders_discovered,
            verdicts: Vec::with_capacity(folders_discovered),
            write_vulnerable: Vec::new(),
            delete_vulnerable: Vec::new(),
            ambiguous: Vec::new(),
        }
    }

    fn push(&mut self, verdict: ProbeVerdict) {
        if verdict.write_vulnerable {
            self.write_vulnerable.push(verdict.path.clone());
        }
        if verdict.is_delete_vulnerable() {
            self.delete_vulnerable.push(verdict.path.clone());
        }
        if verdict.is_ambiguous() {
            self.ambiguous.push(verdict.path.clone());
        }
        self.verdicts.push(verdict);
    }

    fn into_report(self) -> RootReport {
        RootReport {
            root: self.root,
            status: RootStatus::Audited,
            folders_discovered: self.folders_discovered,
            verdicts: self.verdicts,
            write_vulnerable: self.write_vulnerable,
            delete_vulnerable: self.delete_vulnerable,
            ambiguous: self.ambiguous,
        }
    }
}

/// Coordinates discovery and probing over a list of roots.
///
/// Generic over the gateway and sink so the same audit logic runs against
/// S3, LocalStack or in-memory test doubles.
pub struct Auditor<G: StorageGateway, S: ResultSink> {
    gateway: G,
    sink: S,
    probe_object: ProbeObject,
    config: AuditConfig,
}

impl<G: StorageGateway, S: ResultSink> Auditor<G, S> {
    /// Create a new Auditor.
    ///
    /// # Arguments
    ///
    /// * `gateway` - The storage gateway used for list/upload/delete
    /// * `sink` - Receives each root's report as soon as it completes
    /// * `probe_object` - The object uploaded to test write access
    /// * `config` - The audit configuration
    pub fn new(gateway: G, sink: S, probe_object: ProbeObject, config: AuditConfig) -> Self {
        Self {
            gateway,
            sink,
            probe_object,
            config,
        }
    }

    /// The gateway in use.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// The sink in use.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Audit every root in order.
    ///
    /// Each root's report is delivered to the sink before the next root
    /// starts. Sink failures are recorded in the returned stats and do not
    /// stop the run.
    pub async fn run(&self, roots: &[FolderPath]) -> Result<AuditStats> {
        let mut stats = AuditStats::new();

        info!(
            roots = roots.len(),
            mode = ?self.config.mode,
            probe_object = %self.probe_object.name(),
            "Starting audit"
        );

        match self.config.mode {
            AuditMode::Crawl => {
                for root in roots {
                    let (report, gateway_errors) = self.audit_root(root).await;
                    stats.record_gateway_errors(gateway_errors);
                    self.deliver(report, &mut stats).await;
                }
            }
            AuditMode::Direct => {
                let mut seen = HashSet::new();
                for folder in roots.iter().filter(|f| seen.insert(*f)) {
                    let (report, gateway_errors) = self.probe_directly(folder).await;
                    stats.record_gateway_errors(gateway_errors);
                    self.deliver(report, &mut stats).await;
                }
            }
        }

        if let Err(e) = self.sink.flush().await {
            warn!(error = %e, "Failed to flush results");
            stats.record_error(format!("Flush failed: {e}"));
        }

        stats.complete();

        info!(
            roots_audited = stats.roots_audited,
            roots_not_listable = stats.roots_not_listable,
            folders_probed = stats.folders_probed,
            write_vulnerable = stats.write_vulnerable,
            delete_vulnerable = stats.delete_vulnerable,
            ambiguous = stats.ambiguous,
            errors = stats.error_count(),
            "Audit completed"
        );

        Ok(stats)
    }

    /// Crawl one root and probe every folder found under it.
    ///
    /// Returns the root's report and the number of gateway calls that failed
    /// after retries.
    pub async fn audit_root(&self, root: &FolderPath) -> (RootReport, usize) {
        info!(root = %root, "Assessing root");

        let crawler = FolderCrawler::new(&self.gateway, self.config.max_concurrent_lists);
        let folders = match crawler.crawl(root).await {
            CrawlOutcome::Discovered(folders) => folders,
            CrawlOutcome::RootNotListable(reason) => {
                return (
                    RootReport::not_listable(root.clone(), reason),
                    crawler.gateway_errors(),
                );
            }
        };

        let prober = CapabilityProber::new(&self.gateway, &self.probe_object);
        let mut accumulator = RootAccumulator::new(root.clone(), folders.len());

        let verdicts: Vec<ProbeVerdict> = stream::iter(folders.iter())
            .map(|folder| prober.probe(&folder.path, Some(folder.listable)))
            .buffered(self.config.max_concurrent_probes.max(1))
            .collect()
            .await;

        for verdict in verdicts {
            accumulator.push(verdict);
        }

        (
            accumulator.into_report(),
            crawler.gateway_errors() + prober.gateway_errors(),
        )
    }

    /// Probe a single folder without listing anything.
    async fn probe_directly(&self, folder: &FolderPath) -> (RootReport, usize) {
        info!(folder = %folder, "Assessing folder");

        let prober = CapabilityProber::new(&self.gateway, &self.probe_object);
        let mut accumulator = RootAccumulator::new(folder.clone(), 1);
        accumulator.push(prober.probe(folder, None).await);

        (accumulator.into_report(), prober.gateway_errors())
    }

    async fn deliver(&self, report: RootReport, stats: &mut AuditStats) {
        debug!(
            root = %report.root,
            write_vulnerable = report.write_vulnerable.len(),
            delete_vulnerable = report.delete_vulnerable.len(),
            "Recording root results"
        );

        if let Err(e) = self.sink.record(&report).await {
            warn!(root = %report.root, error = %e, "Failed to record results");
            stats.record_error(format!("Output failed for {}: {}", report.root, e));
        }

        stats.record_report(&report);
    }
}
