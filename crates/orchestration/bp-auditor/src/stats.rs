//! Statistics for audit runs.

use bp_types::RootReport;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Statistics collected during an audit run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditStats {
    /// When the audit started
    pub started_at: Option<DateTime<Utc>>,

    /// When the audit completed
    pub completed_at: Option<DateTime<Utc>>,

    /// Roots that were crawled and probed
    pub roots_audited: usize,

    /// Roots skipped because they could not be listed
    pub roots_not_listable: usize,

    /// Unique folders discovered across all roots
    pub folders_discovered: usize,

    /// Folders probed for write/delete access
    pub folders_probed: usize,

    /// Write-vulnerable folders found
    pub write_vulnerable: usize,

    /// Delete-vulnerable folders found
    pub delete_vulnerable: usize,

    /// Folders with ambiguous classifications
    pub ambiguous: usize,

    /// Gateway calls that still failed after retries
    pub gateway_errors: usize,

    /// Errors encountered during the audit
    pub errors: Vec<String>,
}

impl AuditStats {
    /// Create a new stats tracker with the current time as start time.
    pub fn new() -> Self {
        Self {
            started_at: Some(Utc::now()),
            ..Default::default()
        }
    }

    /// Mark the audit as complete with the current time.
    pub fn complete(&mut self) {
        self.completed_at = Some(Utc::now());
    }

    /// Fold a finished root into the totals.
    pub fn record_report(&mut self, report: &RootReport) {
        if report.is_audited() {
            self.roots_audited += 1;
        } else {
            self.roots_not_listable += 1;
        }
        self.folders_discovered += report.folders_discovered;
        self.folders_probed += report.verdicts.len();
        self.write_vulnerable += report.write_vulnerable.len();
        self.delete_vulnerable += report.delete_vulnerable.len();
        self.ambiguous += report.ambiguous.len();
    }

    /// Record gateway calls that failed after all retries.
    pub fn record_gateway_errors(&mut self, count: usize) {
        self.gateway_errors += count;
    }

    /// Record an error.
    pub fn record_error(&mut self, error: impl ToString) {
        self.errors.push(error.to_string());
    }

    /// Total roots processed.
    pub fn roots_total(&self) -> usize {
        self.roots_audited + self.roots_not_listable
    }

    /// Get the duration of the audit.
    pub fn duration(&self) -> Option<Duration> {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }

    /// Check if any errors occurred.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty() || self.gateway_errors > 0
    }

    /// Get the number of errors.
    pub fn error_count(&self) -> usize {
        self.errors.len() + self.gateway_errors
    }

    /// Calculate the throughput in probed folders per second.
    pub fn folders_per_second(&self) -> Option<f64> {
        self.duration().map(|d| {
            let secs = d.num_milliseconds() as f64 / 1000.0;
            if secs > 0.0 {
                self.folders_probed as f64 / secs
            } else {
                0.0
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bp_types::{FolderPath, ListDenial, ProbeVerdict, RootStatus};
    use std::thread::sleep;
    use std::time::Duration as StdDuration;

    fn folder(raw: &str) -> FolderPath {
        FolderPath::parse(raw).unwrap()
    }

    #[test]
    fn test_stats_new() {
        let stats = AuditStats::new();
        assert!(stats.started_at.is_some());
        assert!(stats.completed_at.is_none());
        assert_eq!(stats.roots_total(), 0);
    }

    #[test]
    fn test_record_audited_report() {
        let mut stats = AuditStats::new();
        let a = folder("gs://b/a/");
        let report = RootReport {
            root: folder("gs://b/"),
            status: RootStatus::Audited,
            folders_discovered: 2,
            verdicts: vec![
                ProbeVerdict::written(a.clone(), Some(true), true),
                ProbeVerdict::not_writable(folder("gs://b/"), Some(true)),
            ],
            write_vulnerable: vec![a.clone()],
            delete_vulnerable: vec![a],
            ambiguous: vec![],
        };

        stats.record_report(&report);

        assert_eq!(stats.roots_audited, 1);
        assert_eq!(stats.folders_discovered, 2);
        assert_eq!(stats.folders_probed, 2);
        assert_eq!(stats.write_vulnerable, 1);
        assert_eq!(stats.delete_vulnerable, 1);
    }

    #[test]
    fn test_record_not_listable_report() {
        let mut stats = AuditStats::new();
        stats.record_report(&RootReport::not_listable(
            folder("gs://b2/"),
            ListDenial::AccessDenied,
        ));

        assert_eq!(stats.roots_not_listable, 1);
        assert_eq!(stats.roots_audited, 0);
        assert_eq!(stats.roots_total(), 1);
    }

    #[test]
    fn test_stats_errors() {
        let mut stats = AuditStats::new();
        assert!(!stats.has_errors());

        stats.record_gateway_errors(2);
        assert!(stats.has_errors());

        stats.record_error("sink failed");
        assert_eq!(stats.error_count(), 3);
    }

    #[test]
    fn test_stats_duration() {
        let mut stats = AuditStats::new();
        sleep(StdDuration::from_millis(10));
        stats.complete();

        let duration = stats.duration().unwrap();
        assert!(duration.num_milliseconds() >= 10);
    }
}
