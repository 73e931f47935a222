//! Configuration types for the auditor.

use serde::{Deserialize, Serialize};

/// How input paths are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditMode {
    /// Crawl every folder reachable under each root, then probe them all
    #[default]
    Crawl,
    /// Probe each input path as-is, without listing
    Direct,
}

/// Configuration for an audit run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Crawl or direct-probe mode
    pub mode: AuditMode,

    /// Maximum concurrent list calls within one crawl round
    pub max_concurrent_lists: usize,

    /// Maximum concurrent folder probes within one root
    pub max_concurrent_probes: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            mode: AuditMode::Crawl,
            max_concurrent_lists: 8,
            max_concurrent_probes: 4,
        }
    }
}

impl AuditConfig {
    /// Create a new audit configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the audit mode.
    pub fn with_mode(mut self, mode: AuditMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the maximum concurrent list calls (at least 1).
    pub fn with_max_concurrent_lists(mut self, max: usize) -> Self {
        self.max_concurrent_lists = max.max(1);
        self
    }

    /// Set the maximum concurrent folder probes (at least 1).
    pub fn with_max_concurrent_probes(mut self, max: usize) -> Self {
        self.max_concurrent_probes = max.max(1);
        self
    }

    /// Run every gateway call one after another.
    pub fn sequential(self) -> Self {
        self.with_max_concurrent_lists(1)
            .with_max_concurrent_probes(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_config_defaults() {
        let config = AuditConfig::new();

        assert_eq!(config.mode, AuditMode::Crawl);
        assert_eq!(config.max_concurrent_lists, 8);
        assert_eq!(config.max_concurrent_probes, 4);
    }

    #[test]
    fn test_audit_config_builder() {
        let config = AuditConfig::new()
            .with_mode(AuditMode::Direct)
            .with_max_concurrent_lists(2)
            .with_max_concurrent_probes(3);

        assert_eq!(config.mode, AuditMode::Direct);
        assert_eq!(config.max_concurrent_lists, 2);
        assert_eq!(config.max_concurrent_probes, 3);
    }

    #[test]
    fn test_concurrency_never_zero() {
        let config = AuditConfig::new()
            .with_max_concurrent_lists(0)
            .with_max_concurrent_probes(0);

        assert_eq!(config.max_concurrent_lists, 1);
        assert_eq!(config.max_concurrent_probes, 1);
    }

    #[test]
    fn test_sequential() {
        let config = AuditConfig::new().sequential();
        assert_eq!(config.max_concurrent_lists, 1);
        assert_eq!(config.max_concurrent_probes, 1);
    }
}
