//! bp-auditor - folder discovery and capability probing for bucket-probe.
//!
//! For every root in the input this crate:
//!
//! - Crawls the folder tree breadth-first, listing each folder once
//! - Uploads a probe object into every discovered folder
//! - Deletes the probe object again when the upload succeeded
//! - Hands a per-root [`RootReport`](bp_types::RootReport) to a result sink
//!
//! Storage access goes through the [`StorageGateway`](bp_traits::StorageGateway)
//! trait. [`gateway::S3Gateway`] covers S3 and S3-compatible endpoints,
//! including Google Cloud Storage through its interop endpoint.
//!
//! # Example
//!
//! ```ignore
//! use bp_auditor::gateway::{GatewayConfig, ResilientGateway, S3Gateway, create_s3_client};
//! use bp_auditor::output::StdoutSink;
//! use bp_auditor::{AuditConfig, Auditor, load_roots};
//! use bp_types::ProbeObject;
//!
//! let client = create_s3_client(&GatewayConfig::gcs().with_anonymous(true)).await?;
//! let gateway = ResilientGateway::new(S3Gateway::new(client));
//!
//! let roots = load_roots("listOfOpenBuckets.txt").await?;
//! let probe = ProbeObject::load("testfile")?;
//!
//! let auditor = Auditor::new(gateway, StdoutSink::default(), probe, AuditConfig::new());
//! let stats = auditor.run(&roots).await?;
//! eprintln!("{} write-vulnerable folders", stats.write_vulnerable);
//! ```

pub mod auditor;
pub mod classify;
pub mod config;
pub mod crawler;
pub mod gateway;
pub mod input;
pub mod output;
pub mod prober;
pub mod stats;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use auditor::Auditor;
pub use classify::{DeleteOutcome, ListOutcome, WriteOutcome};
pub use config::{AuditConfig, AuditMode};
pub use crawler::{CrawlOutcome, DiscoveredFolder, DiscoveredFolders, FolderCrawler};
pub use input::{load_roots, parse_roots};
pub use prober::CapabilityProber;
pub use stats::AuditStats;
