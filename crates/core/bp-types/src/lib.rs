//! Shared data types for bucket-probe.
//!
//! This crate provides the types exchanged between the crawler, the prober,
//! the storage gateways and the result sinks:
//! - [`FolderPath`] / [`ObjectUri`] - canonical storage addresses
//! - [`ProbeObject`] - the local file uploaded to test write access
//! - [`ProbeVerdict`] / [`RootReport`] - audit results

pub mod path;
pub mod probe_object;
pub mod report;

pub use path::{FolderPath, ObjectUri, Scheme};
pub use probe_object::ProbeObject;
pub use report::{ListDenial, ProbeVerdict, RootReport, RootStatus};
