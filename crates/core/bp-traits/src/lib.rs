//! Core traits for bucket-probe.
//!
//! This crate defines the seams between the audit engine and the outside world:
//! - [`StorageGateway`] - list, upload and delete against an object store
//! - [`ResultSink`] - receives each root's report as soon as it completes

pub mod gateway;
pub mod sink;

pub use gateway::{
    DeleteResponse, FaultKind, GatewayFault, ListResponse, StorageGateway, UploadResponse,
};
pub use sink::ResultSink;
