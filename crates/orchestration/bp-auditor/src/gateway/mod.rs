//! Storage gateways.
//!
//! - [`S3Gateway`] talks to S3 and S3-compatible endpoints (GCS interop,
//!   LocalStack)
//! - [`ResilientGateway`] adds timeout, retry and pacing around any gateway

mod client;
mod pacing;
mod resilient;
mod retry;
mod s3;

pub use client::{FALLBACK_REGION, GCS_INTEROP_ENDPOINT, GatewayConfig, create_s3_client};
pub use pacing::{Pacer, PacingConfig};
pub use resilient::{DEFAULT_TIMEOUT_SECS, ResilientGateway};
pub use retry::{RetryConfig, with_retry};
pub use s3::S3Gateway;
