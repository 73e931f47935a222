//! S3 client configuration and creation.

use aws_config::BehaviorVersion;
use aws_config::Region;
use aws_config::meta::region::RegionProviderChain;
use aws_config::retry::RetryConfig as SdkRetryConfig;
use aws_sdk_s3::Client;
use bp_error::Result;
use serde::{Deserialize, Serialize};

use super::resilient::DEFAULT_TIMEOUT_SECS;

/// S3-compatible endpoint of Google Cloud Storage.
pub const GCS_INTEROP_ENDPOINT: &str = "https://storage.googleapis.com";

/// Region used when neither the configuration nor the environment sets one.
pub const FALLBACK_REGION: &str = "us-east-1";

/// Configuration for storage access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// AWS region
    pub region: Option<String>,

    /// Custom endpoint URL (GCS interop, LocalStack)
    pub endpoint: Option<String>,

    /// Explicit access key (optional)
    pub access_key: Option<String>,

    /// Explicit secret key (optional)
    pub secret_key: Option<String>,

    /// AWS profile name (optional)
    pub profile: Option<String>,

    /// Send unsigned requests
    pub anonymous: bool,

    /// Per-call timeout in seconds, enforced by `ResilientGateway` around
    /// each attempt. Not applied to the client itself.
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            region: None,
            endpoint: None,
            access_key: None,
            secret_key: None,
            profile: None,
            anonymous: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl GatewayConfig {
    /// Create a configuration using the default credential chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration for Google Cloud Storage through its S3 interop endpoint.
    pub fn gcs() -> Self {
        Self::new().with_endpoint(GCS_INTEROP_ENDPOINT)
    }

    /// Set a custom endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the AWS region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set explicit credentials.
    pub fn with_credentials(
        mut self,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        self.access_key = Some(access_key.into());
        self.secret_key = Some(secret_key.into());
        self
    }

    /// Set the AWS profile.
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Send unsigned requests, as an unauthenticated caller would.
    pub fn with_anonymous(mut self, anonymous: bool) -> Self {
        self.anonymous = anonymous;
        self
    }

    /// Set the per-call timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Create an S3 client from configuration.
///
/// The SDK's own retries are disabled: every request goes through the pacer
/// and the retry budget of `ResilientGateway`.
pub async fn create_s3_client(config: &GatewayConfig) -> Result<Client> {
    let region = RegionProviderChain::first_try(config.region.clone().map(Region::new))
        .or_default_provider()
        .or_else(FALLBACK_REGION);

    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(region)
        .retry_config(SdkRetryConfig::disabled());

    if let Some(endpoint) = &config.endpoint {
        loader = loader.endpoint_url(endpoint);
    }

    if config.anonymous {
        loader = loader.no_credentials();
    } else if let (Some(access_key), Some(secret_key)) = (&config.access_key, &config.secret_key)
    {
        let credentials = aws_sdk_s3::config::Credentials::new(
            access_key,
            secret_key,
            None,
            None,
            "bucket-probe",
        );
        loader = loader.credentials_provider(credentials);
    }

    if let Some(profile) = &config.profile {
        loader = loader.profile_name(profile);
    }

    let aws_config = loader.load().await;

    let builder = aws_sdk_s3::config::Builder::from(&aws_config);

    // Custom endpoints (GCS interop, LocalStack) only support path-style addressing
    let s3_config = if config.endpoint.is_some() {
        builder.force_path_style(true).build()
    } else {
        builder.build()
    };

    Ok(Client::from_conf(s3_config))
}
