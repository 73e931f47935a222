//! LocalStack-backed S3 context for gateway and audit tests.

use aws_sdk_s3::Client as S3Client;
use bp_auditor::gateway::{GatewayConfig, S3Gateway, create_s3_client};
use bp_types::ProbeObject;

/// Probe object used by the integration tests.
pub fn probe_object() -> ProbeObject {
    ProbeObject::from_bytes("bp-probe-testfile", "bucket-probe integration test\n")
}

/// LocalStack test context providing an S3 client and a gateway over it.
pub struct LocalStackTestContext {
    pub s3: S3Client,
    pub endpoint: String,
    pub region: String,
}

impl LocalStackTestContext {
    /// Connect to LocalStack with path-style addressing.
    ///
    /// Uses the `LOCALSTACK_ENDPOINT` environment variable if set,
    /// otherwise defaults to `http://localhost:4566`.
    pub async fn new() -> Self {
        let endpoint = std::env::var("LOCALSTACK_ENDPOINT")
            .unwrap_or_else(|_| "http://localhost:4566".to_string());
        let region = "us-east-1".to_string();

        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new(region.clone()))
            .endpoint_url(&endpoint)
            .load()
            .await;

        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(true)
            .build();

        Self {
            s3: S3Client::from_conf(s3_config),
            endpoint,
            region,
        }
    }

    /// Gateway configuration pointing at LocalStack.
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig::new()
            .with_endpoint(&self.endpoint)
            .with_region(&self.region)
            .with_credentials("test", "test")
    }

    /// Build an [`S3Gateway`] against LocalStack.
    pub async fn gateway(&self) -> S3Gateway {
        let client = create_s3_client(&self.gateway_config())
            .await
            .expect("Failed to create S3 client");
        S3Gateway::new(client)
    }

    /// Whether LocalStack answers a bucket listing.
    pub async fn is_available(&self) -> bool {
        self.s3.list_buckets().send().await.is_ok()
    }

    /// Create `name` unless it already exists.
    pub async fn create_bucket(&self, name: &str) -> Result<(), aws_sdk_s3::Error> {
        let buckets = self.s3.list_buckets().send().await?;
        let exists = buckets
            .buckets()
            .iter()
            .any(|b| b.name().unwrap_or_default() == name);

        if !exists {
            self.s3.create_bucket().bucket(name).send().await?;
        }
        Ok(())
    }

    /// Upload a small object.
    pub async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: &str,
    ) -> Result<(), aws_sdk_s3::Error> {
        self.s3
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(data.as_bytes().to_vec().into())
            .send()
            .await?;
        Ok(())
    }

    /// List all object keys in a bucket with optional prefix.
    pub async fn list_keys(
        &self,
        bucket: &str,
        prefix: Option<&str>,
    ) -> Result<Vec<String>, aws_sdk_s3::Error> {
        let mut request = self.s3.list_objects_v2().bucket(bucket);
        if let Some(p) = prefix {
            request = request.prefix(p);
        }

        let result = request.send().await?;
        let mut keys: Vec<String> = result
            .contents()
            .iter()
            .filter_map(|o| o.key().map(String::from))
            .collect();
        keys.sort();
        Ok(keys)
    }
}
