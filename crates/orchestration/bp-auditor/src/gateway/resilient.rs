//! Timeout, retry and pacing around any [`StorageGateway`].

use async_trait::async_trait;
use bp_error::{GatewayError, Result};
use bp_traits::{DeleteResponse, ListResponse, StorageGateway, UploadResponse};
use bp_types::{FolderPath, ObjectUri, ProbeObject};
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

use super::pacing::{Pacer, PacingConfig};
use super::retry::{RetryConfig, with_retry};

/// Default per-call timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Wraps a gateway so every call is paced, bounded by a timeout and retried
/// on transient failure.
///
/// Service-level faults come back inside `Ok` responses and are passed
/// through untouched; only `Err` results are retried.
pub struct ResilientGateway<G> {
    inner: G,
    retry: RetryConfig,
    pacer: Pacer,
    call_timeout: Duration,
}

impl<G: StorageGateway> ResilientGateway<G> {
    /// Wrap `inner` with default retry, pacing and timeout settings.
    pub fn new(inner: G) -> Self {
        Self {
            inner,
            retry: RetryConfig::default(),
            pacer: Pacer::new(&PacingConfig::default()),
            call_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Set the retry configuration.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Set the pacing configuration.
    pub fn with_pacing(mut self, pacing: &PacingConfig) -> Self {
        self.pacer = Pacer::new(pacing);
        self
    }

    /// Set the per-call timeout.
    pub fn with_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// The wrapped gateway.
    pub fn inner(&self) -> &G {
        &self.inner
    }

    async fn call<T, F, Fut>(&self, operation: &str, mut f: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let limit = self.call_timeout;
        with_retry(&self.retry, operation, || {
            let attempt = f();
            async move {
                self.pacer.wait().await;
                match timeout(limit, attempt).await {
                    Ok(result) => result,
                    Err(_) => Err(GatewayError::Timeout {
                        operation: operation.to_string(),
                        timeout_secs: limit.as_secs(),
                    }
                    .into()),
                }
            }
        })
        .await
    }
}

#[async_trait]
impl<G: StorageGateway> StorageGateway for ResilientGateway<G> {
    async fn list(&self, folder: &FolderPath) -> Result<ListResponse> {
        let operation = format!("list {folder}");
        self.call(&operation, || self.inner.list(folder)).await
    }

    async fn upload(
        &self,
        object: &ProbeObject,
        destination: &ObjectUri,
    ) -> Result<UploadResponse> {
        let operation = format!("upload {destination}");
        self.call(&operation, || self.inner.upload(object, destination))
            .await
    }

    async fn delete(&self, object: &ObjectUri) -> Result<DeleteResponse> {
        let operation = format!("delete {object}");
        self.call(&operation, || self.inner.delete(object)).await
    }
}
