//! [`StorageGateway`] over `aws-sdk-s3`.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use bp_error::{GatewayError, Result};
use bp_traits::{DeleteResponse, GatewayFault, ListResponse, StorageGateway, UploadResponse};
use bp_types::{FolderPath, ObjectUri, ProbeObject};
use tracing::{debug, trace};

/// Error codes the backend uses to ask callers to slow down.
const THROTTLING_CODES: &[&str] = &[
    "SlowDown",
    "Throttling",
    "TooManyRequests",
    "RequestLimitExceeded",
];

/// Gateway talking to S3 or an S3-compatible endpoint.
///
/// Folders are listed with a `/` delimiter: common prefixes become folder
/// entries and objects become file entries. The folder's own placeholder
/// object is not reported.
#[derive(Clone)]
pub struct S3Gateway {
    client: Client,
}

impl S3Gateway {
    /// Create a gateway from a configured client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// The underlying client.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl StorageGateway for S3Gateway {
    async fn list(&self, folder: &FolderPath) -> Result<ListResponse> {
        let mut entries = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut req = self
                .client
                .list_objects_v2()
                .bucket(folder.bucket())
                .delimiter("/");

            if !folder.is_bucket_root() {
                req = req.prefix(folder.key_prefix());
            }

            if let Some(ref token) = continuation_token {
                req = req.continuation_token(token);
            }

            let resp = match req.send().await {
                Ok(resp) => resp,
                Err(e) => {
                    return service_fault(&format!("list {folder}"), e).map(ListResponse::refused);
                }
            };

            for cp in resp.common_prefixes() {
                if let Some(prefix) = cp.prefix() {
                    entries.push(folder.with_key_prefix(prefix).to_string());
                }
            }

            for obj in resp.contents() {
                let Some(key) = obj.key() else { continue };
                // Skip the folder's own placeholder object
                if key == folder.key_prefix() {
                    continue;
                }
                let name = key.strip_prefix(folder.key_prefix()).unwrap_or(key);
                entries.push(folder.join(name).to_string());
            }

            if resp.is_truncated() == Some(true) {
                continuation_token = resp.next_continuation_token().map(str::to_string);
                if continuation_token.is_none() {
                    break;
                }
            } else {
                break;
            }
        }

        debug!(folder = %folder, entries = entries.len(), "Listed folder");
        Ok(ListResponse::entries(entries))
    }

    async fn upload(
        &self,
        object: &ProbeObject,
        destination: &ObjectUri,
    ) -> Result<UploadResponse> {
        let result = self
            .client
            .put_object()
            .bucket(destination.bucket())
            .key(destination.key())
            .body(ByteStream::from(object.body().clone()))
            .send()
            .await;

        match result {
            Ok(output) => {
                trace!(object = %destination, etag = ?output.e_tag(), "Uploaded probe object");
                let etag = output.e_tag().unwrap_or_default();
                Ok(UploadResponse::completed(
                    1,
                    format!("uploaded {destination} etag={etag}"),
                ))
            }
            Err(e) => {
                service_fault(&format!("upload {destination}"), e).map(UploadResponse::refused)
            }
        }
    }

    async fn delete(&self, object: &ObjectUri) -> Result<DeleteResponse> {
        let result = self
            .client
            .delete_object()
            .bucket(object.bucket())
            .key(object.key())
            .send()
            .await;

        match result {
            Ok(_) => Ok(DeleteResponse::completed()),
            Err(e) => service_fault(&format!("delete {object}"), e).map(DeleteResponse::refused),
        }
    }
}

/// Split an SDK error into a service fault (`Ok`) or a transport error.
///
/// Throttling and 5xx replies are transport-level so the caller retries them;
/// any other service reply is a fault for the classifier to interpret.
fn service_fault<E>(operation: &str, err: SdkError<E, HttpResponse>) -> Result<GatewayFault>
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    match &err {
        SdkError::ServiceError(ctx) => {
            let status = ctx.raw().status().as_u16();
            let service = ctx.err();
            let code = service.code().map(str::to_string);
            let message = service
                .message()
                .map(str::to_string)
                .unwrap_or_else(|| DisplayErrorContext(&err).to_string());

            if code
                .as_deref()
                .is_some_and(|c| THROTTLING_CODES.contains(&c))
                || status == 429
            {
                return Err(GatewayError::Throttled(format!("{operation}: {message}")).into());
            }
            if status >= 500 {
                return Err(GatewayError::Unavailable(format!(
                    "{operation}: HTTP {status}: {message}"
                ))
                .into());
            }

            debug!(
                operation,
                code = code.as_deref().unwrap_or("-"),
                status,
                "Request refused"
            );
            Ok(GatewayFault::new(code, Some(status), message))
        }
        SdkError::TimeoutError(_) => Err(GatewayError::Timeout {
            operation: operation.to_string(),
            timeout_secs: 0,
        }
        .into()),
        _ => Err(GatewayError::Transport(format!(
            "{operation}: {}",
            DisplayErrorContext(&err)
        ))
        .into()),
    }
}
