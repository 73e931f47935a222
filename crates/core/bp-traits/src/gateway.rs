//! Storage gateway trait and response types.

use async_trait::async_trait;
use bp_error::Result;
use bp_types::{FolderPath, ObjectUri, ProbeObject};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Trait for object-storage backends.
///
/// Implementations include:
/// - `S3Gateway` over `aws-sdk-s3` (production, in `bp-auditor`)
/// - In-memory mocks (testing)
///
/// # Error contract
///
/// A service-level refusal (access denied, missing bucket) is returned as
/// `Ok` with a [`GatewayFault`] so it can be classified. `Err` is reserved
/// for transport failures (timeouts, dispatch errors, throttling, 5xx),
/// which callers may retry.
#[async_trait]
pub trait StorageGateway: Send + Sync {
    /// Lists the direct children of a folder.
    async fn list(&self, path: &FolderPath) -> Result<ListResponse>;

    /// Uploads the probe object to `destination`.
    async fn upload(&self, object: &ProbeObject, destination: &ObjectUri)
    -> Result<UploadResponse>;

    /// Deletes the object at `object`.
    async fn delete(&self, object: &ObjectUri) -> Result<DeleteResponse>;
}

#[async_trait]
impl<G: StorageGateway + ?Sized> StorageGateway for Arc<G> {
    async fn list(&self, path: &FolderPath) -> Result<ListResponse> {
        (**self).list(path).await
    }

    async fn upload(
        &self,
        object: &ProbeObject,
        destination: &ObjectUri,
    ) -> Result<UploadResponse> {
        (**self).upload(object, destination).await
    }

    async fn delete(&self, object: &ObjectUri) -> Result<DeleteResponse> {
        (**self).delete(object).await
    }
}

/// Coarse structured category of a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// Permission refused (HTTP 403 / `AccessDenied`)
    AccessDenied,
    /// Bucket or key missing (HTTP 404 / `NoSuchBucket` / `NoSuchKey`)
    NotFound,
    /// Anything else
    Other,
}

/// A service-level refusal reported by the backend.
///
/// Structured fields are filled in when the backend provides them; `message`
/// always carries the raw text for fallback matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayFault {
    /// Machine-readable error code (e.g. `AccessDenied`)
    pub code: Option<String>,

    /// HTTP status code of the response
    pub http_status: Option<u16>,

    /// Raw error text
    pub message: String,
}

impl GatewayFault {
    /// Create a fault from structured fields.
    pub fn new(code: Option<String>, http_status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            code,
            http_status,
            message: message.into(),
        }
    }

    /// Create a fault carrying only raw text.
    pub fn from_text(message: impl Into<String>) -> Self {
        Self::new(None, None, message)
    }

    /// A structured access-denied fault.
    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::new(Some("AccessDenied".to_string()), Some(403), message)
    }

    /// A structured not-found fault.
    pub fn not_found(code: &str, message: impl Into<String>) -> Self {
        Self::new(Some(code.to_string()), Some(404), message)
    }

    /// Categorize from structured fields only.
    pub fn kind(&self) -> FaultKind {
        let code = self.code.as_deref().unwrap_or_default();

        if matches!(code, "AccessDenied" | "AccessDeniedException" | "Forbidden")
            || self.http_status == Some(403)
        {
            FaultKind::AccessDenied
        } else if matches!(code, "NoSuchBucket" | "NoSuchKey" | "NotFound")
            || self.http_status == Some(404)
        {
            FaultKind::NotFound
        } else {
            FaultKind::Other
        }
    }
}

/// Response of a list call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListResponse {
    /// Full URIs of the children; folders end with `/`
    pub entries: Vec<String>,

    /// Set when the listing was refused
    pub fault: Option<GatewayFault>,
}

impl ListResponse {
    /// A successful listing.
    pub fn entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
            fault: None,
        }
    }

    /// A refused listing.
    pub fn refused(fault: GatewayFault) -> Self {
        Self {
            entries: Vec::new(),
            fault: Some(fault),
        }
    }

    /// Whether the call succeeded.
    pub fn succeeded(&self) -> bool {
        self.fault.is_none()
    }
}

/// Response of an upload call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadResponse {
    /// Raw output text of the operation
    pub output: String,

    /// Number of objects the backend confirmed written, when known
    pub objects_written: Option<u32>,

    /// Set when the upload was refused
    pub fault: Option<GatewayFault>,
}

impl UploadResponse {
    /// A confirmed upload of `objects` objects.
    pub fn completed(objects: u32, output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            objects_written: Some(objects),
            fault: None,
        }
    }

    /// A refused upload.
    pub fn refused(fault: GatewayFault) -> Self {
        Self {
            output: String::new(),
            objects_written: None,
            fault: Some(fault),
        }
    }

    /// Whether the call succeeded.
    pub fn succeeded(&self) -> bool {
        self.fault.is_none()
    }
}

/// Response of a delete call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteResponse {
    /// Set when the delete was refused
    pub fault: Option<GatewayFault>,
}

impl DeleteResponse {
    /// A completed delete.
    pub fn completed() -> Self {
        Self { fault: None }
    }

    /// A refused delete.
    pub fn refused(fault: GatewayFault) -> Self {
        Self { fault: Some(fault) }
    }

    /// Whether the call succeeded.
    pub fn succeeded(&self) -> bool {
        self.fault.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_kind_from_code() {
        let fault = GatewayFault::new(Some("AccessDenied".to_string()), None, "denied");
        assert_eq!(fault.kind(), FaultKind::AccessDenied);

        let fault = GatewayFault::new(Some("NoSuchBucket".to_string()), None, "missing");
        assert_eq!(fault.kind(), FaultKind::NotFound);
    }

    #[test]
    fn test_fault_kind_from_status() {
        assert_eq!(
            GatewayFault::new(None, Some(403), "").kind(),
            FaultKind::AccessDenied
        );
        assert_eq!(
            GatewayFault::new(None, Some(404), "").kind(),
            FaultKind::NotFound
        );
        assert_eq!(
            GatewayFault::new(None, Some(409), "").kind(),
            FaultKind::Other
        );
    }

    #[test]
    fn test_text_only_fault_is_other() {
        let fault = GatewayFault::from_text("AccessDeniedException: 403 nope");
        assert_eq!(fault.kind(), FaultKind::Other);
    }

    #[test]
    fn test_response_constructors() {
        let list = ListResponse::entries(["gs://b/a/", "gs://b/file"]);
        assert!(list.succeeded());
        assert_eq!(list.entries.len(), 2);

        let upload = UploadResponse::refused(GatewayFault::access_denied("denied"));
        assert!(!upload.succeeded());
        assert_eq!(upload.objects_written, None);

        assert!(DeleteResponse::completed().succeeded());
    }
}
