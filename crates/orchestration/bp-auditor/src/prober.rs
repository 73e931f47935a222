//! Write-then-delete capability probing of a single folder.

use bp_traits::StorageGateway;
use bp_types::{FolderPath, ObjectUri, ProbeObject, ProbeVerdict};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};

use crate::classify::{DeleteOutcome, WriteOutcome, classify_delete, classify_write};

/// Probes folders for unauthorized write and delete access.
///
/// A successful write leaves the probe object in the folder until the delete
/// step removes it. When the delete is refused the object stays behind; this
/// is logged with its full URI so operators can clean it up.
pub struct CapabilityProber<'a, G: StorageGateway> {
    gateway: &'a G,
    probe_object: &'a ProbeObject,
    escalations: AtomicUsize,
}

impl<'a, G: StorageGateway> CapabilityProber<'a, G> {
    /// Create a prober uploading `probe_object`.
    pub fn new(gateway: &'a G, probe_object: &'a ProbeObject) -> Self {
        Self {
            gateway,
            probe_object,
            escalations: AtomicUsize::new(0),
        }
    }

    /// Number of gateway calls that failed after all retries.
    pub fn gateway_errors(&self) -> usize {
        self.escalations.load(Ordering::Relaxed)
    }

    /// Run the probe sequence against `folder`.
    ///
    /// `listable` is carried into the verdict; `None` means the folder was
    /// not listed.
    ///
    /// The delete step only runs after a confirmed write of our own probe
    /// object; an object that was already present is never deleted.
    pub async fn probe(&self, folder: &FolderPath, listable: Option<bool>) -> ProbeVerdict {
        let target = folder.join(self.probe_object.name());
        debug!(folder = %folder, object = %target, "Testing write access");

        match self.try_write(&target).await {
            WriteOutcome::WriteSucceeded => {
                warn!(folder = %folder, "Folder is write-vulnerable");
                self.probe_delete(folder, listable, &target).await
            }
            WriteOutcome::WriteDeniedExisting => {
                info!(
                    folder = %folder,
                    object = %target,
                    "Probe object already exists and delete access is missing, skipping delete test"
                );
                ProbeVerdict::not_writable(folder.clone(), listable)
            }
            WriteOutcome::WriteDenied => {
                info!(folder = %folder, "Folder is not write-vulnerable");
                ProbeVerdict::not_writable(folder.clone(), listable)
            }
            WriteOutcome::Ambiguous(detail) => {
                warn!(folder = %folder, detail = %detail, "Write probe result is ambiguous");
                ProbeVerdict::not_writable(folder.clone(), listable).with_ambiguity(detail)
            }
        }
    }

    async fn probe_delete(
        &self,
        folder: &FolderPath,
        listable: Option<bool>,
        target: &ObjectUri,
    ) -> ProbeVerdict {
        debug!(folder = %folder, object = %target, "Testing delete access");

        match self.try_delete(target).await {
            DeleteOutcome::DeleteSucceeded => {
                warn!(folder = %folder, "Folder is delete-vulnerable");
                ProbeVerdict::written(folder.clone(), listable, true)
            }
            DeleteOutcome::DeleteDenied => {
                info!(folder = %folder, "Folder is not delete-vulnerable");
                warn!(object = %target, "Probe object left behind");
                ProbeVerdict::written(folder.clone(), listable, false)
            }
            DeleteOutcome::Ambiguous(detail) => {
                warn!(folder = %folder, detail = %detail, "Delete probe result is ambiguous");
                warn!(object = %target, "Probe object may have been left behind");
                ProbeVerdict::written_delete_unresolved(folder.clone(), listable)
                    .with_ambiguity(detail)
            }
        }
    }

    async fn try_write(&self, target: &ObjectUri) -> WriteOutcome {
        match self.gateway.upload(self.probe_object, target).await {
            Ok(response) => classify_write(&response),
            Err(e) => {
                self.escalations.fetch_add(1, Ordering::Relaxed);
                warn!(object = %target, error = %e, "Upload failed after retries");
                WriteOutcome::WriteDenied
            }
        }
    }

    async fn try_delete(&self, target: &ObjectUri) -> DeleteOutcome {
        match self.gateway.delete(target).await {
            Ok(response) => classify_delete(&response),
            Err(e) => {
                self.escalations.fetch_add(1, Ordering::Relaxed);
                warn!(object = %target, error = %e, "Delete failed after retries");
                DeleteOutcome::DeleteDenied
            }
        }
    }
}
