//! Classification of gateway responses into probe outcomes.
//!
//! Structured fault fields (error code, HTTP status) are checked first. The
//! text markers below are a compatibility fallback for backends that only
//! return gsutil-style error text. Every text predicate is an explicit
//! conjunction: a denial is only recognized when all of its markers are
//! present.

use bp_traits::{DeleteResponse, FaultKind, GatewayFault, ListResponse, UploadResponse};
use bp_types::{FolderPath, ListDenial};
use tracing::trace;

/// Marker of a 403 access-denied exception in gsutil-style error text.
pub const ACCESS_DENIED_MARKER: &str = "AccessDeniedException: 403";

/// Marker of a missing list permission.
pub const LIST_SCOPE_MARKER: &str = "does not have storage.objects.list access";

/// Marker of a missing delete permission.
pub const DELETE_SCOPE_MARKER: &str = "does not have storage.objects.delete access";

/// Permission name that appears when overwriting an existing object is refused.
pub const DELETE_PERMISSION: &str = "storage.objects.delete";

/// Confirmation text of a single-object copy.
pub const UPLOAD_CONFIRMATION: &str = "Operation completed over 1 objects";

/// Outcome of a list call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListOutcome {
    /// The folder can be listed; only child folders are kept
    Listable { folders: Vec<FolderPath> },
    /// The folder cannot be listed
    NotListable { reason: ListDenial },
}

/// Outcome of an upload call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Exactly one object was written
    WriteSucceeded,
    /// The target already exists and overwriting it needs delete permission
    WriteDeniedExisting,
    /// The upload was refused
    WriteDenied,
    /// The response could not be categorized with confidence
    Ambiguous(String),
}

/// Outcome of a delete call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The object was removed
    DeleteSucceeded,
    /// The delete was refused
    DeleteDenied,
    /// The response could not be categorized with confidence
    Ambiguous(String),
}

/// Whether error text reports a missing list permission.
pub fn is_text_list_denial(text: &str) -> bool {
    text.contains(ACCESS_DENIED_MARKER) && text.contains(LIST_SCOPE_MARKER)
}

/// Whether error text reports a missing delete permission.
pub fn is_text_delete_denial(text: &str) -> bool {
    text.contains(ACCESS_DENIED_MARKER) && text.contains(DELETE_SCOPE_MARKER)
}

/// Classify a list response.
///
/// On success the entries are partitioned into folders (trailing `/`) and
/// files, and only folders are returned.
pub fn classify_listing(response: &ListResponse) -> ListOutcome {
    match &response.fault {
        None => ListOutcome::Listable {
            folders: folders_only(&response.entries),
        },
        Some(fault) => ListOutcome::NotListable {
            reason: list_denial(fault),
        },
    }
}

fn list_denial(fault: &GatewayFault) -> ListDenial {
    match fault.kind() {
        FaultKind::AccessDenied => ListDenial::AccessDenied,
        FaultKind::NotFound => ListDenial::NotFound,
        FaultKind::Other if is_text_list_denial(&fault.message) => ListDenial::AccessDenied,
        FaultKind::Other => ListDenial::Failed(fault.message.clone()),
    }
}

fn folders_only(entries: &[String]) -> Vec<FolderPath> {
    entries
        .iter()
        .filter(|entry| entry.ends_with('/'))
        .filter_map(|entry| match FolderPath::parse(entry) {
            Ok(path) => Some(path),
            Err(e) => {
                trace!(entry = %entry, error = %e, "Skipping unparseable listing entry");
                None
            }
        })
        .collect()
}

/// Classify an upload response.
pub fn classify_write(response: &UploadResponse) -> WriteOutcome {
    match &response.fault {
        None => match response.objects_written {
            Some(1) => WriteOutcome::WriteSucceeded,
            None if response.output.contains(UPLOAD_CONFIRMATION) => WriteOutcome::WriteSucceeded,
            Some(n) => WriteOutcome::Ambiguous(format!(
                "upload reported {n} objects written, expected exactly 1"
            )),
            None => WriteOutcome::Ambiguous(format!(
                "upload succeeded without confirmation: {:?}",
                response.output
            )),
        },
        Some(fault) => {
            let denied = fault.kind() == FaultKind::AccessDenied
                || fault.message.contains(ACCESS_DENIED_MARKER);

            if denied && fault.message.contains(DELETE_PERMISSION) {
                WriteOutcome::WriteDeniedExisting
            } else {
                WriteOutcome::WriteDenied
            }
        }
    }
}

/// Classify a delete response.
///
/// Faults other than an access denial are ambiguous rather than being read
/// as a successful delete.
pub fn classify_delete(response: &DeleteResponse) -> DeleteOutcome {
    match &response.fault {
        None => DeleteOutcome::DeleteSucceeded,
        Some(fault)
            if fault.kind() == FaultKind::AccessDenied
                || is_text_delete_denial(&fault.message) =>
        {
            DeleteOutcome::DeleteDenied
        }
        Some(fault) => DeleteOutcome::Ambiguous(format!(
            "delete failed without an access denial: {}",
            fault.message
        )),
    }
}
