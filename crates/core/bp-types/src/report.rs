//! Probe verdicts and per-root audit reports.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::FolderPath;

/// Why a folder could not be listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum ListDenial {
    /// The caller lacks list permission
    AccessDenied,
    /// The bucket or prefix does not exist
    NotFound,
    /// Any other failure, including transient errors that outlived retries
    Failed(String),
}

impl fmt::Display for ListDenial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListDenial::AccessDenied => write!(f, "access denied"),
            ListDenial::NotFound => write!(f, "not found"),
            ListDenial::Failed(detail) => write!(f, "listing failed: {detail}"),
        }
    }
}

/// Outcome of probing a single folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeVerdict {
    /// The probed folder
    pub path: FolderPath,

    /// Whether the folder could be listed during discovery.
    ///
    /// Absent when the folder was probed without being listed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listable: Option<bool>,

    /// Whether the probe object could be written
    pub write_vulnerable: bool,

    /// Whether the probe object could be deleted again.
    ///
    /// Only present when the write succeeded and the delete outcome was
    /// conclusive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_vulnerable: Option<bool>,

    /// Set when a response could not be classified with confidence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ambiguity: Option<String>,
}

impl ProbeVerdict {
    /// The probe object could not be written.
    pub fn not_writable(path: FolderPath, listable: Option<bool>) -> Self {
        Self {
            path,
            listable,
            write_vulnerable: false,
            delete_vulnerable: None,
            ambiguity: None,
        }
    }

    /// The probe object was written; `deleted` records the delete probe.
    pub fn written(path: FolderPath, listable: Option<bool>, deleted: bool) -> Self {
        Self {
            path,
            listable,
            write_vulnerable: true,
            delete_vulnerable: Some(deleted),
            ambiguity: None,
        }
    }

    /// The probe object was written but the delete outcome is unknown.
    pub fn written_delete_unresolved(path: FolderPath, listable: Option<bool>) -> Self {
        Self {
            path,
            listable,
            write_vulnerable: true,
            delete_vulnerable: None,
            ambiguity: None,
        }
    }

    /// Attach an ambiguity note to this verdict.
    pub fn with_ambiguity(mut self, detail: impl Into<String>) -> Self {
        self.ambiguity = Some(detail.into());
        self
    }

    /// Whether the delete probe confirmed delete access.
    pub fn is_delete_vulnerable(&self) -> bool {
        self.delete_vulnerable == Some(true)
    }

    /// Whether any step of the probe was ambiguous.
    pub fn is_ambiguous(&self) -> bool {
        self.ambiguity.is_some()
    }
}

/// Status of a root after its audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum RootStatus {
    /// The root was crawled and every discovered folder probed
    Audited,
    /// The root itself could not be listed; nothing was probed
    NotListable { reason: ListDenial },
}

/// Results of auditing one root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootReport {
    /// The audited root
    pub root: FolderPath,

    /// Whether the root was audited or skipped
    #[serde(flatten)]
    pub status: RootStatus,

    /// Number of unique folders discovered (root included)
    pub folders_discovered: usize,

    /// Per-folder verdicts in probe order
    pub verdicts: Vec<ProbeVerdict>,

    /// Folders where the probe object could be written
    pub write_vulnerable: Vec<FolderPath>,

    /// Folders where the probe object could also be deleted
    pub delete_vulnerable: Vec<FolderPath>,

    /// Folders with at least one ambiguous classification
    pub ambiguous: Vec<FolderPath>,
}

impl RootReport {
    /// Report for a root that could not be listed.
    pub fn not_listable(root: FolderPath, reason: ListDenial) -> Self {
        Self {
            root,
            status: RootStatus::NotListable { reason },
            folders_discovered: 0,
            verdicts: Vec::new(),
            write_vulnerable: Vec::new(),
            delete_vulnerable: Vec::new(),
            ambiguous: Vec::new(),
        }
    }

    /// Whether the root was audited.
    pub fn is_audited(&self) -> bool {
        self.status == RootStatus::Audited
    }

    /// Whether any vulnerable folder was found.
    pub fn has_findings(&self) -> bool {
        !self.write_vulnerable.is_empty() || !self.delete_vulnerable.is_empty()
    }
}
