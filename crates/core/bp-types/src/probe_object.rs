//! The local file uploaded to test write access.

use bp_error::InputError;
use bytes::Bytes;
use std::path::{Path, PathBuf};

/// A harmless local file uploaded solely to test write capability.
///
/// Loaded once before the audit starts, so a missing file is reported before
/// any network activity.
#[derive(Debug, Clone)]
pub struct ProbeObject {
    local_path: PathBuf,
    name: String,
    body: Bytes,
}

impl ProbeObject {
    /// Load the probe object from disk.
    ///
    /// The object name used in the bucket is the file name component.
    pub fn load(local_path: impl AsRef<Path>) -> Result<Self, InputError> {
        let local_path = local_path.as_ref();

        if !local_path.is_file() {
            return Err(InputError::ProbeFile(format!(
                "{} does not exist or is not a file",
                local_path.display()
            )));
        }

        let name = local_path
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| {
                InputError::ProbeFile(format!(
                    "{} has no usable file name",
                    local_path.display()
                ))
            })?
            .to_string();

        let body = std::fs::read(local_path).map_err(|e| {
            InputError::ProbeFile(format!("failed to read {}: {}", local_path.display(), e))
        })?;

        Ok(Self {
            local_path: local_path.to_path_buf(),
            name,
            body: Bytes::from(body),
        })
    }

    /// Build a probe object from in-memory content.
    pub fn from_bytes(name: impl Into<String>, body: impl Into<Bytes>) -> Self {
        let name = name.into();
        Self {
            local_path: PathBuf::from(&name),
            name,
            body: body.into(),
        }
    }

    /// Path of the local file this object was loaded from.
    pub fn local_path(&self) -> &Path {
        &self.local_path
    }

    /// Object name used inside each probed folder.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Object content.
    pub fn body(&self) -> &Bytes {
        &self.body
    }
}
