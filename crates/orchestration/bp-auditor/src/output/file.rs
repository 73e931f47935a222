//! Newline-delimited result files.

use async_trait::async_trait;
use bp_error::{OutputError, Result};
use bp_traits::ResultSink;
use bp_types::{FolderPath, RootReport};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// File name prefix for write-vulnerable folders.
pub const WRITE_VULNERABLE_FILE_PREFIX: &str = "OutputWriteVulnerableBucketsAndFolders";

/// File name prefix for delete-vulnerable folders.
pub const DELETE_VULNERABLE_FILE_PREFIX: &str = "OutputDeleteVulnerableBucketsAndFolders";

/// File name prefix for folders with ambiguous results.
pub const AMBIGUOUS_FILE_PREFIX: &str = "OutputAmbiguousBucketsAndFolders";

/// Timestamp format embedded in result file names.
pub const RUN_STAMP_FORMAT: &str = "%Y-%m-%d--%H-%M";

/// Appends vulnerable folder paths to per-run result files.
///
/// All three files share one run stamp. They are appended to after each
/// audited root, so results survive an interrupted run. Roots that could not
/// be listed add nothing.
pub struct FileSink {
    write_path: PathBuf,
    delete_path: PathBuf,
    ambiguous_path: PathBuf,
}

impl FileSink {
    /// Create a sink writing into `output_dir`, stamped with the current time.
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self::with_run_time(output_dir, Local::now())
    }

    /// Create a sink stamped with an explicit run time.
    pub fn with_run_time(output_dir: impl AsRef<Path>, run_time: DateTime<Local>) -> Self {
        let dir = output_dir.as_ref();
        let stamp = run_time.format(RUN_STAMP_FORMAT).to_string();
        let file = |prefix: &str| dir.join(format!("{prefix}-{stamp}.txt"));

        Self {
            write_path: file(WRITE_VULNERABLE_FILE_PREFIX),
            delete_path: file(DELETE_VULNERABLE_FILE_PREFIX),
            ambiguous_path: file(AMBIGUOUS_FILE_PREFIX),
        }
    }

    /// Path of the write-vulnerable results file.
    pub fn write_path(&self) -> &Path {
        &self.write_path
    }

    /// Path of the delete-vulnerable results file.
    pub fn delete_path(&self) -> &Path {
        &self.delete_path
    }

    /// Path of the ambiguous results file.
    pub fn ambiguous_path(&self) -> &Path {
        &self.ambiguous_path
    }
}

async fn append_paths(file: &Path, paths: &[FolderPath]) -> Result<()> {
    if let Some(parent) = file.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| OutputError::Io(format!("{}: {e}", parent.display())))?;
    }

    let mut handle = OpenOptions::new()
        .create(true)
        .append(true)
        .open(file)
        .await
        .map_err(|e| OutputError::Io(format!("{}: {e}", file.display())))?;

    let mut buf = String::new();
    for path in paths {
        buf.push_str(&path.to_string());
        buf.push('\n');
    }

    handle
        .write_all(buf.as_bytes())
        .await
        .map_err(|e| OutputError::Io(format!("{}: {e}", file.display())))?;
    handle
        .flush()
        .await
        .map_err(|e| OutputError::Io(format!("{}: {e}", file.display())))?;

    Ok(())
}

#[async_trait]
impl ResultSink for FileSink {
    async fn record(&self, report: &RootReport) -> Result<()> {
        if !report.is_audited() {
            return Ok(());
        }

        append_paths(&self.write_path, &report.write_vulnerable).await?;
        append_paths(&self.delete_path, &report.delete_vulnerable).await?;
        append_paths(&self.ambiguous_path, &report.ambiguous).await?;

        debug!(
            root = %report.root,
            write_vulnerable = report.write_vulnerable.len(),
            delete_vulnerable = report.delete_vulnerable.len(),
            "Appended results"
        );
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        Ok(())
    }
}
