//! In-memory test doubles for the gateway and sink traits.
//!
//! Enabled for this crate's unit tests and, through the `testing` feature, for
//! the workspace integration tests.

use async_trait::async_trait;
use bp_error::{GatewayError, Result};
use bp_traits::{
    DeleteResponse, GatewayFault, ListResponse, ResultSink, StorageGateway, UploadResponse,
};
use bp_types::{FolderPath, ObjectUri, ProbeObject, RootReport};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A gateway call recorded by [`MockGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// `list(path)`
    List(FolderPath),
    /// `upload(_, uri)`
    Upload(String),
    /// `delete(uri)`
    Delete(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Op {
    List,
    Upload,
    Delete,
}

#[derive(Default)]
struct MockState {
    calls: Vec<Call>,
    listed: HashMap<FolderPath, usize>,
    failures: HashMap<(Op, FolderPath), usize>,
}

/// Scripted in-memory [`StorageGateway`].
///
/// Defaults: unknown folders list as empty, uploads are denied, deletes
/// succeed. Listing the same folder twice panics unless
/// [`allow_repeated_lists`](MockGateway::allow_repeated_lists) was called.
#[derive(Default)]
pub struct MockGateway {
    listings: HashMap<FolderPath, ListResponse>,
    uploads: HashMap<FolderPath, UploadResponse>,
    deletes: HashMap<FolderPath, DeleteResponse>,
    hanging: Vec<(Op, FolderPath)>,
    allow_repeats: bool,
    state: Mutex<MockState>,
}

fn path(raw: &str) -> FolderPath {
    FolderPath::parse(raw).unwrap_or_else(|e| panic!("invalid test path {raw}: {e}"))
}

impl MockGateway {
    /// Create an empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a successful listing of `folder`.
    pub fn with_listing<I, S>(mut self, folder: &str, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.listings
            .insert(path(folder), ListResponse::entries(entries));
        self
    }

    /// Script a list-permission denial for `folder`.
    pub fn deny_listing(mut self, folder: &str) -> Self {
        self.listings.insert(
            path(folder),
            ListResponse::refused(GatewayFault::access_denied(format!(
                "anonymous caller does not have storage.objects.list access to {folder}"
            ))),
        );
        self
    }

    /// Script an arbitrary list response.
    pub fn with_list_response(mut self, folder: &str, response: ListResponse) -> Self {
        self.listings.insert(path(folder), response);
        self
    }

    /// Let uploads into `folder` succeed.
    pub fn allow_write(mut self, folder: &str) -> Self {
        self.uploads
            .insert(path(folder), UploadResponse::completed(1, "uploaded"));
        self
    }

    /// Make uploads into `folder` hit an existing object without delete access.
    pub fn existing_object(mut self, folder: &str) -> Self {
        self.uploads.insert(
            path(folder),
            UploadResponse::refused(GatewayFault::access_denied(
                "anonymous caller does not have storage.objects.delete access",
            )),
        );
        self
    }

    /// Script an arbitrary upload response for `folder`.
    pub fn with_upload_response(mut self, folder: &str, response: UploadResponse) -> Self {
        self.uploads.insert(path(folder), response);
        self
    }

    /// Refuse deletes inside `folder`.
    pub fn deny_delete(mut self, folder: &str) -> Self {
        self.deletes.insert(
            path(folder),
            DeleteResponse::refused(GatewayFault::access_denied(
                "anonymous caller does not have storage.objects.delete access",
            )),
        );
        self
    }

    /// Script an arbitrary delete response for `folder`.
    pub fn with_delete_response(mut self, folder: &str, response: DeleteResponse) -> Self {
        self.deletes.insert(path(folder), response);
        self
    }

    /// Fail the next `times` list calls on `folder` with a transport error.
    pub fn fail_list(self, folder: &str, times: usize) -> Self {
        self.fail(Op::List, folder, times)
    }

    /// Fail the next `times` uploads into `folder` with a transport error.
    pub fn fail_upload(self, folder: &str, times: usize) -> Self {
        self.fail(Op::Upload, folder, times)
    }

    /// Fail the next `times` deletes inside `folder` with a transport error.
    pub fn fail_delete(self, folder: &str, times: usize) -> Self {
        self.fail(Op::Delete, folder, times)
    }

    fn fail(self, op: Op, folder: &str, times: usize) -> Self {
        self.lock().failures.insert((op, path(folder)), times);
        self
    }

    /// Never answer list calls on `folder`.
    pub fn hang_list(mut self, folder: &str) -> Self {
        self.hanging.push((Op::List, path(folder)));
        self
    }

    /// Permit listing the same folder more than once.
    pub fn allow_repeated_lists(mut self) -> Self {
        self.allow_repeats = true;
        self
    }

    /// All recorded calls in order.
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Folders passed to `list`, in call order.
    pub fn list_calls(&self) -> Vec<FolderPath> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::List(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    /// Object URIs passed to `upload`, in call order.
    pub fn upload_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Upload(uri) => Some(uri),
                _ => None,
            })
            .collect()
    }

    /// Object URIs passed to `delete`, in call order.
    pub fn delete_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Delete(uri) => Some(uri),
                _ => None,
            })
            .collect()
    }

    /// How many times `folder` was listed.
    pub fn list_count(&self, folder: &FolderPath) -> usize {
        self.lock().listed.get(folder).copied().unwrap_or(0)
    }

    /// Forget recorded calls, e.g. between two runs over the same mock.
    pub fn reset_calls(&self) {
        let mut state = self.lock();
        state.calls.clear();
        state.listed.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn take_failure(&self, op: Op, folder: &FolderPath) -> Option<GatewayError> {
        let mut state = self.lock();
        let remaining = state.failures.get_mut(&(op, folder.clone()))?;
        if *remaining == 0 {
            return None;
        }
        *remaining = remaining.saturating_sub(1);
        Some(GatewayError::Transport(format!(
            "connection reset while calling {op:?} on {folder}"
        )))
    }

    async fn maybe_hang(&self, op: Op, folder: &FolderPath) {
        if self.hanging.iter().any(|(o, f)| *o == op && f == folder) {
            tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
        }
    }
}

#[async_trait]
impl StorageGateway for MockGateway {
    async fn list(&self, folder: &FolderPath) -> Result<ListResponse> {
        {
            let mut state = self.lock();
            state.calls.push(Call::List(folder.clone()));
            let count = state.listed.entry(folder.clone()).or_insert(0);
            *count += 1;
            if *count > 1 && !self.allow_repeats {
                panic!("{folder} listed more than once");
            }
        }

        self.maybe_hang(Op::List, folder).await;
        if let Some(e) = self.take_failure(Op::List, folder) {
            return Err(e.into());
        }

        Ok(self.listings.get(folder).cloned().unwrap_or_default())
    }

    async fn upload(
        &self,
        _object: &ProbeObject,
        destination: &ObjectUri,
    ) -> Result<UploadResponse> {
        self.lock()
            .calls
            .push(Call::Upload(destination.to_string()));

        let folder = destination.folder();
        self.maybe_hang(Op::Upload, folder).await;
        if let Some(e) = self.take_failure(Op::Upload, folder) {
            return Err(e.into());
        }

        Ok(self.uploads.get(folder).cloned().unwrap_or_else(|| {
            UploadResponse::refused(GatewayFault::access_denied(
                "anonymous caller does not have storage.objects.create access",
            ))
        }))
    }

    async fn delete(&self, object: &ObjectUri) -> Result<DeleteResponse> {
        self.lock().calls.push(Call::Delete(object.to_string()));

        let folder = object.folder();
        self.maybe_hang(Op::Delete, folder).await;
        if let Some(e) = self.take_failure(Op::Delete, folder) {
            return Err(e.into());
        }

        Ok(self
            .deletes
            .get(folder)
            .cloned()
            .unwrap_or_else(DeleteResponse::completed))
    }
}

/// [`ResultSink`] that keeps every report in memory.
#[derive(Default, Clone)]
pub struct CollectingSink {
    reports: Arc<Mutex<Vec<RootReport>>>,
    flushes: Arc<Mutex<usize>>,
}

impl CollectingSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports received so far.
    pub fn reports(&self) -> Vec<RootReport> {
        self.reports
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of flush calls.
    pub fn flush_count(&self) -> usize {
        *self.flushes.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ResultSink for CollectingSink {
    async fn record(&self, report: &RootReport) -> Result<()> {
        self.reports
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(report.clone());
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        *self.flushes.lock().unwrap_or_else(|e| e.into_inner()) += 1;
        Ok(())
    }
}
