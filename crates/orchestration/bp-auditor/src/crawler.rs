//! Breadth-first folder discovery.

use bp_traits::StorageGateway;
use bp_types::{FolderPath, ListDenial};
use futures::{StreamExt, stream};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};

use crate::classify::{ListOutcome, classify_listing};

/// A folder found during discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFolder {
    /// The folder path
    pub path: FolderPath,

    /// Whether listing the folder succeeded
    pub listable: bool,
}

/// Insertion-ordered set of unique folders found under one root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveredFolders {
    entries: Vec<DiscoveredFolder>,
    index: HashMap<FolderPath, usize>,
}

impl DiscoveredFolders {
    /// Add a folder; returns `false` if it was already present.
    fn insert(&mut self, path: FolderPath) -> bool {
        if self.index.contains_key(&path) {
            return false;
        }
        self.index.insert(path.clone(), self.entries.len());
        self.entries.push(DiscoveredFolder {
            path,
            listable: true,
        });
        true
    }

    fn mark_not_listable(&mut self, path: &FolderPath) {
        if let Some(&i) = self.index.get(path) {
            self.entries[i].listable = false;
        }
    }

    /// Number of unique folders.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no folder was discovered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `path` was discovered.
    pub fn contains(&self, path: &FolderPath) -> bool {
        self.index.contains_key(path)
    }

    /// Folders in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &DiscoveredFolder> {
        self.entries.iter()
    }

    /// Folder paths in discovery order.
    pub fn paths(&self) -> Vec<FolderPath> {
        self.entries.iter().map(|f| f.path.clone()).collect()
    }
}

/// Result of crawling one root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlOutcome {
    /// The root was listable; all reachable folders, root last
    Discovered(DiscoveredFolders),
    /// The root itself could not be listed
    RootNotListable(ListDenial),
}

/// Walks the folder tree under a root, listing each folder at most once.
pub struct FolderCrawler<'a, G: StorageGateway> {
    gateway: &'a G,
    max_concurrent_lists: usize,
    escalations: AtomicUsize,
}

impl<'a, G: StorageGateway> FolderCrawler<'a, G> {
    /// Create a crawler listing at most `max_concurrent_lists` folders at once.
    pub fn new(gateway: &'a G, max_concurrent_lists: usize) -> Self {
        Self {
            gateway,
            max_concurrent_lists: max_concurrent_lists.max(1),
            escalations: AtomicUsize::new(0),
        }
    }

    /// Number of list calls that failed after all retries.
    pub fn gateway_errors(&self) -> usize {
        self.escalations.load(Ordering::Relaxed)
    }

    /// Discover every folder reachable under `root`.
    ///
    /// Each round lists the unvisited folders of the current frontier and
    /// collects unseen child folders into the next one; the crawl ends when a
    /// round finds nothing new. If the root cannot be listed the whole root is
    /// abandoned. A deeper folder that cannot be listed is kept (it still gets
    /// probed) but not expanded.
    pub async fn crawl(&self, root: &FolderPath) -> CrawlOutcome {
        let mut visited: HashSet<FolderPath> = HashSet::new();
        let mut discovered = DiscoveredFolders::default();

        info!(root = %root, "Listing root folder");
        visited.insert(root.clone());

        let children = match self.list_folder(root).await {
            ListOutcome::Listable { folders } => folders,
            ListOutcome::NotListable { reason } => {
                warn!(root = %root, reason = %reason, "Root is not listable, skipping");
                return CrawlOutcome::RootNotListable(reason);
            }
        };

        let mut frontier = self.admit(root, root, children, &visited, &mut discovered);
        let mut round = 0usize;

        while !frontier.is_empty() {
            round += 1;
            let pending: Vec<FolderPath> = frontier
                .into_iter()
                .filter(|path| visited.insert(path.clone()))
                .collect();

            debug!(root = %root, round, folders = pending.len(), "Listing crawl round");

            let listed: Vec<(FolderPath, ListOutcome)> = stream::iter(pending)
                .map(|path| async move {
                    let outcome = self.list_folder(&path).await;
                    (path, outcome)
                })
                .buffered(self.max_concurrent_lists)
                .collect()
                .await;

            let mut next = Vec::new();
            for (path, outcome) in listed {
                match outcome {
                    ListOutcome::Listable { folders } => {
                        next.extend(self.admit(root, &path, folders, &visited, &mut discovered));
                    }
                    ListOutcome::NotListable { reason } => {
                        warn!(folder = %path, reason = %reason, "Folder is not listable");
                        discovered.mark_not_listable(&path);
                    }
                }
            }
            frontier = next;
        }

        discovered.insert(root.clone());

        info!(
            root = %root,
            folders = discovered.len(),
            rounds = round,
            "Discovery completed"
        );

        CrawlOutcome::Discovered(discovered)
    }

    /// Keep the children that are new and inside the root; returns them in order.
    fn admit(
        &self,
        root: &FolderPath,
        parent: &FolderPath,
        children: Vec<FolderPath>,
        visited: &HashSet<FolderPath>,
        discovered: &mut DiscoveredFolders,
    ) -> Vec<FolderPath> {
        let mut admitted = Vec::new();

        for child in children {
            if !is_within(root, &child) {
                debug!(parent = %parent, child = %child, "Ignoring entry outside the root");
                continue;
            }
            if visited.contains(&child) {
                continue;
            }
            if discovered.insert(child.clone()) {
                debug!(parent = %parent, folder = %child, "Discovered folder");
                admitted.push(child);
            }
        }

        admitted
    }

    async fn list_folder(&self, path: &FolderPath) -> ListOutcome {
        match self.gateway.list(path).await {
            Ok(response) => classify_listing(&response),
            Err(e) => {
                self.escalations.fetch_add(1, Ordering::Relaxed);
                warn!(folder = %path, error = %e, "Listing failed after retries");
                ListOutcome::NotListable {
                    reason: ListDenial::Failed(e.to_string()),
                }
            }
        }
    }
}

fn is_within(root: &FolderPath, path: &FolderPath) -> bool {
    path.scheme() == root.scheme()
        && path.bucket() == root.bucket()
        && path.key_prefix().starts_with(root.key_prefix())
}
