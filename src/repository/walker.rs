// file: src/repository/walker.rs
// description: breadth-first traversal of a repository content tree
// reference: explicit work-list traversal over host directory listings

use crate::error::Result;
use crate::models::{DirectoryListing, RepositoryInfo};
use crate::repository::host::ContentHost;
use std::collections::{HashSet, VecDeque};
use tracing::{debug, warn};

/// Lists every directory of one repository exactly once, parents before children.
///
/// The content tree is expected to be acyclic. Paths already queued are
/// dropped with a warning instead of being listed twice.
pub struct TreeWalker<'a, H: ContentHost> {
    host: &'a H,
    repo: &'a RepositoryInfo,
    pending: VecDeque<String>,
    seen: HashSet<String>,
}

impl<'a, H: ContentHost> TreeWalker<'a, H> {
    /// Starts at the repository root, which is the empty path.
    pub fn new(host: &'a H, repo: &'a RepositoryInfo) -> Self {
        Self {
            host,
            repo,
            pending: VecDeque::from([String::new()]),
            seen: HashSet::from([String::new()]),
        }
    }

    /// A listing failure is returned to the caller; the walker is not resumable after it.
    pub async fn next_listing(&mut self) -> Result<Option<DirectoryListing>> {
        let Some(path) = self.pending.pop_front() else {
            return Ok(None);
        };

        let entries = self.host.list_contents(self.repo, &path).await?;

        for dir in entries.iter().filter(|e| e.is_dir()) {
            if self.seen.insert(dir.path.clone()) {
                self.pending.push_back(dir.path.clone());
            } else {
                warn!(
                    "Skipping already visited directory {}:/{}",
                    self.repo.full_name, dir.path
                );
            }
        }

        debug!(
            "Listed {}:/{} ({} entries, {} pending)",
            self.repo.full_name,
            path,
            entries.len(),
            self.pending.len()
        );

        Ok(Some(DirectoryListing::new(path, entries)))
    }
}
