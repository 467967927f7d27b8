// file: src/repository/host.rs
// description: content hosting interface consumed by the tree walker and pipelines
// reference: github contents api (list, download, create)

use crate::error::Result;
use crate::models::{ContentNode, RepositoryInfo};

/// Read and create-only access to a collection of repositories.
///
/// Implementations must never overwrite: `create_file` on an existing path
/// returns [`crate::PipelineError::Conflict`].
#[allow(async_fn_in_trait)]
pub trait ContentHost {
    async fn list_repositories(&self) -> Result<Vec<RepositoryInfo>>;

    /// Immediate children of `path` (empty string for the repository root), in host order.
    async fn list_contents(&self, repo: &RepositoryInfo, path: &str) -> Result<Vec<ContentNode>>;

    async fn fetch_file(&self, repo: &RepositoryInfo, node: &ContentNode) -> Result<Vec<u8>>;

    async fn create_file(
        &self,
        repo: &RepositoryInfo,
        path: &str,
        message: &str,
        content: &str,
        branch: &str,
    ) -> Result<()>;
}
