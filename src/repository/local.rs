// file: src/repository/local.rs
// description: filesystem-backed content host, one subdirectory per repository
// reference: https://doc.rust-lang.org/std/fs/fn.read_dir.html

use crate::error::{PipelineError, Result};
use crate::models::{ContentNode, NodeKind, RepositoryInfo, content::join_path};
use crate::repository::host::ContentHost;
use crate::utils::Validator;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub struct LocalHost {
    root: PathBuf,
    owner: String,
}

impl LocalHost {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        Validator::validate_directory(&root)?;

        let owner = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "local".to_string());

        Ok(Self { root, owner })
    }

    fn resolve(&self, repo: &RepositoryInfo, path: &str) -> Result<PathBuf> {
        Validator::validate_relative_path(path)?;
        Ok(self.root.join(&repo.name).join(path))
    }

    fn file_url(path: &Path) -> String {
        let absolute = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        format!("file://{}", absolute.display())
    }

    fn io_error(path: &Path, source: std::io::Error) -> PipelineError {
        PipelineError::FileOperation {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Removes a partially written file so the directory is not seen as documented.
    fn discard_on_error(target: &Path, written: std::io::Result<()>) -> Result<()> {
        written.map_err(|e| {
            if let Err(remove) = fs::remove_file(target) {
                warn!("Could not remove partial file {}: {}", target.display(), remove);
            }
            Self::io_error(target, e)
        })
    }
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

impl ContentHost for LocalHost {
    async fn list_repositories(&self) -> Result<Vec<RepositoryInfo>> {
        info!("Listing local repositories under {}", self.root.display());

        let mut repositories = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(|e| Self::io_error(&self.root, e))? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_hidden(&name) || !entry.file_type()?.is_dir() {
                continue;
            }

            repositories.push(RepositoryInfo {
                full_name: format!("{}/{}", self.owner, name),
                html_url: Self::file_url(&entry.path()),
                name,
                default_branch: "main".to_string(),
                language: None,
            });
        }

        repositories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(repositories)
    }

    async fn list_contents(&self, repo: &RepositoryInfo, path: &str) -> Result<Vec<ContentNode>> {
        let dir = self.resolve(repo, path)?;
        debug!("Listing {}", dir.display());

        let mut nodes = Vec::new();
        for entry in fs::read_dir(&dir).map_err(|e| Self::io_error(&dir, e))? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_hidden(&name) {
                continue;
            }

            // Symlinks are reported as Other and never followed.
            let file_type = entry.file_type()?;
            let kind = if file_type.is_dir() {
                NodeKind::Directory
            } else if file_type.is_file() {
                NodeKind::File
            } else {
                NodeKind::Other
            };

            let url = Self::file_url(&entry.path());
            nodes.push(ContentNode {
                path: join_path(path, &name),
                name,
                kind,
                download_url: (kind == NodeKind::File).then(|| url.clone()),
                html_url: Some(url),
            });
        }

        nodes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(nodes)
    }

    async fn fetch_file(&self, repo: &RepositoryInfo, node: &ContentNode) -> Result<Vec<u8>> {
        let path = self.resolve(repo, &node.path)?;
        fs::read(&path).map_err(|e| Self::io_error(&path, e))
    }

    async fn create_file(
        &self,
        repo: &RepositoryInfo,
        path: &str,
        message: &str,
        content: &str,
        _branch: &str,
    ) -> Result<()> {
        let target = self.resolve(repo, path)?;

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&target) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(PipelineError::Conflict(format!("{}:/{}", repo.full_name, path)));
            }
            Err(e) => return Err(Self::io_error(&target, e)),
        };

        Self::discard_on_error(&target, file.write_all(content.as_bytes()))?;

        info!("Created {} ({})", target.display(), message);
        Ok(())
    }
}
