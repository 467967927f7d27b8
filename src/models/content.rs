// file: src/models/content.rs
// description: content tree nodes and directory listings produced during traversal
// reference: github contents api entry shape

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryInfo {
    pub name: String,
    pub full_name: String,
    pub default_branch: String,
    pub language: Option<String>,
    pub html_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    #[serde(rename = "dir")]
    Directory,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentNode {
    pub name: String,
    /// Slash-separated path relative to the repository root; empty for the root.
    pub path: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub html_url: Option<String>,
    pub download_url: Option<String>,
}

impl ContentNode {
    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    pub fn has_extension(&self, extensions: &[String]) -> bool {
        let name = self.name.to_lowercase();
        extensions.iter().any(|ext| {
            let ext = ext.trim_start_matches('.').to_lowercase();
            name.len() > ext.len() + 1 && name.ends_with(&format!(".{}", ext))
        })
    }

    pub fn name_matches(&self, names: &[String]) -> bool {
        names.iter().any(|n| n.eq_ignore_ascii_case(&self.name))
    }

    /// Reference used when linking to this node from a generated document.
    pub fn link(&self) -> Option<&str> {
        self.download_url.as_deref().or(self.html_url.as_deref())
    }
}

/// One directory's immediate children, in the order the host returned them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryListing {
    pub path: String,
    pub entries: Vec<ContentNode>,
}

impl DirectoryListing {
    pub fn new(path: impl Into<String>, entries: Vec<ContentNode>) -> Self {
        Self {
            path: path.into(),
            entries,
        }
    }

    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    pub fn subdirectories(&self) -> impl Iterator<Item = &ContentNode> {
        self.entries.iter().filter(|e| e.is_dir())
    }

    pub fn find_file(&self, names: &[String]) -> Option<&ContentNode> {
        self.entries
            .iter()
            .find(|e| e.is_file() && e.name_matches(names))
    }

    pub fn metainfo_files<'a>(&'a self, names: &'a [String]) -> impl Iterator<Item = &'a ContentNode> {
        self.entries
            .iter()
            .filter(move |e| e.is_file() && e.name_matches(names))
    }

    pub fn images<'a>(&'a self, extensions: &'a [String]) -> impl Iterator<Item = &'a ContentNode> {
        self.entries
            .iter()
            .filter(move |e| e.is_file() && e.has_extension(extensions))
    }

    /// Repository-relative path of a child file of this directory.
    pub fn child_path(&self, name: &str) -> String {
        join_path(&self.path, name)
    }
}

pub fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

pub fn join_path(dir: &str, name: &str) -> String {
    let dir = dir.trim_matches('/');
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}

/// Drops the last segment of a browse url.
pub fn parent_url(url: &str) -> String {
    match url.trim_end_matches('/').rsplit_once('/') {
        Some((parent, _)) => parent.to_string(),
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, path: &str) -> ContentNode {
        ContentNode {
            name: name.to_string(),
            path: path.to_string(),
            kind: NodeKind::File,
            html_url: None,
            download_url: Some(format!("https://raw.example/{}", path)),
        }
    }

    fn exts() -> Vec<String> {
        vec!["png".to_string(), "jpg".to_string(), "jpeg".to_string(), "gif".to_string()]
    }

    #[test]
    fn test_path_helpers() {
        assert_eq!(join_path("", "README.md"), "README.md");
        assert_eq!(join_path("a/b", "README.md"), "a/b/README.md");
        assert_eq!(split_segments("/a//b/"), vec!["a", "b"]);
    }

    #[test]
    fn test_parent_url() {
        assert_eq!(
            parent_url("https://github.com/o/r/blob/main/q/Metainfo.txt"),
            "https://github.com/o/r/blob/main/q"
        );
    }

    #[test]
    fn test_image_detection_is_case_insensitive() {
        assert!(file("chart.PNG", "chart.PNG").has_extension(&exts()));
        assert!(file("plot.jpeg", "plot.jpeg").has_extension(&exts()));
        assert!(!file("notes.txt", "notes.txt").has_extension(&exts()));
        assert!(!file("png", "png").has_extension(&exts()));
    }

    #[test]
    fn test_listing_preserves_image_order() {
        let listing = DirectoryListing::new(
            "q",
            vec![
                file("plot.jpg", "q/plot.jpg"),
                file("Metainfo.txt", "q/Metainfo.txt"),
                file("chart.png", "q/chart.png"),
            ],
        );
        let names: Vec<_> = listing.images(&exts()).map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["plot.jpg", "chart.png"]);

        let metainfo = vec!["metainfo.txt".to_string()];
        assert_eq!(listing.metainfo_files(&metainfo).count(), 1);
        assert_eq!(listing.child_path("README.md"), "q/README.md");
    }

    #[test]
    fn test_node_kind_deserializes_github_types() {
        let json = r#"[{"name":"a","path":"a","type":"dir","html_url":null,"download_url":null},
                      {"name":"b","path":"b","type":"symlink","html_url":null,"download_url":null}]"#;
        let nodes: Vec<ContentNode> = serde_json::from_str(json).unwrap();
        assert_eq!(nodes[0].kind, NodeKind::Directory);
        assert_eq!(nodes[1].kind, NodeKind::Other);
    }
}
