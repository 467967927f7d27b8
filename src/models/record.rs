// file: src/models/record.rs
// description: metadata record models shared by document generation and ingestion
// reference: internal data structures

use serde::{Deserialize, Serialize};

/// Placeholder written for any field that could not be extracted.
pub const SENTINEL: &str = "nan";

pub fn is_sentinel(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case(SENTINEL)
}

/// Raw text of one metadata file together with where it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaInfoRecord {
    pub directory: String,
    pub file_path: String,
    pub text: String,
}

impl MetaInfoRecord {
    pub fn new(directory: impl Into<String>, file_path: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            directory: directory.into(),
            file_path: file_path.into(),
            text: String::from_utf8_lossy(bytes).into_owned(),
        }
    }
}

/// Semantic fields recognized in a metadata record. `None` means the field was absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    pub title: Option<String>,
    pub provenance: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<String>,
    pub author: Option<String>,
    pub submitted: Option<String>,
}

/// Where a record came from, filled in by the ingestion caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordOrigin {
    pub repo_name: String,
    pub url: Option<String>,
    pub parent_folder_url: Option<String>,
    pub language: Option<String>,
    pub image_url: Option<String>,
}

/// One row of the `metadata` table. Every column is always populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionRow {
    pub repo_name: String,
    pub name_of_quantlet: String,
    pub published_in: String,
    pub description: String,
    pub keywords: String,
    pub author: String,
    pub submitted: String,
    pub url: String,
    pub parent_folder_url: String,
    pub language: String,
    pub image_url: String,
}

fn or_sentinel(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .unwrap_or(SENTINEL)
        .to_string()
}

impl IngestionRow {
    pub fn new(record: &ExtractedRecord, origin: &RecordOrigin) -> Self {
        Self {
            repo_name: origin.repo_name.clone(),
            name_of_quantlet: or_sentinel(&record.title),
            published_in: or_sentinel(&record.provenance),
            description: or_sentinel(&record.description),
            keywords: or_sentinel(&record.keywords),
            author: or_sentinel(&record.author),
            submitted: or_sentinel(&record.submitted),
            url: or_sentinel(&origin.url),
            parent_folder_url: or_sentinel(&origin.parent_folder_url),
            language: or_sentinel(&origin.language),
            image_url: or_sentinel(&origin.image_url),
        }
    }

    /// Column values in table order, excluding the generated id.
    pub fn columns(&self) -> [&str; 11] {
        [
            self.repo_name.as_str(),
            self.name_of_quantlet.as_str(),
            self.published_in.as_str(),
            self.description.as_str(),
            self.keywords.as_str(),
            self.author.as_str(),
            self.submitted.as_str(),
            self.url.as_str(),
            self.parent_folder_url.as_str(),
            self.language.as_str(),
            self.image_url.as_str(),
        ]
    }
}
