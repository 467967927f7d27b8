// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod content;
pub mod record;

pub use content::{ContentNode, DirectoryListing, NodeKind, RepositoryInfo};
pub use record::{
    ExtractedRecord, IngestionRow, MetaInfoRecord, RecordOrigin, SENTINEL, is_sentinel,
};
