// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod config;
pub mod database;
pub mod error;
pub mod exporter;
pub mod extractor;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod repository;
pub mod utils;

pub use config::{Config, DatabaseConfig, HostingConfig, PipelineConfig};
pub use database::{LanceDbClient, MemorySink, MetadataSink, MetadataTable, SchemaManager};
pub use error::{PipelineError, Result};
pub use exporter::ReadmeExporter;
pub use extractor::FieldExtractor;
pub use models::{
    ContentNode, DirectoryListing, ExtractedRecord, IngestionRow, MetaInfoRecord, RecordOrigin,
    RepositoryInfo,
};
pub use parser::{MetainfoParser, ParsedFields};
pub use pipeline::{MetadataIngestor, PipelineStats, ProgressTracker, ReadmeGenerator};
pub use repository::{ContentHost, GitHubClient, LocalHost, TreeWalker};
pub use utils::Validator;
