// file: src/database/mod.rs
// description: database operations module exports
// reference: internal module structure

pub mod client;
pub mod insert;
pub mod schema;

pub use client::LanceDbClient;
pub use insert::{MemorySink, MetadataSink, MetadataTable};
pub use schema::{METADATA_COLUMNS, SchemaManager};
