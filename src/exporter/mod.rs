// file: src/exporter/mod.rs
// description: document rendering module exports
// reference: internal module structure

pub mod readme;

pub use readme::{DEFAULT_HEADER, ReadmeExporter};
