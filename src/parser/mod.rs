// file: src/parser/mod.rs
// description: metadata record parsing module exports
// reference: internal module structure

pub mod metainfo;

pub use metainfo::{MetainfoParser, ParsedFields};
