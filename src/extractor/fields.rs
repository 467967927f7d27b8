// file: src/extractor/fields.rs
// description: semantic field extraction shared by readme generation and ingestion
// reference: metadata record field conventions

use crate::extractor::patterns::{clean, strip_marker};
use crate::models::{ExtractedRecord, is_sentinel};
use crate::parser::{MetainfoParser, ParsedFields};

pub const TITLE_KEY: &str = "Name of Quantlet";
pub const PROVENANCE_KEY: &str = "Published in";
pub const DESCRIPTION_KEY: &str = "Description";
pub const KEYWORDS_KEY: &str = "Keywords";
pub const AUTHOR_KEY: &str = "Author";
pub const SUBMITTED_KEY: &str = "Submitted";

pub struct FieldExtractor {
    parser: MetainfoParser,
}

impl FieldExtractor {
    pub fn new() -> Self {
        Self {
            parser: MetainfoParser::new(),
        }
    }

    /// Parses raw record text and extracts from the resulting mapping.
    pub fn extract_text(&self, content: &str) -> (ParsedFields, ExtractedRecord) {
        let fields = self.parser.parse(content);
        let record = self.extract(&fields);
        (fields, record)
    }

    pub fn extract(&self, fields: &ParsedFields) -> ExtractedRecord {
        ExtractedRecord {
            title: single_value(fields, TITLE_KEY),
            provenance: single_value(fields, PROVENANCE_KEY),
            description: description(fields),
            keywords: keywords(fields),
            author: single_value(fields, AUTHOR_KEY),
            submitted: single_value(fields, SUBMITTED_KEY),
        }
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Lines of a parsed value with list markers and quotes removed.
fn items(value: &str) -> Vec<String> {
    value
        .lines()
        .map(|line| clean(strip_marker(line)))
        .filter(|item| !item.is_empty())
        .collect()
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() { None } else { Some(text) }
}

fn single_value(fields: &ParsedFields, key: &str) -> Option<String> {
    let value = fields.get_ignore_case(key)?;
    non_empty(items(value).join(", "))
}

fn description(fields: &ParsedFields) -> Option<String> {
    let value = fields.get_ignore_case(DESCRIPTION_KEY)?;
    non_empty(items(value).join(" "))
}

/// Inline comma list on the key line followed by one keyword per continuation line.
fn keywords(fields: &ParsedFields) -> Option<String> {
    let value = fields.get_ignore_case(KEYWORDS_KEY)?;
    let mut lines = value.lines();

    let mut all = Vec::new();
    if let Some(inline) = lines.next() {
        all.extend(inline.split(',').map(|kw| clean(strip_marker(kw))));
    }
    all.extend(lines.map(|line| clean(strip_marker(line))));

    let kept: Vec<String> = all
        .into_iter()
        .filter(|kw| !kw.is_empty() && !is_sentinel(kw))
        .collect();

    non_empty(kept.join(", "))
}
