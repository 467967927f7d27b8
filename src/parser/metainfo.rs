// file: src/parser/metainfo.rs
// description: line-oriented key/value parser for Metainfo.txt records
// reference: internal record grammar (key: value pairs with "-" continuation lines)

use crate::extractor::patterns::{LIST_MARKER, unquote};

/// Ordered field mapping, keys kept exactly as written in the record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFields {
    entries: Vec<(String, String)>,
}

impl ParsedFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-inserting an existing key replaces its value but keeps its original position.
    pub fn insert(&mut self, key: String, value: String) -> usize {
        if let Some(idx) = self.entries.iter().position(|(k, _)| *k == key) {
            self.entries[idx].1 = value;
            idx
        } else {
            self.entries.push((key, value));
            self.entries.len() - 1
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_ignore_case(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn append(&mut self, idx: usize, line: &str) {
        let value = &mut self.entries[idx].1;
        value.push('\n');
        value.push_str(line);
    }
}

pub struct MetainfoParser;

impl MetainfoParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, content: &str) -> ParsedFields {
        let mut fields = ParsedFields::new();
        // Index of the key that continuation lines attach to.
        let mut current: Option<usize> = None;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let is_continuation = line.starts_with(LIST_MARKER);

            if !is_continuation && let Some((key, value)) = line.split_once(':') {
                // A quoted key beginning with the marker keeps its quotes,
                // otherwise it would read back as a continuation line.
                let key = match unquote(key) {
                    unquoted if unquoted.starts_with(LIST_MARKER) => key.trim(),
                    unquoted => unquoted,
                };
                if key.is_empty() {
                    current = None;
                    continue;
                }
                current = Some(fields.insert(key.to_string(), unquote(value).to_string()));
            } else if let (Some(idx), true) = (current, is_continuation) {
                fields.append(idx, unquote(line));
            } else {
                current = None;
            }
        }

        fields
    }
}

impl Default for MetainfoParser {
    fn default() -> Self {
        Self::new()
    }
}
