// file: src/extractor/patterns.rs
// description: shared character sets and compiled regex patterns for metadata cleanup
// reference: https://docs.rs/regex

use lazy_static::lazy_static;
use regex::Regex;

pub const LIST_MARKER: char = '-';

/// Straight and curly quote characters treated as cosmetic.
pub const QUOTE_CHARS: &[char] = &['"', '\'', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}'];

lazy_static! {
    pub static ref EMBEDDED_QUOTES: Regex = Regex::new(
        "[\"'\u{2018}\u{2019}\u{201C}\u{201D}]+"
    ).expect("EMBEDDED_QUOTES regex is valid");

    pub static ref WHITESPACE_RUN: Regex = Regex::new(
        r"\s+"
    ).expect("WHITESPACE_RUN regex is valid");
}

/// Trims whitespace and surrounding quote characters.
pub fn unquote(text: &str) -> &str {
    text.trim().trim_matches(QUOTE_CHARS).trim()
}

/// Removes a single leading list marker.
pub fn strip_marker(text: &str) -> &str {
    let text = text.trim();
    text.strip_prefix(LIST_MARKER).unwrap_or(text).trim()
}

/// Removes every quote character and collapses whitespace runs.
pub fn clean(text: &str) -> String {
    let without_quotes = EMBEDDED_QUOTES.replace_all(text, "");
    WHITESPACE_RUN
        .replace_all(without_quotes.trim(), " ")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("  'Foo'  "), "Foo");
        assert_eq!(unquote("\u{201C}Foo\u{201D}"), "Foo");
        assert_eq!(unquote("O'Brien"), "O'Brien");
    }

    #[test]
    fn test_strip_marker_removes_one() {
        assert_eq!(strip_marker("- item"), "item");
        assert_eq!(strip_marker("-- item"), "- item");
        assert_eq!(strip_marker("time-series"), "time-series");
    }

    #[test]
    fn test_clean_strips_embedded_quotes() {
        assert_eq!(clean(" the \"best\"   model "), "the best model");
        assert_eq!(clean("O'Brien"), "OBrien");
    }
}
