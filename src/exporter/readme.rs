// file: src/exporter/readme.rs
// description: README.md rendering from parsed metadata fields and sibling images
// reference: github flavored markdown with inline html blocks

use crate::parser::ParsedFields;

pub const DEFAULT_HEADER: &str = concat!(
    "<div style=\"margin: 0; padding: 0; text-align: center; border: none;\">\n",
    "<a href=\"https://quantlet.com\" target=\"_blank\" style=\"text-decoration: none; border: none;\">\n",
    "<img src=\"https://github.com/StefanGam/test-repo/blob/main/quantlet_design.png?raw=true\" ",
    "alt=\"Header Image\" width=\"100%\" style=\"margin: 0; padding: 0; display: block; border: none;\" />\n",
    "</a>\n",
    "</div>\n\n",
);

const FENCE: &str = "```\n";

#[derive(Debug, Clone)]
pub struct ReadmeExporter {
    header: String,
}

impl ReadmeExporter {
    pub fn new() -> Self {
        Self::with_header(DEFAULT_HEADER.to_string())
    }

    pub fn with_header(header: String) -> Self {
        Self { header }
    }

    /// Header, every field as `key: value` inside one fenced block, then centered images.
    pub fn render<S: AsRef<str>>(&self, fields: &ParsedFields, images: &[S]) -> String {
        let mut content = self.header.clone();

        content.push_str(FENCE);
        for (key, value) in fields.iter() {
            content.push_str(&format!("{}: {}\n\n", key, value));
        }
        content.push_str(FENCE);

        for image in images {
            content.push_str(&format!(
                "<div align=\"center\">\n<img src=\"{}\" alt=\"Image\" />\n</div>\n\n",
                image.as_ref()
            ));
        }

        content
    }

    /// Text between the first pair of fences.
    pub fn fenced_block(document: &str) -> Option<&str> {
        let start = document.find(FENCE)? + FENCE.len();
        let end = document[start..].find(FENCE)? + start;
        Some(&document[start..end])
    }
}

impl Default for ReadmeExporter {
    fn default() -> Self {
        Self::new()
    }
}
