//! JSON view of a template for `inspect`.

use serde::Serialize;

use super::body::find_placeholder;
use crate::error::{Error, Result};
use crate::model::{Document, Story};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// What a template asks for and where it can put it.
#[derive(Debug, Serialize)]
pub struct TemplateSummary<'a> {
    /// Placeholder keys, sorted, headers and footers included
    pub placeholders: Vec<String>,
    /// Top-level paragraph index where the body field expands
    pub body_anchor: Option<usize>,
    pub paragraphs: usize,
    pub tables: usize,
    /// Header part names
    pub headers: Vec<&'a str>,
    /// Footer part names
    pub footers: Vec<&'a str>,
    /// Full document tree, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<&'a Document>,
}

impl<'a> TemplateSummary<'a> {
    /// Summarize `doc`; `body_key` names the field expanded into paragraphs.
    pub fn new(doc: &'a Document, body_key: &str) -> Self {
        Self {
            placeholders: doc.placeholders(),
            body_anchor: find_placeholder(&doc.body, body_key),
            paragraphs: doc.paragraphs().count(),
            tables: doc.tables().count(),
            headers: part_names(&doc.headers),
            footers: part_names(&doc.footers),
            document: None,
        }
    }

    /// Include the whole document tree.
    pub fn with_tree(mut self, doc: &'a Document) -> Self {
        self.document = Some(doc);
        self
    }

    /// Serialize the summary.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        encode(self, format)
    }
}

/// Convert a document tree to JSON.
pub fn to_json(doc: &Document, format: JsonFormat) -> Result<String> {
    encode(doc, format)
}

fn part_names(stories: &[Story]) -> Vec<&str> {
    stories.iter().map(|s| s.part_name.as_str()).collect()
}

fn encode<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };
    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}
