//! Paragraph and text-level types.

use crate::docx::xml::Element;
use serde::{Deserialize, Serialize};

/// Points per centimetre.
const POINTS_PER_CM: f32 = 72.0 / 2.54;

/// Convert centimetres to points.
pub fn cm_to_points(cm: f32) -> f32 {
    cm * POINTS_PER_CM
}

/// A paragraph of text content.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Paragraph {
    /// Inline content in document order
    pub content: Vec<InlineContent>,

    /// Paragraph style
    pub style: ParagraphStyle,

    /// Attributes of the paragraph element (revision ids and the like)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<(String, String)>,
}

impl Paragraph {
    /// Create a new empty paragraph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a paragraph with plain text.
    pub fn with_text(text: impl Into<String>) -> Self {
        let mut p = Self::new();
        p.add_text(text);
        p
    }

    /// Add plain text to the paragraph.
    pub fn add_text(&mut self, text: impl Into<String>) {
        self.content
            .push(InlineContent::Run(TextRun::new(text.into().as_str())));
    }

    /// Add a styled text run.
    pub fn add_run(&mut self, run: TextRun) {
        self.content.push(InlineContent::Run(run));
    }

    /// Get plain text content of the paragraph.
    ///
    /// Text inside hyperlinks and other wrapped inline content is included.
    pub fn plain_text(&self) -> String {
        self.content
            .iter()
            .map(|c| match c {
                InlineContent::Run(run) => run.text(),
                InlineContent::Opaque(el) => el.descendant_text("w:t"),
            })
            .collect()
    }

    /// Replace the whole paragraph text with a single run.
    ///
    /// Inline structure (runs, hyperlinks, bookmarks) is discarded; the new
    /// run inherits the formatting of the first run. Paragraph formatting is
    /// kept.
    pub fn set_text(&mut self, text: &str) {
        let properties = self.leading_run_properties();
        self.content = vec![InlineContent::Run(TextRun::with_properties(text, properties))];
    }

    /// Formatting of the first direct run, or default formatting.
    pub fn leading_run_properties(&self) -> RunProperties {
        self.runs().next().map(|r| r.properties.clone()).unwrap_or_default()
    }

    /// Iterate over direct runs.
    pub fn runs(&self) -> impl Iterator<Item = &TextRun> {
        self.content.iter().filter_map(|c| match c {
            InlineContent::Run(run) => Some(run),
            InlineContent::Opaque(_) => None,
        })
    }

    /// Iterate over direct runs, mutably.
    pub fn runs_mut(&mut self) -> impl Iterator<Item = &mut TextRun> {
        self.content.iter_mut().filter_map(|c| match c {
            InlineContent::Run(run) => Some(run),
            InlineContent::Opaque(_) => None,
        })
    }

    /// Set or clear bold on every direct run.
    pub fn set_bold(&mut self, bold: bool) {
        for run in self.runs_mut() {
            run.properties.bold = Some(bold);
        }
    }

    /// Check whether every direct run is bold (false for a paragraph without runs).
    pub fn is_bold(&self) -> bool {
        let mut runs = self.runs().peekable();
        runs.peek().is_some() && runs.all(|r| r.properties.bold == Some(true))
    }

    /// Check if the paragraph is empty.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty() || self.plain_text().trim().is_empty()
    }
}

/// Inline content within a paragraph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InlineContent {
    /// A text run
    Run(TextRun),

    /// Inline markup kept verbatim (hyperlinks, bookmarks, fields, revisions)
    Opaque(Element),
}

/// A run of text with consistent styling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextRun {
    /// Run formatting
    pub properties: RunProperties,

    /// Run content in document order
    pub content: Vec<RunContent>,

    /// Attributes of the run element
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<(String, String)>,
}

impl TextRun {
    /// Create a new text run with default formatting.
    pub fn new(text: &str) -> Self {
        Self::with_properties(text, RunProperties::default())
    }

    /// Create a bold text run.
    pub fn bold(text: &str) -> Self {
        Self::with_properties(
            text,
            RunProperties {
                bold: Some(true),
                ..Default::default()
            },
        )
    }

    /// Create a run from text, mapping `\t` to tabs and line feeds to breaks.
    pub fn with_properties(text: &str, properties: RunProperties) -> Self {
        let mut content = Vec::new();
        let mut pending = String::new();
        for ch in text.chars() {
            let special = match ch {
                '\t' => Some(RunContent::Tab),
                '\n' | '\r' => Some(RunContent::Break),
                _ => None,
            };
            match special {
                Some(item) => {
                    if !pending.is_empty() {
                        content.push(RunContent::Text(std::mem::take(&mut pending)));
                    }
                    content.push(item);
                }
                None => pending.push(ch),
            }
        }
        if !pending.is_empty() {
            content.push(RunContent::Text(pending));
        }

        Self {
            properties,
            content,
            attributes: Vec::new(),
        }
    }

    /// Get the text of this run.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .map(|c| match c {
                RunContent::Text(t) => t.as_str(),
                RunContent::Tab => "\t",
                RunContent::Break => "\n",
                RunContent::Opaque(_) => "",
            })
            .collect()
    }

    /// Check if this run is empty.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// A piece of run content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunContent {
    /// Literal text
    Text(String),

    /// Tab character
    Tab,

    /// Line break
    Break,

    /// Other run content kept verbatim (drawings, field codes, page breaks)
    Opaque(Element),
}

/// Run formatting.
///
/// Bold is typed because the renderer sets it; every other property is
/// carried verbatim.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunProperties {
    /// Bold (`None` = inherited from style)
    pub bold: Option<bool>,

    /// Remaining run properties
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<Element>,
}

impl RunProperties {
    /// Check if any property is set.
    pub fn is_empty(&self) -> bool {
        self.bold.is_none() && self.extra.is_empty()
    }
}

/// Paragraph styling properties.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParagraphStyle {
    /// Named style identifier (`w:pStyle`)
    pub style_id: Option<String>,

    /// Text alignment (`None` = inherited from style)
    pub alignment: Option<Alignment>,

    /// First line indent in points; negative values are hanging indents
    pub first_line_indent: Option<f32>,

    /// Remaining paragraph properties
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<Element>,
}

impl ParagraphStyle {
    /// Create a style derived from a named style only.
    pub fn named(style_id: Option<String>) -> Self {
        Self {
            style_id,
            ..Default::default()
        }
    }
}

/// Text alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Left alignment (default)
    #[default]
    Left,
    /// Center alignment
    Center,
    /// Right alignment
    Right,
    /// Justified alignment
    Justify,
    /// Justified with distributed character spacing
    Distribute,
}
