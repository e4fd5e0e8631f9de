//! Document-level types.

use super::{Paragraph, Table};
use crate::docx::xml::Element;
use crate::render::tags;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A template or rendered document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Main body content
    pub body: Vec<Block>,

    /// Header parts, in package order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<Story>,

    /// Footer parts, in package order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub footers: Vec<Story>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a paragraph to the body.
    pub fn add_paragraph(&mut self, paragraph: Paragraph) {
        self.body.push(Block::Paragraph(paragraph));
    }

    /// Add a table to the body.
    pub fn add_table(&mut self, table: Table) {
        self.body.push(Block::Table(table));
    }

    /// Iterate over top-level body paragraphs (not those inside tables).
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.body.iter().filter_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            _ => None,
        })
    }

    /// Iterate over top-level body tables.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.body.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        })
    }

    /// Iterate over header and footer stories.
    pub fn stories(&self) -> impl Iterator<Item = &Story> {
        self.headers.iter().chain(self.footers.iter())
    }

    /// Iterate over header and footer stories, mutably.
    pub fn stories_mut(&mut self) -> impl Iterator<Item = &mut Story> {
        self.headers.iter_mut().chain(self.footers.iter_mut())
    }

    /// Check if the document has no body content.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Get plain text content of the body.
    pub fn plain_text(&self) -> String {
        blocks_text(&self.body)
    }

    /// Distinct placeholder keys found anywhere in the document, sorted.
    ///
    /// Both spellings (`{{ key }}` and `{{key}}`) report the same key.
    pub fn placeholders(&self) -> Vec<String> {
        let mut keys = BTreeSet::new();
        let mut collect = |text: String| {
            keys.extend(tags::keys_in(&text));
        };
        collect(self.plain_text());
        for story in self.stories() {
            collect(blocks_text(&story.blocks));
        }
        keys.into_iter().collect()
    }
}

fn blocks_text(blocks: &[Block]) -> String {
    blocks
        .iter()
        .filter_map(Block::plain_text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// A header or footer part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Story {
    /// Package part name, e.g. `word/header1.xml`
    pub part_name: String,

    /// Whether this is a header or a footer
    pub kind: StoryKind,

    /// Story content
    pub blocks: Vec<Block>,
}

impl Story {
    /// Create an empty story.
    pub fn new(part_name: impl Into<String>, kind: StoryKind) -> Self {
        Self {
            part_name: part_name.into(),
            kind,
            blocks: Vec::new(),
        }
    }

    /// Get plain text content of the story.
    pub fn plain_text(&self) -> String {
        blocks_text(&self.blocks)
    }
}

/// Kind of auxiliary story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryKind {
    /// Page header
    Header,
    /// Page footer
    Footer,
}

/// A content block in a container.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Block {
    /// A paragraph of text
    Paragraph(Paragraph),

    /// A table
    Table(Table),

    /// Block-level markup kept verbatim (section properties, content controls)
    Opaque(Element),
}

impl Block {
    /// Plain text of a paragraph or table; `None` for opaque blocks.
    pub fn plain_text(&self) -> Option<String> {
        match self {
            Block::Paragraph(p) => Some(p.plain_text()),
            Block::Table(t) => Some(t.plain_text()),
            Block::Opaque(_) => None,
        }
    }

    /// Get the paragraph if this block is one.
    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match self {
            Block::Paragraph(p) => Some(p),
            _ => None,
        }
    }

    /// Get the table if this block is one.
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Block::Table(t) => Some(t),
            _ => None,
        }
    }
}
