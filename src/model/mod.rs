//! Document model types for template content.
//!
//! This module defines the in-memory tree the renderer works on: block
//! containers (`Vec<Block>`) holding paragraphs and tables, with tables
//! nesting further containers in their cells. Everything the renderer does
//! not interpret is carried verbatim so untouched content survives a render.

mod document;
mod paragraph;
mod table;

pub use document::{Block, Document, Story, StoryKind};
pub use paragraph::{
    cm_to_points, Alignment, InlineContent, Paragraph, ParagraphStyle, RunContent, RunProperties,
    TextRun,
};
pub use table::{Table, TableCell, TableRow};
