//! Table types.

use super::{Block, Paragraph};
use crate::docx::xml::Element;
use serde::{Deserialize, Serialize};

/// A table structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    /// Table-level properties and grid (`w:tblPr`, `w:tblGrid`), verbatim
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<Element>,

    /// Rows in the table
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a row to the table.
    pub fn add_row(&mut self, row: TableRow) {
        self.rows.push(row);
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns (based on first row).
    pub fn column_count(&self) -> usize {
        self.rows.first().map(|r| r.cells.len()).unwrap_or(0)
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get a cell by row and column index.
    pub fn cell(&self, row: usize, col: usize) -> Option<&TableCell> {
        self.rows.get(row).and_then(|r| r.cells.get(col))
    }

    /// Get a cell by row and column index, mutably.
    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut TableCell> {
        self.rows.get_mut(row).and_then(|r| r.cells.get_mut(col))
    }

    /// Get plain text representation of the table.
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.plain_text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A table row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableRow {
    /// Row-level properties (`w:tblPrEx`, `w:trPr`), verbatim
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<Element>,

    /// Cells in the row
    pub cells: Vec<TableCell>,

    /// Attributes of the row element
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<(String, String)>,
}

impl TableRow {
    /// Create a new row with cells.
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self {
            cells,
            ..Default::default()
        }
    }

    /// Create a row from text values.
    pub fn from_strings<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::new(values.into_iter().map(TableCell::text).collect())
    }

    /// Get plain text representation.
    pub fn plain_text(&self) -> String {
        self.cells
            .iter()
            .map(|c| c.plain_text())
            .collect::<Vec<_>>()
            .join("\t")
    }
}

/// A table cell.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableCell {
    /// Cell properties (`w:tcPr`), verbatim
    pub properties: Option<Element>,

    /// Cell content: paragraphs and nested tables
    pub content: Vec<Block>,
}

impl TableCell {
    /// Create a new cell with text content.
    pub fn text(text: impl Into<String>) -> Self {
        Self::with_content(vec![Block::Paragraph(Paragraph::with_text(text))])
    }

    /// Create an empty cell.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a cell with blocks.
    pub fn with_content(content: Vec<Block>) -> Self {
        Self {
            properties: None,
            content,
        }
    }

    /// Get plain text content.
    pub fn plain_text(&self) -> String {
        self.content
            .iter()
            .filter_map(Block::plain_text)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Check if the cell is empty.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty() || self.plain_text().trim().is_empty()
    }
}
