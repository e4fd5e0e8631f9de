//! Visitor pattern for walking block containers.
//!
//! Rendering passes implement [`ParagraphVisitor`] and are driven over a
//! container with [`walk_blocks`], which descends into every table cell and
//! every table nested inside a cell.
//!
//! # Example
//!
//! ```
//! use docfill::model::{Block, Paragraph, Table, TableCell, TableRow};
//! use docfill::render::visitor::{walk_blocks, ParagraphVisitor};
//!
//! struct Upper;
//!
//! impl ParagraphVisitor for Upper {
//!     fn visit_paragraph(&mut self, para: &mut Paragraph) {
//!         let text = para.plain_text().to_uppercase();
//!         para.set_text(&text);
//!     }
//! }
//!
//! let mut table = Table::new();
//! table.add_row(TableRow::new(vec![TableCell::text("cell")]));
//! let mut blocks = vec![Block::Paragraph(Paragraph::with_text("top")), Block::Table(table)];
//! walk_blocks(&mut blocks, &mut Upper);
//! assert_eq!(blocks[0].plain_text().as_deref(), Some("TOP"));
//! assert_eq!(blocks[1].plain_text().as_deref(), Some("CELL"));
//! ```

use crate::model::{Block, Paragraph, Table};

/// Action returned before descending into a table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VisitorAction {
    /// Visit the table's cells.
    #[default]
    Continue,

    /// Leave the table untouched.
    Skip,
}

/// Trait for passes over document paragraphs.
pub trait ParagraphVisitor {
    /// Called for each paragraph in document order.
    fn visit_paragraph(&mut self, para: &mut Paragraph);

    /// Called before descending into a table.
    ///
    /// `depth` is 0 for a table directly in the walked container, 1 for a
    /// table inside one of its cells, and so on.
    fn enter_table(&mut self, table: &Table, depth: usize) -> VisitorAction {
        let _ = (table, depth);
        VisitorAction::Continue
    }
}

/// Visit every paragraph in `blocks`, recursing into tables.
pub fn walk_blocks<V: ParagraphVisitor + ?Sized>(blocks: &mut [Block], visitor: &mut V) {
    walk_at_depth(blocks, visitor, 0);
}

fn walk_at_depth<V: ParagraphVisitor + ?Sized>(blocks: &mut [Block], visitor: &mut V, depth: usize) {
    for block in blocks.iter_mut() {
        match block {
            Block::Paragraph(para) => visitor.visit_paragraph(para),
            Block::Table(table) => walk_table(table, visitor, depth),
            Block::Opaque(_) => {}
        }
    }
}

fn walk_table<V: ParagraphVisitor + ?Sized>(table: &mut Table, visitor: &mut V, depth: usize) {
    if visitor.enter_table(table, depth) == VisitorAction::Skip {
        return;
    }
    for row in &mut table.rows {
        for cell in &mut row.cells {
            walk_at_depth(&mut cell.content, visitor, depth + 1);
        }
    }
}

/// Count paragraphs reachable from `blocks`, including those in tables.
pub fn count_paragraphs(blocks: &[Block]) -> usize {
    blocks
        .iter()
        .map(|block| match block {
            Block::Paragraph(_) => 1,
            Block::Table(table) => table
                .rows
                .iter()
                .flat_map(|r| &r.cells)
                .map(|c| count_paragraphs(&c.content))
                .sum(),
            Block::Opaque(_) => 0,
        })
        .sum()
}
