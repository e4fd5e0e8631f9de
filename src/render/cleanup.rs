//! Leftover placeholder cleanup.
//!
//! Substitution cleans the stories it visits on its own. This pass covers
//! headers and footers when their substitution is switched off but cleanup
//! is requested: anything written between double braces, well-formed or
//! not, is deleted.

use super::tags;
use super::visitor::ParagraphVisitor;
use crate::model::Paragraph;

/// Deletes leftover placeholders from every visited paragraph.
#[derive(Debug, Default)]
pub struct CleanupPass {
    removed: u32,
    paragraphs: u32,
}

impl CleanupPass {
    /// Create a new cleanup pass.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of leftover fragments deleted so far.
    pub fn removed(&self) -> u32 {
        self.removed
    }

    /// Number of paragraphs rewritten so far.
    pub fn paragraphs_changed(&self) -> u32 {
        self.paragraphs
    }
}

impl ParagraphVisitor for CleanupPass {
    fn visit_paragraph(&mut self, para: &mut Paragraph) {
        let text = para.plain_text();
        if !text.contains(tags::OPEN) {
            return;
        }

        let count = tags::leftover_regex().find_iter(&text).count() as u32;
        if count == 0 {
            return;
        }

        let cleaned = tags::strip_leftovers(&text);
        log::debug!("removed {} leftover placeholder(s) from {:?}", count, text);
        para.set_text(&cleaned);
        self.removed += count;
        self.paragraphs += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, Table, TableCell, TableRow, TextRun};
    use crate::render::visitor::walk_blocks;

    fn clean(text: &str) -> (String, u32) {
        let mut para = Paragraph::with_text(text);
        let mut pass = CleanupPass::new();
        pass.visit_paragraph(&mut para);
        (para.plain_text(), pass.removed())
    }

    #[test]
    fn test_removes_unknown_tags() {
        assert_eq!(clean("Dear {{ unknown_field }}!"), ("Dear !".to_string(), 1));
        assert_eq!(clean("{{a}} and {{ b }}"), (" and ".to_string(), 2));
    }

    #[test]
    fn test_removes_malformed_fragments() {
        assert_eq!(clean("x{{}}y"), ("xy".to_string(), 1));
        assert_eq!(clean("{{ {{ nested }}"), ("".to_string(), 1));
    }

    #[test]
    fn test_plain_text_untouched() {
        let mut para = Paragraph::new();
        para.add_run(TextRun::bold("Keep "));
        para.add_run(TextRun::new("these runs { single }"));
        let mut pass = CleanupPass::new();
        pass.visit_paragraph(&mut para);

        assert_eq!(para.runs().count(), 2);
        assert_eq!(pass.paragraphs_changed(), 0);
    }

    #[test]
    fn test_idempotent() {
        let (once, _) = clean("a {{ x }} b {{y}} c");
        let (twice, removed) = clean(&once);
        assert_eq!(once, twice);
        assert_eq!(removed, 0);
    }

    #[test]
    fn test_nested_tables() {
        let mut inner = Table::new();
        inner.add_row(TableRow::from_strings(["deep {{ gone }}"]));
        let mut outer = Table::new();
        outer.add_row(TableRow::new(vec![TableCell::with_content(vec![
            Block::Table(inner),
        ])]));
        let mut blocks = vec![Block::Table(outer)];

        let mut pass = CleanupPass::new();
        walk_blocks(&mut blocks, &mut pass);

        assert_eq!(pass.removed(), 1);
        assert_eq!(blocks[0].plain_text().as_deref(), Some("deep "));
    }
}
