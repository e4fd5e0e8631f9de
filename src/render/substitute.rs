//! Placeholder substitution pass.

use super::tags::{self, Resolution};
use super::visitor::ParagraphVisitor;
use super::{RenderOptions, RenderStats};
use crate::model::Paragraph;
use crate::record::PlaceholderMap;

/// Replaces placeholders paragraph by paragraph.
///
/// A paragraph whose text changes is rebuilt as a single run. If its
/// original text held a label-field placeholder (key containing the
/// emphasis marker) that the map resolves, the rebuilt paragraph is bolded
/// as a whole.
///
/// A cleaning pass also deletes leftover placeholder syntax from the
/// template text, never from inserted values. Body placeholders are
/// deleted silently there: body expansion owns them.
pub struct Substitution<'a> {
    placeholders: &'a PlaceholderMap,
    options: &'a RenderOptions,
    clean: bool,
    stats: RenderStats,
}

impl<'a> Substitution<'a> {
    /// Create a pass over `placeholders`.
    pub fn new(placeholders: &'a PlaceholderMap, options: &'a RenderOptions) -> Self {
        Self {
            placeholders,
            options,
            clean: false,
            stats: RenderStats::default(),
        }
    }

    /// Also delete leftover placeholders from template text.
    pub fn cleaning(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }

    /// Statistics gathered so far.
    pub fn stats(&self) -> &RenderStats {
        &self.stats
    }

    /// Consume the pass and return its statistics.
    pub fn into_stats(self) -> RenderStats {
        self.stats
    }

    fn needs_emphasis(&self, text: &str) -> bool {
        tags::keys_in(text)
            .iter()
            .any(|key| self.options.is_emphasis_key(key) && self.placeholders.contains_key(key))
    }
}

impl ParagraphVisitor for Substitution<'_> {
    fn visit_paragraph(&mut self, para: &mut Paragraph) {
        self.stats.paragraphs_visited += 1;

        let original = para.plain_text();
        if !original.contains(tags::OPEN) {
            return;
        }

        let emphasize = self.needs_emphasis(&original);
        let placeholders = self.placeholders;
        let clean = self.clean;
        let body_key = self.options.body_key.as_str();
        let rewrite = tags::substitute(&original, clean, |key| match placeholders.get(key) {
            Some(value) => Resolution::Value(value.to_string()),
            None if clean && key == body_key => Resolution::Drop,
            None => Resolution::Unresolved,
        });

        if rewrite.text == original {
            return;
        }

        para.set_text(&rewrite.text);
        self.stats.paragraphs_substituted += 1;
        self.stats.tags_replaced += rewrite.replaced;
        self.stats.leftovers_removed += rewrite.removed;
        if rewrite.removed > 0 {
            log::debug!("removed {} leftover placeholder(s) from {:?}", rewrite.removed, original);
        }

        if emphasize {
            para.set_bold(true);
            self.stats.paragraphs_emphasized += 1;
            log::debug!("bolded label paragraph: {:?}", rewrite.text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, TextRun};
    use crate::render::visitor::walk_blocks;

    fn map() -> PlaceholderMap {
        let mut map = PlaceholderMap::new();
        map.insert("sender.name", "Иванов");
        map.insert("signed_in_city", "г. Москва");
        map.insert("empty", "");
        map
    }

    fn run(text: &str) -> Paragraph {
        let options = RenderOptions::default();
        let placeholders = map();
        let mut blocks = vec![Block::Paragraph(Paragraph::with_text(text))];
        walk_blocks(&mut blocks, &mut Substitution::new(&placeholders, &options));
        match blocks.remove(0) {
            Block::Paragraph(p) => p,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_both_spellings() {
        assert_eq!(run("{{ sender.name }}").plain_text(), "Иванов");
        assert_eq!(run("{{sender.name}}").plain_text(), "Иванов");
    }

    #[test]
    fn test_empty_value() {
        assert_eq!(run("[{{ empty }}]").plain_text(), "[]");
    }

    #[test]
    fn test_unknown_left_for_cleanup() {
        assert_eq!(run("{{ missing }}").plain_text(), "{{ missing }}");
    }

    #[test]
    fn test_label_field_bolded() {
        let p = run("{{ signed_in_city }}");
        assert_eq!(p.plain_text(), "г. Москва");
        assert!(p.is_bold());
    }

    #[test]
    fn test_other_paragraphs_not_bolded() {
        let p = run("From {{ sender.name }}");
        assert_eq!(p.plain_text(), "From Иванов");
        assert!(!p.is_bold());
    }

    #[test]
    fn test_unresolved_label_not_bolded() {
        let p = run("{{ issued_in_place }} {{ sender.name }}");
        assert!(!p.is_bold());
    }

    #[test]
    fn test_cleaning_keeps_values_verbatim() {
        let options = RenderOptions::default();
        let mut placeholders = map();
        placeholders.insert("subject", "use {{x}} here");
        let mut para = Paragraph::with_text("{{ subject }} {{ missing }} {{ body }}");
        let mut pass = Substitution::new(&placeholders, &options).cleaning(true);
        pass.visit_paragraph(&mut para);

        assert_eq!(para.plain_text(), "use {{x}} here  ");
        assert_eq!(pass.stats().tags_replaced, 1);
        assert_eq!(pass.stats().leftovers_removed, 1);
    }

    #[test]
    fn test_split_runs_are_joined() {
        let options = RenderOptions::default();
        let placeholders = map();
        let mut para = Paragraph::new();
        para.add_run(TextRun::new("{{ sender"));
        para.add_run(TextRun::new(".name }}"));
        let mut pass = Substitution::new(&placeholders, &options);
        pass.visit_paragraph(&mut para);

        assert_eq!(para.plain_text(), "Иванов");
        assert_eq!(para.runs().count(), 1);
        assert_eq!(pass.stats().tags_replaced, 1);
    }

    #[test]
    fn test_untouched_paragraph_keeps_runs() {
        let options = RenderOptions::default();
        let placeholders = map();
        let mut para = Paragraph::new();
        para.add_run(TextRun::bold("Plain "));
        para.add_run(TextRun::new("text"));
        let mut pass = Substitution::new(&placeholders, &options);
        pass.visit_paragraph(&mut para);

        assert_eq!(para.runs().count(), 2);
        assert_eq!(pass.into_stats().paragraphs_substituted, 0);
    }
}
