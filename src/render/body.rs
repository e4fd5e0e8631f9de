//! Multi-paragraph body expansion.
//!
//! The body field holds newline-separated prose. Its placeholder paragraph
//! receives the first non-blank line; every further line becomes a new
//! paragraph spliced in directly after the previous one, sharing the
//! placeholder paragraph's named style and run formatting.

use super::tags;
use super::RenderOptions;
use crate::model::{Block, InlineContent, Paragraph, ParagraphStyle, TextRun};

/// Outcome of a body expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyOutcome {
    /// No top-level paragraph holds the body placeholder; the body is dropped.
    NoPlaceholder,

    /// The body has no non-blank lines; the placeholder paragraph at `index`
    /// was emptied and its formatting left alone.
    Emptied {
        /// Position of the placeholder paragraph in the container
        index: usize,
    },

    /// The placeholder paragraph at `index` was replaced by `paragraphs`
    /// paragraphs, one per body line.
    Expanded {
        /// Position of the placeholder paragraph in the container
        index: usize,
        /// Number of paragraphs now occupying that position
        paragraphs: usize,
    },
}

/// Non-blank, trimmed lines of a body text.
pub fn body_lines(body: &str) -> Vec<&str> {
    body.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Position of the first top-level paragraph holding the `key` placeholder.
pub fn find_placeholder(blocks: &[Block], key: &str) -> Option<usize> {
    blocks.iter().position(|block| match block {
        Block::Paragraph(p) => tags::contains_key(&p.plain_text(), key),
        _ => false,
    })
}

/// Expand `body` at the paragraph holding the body placeholder.
///
/// Only direct children of `blocks` are searched; paragraphs inside tables
/// are not candidates.
pub fn expand_body(blocks: &mut Vec<Block>, body: &str, options: &RenderOptions) -> BodyOutcome {
    match find_placeholder(blocks, &options.body_key) {
        Some(index) => expand_body_at(blocks, index, body, options),
        None => BodyOutcome::NoPlaceholder,
    }
}

/// Expand `body` at the paragraph at `index`, located earlier with
/// [`find_placeholder`]. The paragraph's current text is replaced.
pub fn expand_body_at(
    blocks: &mut Vec<Block>,
    index: usize,
    body: &str,
    options: &RenderOptions,
) -> BodyOutcome {
    let lines = body_lines(body);

    let Some(Block::Paragraph(anchor)) = blocks.get_mut(index) else {
        return BodyOutcome::NoPlaceholder;
    };

    let Some((first, rest)) = lines.split_first() else {
        anchor.set_text("");
        return BodyOutcome::Emptied { index };
    };
    anchor.set_text(first);
    anchor.style.alignment = Some(options.body_alignment);
    anchor.style.first_line_indent = Some(options.body_first_line_indent);

    let style_id = anchor.style.style_id.clone();
    let run_properties = anchor.leading_run_properties();

    for (offset, line) in rest.iter().enumerate() {
        let paragraph = Paragraph {
            content: vec![InlineContent::Run(TextRun::with_properties(
                line,
                run_properties.clone(),
            ))],
            style: ParagraphStyle {
                alignment: Some(options.body_alignment),
                first_line_indent: Some(options.body_first_line_indent),
                ..ParagraphStyle::named(style_id.clone())
            },
            attributes: Vec::new(),
        };
        blocks.insert(index + 1 + offset, Block::Paragraph(paragraph));
    }

    BodyOutcome::Expanded {
        index,
        paragraphs: lines.len(),
    }
}
