//! Template rendering: placeholder substitution, body expansion and cleanup.
//!
//! [`Renderer`] runs two passes over a [`Document`], in this order:
//!
//! 1. substitution of every simple placeholder (everything but the body
//!    field) in the body, all tables and, by default, headers and footers,
//!    deleting leftover placeholder syntax from the template text as it goes
//!    (headers and footers only on request);
//! 2. expansion of the body field into consecutive paragraphs at the
//!    placeholder paragraph located before substitution.
//!
//! Inserted values and body lines are never cleaned, so a value that itself
//! contains `{{ ... }}` reaches the document verbatim.

mod body;
mod cleanup;
mod json;
mod options;
mod result;
mod substitute;
pub mod tags;
pub mod visitor;

pub use body::{body_lines, expand_body, expand_body_at, find_placeholder, BodyOutcome};
pub use cleanup::CleanupPass;
pub use json::{to_json, JsonFormat, TemplateSummary};
pub use options::{RenderOptions, DEFAULT_BODY_INDENT_CM, DEFAULT_EMPHASIS_MARKER};
pub use result::{RenderResult, RenderStats};
pub use substitute::Substitution;
pub use visitor::{walk_blocks, ParagraphVisitor, VisitorAction};

use crate::model::Document;
use crate::record::{PlaceholderMap, StructuredRecord};

/// Renders records into document trees.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    options: RenderOptions,
}

impl Renderer {
    /// Create a renderer with the given options.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Rendering options in use.
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render `record` into `doc` in place.
    ///
    /// An absent or null body field renders as an empty body.
    pub fn render(&self, doc: &mut Document, record: &StructuredRecord) -> RenderStats {
        let placeholders = PlaceholderMap::from_record(record);
        let body = record.text_field(&self.options.body_key).unwrap_or_default();
        self.render_map(doc, &placeholders, &body)
    }

    /// Render an already flattened placeholder map into `doc` in place.
    ///
    /// The body key is ignored in `placeholders`; `body` supplies its text.
    pub fn render_map(&self, doc: &mut Document, placeholders: &PlaceholderMap, body: &str) -> RenderStats {
        let simple = placeholders.without(&self.options.body_key);
        let anchor = body::find_placeholder(&doc.body, &self.options.body_key);

        let mut substitution = Substitution::new(&simple, &self.options).cleaning(true);
        walk_blocks(&mut doc.body, &mut substitution);
        let mut stats = substitution.into_stats();

        if self.options.substitute_headers_footers {
            let mut stories = Substitution::new(&simple, &self.options)
                .cleaning(self.options.cleanup_headers_footers);
            for story in doc.stories_mut() {
                walk_blocks(&mut story.blocks, &mut stories);
            }
            stats.merge(&stories.into_stats());
        } else if self.options.cleanup_headers_footers {
            let mut cleanup = CleanupPass::new();
            for story in doc.stories_mut() {
                walk_blocks(&mut story.blocks, &mut cleanup);
            }
            stats.leftovers_removed += cleanup.removed();
        }

        let outcome = match anchor {
            Some(index) => body::expand_body_at(&mut doc.body, index, body, &self.options),
            None => BodyOutcome::NoPlaceholder,
        };
        match outcome {
            BodyOutcome::Expanded { paragraphs, .. } => {
                stats.body_placed = true;
                stats.body_paragraphs = paragraphs as u32;
            }
            BodyOutcome::Emptied { index } => {
                log::debug!("body is empty; cleared placeholder paragraph {}", index);
            }
            BodyOutcome::NoPlaceholder => {
                if !body.trim().is_empty() {
                    log::warn!(
                        "template has no {{{{ {} }}}} paragraph; body text dropped",
                        self.options.body_key
                    );
                }
            }
        }

        log::info!(
            "rendered {} placeholder(s) in {} paragraph(s), body {} paragraph(s), {} leftover(s) removed",
            stats.tags_replaced,
            stats.paragraphs_substituted,
            stats.body_paragraphs,
            stats.leftovers_removed
        );

        stats
    }
}
