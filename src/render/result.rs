//! Rendering result with statistics.

use serde::{Deserialize, Serialize};

/// Result of rendering a template: the serialized document and statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderResult {
    /// The rendered `.docx` package
    #[serde(skip)]
    pub content: Vec<u8>,

    /// Rendering statistics
    pub stats: RenderStats,
}

impl RenderResult {
    /// Create a new render result.
    pub fn new(content: Vec<u8>, stats: RenderStats) -> Self {
        Self { content, stats }
    }

    /// Get the content length in bytes.
    pub fn content_len(&self) -> usize {
        self.content.len()
    }
}

/// Statistics collected while rendering.
///
/// Degraded cases (dropped body, deleted leftovers) are not errors; they
/// show up here and in the log only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderStats {
    /// Paragraphs examined by the substitution pass
    pub paragraphs_visited: u32,

    /// Paragraphs whose text changed during substitution
    pub paragraphs_substituted: u32,

    /// Individual placeholders replaced
    pub tags_replaced: u32,

    /// Paragraphs bolded by the label-field heuristic
    pub paragraphs_emphasized: u32,

    /// Paragraphs produced by body expansion (0 when the body was dropped or empty)
    pub body_paragraphs: u32,

    /// Whether body text was placed at a body placeholder
    pub body_placed: bool,

    /// Leftover placeholders deleted from template text
    pub leftovers_removed: u32,
}

impl RenderStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether the cleanup pass had to delete anything.
    pub fn had_leftovers(&self) -> bool {
        self.leftovers_removed > 0
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &RenderStats) {
        self.paragraphs_visited += other.paragraphs_visited;
        self.paragraphs_substituted += other.paragraphs_substituted;
        self.tags_replaced += other.tags_replaced;
        self.paragraphs_emphasized += other.paragraphs_emphasized;
        self.body_paragraphs += other.body_paragraphs;
        self.body_placed |= other.body_placed;
        self.leftovers_removed += other.leftovers_removed;
    }
}
