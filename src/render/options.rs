//! Rendering options and configuration.

use crate::model::{cm_to_points, Alignment};
use crate::record::BODY_FIELD;

/// Marker that identifies label fields rendered in bold (`issued_in_city`).
pub const DEFAULT_EMPHASIS_MARKER: &str = "_in_";

/// First line indent applied to body paragraphs, in centimetres.
pub const DEFAULT_BODY_INDENT_CM: f32 = 1.25;

/// Options for rendering a template.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Record field expanded into body paragraphs
    pub body_key: String,

    /// Keys containing this marker are label fields; paragraphs holding one
    /// are bolded after substitution. Empty disables the heuristic.
    pub emphasis_marker: String,

    /// First line indent of body paragraphs, in points
    pub body_first_line_indent: f32,

    /// Alignment of body paragraphs
    pub body_alignment: Alignment,

    /// Substitute placeholders in headers and footers
    pub substitute_headers_footers: bool,

    /// Also strip leftover placeholders from headers and footers
    pub cleanup_headers_footers: bool,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the body field name.
    pub fn with_body_key(mut self, key: impl Into<String>) -> Self {
        self.body_key = key.into();
        self
    }

    /// Set the emphasis marker.
    pub fn with_emphasis_marker(mut self, marker: impl Into<String>) -> Self {
        self.emphasis_marker = marker.into();
        self
    }

    /// Set the body first line indent in centimetres.
    pub fn with_body_indent_cm(mut self, cm: f32) -> Self {
        self.body_first_line_indent = cm_to_points(cm);
        self
    }

    /// Set the body alignment.
    pub fn with_body_alignment(mut self, alignment: Alignment) -> Self {
        self.body_alignment = alignment;
        self
    }

    /// Enable or disable header/footer substitution.
    pub fn with_headers_footers(mut self, enabled: bool) -> Self {
        self.substitute_headers_footers = enabled;
        self
    }

    /// Enable or disable header/footer cleanup.
    pub fn with_header_footer_cleanup(mut self, enabled: bool) -> Self {
        self.cleanup_headers_footers = enabled;
        self
    }

    /// Check whether `key` names a label field.
    pub fn is_emphasis_key(&self, key: &str) -> bool {
        !self.emphasis_marker.is_empty() && key.contains(&self.emphasis_marker)
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            body_key: BODY_FIELD.to_string(),
            emphasis_marker: DEFAULT_EMPHASIS_MARKER.to_string(),
            body_first_line_indent: cm_to_points(DEFAULT_BODY_INDENT_CM),
            body_alignment: Alignment::Justify,
            substitute_headers_footers: true,
            cleanup_headers_footers: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = RenderOptions::default();
        assert_eq!(options.body_key, "body");
        assert_eq!(options.body_alignment, Alignment::Justify);
        assert!(options.substitute_headers_footers);
        assert!(!options.cleanup_headers_footers);
        assert!((options.body_first_line_indent - 35.43).abs() < 0.01);
    }

    #[test]
    fn test_emphasis_key() {
        let options = RenderOptions::default();
        assert!(options.is_emphasis_key("signed_in_city"));
        assert!(options.is_emphasis_key("sender.issued_in_place"));
        assert!(!options.is_emphasis_key("inbox"));

        let disabled = RenderOptions::new().with_emphasis_marker("");
        assert!(!disabled.is_emphasis_key("signed_in_city"));
    }

    #[test]
    fn test_builder_chain() {
        let options = RenderOptions::new()
            .with_body_key("text")
            .with_body_indent_cm(0.0)
            .with_body_alignment(Alignment::Left)
            .with_header_footer_cleanup(true);
        assert_eq!(options.body_key, "text");
        assert_eq!(options.body_first_line_indent, 0.0);
        assert_eq!(options.body_alignment, Alignment::Left);
        assert!(options.cleanup_headers_footers);
    }
}
