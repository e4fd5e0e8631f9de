//! # docfill
//!
//! Fill `.docx` templates with structured records.
//!
//! A template is an ordinary Word document containing `{{ key }}` (or
//! `{{key}}`) placeholders. A record is a mapping of fields, optionally
//! grouped one level deep (`sender.name`), plus a free-text `body` that is
//! expanded into as many paragraphs as it has non-blank lines.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docfill::{render_file, RenderOptions, StructuredRecord};
//!
//! fn main() -> docfill::Result<()> {
//!     let record = StructuredRecord::from_path("memo.yaml")?;
//!     let stats = render_file("templates/memo.docx", &record, "out.docx", &RenderOptions::default())?;
//!     println!("{} placeholders replaced", stats.tags_replaced);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Both placeholder spellings**: `{{ key }}` and `{{key}}` resolve alike
//! - **Body expansion**: multi-line text becomes justified, indented paragraphs
//! - **Label emphasis**: paragraphs holding `*_in_*` fields are bolded
//! - **Leftover cleanup**: unresolved placeholders never reach the reader
//! - **Lossless round trip**: untouched markup is written back as read
//! - **Parallel batches**: Rayon renders many records from one template

pub mod docx;
pub mod error;
pub mod model;
pub mod record;
pub mod render;
pub mod store;

// Re-export commonly used types
pub use docx::Template;
pub use error::{Error, Result};
pub use model::{
    Alignment, Block, Document, InlineContent, Paragraph, ParagraphStyle, Story, StoryKind, Table,
    TableCell, TableRow, TextRun,
};
pub use record::{FieldValue, PlaceholderMap, StructuredRecord};
pub use render::{JsonFormat, RenderOptions, RenderResult, RenderStats, Renderer, TemplateSummary};
pub use store::{DocumentKind, OutputDir, OutputMetadata, TemplateStore};

use std::path::Path;

/// Load a template file.
///
/// # Example
///
/// ```no_run
/// let template = docfill::open_template("templates/pismo.docx").unwrap();
/// println!("{:?}", template.placeholders());
/// ```
pub fn open_template<P: AsRef<Path>>(path: P) -> Result<Template> {
    Template::open(path)
}

/// Render a record into a template file and write the result.
///
/// # Arguments
///
/// * `template` - Path to the `.docx` template
/// * `record` - Field values
/// * `output` - Destination path
/// * `options` - Rendering options
pub fn render_file<P: AsRef<Path>, Q: AsRef<Path>>(
    template: P,
    record: &StructuredRecord,
    output: Q,
    options: &RenderOptions,
) -> Result<RenderStats> {
    let template = Template::open(template)?;
    let result = template.render_to_file(record, options, output)?;
    Ok(result.stats)
}

/// Render a record into template bytes and return the rendered package.
///
/// # Example
///
/// ```no_run
/// use docfill::{render_bytes, RenderOptions, StructuredRecord};
///
/// let template = std::fs::read("templates/pismo.docx").unwrap();
/// let record = StructuredRecord::from_yaml_str("subject: Hello").unwrap();
/// let rendered = render_bytes(&template, &record, &RenderOptions::default()).unwrap();
/// std::fs::write("out.docx", rendered.content).unwrap();
/// ```
pub fn render_bytes(
    template: &[u8],
    record: &StructuredRecord,
    options: &RenderOptions,
) -> Result<RenderResult> {
    Template::from_bytes(template)?.render(record, options)
}

/// Placeholder keys used by a template file, sorted.
pub fn placeholders<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    Ok(Template::open(path)?.placeholders())
}

/// Dump a template's document tree as JSON.
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let template = Template::open(path)?;
    render::to_json(template.document(), format)
}

/// Builder for rendering templates.
///
/// # Example
///
/// ```no_run
/// use docfill::{Alignment, Docfill, StructuredRecord};
///
/// let record = StructuredRecord::from_path("letter.yaml")?;
/// let result = Docfill::new()
///     .with_body_indent_cm(1.0)
///     .with_body_alignment(Alignment::Left)
///     .with_header_footer_cleanup()
///     .open("templates/pismo.docx")?
///     .render(&record)?;
/// std::fs::write("letter.docx", &result.content)?;
/// # Ok::<(), docfill::Error>(())
/// ```
pub struct Docfill {
    options: RenderOptions,
}

impl Docfill {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self {
            options: RenderOptions::default(),
        }
    }

    /// Set the body field name.
    pub fn with_body_key(mut self, key: impl Into<String>) -> Self {
        self.options = self.options.with_body_key(key);
        self
    }

    /// Set the marker of label fields that get bolded.
    pub fn with_emphasis_marker(mut self, marker: impl Into<String>) -> Self {
        self.options = self.options.with_emphasis_marker(marker);
        self
    }

    /// Set the body first line indent in centimetres.
    pub fn with_body_indent_cm(mut self, cm: f32) -> Self {
        self.options = self.options.with_body_indent_cm(cm);
        self
    }

    /// Set the body alignment.
    pub fn with_body_alignment(mut self, alignment: Alignment) -> Self {
        self.options = self.options.with_body_alignment(alignment);
        self
    }

    /// Leave headers and footers untouched.
    pub fn without_headers_footers(mut self) -> Self {
        self.options = self.options.with_headers_footers(false);
        self
    }

    /// Also strip leftover placeholders from headers and footers.
    pub fn with_header_footer_cleanup(mut self) -> Self {
        self.options = self.options.with_header_footer_cleanup(true);
        self
    }

    /// Open a template file.
    pub fn open<P: AsRef<Path>>(self, path: P) -> Result<DocfillTemplate> {
        Ok(DocfillTemplate {
            template: Template::open(path)?,
            options: self.options,
        })
    }

    /// Load a template from bytes.
    pub fn load_bytes(self, data: &[u8]) -> Result<DocfillTemplate> {
        Ok(DocfillTemplate {
            template: Template::from_bytes(data)?,
            options: self.options,
        })
    }

    /// The options collected so far.
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }
}

impl Default for Docfill {
    fn default() -> Self {
        Self::new()
    }
}

/// A loaded template paired with rendering options.
pub struct DocfillTemplate {
    template: Template,
    options: RenderOptions,
}

impl DocfillTemplate {
    /// Render one record.
    pub fn render(&self, record: &StructuredRecord) -> Result<RenderResult> {
        self.template.render(record, &self.options)
    }

    /// Render many records in parallel.
    pub fn render_batch(&self, records: &[StructuredRecord]) -> Vec<Result<RenderResult>> {
        self.template.render_batch(records, &self.options)
    }

    /// Placeholder keys used by the template.
    pub fn placeholders(&self) -> Vec<String> {
        self.template.placeholders()
    }

    /// Get the template.
    pub fn template(&self) -> &Template {
        &self.template
    }
}
