//! `.docx` templates: loading, rendering and saving.

pub mod package;
pub mod reader;
pub mod writer;
pub mod xml;

pub use package::{Package, MAIN_PART};

use std::io::{self, Read};
use std::path::Path;

use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::model::{Document, Story, StoryKind};
use crate::record::StructuredRecord;
use crate::render::{RenderOptions, RenderResult, Renderer};
use xml::XmlDocument;

/// A loaded `.docx` template.
///
/// The parsed [`Document`] is the editable view; the package and the parsed
/// story parts are kept so everything outside the story bodies is written
/// back unchanged. A template is never modified by rendering: each render
/// works on its own copy of the document.
#[derive(Debug, Clone)]
pub struct Template {
    package: Package,
    main: XmlDocument,
    story_parts: Vec<(String, XmlDocument)>,
    document: Document,
}

impl Template {
    /// Open a template file.
    ///
    /// A missing file is reported as [`Error::TemplateNotFound`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::TemplateNotFound(path.to_path_buf()),
            _ => Error::Io(e),
        })?;
        log::debug!("loading template {}", path.display());
        Self::from_bytes(&data)
    }

    /// Load a template from a reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    /// Load a template from `.docx` bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let package = Package::from_bytes(data)?;
        let main = XmlDocument::parse(package.require(MAIN_PART)?)?;
        let body = main_body(&main)?;
        if reader::has_mixed_text(body) {
            log::warn!("{} has stray text in w:body; it will be dropped", MAIN_PART);
        }

        let mut document = Document::new();
        document.body = reader::read_blocks(body);

        let mut story_parts = Vec::new();
        for (name, kind) in package.story_parts() {
            let part = XmlDocument::parse(package.require(&name)?)?;
            let mut story = Story::new(name.as_str(), kind);
            story.blocks = reader::read_blocks(&part.root);
            match kind {
                StoryKind::Header => document.headers.push(story),
                StoryKind::Footer => document.footers.push(story),
            }
            story_parts.push((name, part));
        }

        log::debug!(
            "template has {} body block(s), {} header(s), {} footer(s)",
            document.body.len(),
            document.headers.len(),
            document.footers.len()
        );

        Ok(Self {
            package,
            main,
            story_parts,
            document,
        })
    }

    /// The template's document tree.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The template's document tree, mutably.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// The underlying package.
    pub fn package(&self) -> &Package {
        &self.package
    }

    /// Distinct placeholder keys used by the template.
    pub fn placeholders(&self) -> Vec<String> {
        self.document.placeholders()
    }

    /// Serialize a document tree into a package built on this template.
    ///
    /// Stories of `doc` are matched to parts by name; stories without a
    /// matching part are ignored.
    pub fn to_bytes(&self, doc: &Document) -> Result<Vec<u8>> {
        let mut package = self.package.clone();

        let mut main = self.main.clone();
        let body = main
            .root
            .child_mut("w:body")
            .ok_or_else(|| Error::InvalidPackage(format!("{} has no w:body", MAIN_PART)))?;
        writer::write_blocks_into(body, &doc.body);
        package.set_part(MAIN_PART, main.to_bytes()?);

        for story in doc.stories() {
            let Some((_, part)) = self.story_parts.iter().find(|(n, _)| *n == story.part_name)
            else {
                log::warn!("no package part named {}; story skipped", story.part_name);
                continue;
            };
            let mut part = part.clone();
            writer::write_blocks_into(&mut part.root, &story.blocks);
            package.set_part(&story.part_name, part.to_bytes()?);
        }

        package.to_bytes()
    }

    /// Render a record with this template.
    pub fn render(&self, record: &StructuredRecord, options: &RenderOptions) -> Result<RenderResult> {
        let mut doc = self.document.clone();
        let stats = Renderer::new(options.clone()).render(&mut doc, record);
        let content = self.to_bytes(&doc)?;
        Ok(RenderResult::new(content, stats))
    }

    /// Render a record and write the result to `path`.
    pub fn render_to_file<P: AsRef<Path>>(
        &self,
        record: &StructuredRecord,
        options: &RenderOptions,
        path: P,
    ) -> Result<RenderResult> {
        let result = self.render(record, options)?;
        std::fs::write(path.as_ref(), &result.content)?;
        log::info!("wrote {}", path.as_ref().display());
        Ok(result)
    }

    /// Render many records in parallel, one independent copy each.
    ///
    /// Results are returned in input order.
    pub fn render_batch(
        &self,
        records: &[StructuredRecord],
        options: &RenderOptions,
    ) -> Vec<Result<RenderResult>> {
        records
            .par_iter()
            .map(|record| self.render(record, options))
            .collect()
    }
}

fn main_body(main: &XmlDocument) -> Result<&xml::Element> {
    main.root
        .child("w:body")
        .ok_or_else(|| Error::InvalidPackage(format!("{} has no w:body", MAIN_PART)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Block;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const W: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

    fn docx(body: &str, header: Option<&str>) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let opts = SimpleFileOptions::default();
        zip.start_file("[Content_Types].xml", opts).unwrap();
        zip.write_all(b"<Types/>").unwrap();
        zip.start_file(MAIN_PART, opts).unwrap();
        write!(
            zip,
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document {W}><w:body>{body}<w:sectPr/></w:body></w:document>"#
        )
        .unwrap();
        if let Some(h) = header {
            zip.start_file("word/header1.xml", opts).unwrap();
            write!(zip, r#"<w:hdr {W}>{h}</w:hdr>"#).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    fn p(text: &str) -> String {
        format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", text)
    }

    #[test]
    fn test_load() {
        let template =
            Template::from_bytes(&docx(&p("{{ subject }}"), Some(&p("{{sender.name}}")))).unwrap();
        let doc = template.document();
        assert_eq!(doc.body.len(), 2);
        assert!(matches!(doc.body[1], Block::Opaque(_)));
        assert_eq!(doc.headers.len(), 1);
        assert_eq!(template.placeholders(), vec!["sender.name", "subject"]);
    }

    #[test]
    fn test_render_does_not_mutate_template() {
        let template = Template::from_bytes(&docx(&p("{{ subject }}"), None)).unwrap();
        let record = StructuredRecord::from_yaml_str("subject: Hi").unwrap();
        let result = template.render(&record, &RenderOptions::default()).unwrap();

        assert_eq!(template.document().plain_text(), "{{ subject }}");
        let rendered = Template::from_bytes(&result.content).unwrap();
        assert_eq!(rendered.document().plain_text(), "Hi");
        assert!(rendered.package().contains("[Content_Types].xml"));
    }

    #[test]
    fn test_batch_keeps_order() {
        let template = Template::from_bytes(&docx(&p("{{ n }}"), None)).unwrap();
        let records: Vec<StructuredRecord> = (0..8)
            .map(|i| StructuredRecord::from_yaml_str(&format!("n: {}", i)).unwrap())
            .collect();
        let results = template.render_batch(&records, &RenderOptions::default());

        for (i, result) in results.into_iter().enumerate() {
            let content = result.unwrap().content;
            let doc = Template::from_bytes(&content).unwrap();
            assert_eq!(doc.document().plain_text(), i.to_string());
        }
    }

    #[test]
    fn test_missing_main_part() {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("word/styles.xml", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"<w:styles/>").unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        assert!(matches!(
            Template::from_bytes(&bytes),
            Err(Error::MissingPart(_))
        ));
    }

    #[test]
    fn test_open_missing_file() {
        let err = Template::open("/nonexistent/template.docx").unwrap_err();
        assert!(matches!(err, Error::TemplateNotFound(_)));
    }
}
