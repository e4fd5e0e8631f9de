//! In-memory `.docx` fixtures for integration tests.

#![allow(dead_code)]

use std::io::{Cursor, Write};

use docfill::docx::xml::XmlDocument;
use docfill::docx::{Package, MAIN_PART};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const NS: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships""#;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

/// Builds a minimal WordprocessingML package.
#[derive(Default)]
pub struct DocxBuilder {
    body: String,
    headers: Vec<String>,
    footers: Vec<String>,
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw body markup.
    pub fn raw(mut self, xml: &str) -> Self {
        self.body.push_str(xml);
        self
    }

    /// Append a single-run paragraph.
    pub fn paragraph(self, text: &str) -> Self {
        let xml = para(text);
        self.raw(&xml)
    }

    /// Add a header part holding one paragraph per line.
    pub fn header(mut self, lines: &[&str]) -> Self {
        self.headers.push(lines.iter().map(|l| para(l)).collect());
        self
    }

    /// Add a footer part holding one paragraph per line.
    pub fn footer(mut self, lines: &[&str]) -> Self {
        self.footers.push(lines.iter().map(|l| para(l)).collect());
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let opts = SimpleFileOptions::default();

        let mut put = |name: &str, data: &str| {
            zip.start_file(name, opts).unwrap();
            zip.write_all(data.as_bytes()).unwrap();
        };

        put("[Content_Types].xml", CONTENT_TYPES);
        put("_rels/.rels", ROOT_RELS);
        put(
            MAIN_PART,
            &format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document {NS}><w:body>{}<w:sectPr><w:pgSz w:w="11906" w:h="16838"/></w:sectPr></w:body></w:document>"#,
                self.body
            ),
        );
        for (i, h) in self.headers.iter().enumerate() {
            put(
                &format!("word/header{}.xml", i + 1),
                &format!(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:hdr {NS}>{h}</w:hdr>"#),
            );
        }
        for (i, f) in self.footers.iter().enumerate() {
            put(
                &format!("word/footer{}.xml", i + 1),
                &format!(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:ftr {NS}>{f}</w:ftr>"#),
            );
        }
        put("word/styles.xml", &format!(r#"<w:styles {NS}/>"#));

        zip.finish().unwrap().into_inner()
    }
}

/// Single-run paragraph markup.
pub fn para(text: &str) -> String {
    let space = if text.starts_with(' ') || text.ends_with(' ') || text.contains("  ") {
        r#" xml:space="preserve""#
    } else {
        ""
    };
    format!("<w:p><w:r><w:t{}>{}</w:t></w:r></w:p>", space, escape(text))
}

/// Table markup; each cell holds raw block markup.
pub fn table(rows: &[&[&str]]) -> String {
    let mut xml = String::from(r#"<w:tbl><w:tblPr><w:tblW w:w="0" w:type="auto"/></w:tblPr>"#);
    for row in rows {
        xml.push_str("<w:tr>");
        for cell in row.iter() {
            xml.push_str(&format!("<w:tc><w:tcPr><w:tcW w:w=\"2000\"/></w:tcPr>{}</w:tc>", cell));
        }
        xml.push_str("</w:tr>");
    }
    xml.push_str("</w:tbl>");
    xml
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Parse a part of a rendered package.
pub fn part(docx: &[u8], name: &str) -> XmlDocument {
    let package = Package::from_bytes(docx).unwrap();
    XmlDocument::parse(package.part(name).unwrap()).unwrap()
}
