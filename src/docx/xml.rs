//! Minimal ordered XML tree used for OOXML package parts.
//!
//! Parts are read into an [`XmlDocument`] with `quick-xml`, edited as plain
//! data, and written back. Element and attribute order is preserved so parts
//! the renderer never touches round-trip without semantic change.

use crate::error::{Error, Result};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde::{Deserialize, Serialize};

/// An XML element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Qualified name, e.g. `w:p`
    pub name: String,

    /// Attributes in document order (qualified name, unescaped value)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<(String, String)>,

    /// Child nodes in document order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Element {
    /// Create an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add an attribute and return self.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Add a child element and return self.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Add a text child and return self.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    /// Get an attribute value.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing any existing value in place.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Remove an attribute. Returns the removed value.
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let pos = self.attributes.iter().position(|(k, _)| k == name)?;
        Some(self.attributes.remove(pos).1)
    }

    /// Check the qualified name.
    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    /// Iterate over child elements, skipping text and comments.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            _ => None,
        })
    }

    /// Find the first child element with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|el| el.is(name))
    }

    /// Find the first child element with the given name, mutably.
    pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.children.iter_mut().find_map(|node| match node {
            Node::Element(el) if el.is(name) => Some(el),
            _ => None,
        })
    }

    /// Concatenated text of all descendant text nodes inside elements named `tag`.
    pub fn descendant_text(&self, tag: &str) -> String {
        let mut out = String::new();
        collect_text(self, tag, false, &mut out);
        out
    }

    /// Concatenated text content of this element's direct and nested text nodes.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            match node {
                Node::Text(t) | Node::CData(t) => out.push_str(t),
                Node::Element(el) => out.push_str(&el.text()),
                Node::Comment(_) => {}
            }
        }
        out
    }
}

fn collect_text(el: &Element, tag: &str, inside: bool, out: &mut String) {
    let inside = inside || el.is(tag);
    for node in &el.children {
        match node {
            Node::Text(t) | Node::CData(t) if inside => out.push_str(t),
            Node::Element(child) => collect_text(child, tag, inside, out),
            _ => {}
        }
    }
}

/// A node in the XML tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    /// Nested element
    Element(Element),

    /// Character data (unescaped)
    Text(String),

    /// CDATA section
    CData(String),

    /// Comment (raw content)
    Comment(String),
}

/// The `<?xml ...?>` declaration of a part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// XML version
    pub version: String,
    /// Declared encoding
    pub encoding: Option<String>,
    /// Standalone flag
    pub standalone: Option<String>,
}

impl Default for Declaration {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            encoding: Some("UTF-8".to_string()),
            standalone: Some("yes".to_string()),
        }
    }
}

/// A parsed XML part.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    /// Declaration, if present in the source
    pub declaration: Option<Declaration>,

    /// Root element
    pub root: Element,
}

impl XmlDocument {
    /// Create a document with the default declaration.
    pub fn new(root: Element) -> Self {
        Self {
            declaration: Some(Declaration::default()),
            root,
        }
    }

    /// Parse an XML part from bytes.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(data);
        reader.config_mut().trim_text(false);

        let mut buf = Vec::new();
        let mut declaration = None;
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Decl(decl) => {
                    let version = String::from_utf8_lossy(&decl.version()?).into_owned();
                    let encoding = match decl.encoding() {
                        Some(enc) => Some(String::from_utf8_lossy(&enc?).into_owned()),
                        None => None,
                    };
                    let standalone = match decl.standalone() {
                        Some(sa) => Some(String::from_utf8_lossy(&sa?).into_owned()),
                        None => None,
                    };
                    declaration = Some(Declaration {
                        version,
                        encoding,
                        standalone,
                    });
                }
                Event::Start(start) => stack.push(element_from_start(&start)?),
                Event::Empty(start) => {
                    let el = element_from_start(&start)?;
                    attach(&mut stack, &mut root, el)?;
                }
                Event::End(_) => {
                    let el = stack
                        .pop()
                        .ok_or_else(|| Error::Xml("unexpected closing tag".to_string()))?;
                    attach(&mut stack, &mut root, el)?;
                }
                Event::Text(text) => {
                    if let Some(parent) = stack.last_mut() {
                        let value = text.unescape()?.into_owned();
                        if !value.is_empty() {
                            parent.children.push(Node::Text(value));
                        }
                    }
                }
                Event::CData(data) => {
                    if let Some(parent) = stack.last_mut() {
                        let value = String::from_utf8_lossy(&data).into_owned();
                        parent.children.push(Node::CData(value));
                    }
                }
                Event::Comment(comment) => {
                    if let Some(parent) = stack.last_mut() {
                        let value = String::from_utf8_lossy(&comment).into_owned();
                        parent.children.push(Node::Comment(value));
                    }
                }
                Event::Eof => break,
                // Processing instructions and doctypes do not occur in WordprocessingML parts.
                _ => {}
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(Error::Xml(format!("unclosed element <{}>", stack[0].name)));
        }

        let root = root.ok_or_else(|| Error::Xml("document has no root element".to_string()))?;
        Ok(Self { declaration, root })
    }

    /// Serialize the part back to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());

        if let Some(ref decl) = self.declaration {
            writer.write_event(Event::Decl(BytesDecl::new(
                &decl.version,
                decl.encoding.as_deref(),
                decl.standalone.as_deref(),
            )))?;
            writer.get_mut().extend_from_slice(b"\r\n");
        }

        write_element(&mut writer, &self.root)?;
        Ok(writer.into_inner())
    }
}

fn element_from_start(start: &BytesStart<'_>) -> Result<Element> {
    let mut el = Element::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attr in start.attributes() {
        let attr = attr.map_err(|e| Error::Xml(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        el.attributes.push((key, value));
    }
    Ok(el)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, el: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(el)),
        None => {
            if root.is_some() {
                return Err(Error::Xml("multiple root elements".to_string()));
            }
            *root = Some(el);
        }
    }
    Ok(())
}

fn write_element(writer: &mut Writer<Vec<u8>>, el: &Element) -> Result<()> {
    let mut start = BytesStart::new(el.name.as_str());
    for (key, value) in &el.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if el.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for node in &el.children {
        match node {
            Node::Element(child) => write_element(writer, child)?,
            Node::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
            Node::CData(text) => writer.write_event(Event::CData(BytesCData::new(text.as_str())))?,
            Node::Comment(text) => {
                writer.write_event(Event::Comment(BytesText::from_escaped(text.as_str())))?
            }
        }
    }
    writer.write_event(Event::End(BytesEnd::new(el.name.as_str())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="urn:w"><w:body><w:p w:rsidR="00A1"><w:r><w:t xml:space="preserve">Hello &amp; welcome </w:t></w:r></w:p><!-- note --></w:body></w:document>"#;

    #[test]
    fn test_parse_structure() {
        let doc = XmlDocument::parse(SAMPLE.as_bytes()).unwrap();
        assert_eq!(doc.root.name, "w:document");
        let body = doc.root.child("w:body").unwrap();
        let p = body.child("w:p").unwrap();
        assert_eq!(p.attr("w:rsidR"), Some("00A1"));
        assert_eq!(p.descendant_text("w:t"), "Hello & welcome ");
        assert!(matches!(body.children.last(), Some(Node::Comment(c)) if c == " note "));
    }

    #[test]
    fn test_declaration_preserved() {
        let doc = XmlDocument::parse(SAMPLE.as_bytes()).unwrap();
        let decl = doc.declaration.clone().unwrap();
        assert_eq!(decl.version, "1.0");
        assert_eq!(decl.encoding.as_deref(), Some("UTF-8"));
        assert_eq!(decl.standalone.as_deref(), Some("yes"));
    }

    #[test]
    fn test_write_then_parse_keeps_tree() {
        let doc = XmlDocument::parse(SAMPLE.as_bytes()).unwrap();
        let bytes = doc.to_bytes().unwrap();
        let reparsed = XmlDocument::parse(&bytes).unwrap();
        assert_eq!(doc, reparsed);
        assert!(String::from_utf8(bytes).unwrap().contains("&amp;"));
    }

    #[test]
    fn test_empty_elements_written_self_closing() {
        let root = Element::new("w:p").with_child(Element::new("w:pPr"));
        let bytes = XmlDocument::new(root).to_bytes().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("<w:pPr/>"));
    }

    #[test]
    fn test_set_and_remove_attr() {
        let mut el = Element::new("w:ind").with_attr("w:left", "720");
        el.set_attr("w:left", "360");
        el.set_attr("w:firstLine", "709");
        assert_eq!(el.attributes.len(), 2);
        assert_eq!(el.attr("w:left"), Some("360"));
        assert_eq!(el.remove_attr("w:firstLine").as_deref(), Some("709"));
        assert_eq!(el.attr("w:firstLine"), None);
    }

    #[test]
    fn test_unclosed_element_is_error() {
        let result = XmlDocument::parse(b"<w:document><w:body>");
        assert!(matches!(result, Err(Error::Xml(_))));
    }
}
