//! Document model → WordprocessingML.
//!
//! Property elements are emitted in schema order; Word rejects parts whose
//! `w:pPr` or `w:rPr` children are out of sequence.

use super::reader::{indent_points, TWIPS_PER_POINT};
use super::xml::{Element, Node};
use crate::model::{
    Alignment, Block, InlineContent, Paragraph, ParagraphStyle, RunContent, RunProperties, Table,
    TableCell, TableRow, TextRun,
};

/// Child order of `w:pPr` (CT_PPr).
const PPR_ORDER: &[&str] = &[
    "w:pStyle",
    "w:keepNext",
    "w:keepLines",
    "w:pageBreakBefore",
    "w:framePr",
    "w:widowControl",
    "w:numPr",
    "w:suppressLineNumbers",
    "w:pBdr",
    "w:shd",
    "w:tabs",
    "w:suppressAutoHyphens",
    "w:kinsoku",
    "w:wordWrap",
    "w:overflowPunct",
    "w:topLinePunct",
    "w:autoSpaceDE",
    "w:autoSpaceDN",
    "w:bidi",
    "w:adjustRightInd",
    "w:snapToGrid",
    "w:spacing",
    "w:ind",
    "w:contextualSpacing",
    "w:mirrorIndents",
    "w:suppressOverlap",
    "w:jc",
    "w:textDirection",
    "w:textAlignment",
    "w:textboxTightWrap",
    "w:outlineLvl",
    "w:divId",
    "w:cnfStyle",
    "w:rPr",
    "w:sectPr",
    "w:pPrChange",
];

/// Child order of `w:rPr` (CT_RPr).
const RPR_ORDER: &[&str] = &[
    "w:rStyle",
    "w:rFonts",
    "w:b",
    "w:bCs",
    "w:i",
    "w:iCs",
    "w:caps",
    "w:smallCaps",
    "w:strike",
    "w:dstrike",
    "w:outline",
    "w:shadow",
    "w:emboss",
    "w:imprint",
    "w:noProof",
    "w:snapToGrid",
    "w:vanish",
    "w:webHidden",
    "w:color",
    "w:spacing",
    "w:w",
    "w:kern",
    "w:position",
    "w:sz",
    "w:szCs",
    "w:highlight",
    "w:u",
    "w:effect",
    "w:bdr",
    "w:shd",
    "w:fitText",
    "w:vertAlign",
    "w:rtl",
    "w:cs",
    "w:em",
    "w:lang",
    "w:eastAsianLayout",
    "w:specVanish",
    "w:oMath",
    "w:rPrChange",
];

/// Indent attributes superseded when the first line indent is rewritten.
const FIRST_LINE_ATTRS: &[&str] = &[
    "w:firstLine",
    "w:firstLineChars",
    "w:hanging",
    "w:hangingChars",
];

/// Replace the block-level children of a story container.
///
/// Cell properties of a `w:tc` container stay in front.
pub fn write_blocks_into(container: &mut Element, blocks: &[Block]) {
    let mut children = Vec::with_capacity(blocks.len() + 1);
    if let Some(tcpr) = container.child("w:tcPr") {
        children.push(Node::Element(tcpr.clone()));
    }
    children.extend(blocks.iter().map(|b| Node::Element(write_block(b))));
    container.children = children;
}

/// Write a single block.
pub fn write_block(block: &Block) -> Element {
    match block {
        Block::Paragraph(p) => write_paragraph(p),
        Block::Table(t) => write_table(t),
        Block::Opaque(el) => el.clone(),
    }
}

/// Write a paragraph as `w:p`.
pub fn write_paragraph(para: &Paragraph) -> Element {
    let mut el = Element::new("w:p");
    el.attributes = para.attributes.clone();

    if let Some(ppr) = write_paragraph_style(&para.style) {
        el.children.push(Node::Element(ppr));
    }
    for item in &para.content {
        let child = match item {
            InlineContent::Run(run) => write_run(run),
            InlineContent::Opaque(raw) => raw.clone(),
        };
        el.children.push(Node::Element(child));
    }

    el
}

fn write_paragraph_style(style: &ParagraphStyle) -> Option<Element> {
    let mut children = Vec::new();

    if let Some(ref id) = style.style_id {
        children.push(Element::new("w:pStyle").with_attr("w:val", id.as_str()));
    }

    let mut has_indent = false;
    for el in &style.extra {
        if el.is("w:ind") {
            has_indent = true;
            children.push(patch_indent(el, style.first_line_indent));
        } else {
            children.push(el.clone());
        }
    }
    if !has_indent {
        if let Some(points) = style.first_line_indent {
            let mut ind = Element::new("w:ind");
            set_first_line(&mut ind, points);
            children.push(ind);
        }
    }

    if let Some(alignment) = style.alignment {
        children.push(Element::new("w:jc").with_attr("w:val", alignment_value(alignment)));
    }

    if children.is_empty() {
        return None;
    }
    sort_by_schema(&mut children, PPR_ORDER);
    Some(with_children("w:pPr", children))
}

/// `w:jc` value of an alignment.
pub fn alignment_value(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Left => "left",
        Alignment::Center => "center",
        Alignment::Right => "right",
        Alignment::Justify => "both",
        Alignment::Distribute => "distribute",
    }
}

fn to_twips(points: f32) -> i64 {
    (points * TWIPS_PER_POINT).round() as i64
}

/// Bring a source `w:ind` in line with the typed first line indent.
///
/// Left untouched when the value did not change, so character-based
/// indents written by Word survive.
fn patch_indent(raw: &Element, first_line: Option<f32>) -> Element {
    let current = indent_points(raw).map(to_twips);
    let wanted = first_line.map(to_twips);
    if current == wanted {
        return raw.clone();
    }

    let mut ind = raw.clone();
    match first_line {
        Some(points) => set_first_line(&mut ind, points),
        None => {
            for attr in FIRST_LINE_ATTRS {
                ind.remove_attr(attr);
            }
        }
    }
    ind
}

fn set_first_line(ind: &mut Element, points: f32) {
    for attr in FIRST_LINE_ATTRS {
        ind.remove_attr(attr);
    }
    let twips = to_twips(points);
    if twips < 0 {
        ind.set_attr("w:hanging", (-twips).to_string());
    } else {
        ind.set_attr("w:firstLine", twips.to_string());
    }
}

/// Write a run as `w:r`.
pub fn write_run(run: &TextRun) -> Element {
    let mut el = Element::new("w:r");
    el.attributes = run.attributes.clone();

    if let Some(rpr) = write_run_properties(&run.properties) {
        el.children.push(Node::Element(rpr));
    }

    for item in &run.content {
        let child = match item {
            RunContent::Text(text) => text_element(text),
            RunContent::Tab => Element::new("w:tab"),
            RunContent::Break => Element::new("w:br"),
            RunContent::Opaque(raw) => raw.clone(),
        };
        el.children.push(Node::Element(child));
    }

    el
}

fn text_element(text: &str) -> Element {
    let el = Element::new("w:t");
    let needs_preserve = text.starts_with(char::is_whitespace)
        || text.ends_with(char::is_whitespace)
        || text.contains("  ");
    let el = if needs_preserve {
        el.with_attr("xml:space", "preserve")
    } else {
        el
    };
    el.with_text(text)
}

fn write_run_properties(props: &RunProperties) -> Option<Element> {
    if props.is_empty() {
        return None;
    }

    let mut children = Vec::with_capacity(props.extra.len() + 1);
    if let Some(bold) = props.bold {
        let b = Element::new("w:b");
        children.push(if bold { b } else { b.with_attr("w:val", "0") });
    }
    children.extend(props.extra.iter().cloned());
    sort_by_schema(&mut children, RPR_ORDER);

    Some(with_children("w:rPr", children))
}

/// Write a table as `w:tbl`.
pub fn write_table(table: &Table) -> Element {
    let mut el = Element::new("w:tbl");
    el.children
        .extend(table.properties.iter().cloned().map(Node::Element));
    el.children
        .extend(table.rows.iter().map(|r| Node::Element(write_row(r))));
    el
}

fn write_row(row: &TableRow) -> Element {
    let mut el = Element::new("w:tr");
    el.attributes = row.attributes.clone();
    el.children
        .extend(row.properties.iter().cloned().map(Node::Element));
    el.children
        .extend(row.cells.iter().map(|c| Node::Element(write_cell(c))));
    el
}

fn write_cell(cell: &TableCell) -> Element {
    let mut el = Element::new("w:tc");
    if let Some(ref tcpr) = cell.properties {
        el.children.push(Node::Element(tcpr.clone()));
    }
    el.children
        .extend(cell.content.iter().map(|b| Node::Element(write_block(b))));

    // A cell must end with a paragraph.
    if !matches!(cell.content.last(), Some(Block::Paragraph(_))) {
        el.children.push(Node::Element(Element::new("w:p")));
    }
    el
}

fn sort_by_schema(children: &mut [Element], order: &[&str]) {
    children.sort_by_key(|el| {
        order
            .iter()
            .position(|name| *name == el.name)
            .unwrap_or(order.len())
    });
}

fn with_children(name: &str, children: Vec<Element>) -> Element {
    let mut el = Element::new(name);
    el.children = children.into_iter().map(Node::Element).collect();
    el
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::reader::{read_blocks, read_paragraph};
    use crate::docx::xml::XmlDocument;

    fn parse(xml: &str) -> Element {
        XmlDocument::parse(xml.as_bytes()).unwrap().root
    }

    fn names(el: &Element) -> Vec<&str> {
        el.elements().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_untouched_paragraph_round_trips() {
        let source = parse(
            r#"<w:p w14:paraId="1A"><w:pPr><w:pStyle w:val="Body"/><w:ind w:left="0" w:firstLineChars="200" w:firstLine="420"/><w:jc w:val="center"/></w:pPr><w:r w:rsidR="00AB"><w:rPr><w:b/><w:sz w:val="28"/></w:rPr><w:t xml:space="preserve">Hi </w:t></w:r></w:p>"#,
        );
        let written = write_paragraph(&read_paragraph(&source));
        assert_eq!(written, source);
    }

    #[test]
    fn test_property_order() {
        let mut para = Paragraph::with_text("x");
        para.style.extra.push(Element::new("w:spacing").with_attr("w:after", "0"));
        para.style.extra.push(Element::new("w:keepNext"));
        para.style.alignment = Some(Alignment::Justify);
        para.style.style_id = Some("Body".to_string());
        para.style.first_line_indent = Some(crate::model::cm_to_points(1.25));
        para.content = vec![InlineContent::Run(TextRun::with_properties(
            "x",
            RunProperties {
                bold: Some(true),
                extra: vec![
                    Element::new("w:sz").with_attr("w:val", "24"),
                    Element::new("w:rFonts").with_attr("w:ascii", "Times New Roman"),
                ],
            },
        ))];

        let p = write_paragraph(&para);
        let ppr = p.child("w:pPr").unwrap();
        assert_eq!(
            names(ppr),
            vec!["w:pStyle", "w:keepNext", "w:spacing", "w:ind", "w:jc"]
        );
        assert_eq!(ppr.child("w:ind").unwrap().attr("w:firstLine"), Some("709"));
        assert_eq!(ppr.child("w:jc").unwrap().attr("w:val"), Some("both"));

        let rpr = p.child("w:r").unwrap().child("w:rPr").unwrap();
        assert_eq!(names(rpr), vec!["w:rFonts", "w:b", "w:sz"]);
    }

    #[test]
    fn test_indent_patch_drops_char_units() {
        let mut para = read_paragraph(&parse(
            r#"<w:p><w:pPr><w:ind w:left="360" w:firstLineChars="200" w:firstLine="420"/></w:pPr></w:p>"#,
        ));
        para.style.first_line_indent = Some(-18.0);
        let p = write_paragraph(&para);
        let ind = p.child("w:pPr").unwrap().child("w:ind").unwrap();
        assert_eq!(ind.attr("w:left"), Some("360"));
        assert_eq!(ind.attr("w:hanging"), Some("360"));
        assert_eq!(ind.attr("w:firstLine"), None);
        assert_eq!(ind.attr("w:firstLineChars"), None);
    }

    #[test]
    fn test_run_content() {
        let mut run = TextRun::with_properties(" a\tb\nc", RunProperties::default());
        run.properties.bold = Some(false);
        let r = write_run(&run);
        assert_eq!(names(&r), vec!["w:rPr", "w:t", "w:tab", "w:t", "w:br", "w:t"]);
        let first = r.child("w:t").unwrap();
        assert_eq!(first.attr("xml:space"), Some("preserve"));
        assert_eq!(
            r.child("w:rPr").unwrap().child("w:b").unwrap().attr("w:val"),
            Some("0")
        );
    }

    #[test]
    fn test_table_round_trip() {
        let source = parse(
            r#"<w:tbl><w:tblPr><w:tblW w:w="0" w:type="auto"/></w:tblPr><w:tblGrid><w:gridCol w:w="4675"/></w:tblGrid><w:tr w:rsidR="1"><w:trPr/><w:tc><w:tcPr><w:tcW w:w="4675"/></w:tcPr><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
        );
        let wrapper = Element::new("w:body").with_child(source.clone());
        let blocks = read_blocks(&wrapper);
        assert_eq!(write_block(&blocks[0]), source);
    }

    #[test]
    fn test_cell_gets_trailing_paragraph() {
        let mut table = Table::new();
        table.add_row(TableRow::new(vec![TableCell::empty()]));
        let tbl = write_table(&table);
        let tc = tbl.child("w:tr").unwrap().child("w:tc").unwrap();
        assert_eq!(names(tc), vec!["w:p"]);
    }

    #[test]
    fn test_write_blocks_into_cell_keeps_tcpr() {
        let mut tc = parse(r#"<w:tc><w:tcPr><w:shd w:fill="EEE"/></w:tcPr><w:p/></w:tc>"#);
        write_blocks_into(
            &mut tc,
            &[Block::Paragraph(Paragraph::with_text("a")), Block::Paragraph(Paragraph::new())],
        );
        assert_eq!(names(&tc), vec!["w:tcPr", "w:p", "w:p"]);
    }
}
