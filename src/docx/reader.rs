//! WordprocessingML → document model.
//!
//! Paragraphs, runs and tables become typed model values. Everything the
//! renderer does not need to understand is kept as an [`Element`] in the
//! nearest opaque slot so it can be written back unchanged.

use super::xml::{Element, Node};
use crate::model::{
    Alignment, Block, InlineContent, Paragraph, ParagraphStyle, RunContent, RunProperties, Table,
    TableCell, TableRow, TextRun,
};

/// Twentieths of a point per point.
pub(crate) const TWIPS_PER_POINT: f32 = 20.0;

/// Read the block-level children of a story container (`w:body`, `w:hdr`,
/// `w:ftr`, `w:tc`).
pub fn read_blocks(container: &Element) -> Vec<Block> {
    container
        .elements()
        .filter(|el| !el.is("w:tcPr"))
        .map(read_block)
        .collect()
}

fn read_block(el: &Element) -> Block {
    match el.name.as_str() {
        "w:p" => Block::Paragraph(read_paragraph(el)),
        "w:tbl" => Block::Table(read_table(el)),
        _ => Block::Opaque(el.clone()),
    }
}

/// Read a `w:p` element.
pub fn read_paragraph(el: &Element) -> Paragraph {
    let mut para = Paragraph {
        attributes: el.attributes.clone(),
        ..Default::default()
    };

    for child in el.elements() {
        match child.name.as_str() {
            "w:pPr" => para.style = read_paragraph_style(child),
            "w:r" => para.content.push(InlineContent::Run(read_run(child))),
            _ => para.content.push(InlineContent::Opaque(child.clone())),
        }
    }

    para
}

fn read_paragraph_style(ppr: &Element) -> ParagraphStyle {
    let mut style = ParagraphStyle::default();

    for child in ppr.elements() {
        match child.name.as_str() {
            "w:pStyle" => style.style_id = child.attr("w:val").map(str::to_string),
            "w:jc" => style.alignment = child.attr("w:val").and_then(parse_alignment),
            "w:ind" => {
                style.first_line_indent = indent_points(child);
                style.extra.push(child.clone());
            }
            _ => style.extra.push(child.clone()),
        }
    }

    style
}

/// Map a `w:jc` value to an alignment.
pub fn parse_alignment(value: &str) -> Option<Alignment> {
    match value {
        "left" | "start" => Some(Alignment::Left),
        "center" => Some(Alignment::Center),
        "right" | "end" => Some(Alignment::Right),
        "both" => Some(Alignment::Justify),
        "distribute" => Some(Alignment::Distribute),
        _ => None,
    }
}

/// First line indent of a `w:ind` element in points; hanging indents are
/// negative.
pub(crate) fn indent_points(ind: &Element) -> Option<f32> {
    let twips = |name: &str| ind.attr(name).and_then(|v| v.trim().parse::<f32>().ok());
    if let Some(hanging) = twips("w:hanging") {
        return Some(-hanging / TWIPS_PER_POINT);
    }
    twips("w:firstLine").map(|v| v / TWIPS_PER_POINT)
}

/// Read a `w:r` element.
pub fn read_run(el: &Element) -> TextRun {
    let mut run = TextRun {
        attributes: el.attributes.clone(),
        ..Default::default()
    };

    for child in el.elements() {
        match child.name.as_str() {
            "w:rPr" => run.properties = read_run_properties(child),
            "w:t" => run.content.push(RunContent::Text(child.text())),
            "w:tab" => run.content.push(RunContent::Tab),
            "w:cr" => run.content.push(RunContent::Break),
            "w:br" if is_line_break(child) => run.content.push(RunContent::Break),
            _ => run.content.push(RunContent::Opaque(child.clone())),
        }
    }

    run
}

fn is_line_break(br: &Element) -> bool {
    matches!(br.attr("w:type"), None | Some("textWrapping")) && br.attr("w:clear").is_none()
}

fn read_run_properties(rpr: &Element) -> RunProperties {
    let mut props = RunProperties::default();

    for child in rpr.elements() {
        if child.is("w:b") {
            props.bold = Some(on_off(child));
        } else {
            props.extra.push(child.clone());
        }
    }

    props
}

/// Value of an OOXML on/off property; absent `w:val` means on.
fn on_off(el: &Element) -> bool {
    !matches!(el.attr("w:val"), Some("0" | "false" | "off"))
}

/// Read a `w:tbl` element.
pub fn read_table(el: &Element) -> Table {
    let mut table = Table::new();

    for child in el.elements() {
        if child.is("w:tr") {
            table.rows.push(read_row(child));
        } else {
            table.properties.push(child.clone());
        }
    }

    table
}

fn read_row(el: &Element) -> TableRow {
    let mut row = TableRow {
        attributes: el.attributes.clone(),
        ..Default::default()
    };

    for child in el.elements() {
        if child.is("w:tc") {
            row.cells.push(read_cell(child));
        } else {
            row.properties.push(child.clone());
        }
    }

    row
}

fn read_cell(el: &Element) -> TableCell {
    TableCell {
        properties: el.child("w:tcPr").cloned(),
        content: read_blocks(el),
    }
}

/// Check whether an element has text nodes interleaved with child elements.
///
/// Story containers never do; such content would not survive a rewrite.
pub(crate) fn has_mixed_text(el: &Element) -> bool {
    el.children
        .iter()
        .any(|node| matches!(node, Node::Text(t) if !t.trim().is_empty()))
}
