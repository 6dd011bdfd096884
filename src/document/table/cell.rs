//! Table cell elements (w:tc, w:tcPr)

use crate::document::Paragraph;
use crate::error::Result;
use crate::xml::{get_attr, get_w_attr, get_w_val, skip_element};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::BufRead;

use super::types::{
    BorderEdge, CellBorders, CellMargins, TextDirection, VMerge, VerticalAlignment,
};
use super::Table;

/// Table cell (w:tc)
///
/// A cell owns paragraphs and, recursively, nested tables. The encoder
/// always emits properties first, then paragraphs, then nested tables, and
/// guarantees at least one paragraph.
#[derive(Clone, Debug, Default)]
pub struct TableCell {
    /// Cell properties
    pub properties: TableCellProperties,
    /// Cell content
    pub paragraphs: Vec<Paragraph>,
    /// Nested tables, arbitrary depth
    pub tables: Vec<Table>,
}

/// Table cell properties (w:tcPr)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableCellProperties {
    /// Cell width in twips
    pub width: Option<i32>,
    /// Grid span (horizontal merge)
    pub grid_span: Option<u32>,
    /// Vertical merge
    pub v_merge: Option<VMerge>,
    /// Vertical alignment
    pub v_align: Option<VerticalAlignment>,
    /// Cell borders
    pub borders: Option<CellBorders>,
    /// Shading fill as a hex color
    pub shading: Option<String>,
    /// Interior margins
    pub margins: Option<CellMargins>,
    /// Text flow direction
    pub text_direction: Option<TextDirection>,
}

impl TableCell {
    /// Create a new cell with text
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let paragraphs = if text.is_empty() {
            vec![Paragraph::default()]
        } else {
            vec![Paragraph::new(text)]
        };
        TableCell {
            paragraphs,
            ..Default::default()
        }
    }

    /// Set the cell text (replaces all paragraphs with a single one)
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.paragraphs.clear();
        self.paragraphs.push(Paragraph::new(text));
    }

    /// Add a paragraph to the cell
    pub fn add_paragraph(&mut self, para: Paragraph) {
        self.paragraphs.push(para);
    }

    /// Add a nested table to the cell
    pub fn add_table(&mut self, table: Table) -> &mut Table {
        self.tables.push(table);
        match self.tables.last_mut() {
            Some(t) => t,
            None => unreachable!("just pushed a table"),
        }
    }

    /// Set cell width (in twips)
    pub fn set_width(&mut self, width: i32) -> &mut Self {
        self.properties.width = Some(width);
        self
    }

    /// Set vertical alignment
    pub fn set_vertical_alignment(&mut self, align: VerticalAlignment) -> &mut Self {
        self.properties.v_align = Some(align);
        self
    }

    /// Set the shading fill color (hex, no leading '#')
    pub fn set_shading(&mut self, fill: impl Into<String>) -> &mut Self {
        self.properties.shading = Some(fill.into());
        self
    }

    /// Set the text flow direction
    pub fn set_text_direction(&mut self, dir: TextDirection) -> &mut Self {
        self.properties.text_direction = Some(dir);
        self
    }

    /// Set cell borders
    pub fn set_borders(&mut self, borders: CellBorders) -> &mut Self {
        self.properties.borders = Some(borders);
        self
    }

    /// Parse from reader (after the w:tc start tag)
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>, _start: &BytesStart) -> Result<Self> {
        let mut cell = TableCell::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let name = e.name();
                    let local = name.local_name();

                    match local.as_ref() {
                        b"tcPr" => cell.properties = TableCellProperties::from_reader(reader)?,
                        b"p" => {
                            let para = Paragraph::from_reader(reader, &e)?;
                            cell.paragraphs.push(para);
                        }
                        b"tbl" => {
                            let table = Table::from_reader(reader, &e)?;
                            cell.tables.push(table);
                        }
                        _ => skip_element(reader, &e)?,
                    }
                }
                Event::Empty(e) => {
                    if e.name().local_name().as_ref() == b"p" {
                        cell.paragraphs.push(Paragraph::default());
                    }
                }
                Event::End(e) => {
                    if e.name().local_name().as_ref() == b"tc" {
                        break;
                    }
                }
                Event::Eof => {
                    return Err(crate::error::Error::InvalidDocument(
                        "unexpected EOF inside <w:tc>".into(),
                    ))
                }
                _ => {}
            }
            buf.clear();
        }

        Ok(cell)
    }

    /// Get cell text (all paragraphs concatenated)
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.paragraphs.iter()
    }

    pub fn paragraphs_mut(&mut self) -> impl Iterator<Item = &mut Paragraph> {
        self.paragraphs.iter_mut()
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.iter()
    }

    pub fn width(&self) -> Option<i32> {
        self.properties.width
    }

    pub fn vertical_alignment(&self) -> Option<VerticalAlignment> {
        self.properties.v_align
    }

    /// Grid span (horizontal merge width, 1 when absent)
    pub fn grid_span(&self) -> u32 {
        self.properties.grid_span.unwrap_or(1)
    }

    pub fn v_merge(&self) -> Option<VMerge> {
        self.properties.v_merge
    }

    /// Whether this cell is the first cell of a horizontal merge
    pub fn is_merge_start(&self) -> bool {
        self.grid_span() > 1
    }

    /// Whether this cell starts a vertical merge group
    pub fn is_v_merge_start(&self) -> bool {
        self.properties.v_merge == Some(VMerge::Restart)
    }

    /// Whether this cell continues a vertical merge group
    pub fn is_v_merge_continue(&self) -> bool {
        self.properties.v_merge == Some(VMerge::Continue)
    }

    /// Clear cell content down to a single empty paragraph
    pub fn clear(&mut self) {
        self.paragraphs.clear();
        self.paragraphs.push(Paragraph::default());
        self.tables.clear();
    }

    /// A placeholder cell carrying only this cell's width and alignment.
    /// Used when re-inserting cells after an unmerge and when cloning
    /// structure for new rows/columns; never copies merge state.
    pub fn placeholder_like(&self) -> TableCell {
        let mut cell = TableCell::new("");
        cell.properties.width = self.properties.width;
        cell.properties.v_align = self.properties.v_align;
        cell
    }

    /// Write to XML writer
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        writer.write_event(Event::Start(BytesStart::new("w:tc")))?;

        self.properties.write_to(writer)?;

        // A cell must contain at least one paragraph.
        if self.paragraphs.is_empty() {
            writer.write_event(Event::Empty(BytesStart::new("w:p")))?;
        } else {
            for para in &self.paragraphs {
                para.write_to(writer)?;
            }
        }

        for table in &self.tables {
            table.write_to(writer)?;
        }

        writer.write_event(Event::End(BytesEnd::new("w:tc")))?;
        Ok(())
    }
}

impl TableCellProperties {
    /// Parse from reader (after the w:tcPr start tag)
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>) -> Result<Self> {
        let mut props = TableCellProperties::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let name = e.name();
                    let local = name.local_name();

                    match local.as_ref() {
                        b"tcBorders" => props.borders = Some(parse_cell_borders(reader)?),
                        b"tcMar" => props.margins = Some(parse_cell_margins(reader)?),
                        _ => skip_element(reader, &e)?,
                    }
                }
                Event::Empty(e) => {
                    let name = e.name();
                    let local = name.local_name();

                    match local.as_ref() {
                        b"tcW" => {
                            props.width = get_attr(&e, "w:w")
                                .or_else(|| get_attr(&e, "w"))
                                .and_then(|v| v.parse().ok());
                        }
                        b"gridSpan" => {
                            props.grid_span = get_w_val(&e).and_then(|v| v.parse().ok());
                        }
                        b"vMerge" => {
                            props.v_merge = Some(match get_w_val(&e).as_deref() {
                                Some("restart") => VMerge::Restart,
                                _ => VMerge::Continue,
                            });
                        }
                        b"vAlign" => {
                            props.v_align =
                                get_w_val(&e).map(|v| VerticalAlignment::parse(&v));
                        }
                        b"shd" => props.shading = get_w_attr(&e, "fill"),
                        b"textDirection" => {
                            props.text_direction =
                                get_w_val(&e).map(|v| TextDirection::parse(&v));
                        }
                        _ => {}
                    }
                }
                Event::End(e) => {
                    if e.name().local_name().as_ref() == b"tcPr" {
                        break;
                    }
                }
                Event::Eof => {
                    return Err(crate::error::Error::InvalidDocument(
                        "unexpected EOF inside <w:tcPr>".into(),
                    ))
                }
                _ => {}
            }
            buf.clear();
        }

        Ok(props)
    }

    /// Write to XML writer (skipped entirely when all defaults)
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        if *self == TableCellProperties::default() {
            return Ok(());
        }

        writer.write_event(Event::Start(BytesStart::new("w:tcPr")))?;

        if let Some(width) = self.width {
            let mut elem = BytesStart::new("w:tcW");
            elem.push_attribute(("w:w", width.to_string().as_str()));
            elem.push_attribute(("w:type", "dxa"));
            writer.write_event(Event::Empty(elem))?;
        }

        if let Some(span) = self.grid_span {
            let mut elem = BytesStart::new("w:gridSpan");
            elem.push_attribute(("w:val", span.to_string().as_str()));
            writer.write_event(Event::Empty(elem))?;
        }

        if let Some(v_merge) = self.v_merge {
            let mut elem = BytesStart::new("w:vMerge");
            if v_merge == VMerge::Restart {
                elem.push_attribute(("w:val", "restart"));
            }
            writer.write_event(Event::Empty(elem))?;
        }

        if let Some(borders) = &self.borders {
            writer.write_event(Event::Start(BytesStart::new("w:tcBorders")))?;
            write_border_edge(writer, "w:top", borders.top.as_ref())?;
            write_border_edge(writer, "w:left", borders.left.as_ref())?;
            write_border_edge(writer, "w:bottom", borders.bottom.as_ref())?;
            write_border_edge(writer, "w:right", borders.right.as_ref())?;
            writer.write_event(Event::End(BytesEnd::new("w:tcBorders")))?;
        }

        if let Some(fill) = &self.shading {
            let mut elem = BytesStart::new("w:shd");
            elem.push_attribute(("w:val", "clear"));
            elem.push_attribute(("w:fill", fill.as_str()));
            writer.write_event(Event::Empty(elem))?;
        }

        if let Some(margins) = &self.margins {
            writer.write_event(Event::Start(BytesStart::new("w:tcMar")))?;
            write_margin(writer, "w:top", margins.top)?;
            write_margin(writer, "w:left", margins.left)?;
            write_margin(writer, "w:bottom", margins.bottom)?;
            write_margin(writer, "w:right", margins.right)?;
            writer.write_event(Event::End(BytesEnd::new("w:tcMar")))?;
        }

        if let Some(dir) = self.text_direction {
            let mut elem = BytesStart::new("w:textDirection");
            elem.push_attribute(("w:val", dir.as_str()));
            writer.write_event(Event::Empty(elem))?;
        }

        if let Some(v_align) = self.v_align {
            let mut elem = BytesStart::new("w:vAlign");
            elem.push_attribute(("w:val", v_align.as_str()));
            writer.write_event(Event::Empty(elem))?;
        }

        writer.write_event(Event::End(BytesEnd::new("w:tcPr")))?;
        Ok(())
    }
}

pub(super) fn write_border_edge<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    edge: Option<&BorderEdge>,
) -> Result<()> {
    if let Some(edge) = edge {
        let mut elem = BytesStart::new(name);
        elem.push_attribute(("w:val", edge.style.as_str()));
        elem.push_attribute(("w:sz", edge.size.to_string().as_str()));
        elem.push_attribute(("w:color", edge.color.as_str()));
        writer.write_event(Event::Empty(elem))?;
    }
    Ok(())
}

pub(super) fn parse_border_edge(e: &BytesStart) -> BorderEdge {
    BorderEdge {
        style: get_w_val(e).unwrap_or_else(|| "single".to_string()),
        size: get_w_attr(e, "sz").and_then(|v| v.parse().ok()).unwrap_or(4),
        color: get_w_attr(e, "color").unwrap_or_else(|| "auto".to_string()),
    }
}

fn parse_cell_borders<R: BufRead>(reader: &mut Reader<R>) -> Result<CellBorders> {
    let mut borders = CellBorders::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => skip_element(reader, &e)?,
            Event::Empty(e) => {
                let name = e.name();
                let edge = parse_border_edge(&e);
                match name.local_name().as_ref() {
                    b"top" => borders.top = Some(edge),
                    b"left" => borders.left = Some(edge),
                    b"bottom" => borders.bottom = Some(edge),
                    b"right" => borders.right = Some(edge),
                    _ => {}
                }
            }
            Event::End(e) if e.name().local_name().as_ref() == b"tcBorders" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(borders)
}

fn parse_cell_margins<R: BufRead>(reader: &mut Reader<R>) -> Result<CellMargins> {
    let mut margins = CellMargins::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => skip_element(reader, &e)?,
            Event::Empty(e) => {
                let name = e.name();
                let value = get_attr(&e, "w:w")
                    .or_else(|| get_attr(&e, "w"))
                    .and_then(|v| v.parse().ok());
                match name.local_name().as_ref() {
                    b"top" => margins.top = value,
                    b"left" => margins.left = value,
                    b"bottom" => margins.bottom = value,
                    b"right" => margins.right = value,
                    _ => {}
                }
            }
            Event::End(e) if e.name().local_name().as_ref() == b"tcMar" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(margins)
}

fn write_margin<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    value: Option<u32>,
) -> Result<()> {
    if let Some(value) = value {
        let mut elem = BytesStart::new(name);
        elem.push_attribute(("w:w", value.to_string().as_str()));
        elem.push_attribute(("w:type", "dxa"));
        writer.write_event(Event::Empty(elem))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(cell: &TableCell) -> TableCell {
        let mut buf = Vec::new();
        let mut writer = Writer::new(&mut buf);
        cell.write_to(&mut writer).unwrap();
        let xml = String::from_utf8(buf).unwrap();

        let mut reader = Reader::from_str(&xml);
        let mut rbuf = Vec::new();
        match reader.read_event_into(&mut rbuf).unwrap() {
            Event::Start(e) => {
                let e = e.to_owned();
                TableCell::from_reader(&mut reader, &e).unwrap()
            }
            other => panic!("expected start, got {other:?}"),
        }
    }

    #[test]
    fn test_cell_always_has_paragraph() {
        let mut cell = TableCell::new("x");
        cell.paragraphs.clear();

        let mut buf = Vec::new();
        let mut writer = Writer::new(&mut buf);
        cell.write_to(&mut writer).unwrap();
        let xml = String::from_utf8(buf).unwrap();
        assert!(xml.contains("<w:p/>"));
    }

    #[test]
    fn test_properties_roundtrip() {
        let mut cell = TableCell::new("styled");
        cell.set_width(2400)
            .set_vertical_alignment(VerticalAlignment::Center)
            .set_shading("D9D9D9")
            .set_text_direction(TextDirection::TopToBottomRightToLeft);
        cell.properties.margins = Some(CellMargins {
            top: Some(60),
            ..Default::default()
        });

        let cell2 = roundtrip(&cell);
        assert_eq!(cell2.width(), Some(2400));
        assert_eq!(cell2.vertical_alignment(), Some(VerticalAlignment::Center));
        assert_eq!(cell2.properties.shading.as_deref(), Some("D9D9D9"));
        assert_eq!(
            cell2.properties.text_direction,
            Some(TextDirection::TopToBottomRightToLeft)
        );
        assert_eq!(cell2.properties.margins.unwrap().top, Some(60));
        assert_eq!(cell2.text(), "styled");
    }

    #[test]
    fn test_placeholder_drops_merge_state() {
        let mut cell = TableCell::new("merged");
        cell.set_width(1200);
        cell.properties.grid_span = Some(3);
        cell.properties.v_merge = Some(VMerge::Restart);

        let placeholder = cell.placeholder_like();
        assert_eq!(placeholder.width(), Some(1200));
        assert_eq!(placeholder.properties.grid_span, None);
        assert_eq!(placeholder.properties.v_merge, None);
        assert_eq!(placeholder.text(), "");
    }

    #[test]
    fn test_v_merge_continue_no_val() {
        let mut cell = TableCell::new("");
        cell.properties.v_merge = Some(VMerge::Continue);

        let mut buf = Vec::new();
        let mut writer = Writer::new(&mut buf);
        cell.write_to(&mut writer).unwrap();
        let xml = String::from_utf8(buf).unwrap();
        assert!(xml.contains("<w:vMerge/>"));
        assert!(!xml.contains("restart"));
    }
}
