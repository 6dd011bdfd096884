//! Table row elements (w:tr, w:trPr)

use crate::error::Result;
use crate::xml::{get_w_attr, get_w_val, parse_bool, skip_element};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::BufRead;

use super::cell::TableCell;

/// Table row (w:tr)
#[derive(Clone, Debug, Default)]
pub struct TableRow {
    /// Row properties
    pub properties: TableRowProperties,
    /// Cells
    pub cells: Vec<TableCell>,
}

/// Table row properties (w:trPr)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableRowProperties {
    /// Row height in twips
    pub height: Option<RowHeight>,
    /// Keep the row on one page
    pub cant_split: bool,
    /// Repeat as header row on every page
    pub header: bool,
}

/// Row height: a hint (atLeast) or a hard constraint (exact)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowHeight {
    pub twips: u32,
    pub exact: bool,
}

impl TableRow {
    /// Create a new row with empty cells
    pub fn new(cell_count: usize) -> Self {
        let cells = (0..cell_count).map(|_| TableCell::new("")).collect();
        TableRow {
            cells,
            ..Default::default()
        }
    }

    /// Create a row from cell texts
    pub fn from_texts<S: Into<String>>(texts: impl IntoIterator<Item = S>) -> Self {
        let cells = texts.into_iter().map(TableCell::new).collect();
        TableRow {
            cells,
            ..Default::default()
        }
    }

    /// Parse from reader (after the w:tr start tag)
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>, _start: &BytesStart) -> Result<Self> {
        let mut row = TableRow::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let name = e.name();
                    let local = name.local_name();

                    match local.as_ref() {
                        b"trPr" => row.properties = TableRowProperties::from_reader(reader)?,
                        b"tc" => {
                            let cell = TableCell::from_reader(reader, &e)?;
                            row.cells.push(cell);
                        }
                        _ => skip_element(reader, &e)?,
                    }
                }
                Event::End(e) => {
                    if e.name().local_name().as_ref() == b"tr" {
                        break;
                    }
                }
                Event::Eof => {
                    return Err(crate::error::Error::InvalidDocument(
                        "unexpected EOF inside <w:tr>".into(),
                    ))
                }
                _ => {}
            }
            buf.clear();
        }

        Ok(row)
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn cells(&self) -> impl Iterator<Item = &TableCell> {
        self.cells.iter()
    }

    pub fn cell(&self, index: usize) -> Option<&TableCell> {
        self.cells.get(index)
    }

    pub fn cell_mut(&mut self, index: usize) -> Option<&mut TableCell> {
        self.cells.get_mut(index)
    }

    pub fn add_cell(&mut self, cell: TableCell) {
        self.cells.push(cell);
    }

    /// Set the row height
    pub fn set_height(&mut self, twips: u32, exact: bool) -> &mut Self {
        self.properties.height = Some(RowHeight { twips, exact });
        self
    }

    /// Keep the row on a single page
    pub fn set_cant_split(&mut self, v: bool) -> &mut Self {
        self.properties.cant_split = v;
        self
    }

    /// Mark the row as a repeating header row
    pub fn set_header(&mut self, v: bool) -> &mut Self {
        self.properties.header = v;
        self
    }

    /// Write to XML writer
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        writer.write_event(Event::Start(BytesStart::new("w:tr")))?;
        self.properties.write_to(writer)?;
        for cell in &self.cells {
            cell.write_to(writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new("w:tr")))?;
        Ok(())
    }
}

impl TableRowProperties {
    /// Parse from reader (after the w:trPr start tag)
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>) -> Result<Self> {
        let mut props = TableRowProperties::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => skip_element(reader, &e)?,
                Event::Empty(e) => {
                    let name = e.name();
                    let local = name.local_name();

                    match local.as_ref() {
                        b"trHeight" => {
                            if let Some(twips) =
                                get_w_val(&e).and_then(|v| v.parse().ok())
                            {
                                let exact =
                                    get_w_attr(&e, "hRule").as_deref() == Some("exact");
                                props.height = Some(RowHeight { twips, exact });
                            }
                        }
                        b"cantSplit" => props.cant_split = parse_bool(&e),
                        b"tblHeader" => props.header = parse_bool(&e),
                        _ => {}
                    }
                }
                Event::End(e) => {
                    if e.name().local_name().as_ref() == b"trPr" {
                        break;
                    }
                }
                Event::Eof => {
                    return Err(crate::error::Error::InvalidDocument(
                        "unexpected EOF inside <w:trPr>".into(),
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
        if *self == TableRowProperties::default() {
            return Ok(());
        }

        writer.write_event(Event::Start(BytesStart::new("w:trPr")))?;

        if self.cant_split {
            writer.write_event(Event::Empty(BytesStart::new("w:cantSplit")))?;
        }
        if let Some(height) = &self.height {
            let mut elem = BytesStart::new("w:trHeight");
            elem.push_attribute(("w:val", height.twips.to_string().as_str()));
            if height.exact {
                elem.push_attribute(("w:hRule", "exact"));
            }
            writer.write_event(Event::Empty(elem))?;
        }
        if self.header {
            writer.write_event(Event::Empty(BytesStart::new("w:tblHeader")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("w:trPr")))?;
        Ok(())
    }
}
