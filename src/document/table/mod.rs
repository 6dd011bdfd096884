//! Table elements (w:tbl, w:tr, w:tc) and the structural mutation engine

mod cell;
mod engine;
mod row;
mod types;

pub use cell::{TableCell, TableCellProperties};
pub use engine::CellWalk;
pub use row::{RowHeight, TableRow, TableRowProperties};
pub use types::{
    BorderEdge, CellAddress, CellBorders, CellMargins, GridColumn, TableAlignment, TableBorders,
    TableWidth, TextDirection, VMerge, VerticalAlignment,
};

use crate::error::{Error, Result};
use crate::xml::{get_attr, get_w_val, skip_element};
use cell::{parse_border_edge, write_border_edge};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::BufRead;

/// Table element (w:tbl)
#[derive(Clone, Debug, Default)]
pub struct Table {
    /// Table properties
    pub properties: TableProperties,
    /// Table grid (column definitions)
    pub grid: Vec<GridColumn>,
    /// Table rows
    pub rows: Vec<TableRow>,
}

/// Table properties (w:tblPr)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableProperties {
    /// Table style id
    pub style: Option<String>,
    /// Preferred table width
    pub width: Option<TableWidth>,
    /// Horizontal alignment of the whole table
    pub alignment: Option<TableAlignment>,
    /// Indent from the left margin in twips
    pub indent: Option<i32>,
    /// Table borders
    pub borders: Option<TableBorders>,
}

impl Table {
    /// Create a table with the given dimensions.
    ///
    /// Both dimensions must be non-zero.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidArgument(format!(
                "table dimensions must be non-zero, got {rows}x{cols}"
            )));
        }

        let table_rows = (0..rows).map(|_| TableRow::new(cols)).collect();
        let grid = (0..cols).map(|_| GridColumn::default()).collect();

        Ok(Table {
            grid,
            rows: table_rows,
            ..Default::default()
        })
    }

    /// Create a table with explicit column widths (twips).
    ///
    /// The width count must match the column count.
    pub fn with_column_widths(rows: usize, widths: &[i32]) -> Result<Self> {
        let mut table = Table::new(rows, widths.len())?;
        for (col, width) in table.grid.iter_mut().zip(widths) {
            col.width = Some(*width);
        }
        for row in &mut table.rows {
            for (cell, width) in row.cells.iter_mut().zip(widths) {
                cell.properties.width = Some(*width);
            }
        }
        Ok(table)
    }

    /// Create a table from a 2D array of strings
    pub fn from_data<S: Into<String> + Clone>(data: &[&[S]]) -> Result<Self> {
        let cols = data.first().map(|r| r.len()).unwrap_or(0);
        if data.is_empty() || cols == 0 {
            return Err(Error::InvalidArgument(
                "table data must have at least one row and one column".into(),
            ));
        }

        let rows = data
            .iter()
            .map(|row| TableRow::from_texts(row.iter().cloned()))
            .collect();
        let grid = (0..cols).map(|_| GridColumn::default()).collect();

        Ok(Table {
            grid,
            rows,
            ..Default::default()
        })
    }

    /// Parse from reader (after the w:tbl start tag)
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>, _start: &BytesStart) -> Result<Self> {
        let mut table = Table::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let name = e.name();
                    let local = name.local_name();

                    match local.as_ref() {
                        b"tblPr" => table.properties = TableProperties::from_reader(reader)?,
                        b"tblGrid" => table.grid = parse_table_grid(reader)?,
                        b"tr" => {
                            let row = TableRow::from_reader(reader, &e)?;
                            table.rows.push(row);
                        }
                        _ => skip_element(reader, &e)?,
                    }
                }
                Event::End(e) => {
                    if e.name().local_name().as_ref() == b"tbl" {
                        break;
                    }
                }
                Event::Eof => {
                    return Err(Error::InvalidDocument(
                        "unexpected EOF inside <w:tbl>".into(),
                    ))
                }
                _ => {}
            }
            buf.clear();
        }

        Ok(table)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Column count, from the grid when present, else the widest row
    pub fn column_count(&self) -> usize {
        if !self.grid.is_empty() {
            self.grid.len()
        } else {
            self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0)
        }
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&TableCell> {
        self.rows.get(row)?.cells.get(col)
    }

    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut TableCell> {
        self.rows.get_mut(row)?.cells.get_mut(col)
    }

    pub fn rows(&self) -> impl Iterator<Item = &TableRow> {
        self.rows.iter()
    }

    pub fn row(&self, index: usize) -> Option<&TableRow> {
        self.rows.get(index)
    }

    pub fn row_mut(&mut self, index: usize) -> Option<&mut TableRow> {
        self.rows.get_mut(index)
    }

    /// Set a column width in both the grid and every cell of the column
    pub fn set_column_width(&mut self, col: usize, width: i32) -> Result<()> {
        let len = self.grid.len();
        let column = self
            .grid
            .get_mut(col)
            .ok_or(Error::OutOfRange {
                what: "column",
                index: col,
                len,
            })?;
        column.width = Some(width);
        for row in &mut self.rows {
            if let Some(cell) = row.cells.get_mut(col) {
                cell.properties.width = Some(width);
            }
        }
        Ok(())
    }

    /// Set the table style id
    pub fn set_style(&mut self, style: impl Into<String>) -> &mut Self {
        self.properties.style = Some(style.into());
        self
    }

    /// Set the preferred table width
    pub fn set_width(&mut self, width: TableWidth) -> &mut Self {
        self.properties.width = Some(width);
        self
    }

    /// Set table alignment
    pub fn set_alignment(&mut self, alignment: TableAlignment) -> &mut Self {
        self.properties.alignment = Some(alignment);
        self
    }

    /// Set all borders to a uniform single-line edge
    pub fn set_borders(&mut self, borders: TableBorders) -> &mut Self {
        self.properties.borders = Some(borders);
        self
    }

    /// Write to XML writer
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        writer.write_event(Event::Start(BytesStart::new("w:tbl")))?;

        self.properties.write_to(writer)?;

        if !self.grid.is_empty() {
            writer.write_event(Event::Start(BytesStart::new("w:tblGrid")))?;
            for col in &self.grid {
                let mut elem = BytesStart::new("w:gridCol");
                if let Some(w) = col.width {
                    elem.push_attribute(("w:w", w.to_string().as_str()));
                }
                writer.write_event(Event::Empty(elem))?;
            }
            writer.write_event(Event::End(BytesEnd::new("w:tblGrid")))?;
        }

        for row in &self.rows {
            row.write_to(writer)?;
        }

        writer.write_event(Event::End(BytesEnd::new("w:tbl")))?;
        Ok(())
    }
}

impl TableProperties {
    /// Parse from reader (after the w:tblPr start tag)
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>) -> Result<Self> {
        let mut props = TableProperties::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let name = e.name();
                    match name.local_name().as_ref() {
                        b"tblBorders" => props.borders = Some(parse_table_borders(reader)?),
                        _ => skip_element(reader, &e)?,
                    }
                }
                Event::Empty(e) => {
                    let name = e.name();
                    let local = name.local_name();

                    match local.as_ref() {
                        b"tblStyle" => props.style = get_w_val(&e),
                        b"tblW" => {
                            let value = get_attr(&e, "w:w").or_else(|| get_attr(&e, "w"));
                            let kind =
                                get_attr(&e, "w:type").or_else(|| get_attr(&e, "type"));
                            props.width =
                                Some(TableWidth::parse(value.as_deref(), kind.as_deref()));
                        }
                        b"jc" => {
                            props.alignment = get_w_val(&e).map(|v| TableAlignment::parse(&v));
                        }
                        b"tblInd" => {
                            props.indent = get_attr(&e, "w:w")
                                .or_else(|| get_attr(&e, "w"))
                                .and_then(|v| v.parse().ok());
                        }
                        _ => {}
                    }
                }
                Event::End(e) => {
                    if e.name().local_name().as_ref() == b"tblPr" {
                        break;
                    }
                }
                Event::Eof => {
                    return Err(Error::InvalidDocument(
                        "unexpected EOF inside <w:tblPr>".into(),
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
        if *self == TableProperties::default() {
            return Ok(());
        }

        writer.write_event(Event::Start(BytesStart::new("w:tblPr")))?;

        if let Some(style) = &self.style {
            let mut elem = BytesStart::new("w:tblStyle");
            elem.push_attribute(("w:val", style.as_str()));
            writer.write_event(Event::Empty(elem))?;
        }

        if let Some(width) = &self.width {
            let (value, kind) = width.to_attrs();
            let mut elem = BytesStart::new("w:tblW");
            elem.push_attribute(("w:w", value.as_str()));
            elem.push_attribute(("w:type", kind));
            writer.write_event(Event::Empty(elem))?;
        }

        if let Some(alignment) = self.alignment {
            let mut elem = BytesStart::new("w:jc");
            elem.push_attribute(("w:val", alignment.as_str()));
            writer.write_event(Event::Empty(elem))?;
        }

        if let Some(indent) = self.indent {
            let mut elem = BytesStart::new("w:tblInd");
            elem.push_attribute(("w:w", indent.to_string().as_str()));
            elem.push_attribute(("w:type", "dxa"));
            writer.write_event(Event::Empty(elem))?;
        }

        if let Some(borders) = &self.borders {
            writer.write_event(Event::Start(BytesStart::new("w:tblBorders")))?;
            write_border_edge(writer, "w:top", borders.top.as_ref())?;
            write_border_edge(writer, "w:left", borders.left.as_ref())?;
            write_border_edge(writer, "w:bottom", borders.bottom.as_ref())?;
            write_border_edge(writer, "w:right", borders.right.as_ref())?;
            write_border_edge(writer, "w:insideH", borders.inside_h.as_ref())?;
            write_border_edge(writer, "w:insideV", borders.inside_v.as_ref())?;
            writer.write_event(Event::End(BytesEnd::new("w:tblBorders")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("w:tblPr")))?;
        Ok(())
    }
}

fn parse_table_grid<R: BufRead>(reader: &mut Reader<R>) -> Result<Vec<GridColumn>> {
    let mut columns = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(e) => {
                if e.name().local_name().as_ref() == b"gridCol" {
                    let width = get_attr(&e, "w:w")
                        .or_else(|| get_attr(&e, "w"))
                        .and_then(|v| v.parse().ok());
                    columns.push(GridColumn { width });
                }
            }
            Event::Start(e) => skip_element(reader, &e)?,
            Event::End(e) => {
                if e.name().local_name().as_ref() == b"tblGrid" {
                    break;
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(columns)
}

fn parse_table_borders<R: BufRead>(reader: &mut Reader<R>) -> Result<TableBorders> {
    let mut borders = TableBorders::default();
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
                    b"insideH" => borders.inside_h = Some(edge),
                    b"insideV" => borders.inside_v = Some(edge),
                    _ => {}
                }
            }
            Event::End(e) if e.name().local_name().as_ref() == b"tblBorders" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(borders)
}
