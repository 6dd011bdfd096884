//! Section properties (w:sectPr) - page-level settings

use crate::error::Result;
use crate::xml::{get_attr, get_w_attr, skip_element};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::BufRead;

/// Page-level settings attached to the end of the body.
///
/// Only the last section-properties element in a body is meaningful; the
/// encoder always emits it as the final child of w:body.
#[derive(Clone, Debug)]
pub struct SectionProperties {
    /// Page size
    pub page_size: PageSize,
    /// Page margins
    pub margins: PageMargins,
    /// Header bindings (r:id per kind)
    pub headers: Vec<HeaderFooterRef>,
    /// Footer bindings (r:id per kind)
    pub footers: Vec<HeaderFooterRef>,
}

/// Page size in twips
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageSize {
    pub width: u32,
    pub height: u32,
    pub landscape: bool,
}

/// Page margins in twips. All four page margins may be negative.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageMargins {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
    pub header: u32,
    pub footer: u32,
    pub gutter: u32,
}

/// A header or footer binding
#[derive(Clone, Debug)]
pub struct HeaderFooterRef {
    /// "default", "first" or "even"
    pub kind: String,
    /// Relationship id of the header/footer part
    pub rel_id: String,
}

impl PageSize {
    /// A4 portrait (210 x 297 mm)
    pub const A4: PageSize = PageSize {
        width: 11906,
        height: 16838,
        landscape: false,
    };

    /// US Letter portrait (8.5 x 11 in)
    pub const LETTER: PageSize = PageSize {
        width: 12240,
        height: 15840,
        landscape: false,
    };
}

impl Default for PageSize {
    fn default() -> Self {
        Self::A4
    }
}

impl Default for PageMargins {
    fn default() -> Self {
        // One inch on every side, half an inch for header/footer.
        PageMargins {
            top: 1440,
            right: 1440,
            bottom: 1440,
            left: 1440,
            header: 720,
            footer: 720,
            gutter: 0,
        }
    }
}

impl Default for SectionProperties {
    fn default() -> Self {
        SectionProperties {
            page_size: PageSize::default(),
            margins: PageMargins::default(),
            headers: Vec::new(),
            footers: Vec::new(),
        }
    }
}

impl SectionProperties {
    /// Parse from reader (after the w:sectPr start tag)
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>, _start: &BytesStart) -> Result<Self> {
        let mut sect = SectionProperties::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => skip_element(reader, &e)?,
                Event::Empty(e) => {
                    let name = e.name();
                    let local = name.local_name();

                    match local.as_ref() {
                        b"pgSz" => {
                            if let Some(w) = get_w_attr(&e, "w").and_then(|v| v.parse().ok()) {
                                sect.page_size.width = w;
                            }
                            if let Some(h) = get_w_attr(&e, "h").and_then(|v| v.parse().ok()) {
                                sect.page_size.height = h;
                            }
                            sect.page_size.landscape =
                                get_w_attr(&e, "orient").as_deref() == Some("landscape");
                        }
                        b"pgMar" => {
                            let m = &mut sect.margins;
                            let read = |name: &str| get_w_attr(&e, name);
                            if let Some(v) = read("top").and_then(|v| v.parse().ok()) {
                                m.top = v;
                            }
                            if let Some(v) = read("right").and_then(|v| v.parse().ok()) {
                                m.right = v;
                            }
                            if let Some(v) = read("bottom").and_then(|v| v.parse().ok()) {
                                m.bottom = v;
                            }
                            if let Some(v) = read("left").and_then(|v| v.parse().ok()) {
                                m.left = v;
                            }
                            if let Some(v) = read("header").and_then(|v| v.parse().ok()) {
                                m.header = v;
                            }
                            if let Some(v) = read("footer").and_then(|v| v.parse().ok()) {
                                m.footer = v;
                            }
                            if let Some(v) = read("gutter").and_then(|v| v.parse().ok()) {
                                m.gutter = v;
                            }
                        }
                        b"headerReference" | b"footerReference" => {
                            let kind = get_w_attr(&e, "type").unwrap_or_else(|| "default".into());
                            if let Some(rel_id) = get_attr(&e, "r:id") {
                                let binding = HeaderFooterRef { kind, rel_id };
                                if local.as_ref() == b"headerReference" {
                                    sect.headers.push(binding);
                                } else {
                                    sect.footers.push(binding);
                                }
                            }
                        }
                        _ => {}
                    }
                }
                Event::End(e) => {
                    if e.name().local_name().as_ref() == b"sectPr" {
                        break;
                    }
                }
                Event::Eof => {
                    return Err(crate::error::Error::InvalidDocument(
                        "unexpected EOF inside <w:sectPr>".into(),
                    ))
                }
                _ => {}
            }
            buf.clear();
        }

        Ok(sect)
    }

    /// Write to XML writer
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        writer.write_event(Event::Start(BytesStart::new("w:sectPr")))?;

        for binding in &self.headers {
            let mut elem = BytesStart::new("w:headerReference");
            elem.push_attribute(("w:type", binding.kind.as_str()));
            elem.push_attribute(("r:id", binding.rel_id.as_str()));
            writer.write_event(Event::Empty(elem))?;
        }
        for binding in &self.footers {
            let mut elem = BytesStart::new("w:footerReference");
            elem.push_attribute(("w:type", binding.kind.as_str()));
            elem.push_attribute(("r:id", binding.rel_id.as_str()));
            writer.write_event(Event::Empty(elem))?;
        }

        let mut pg_sz = BytesStart::new("w:pgSz");
        pg_sz.push_attribute(("w:w", self.page_size.width.to_string().as_str()));
        pg_sz.push_attribute(("w:h", self.page_size.height.to_string().as_str()));
        if self.page_size.landscape {
            pg_sz.push_attribute(("w:orient", "landscape"));
        }
        writer.write_event(Event::Empty(pg_sz))?;

        let m = &self.margins;
        let mut pg_mar = BytesStart::new("w:pgMar");
        pg_mar.push_attribute(("w:top", m.top.to_string().as_str()));
        pg_mar.push_attribute(("w:right", m.right.to_string().as_str()));
        pg_mar.push_attribute(("w:bottom", m.bottom.to_string().as_str()));
        pg_mar.push_attribute(("w:left", m.left.to_string().as_str()));
        pg_mar.push_attribute(("w:header", m.header.to_string().as_str()));
        pg_mar.push_attribute(("w:footer", m.footer.to_string().as_str()));
        pg_mar.push_attribute(("w:gutter", m.gutter.to_string().as_str()));
        writer.write_event(Event::Empty(pg_mar))?;

        writer.write_event(Event::End(BytesEnd::new("w:sectPr")))?;
        Ok(())
    }
}
