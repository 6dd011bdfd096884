//! Run element (w:r) - the atomic styled-text unit

use crate::error::Result;
use crate::xml::{get_attr, get_w_attr, get_w_val, parse_bool, skip_element};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::BufRead;

/// Run element (w:r).
///
/// A run carries optional properties plus at most one payload.
#[derive(Clone, Debug, Default)]
pub struct Run {
    /// Run properties
    pub properties: Option<RunProperties>,
    /// The payload, if any
    pub content: Option<RunContent>,
}

/// The payload of a run
#[derive(Clone, Debug)]
pub enum RunContent {
    /// Text (w:t). An empty string encodes to nothing.
    Text(String),
    /// Break (w:br)
    Break(BreakKind),
    /// Inline image (w:drawing)
    Drawing(Drawing),
    /// Field character (w:fldChar)
    FieldChar(FieldCharKind),
    /// Field instruction text (w:instrText)
    InstrText(String),
    /// Footnote reference (w:footnoteReference)
    FootnoteReference(i64),
    /// Endnote reference (w:endnoteReference)
    EndnoteReference(i64),
    /// Note separator rule (w:separator), only valid inside note parts
    Separator,
    /// Note continuation separator (w:continuationSeparator)
    ContinuationSeparator,
}

/// Break kind
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BreakKind {
    #[default]
    TextWrapping,
    Page,
    Column,
}

/// Field character kind
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldCharKind {
    Begin,
    Separate,
    End,
}

/// An inline image reference.
///
/// Holds the relationship id of the media part plus display extents in EMUs
/// (914400 per inch). The description carries the caller-supplied name as
/// alt text; it never becomes a part path.
#[derive(Clone, Debug, Default)]
pub struct Drawing {
    /// Relationship ID of the image part
    pub rel_id: String,
    /// Display width in EMUs
    pub width_emu: u64,
    /// Display height in EMUs
    pub height_emu: u64,
    /// Alt text / descriptive name
    pub description: Option<String>,
}

/// Run properties (w:rPr). Every field is independently optional.
#[derive(Clone, Debug, Default)]
pub struct RunProperties {
    /// Font (ASCII range)
    pub font_ascii: Option<String>,
    /// Font (East Asian range)
    pub font_east_asia: Option<String>,
    /// Bold
    pub bold: Option<bool>,
    /// Italic
    pub italic: Option<bool>,
    /// Underline type (e.g. "single")
    pub underline: Option<String>,
    /// Strike-through
    pub strike: Option<bool>,
    /// Font size in half-points (24 = 12pt)
    pub size: Option<u32>,
    /// Color (RGB hex)
    pub color: Option<String>,
    /// Highlight color name
    pub highlight: Option<String>,
}

impl Run {
    /// Create a new run with text
    pub fn new(text: impl Into<String>) -> Self {
        Run {
            content: Some(RunContent::Text(text.into())),
            ..Default::default()
        }
    }

    /// Create a run containing a break
    pub fn new_break(kind: BreakKind) -> Self {
        Run {
            content: Some(RunContent::Break(kind)),
            ..Default::default()
        }
    }

    /// Create a run containing an inline image
    pub fn new_drawing(drawing: Drawing) -> Self {
        Run {
            content: Some(RunContent::Drawing(drawing)),
            ..Default::default()
        }
    }

    /// Parse from reader (after the w:r start tag).
    ///
    /// The first recognized payload wins; unrecognized children are consumed
    /// and dropped.
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>, _start: &BytesStart) -> Result<Self> {
        let mut run = Run::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let name = e.name();
                    let local = name.local_name();

                    match local.as_ref() {
                        b"rPr" => {
                            run.properties = Some(RunProperties::from_reader(reader)?);
                        }
                        b"t" => {
                            let text = crate::xml::read_text_until(reader, b"t")?;
                            run.set_payload(RunContent::Text(text));
                        }
                        b"instrText" => {
                            let text = crate::xml::read_text_until(reader, b"instrText")?;
                            run.set_payload(RunContent::InstrText(text));
                        }
                        b"drawing" => {
                            let drawing = Drawing::from_reader(reader, &e)?;
                            run.set_payload(RunContent::Drawing(drawing));
                        }
                        _ => skip_element(reader, &e)?,
                    }
                }
                Event::Empty(e) => {
                    let name = e.name();
                    let local = name.local_name();

                    match local.as_ref() {
                        b"t" => run.set_payload(RunContent::Text(String::new())),
                        b"br" => {
                            let kind = match get_w_attr(&e, "type").as_deref() {
                                Some("page") => BreakKind::Page,
                                Some("column") => BreakKind::Column,
                                _ => BreakKind::TextWrapping,
                            };
                            run.set_payload(RunContent::Break(kind));
                        }
                        b"fldChar" => {
                            let kind = match get_w_attr(&e, "fldCharType").as_deref() {
                                Some("separate") => FieldCharKind::Separate,
                                Some("end") => FieldCharKind::End,
                                _ => FieldCharKind::Begin,
                            };
                            run.set_payload(RunContent::FieldChar(kind));
                        }
                        b"footnoteReference" => {
                            if let Some(id) =
                                get_w_attr(&e, "id").and_then(|v| v.parse().ok())
                            {
                                run.set_payload(RunContent::FootnoteReference(id));
                            }
                        }
                        b"endnoteReference" => {
                            if let Some(id) =
                                get_w_attr(&e, "id").and_then(|v| v.parse().ok())
                            {
                                run.set_payload(RunContent::EndnoteReference(id));
                            }
                        }
                        b"separator" => run.set_payload(RunContent::Separator),
                        b"continuationSeparator" => {
                            run.set_payload(RunContent::ContinuationSeparator)
                        }
                        _ => {}
                    }
                }
                Event::End(e) => {
                    if e.name().local_name().as_ref() == b"r" {
                        break;
                    }
                }
                Event::Eof => {
                    return Err(crate::error::Error::InvalidDocument(
                        "unexpected EOF inside <w:r>".into(),
                    ))
                }
                _ => {}
            }
            buf.clear();
        }

        Ok(run)
    }

    fn set_payload(&mut self, content: RunContent) {
        if self.content.is_none() {
            self.content = Some(content);
        }
    }

    /// Text of this run ("" for non-text payloads)
    pub fn text(&self) -> &str {
        match &self.content {
            Some(RunContent::Text(t)) => t,
            _ => "",
        }
    }

    /// Check if bold
    pub fn bold(&self) -> bool {
        self.properties.as_ref().and_then(|p| p.bold).unwrap_or(false)
    }

    /// Check if italic
    pub fn italic(&self) -> bool {
        self.properties
            .as_ref()
            .and_then(|p| p.italic)
            .unwrap_or(false)
    }

    /// Check if struck through
    pub fn strike(&self) -> bool {
        self.properties
            .as_ref()
            .and_then(|p| p.strike)
            .unwrap_or(false)
    }

    /// Get font size in points
    pub fn font_size_pt(&self) -> Option<f32> {
        self.properties.as_ref()?.size.map(|s| s as f32 / 2.0)
    }

    /// Get color (RGB hex string)
    pub fn color(&self) -> Option<&str> {
        self.properties.as_ref()?.color.as_deref()
    }

    /// Get underline type
    pub fn underline(&self) -> Option<&str> {
        self.properties.as_ref()?.underline.as_deref()
    }

    fn props_mut(&mut self) -> &mut RunProperties {
        self.properties.get_or_insert_with(Default::default)
    }

    /// Set bold
    pub fn set_bold(&mut self, bold: bool) -> &mut Self {
        self.props_mut().bold = Some(bold);
        self
    }

    /// Set italic
    pub fn set_italic(&mut self, italic: bool) -> &mut Self {
        self.props_mut().italic = Some(italic);
        self
    }

    /// Set underline type
    pub fn set_underline(&mut self, underline: impl Into<String>) -> &mut Self {
        self.props_mut().underline = Some(underline.into());
        self
    }

    /// Set strike-through
    pub fn set_strike(&mut self, strike: bool) -> &mut Self {
        self.props_mut().strike = Some(strike);
        self
    }

    /// Set font size in points
    pub fn set_font_size_pt(&mut self, size: f32) -> &mut Self {
        self.props_mut().size = Some((size * 2.0) as u32);
        self
    }

    /// Set color (RGB hex string)
    pub fn set_color(&mut self, color: impl Into<String>) -> &mut Self {
        self.props_mut().color = Some(color.into());
        self
    }

    /// Set highlight color name
    pub fn set_highlight(&mut self, highlight: impl Into<String>) -> &mut Self {
        self.props_mut().highlight = Some(highlight.into());
        self
    }

    /// Set the ASCII font family
    pub fn set_font(&mut self, font: impl Into<String>) -> &mut Self {
        self.props_mut().font_ascii = Some(font.into());
        self
    }

    /// Write to XML writer.
    ///
    /// Sub-elements are emitted in fixed schema order: properties first, then
    /// the payload. An empty text payload emits no w:t element.
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let start = BytesStart::new("w:r");

        let payload_empty = match &self.content {
            None => true,
            Some(RunContent::Text(t)) => t.is_empty(),
            Some(_) => false,
        };
        if self.properties.is_none() && payload_empty {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;

        if let Some(props) = &self.properties {
            props.write_to(writer)?;
        }

        if let Some(content) = &self.content {
            content.write_to(writer)?;
        }

        writer.write_event(Event::End(BytesEnd::new("w:r")))?;
        Ok(())
    }
}

impl RunContent {
    /// Write to XML writer
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        match self {
            RunContent::Text(text) => {
                // Schema-compatibility: an empty text payload is omitted
                // entirely rather than encoded as an empty element.
                if text.is_empty() {
                    return Ok(());
                }
                let mut start = BytesStart::new("w:t");
                if text.starts_with(' ') || text.ends_with(' ') || text.contains("  ") {
                    start.push_attribute(("xml:space", "preserve"));
                }
                writer.write_event(Event::Start(start))?;
                writer.write_event(Event::Text(BytesText::new(text)))?;
                writer.write_event(Event::End(BytesEnd::new("w:t")))?;
            }
            RunContent::Break(kind) => {
                let mut start = BytesStart::new("w:br");
                match kind {
                    BreakKind::Page => start.push_attribute(("w:type", "page")),
                    BreakKind::Column => start.push_attribute(("w:type", "column")),
                    BreakKind::TextWrapping => {}
                }
                writer.write_event(Event::Empty(start))?;
            }
            RunContent::Drawing(drawing) => drawing.write_to(writer)?,
            RunContent::FieldChar(kind) => {
                let mut start = BytesStart::new("w:fldChar");
                let val = match kind {
                    FieldCharKind::Begin => "begin",
                    FieldCharKind::Separate => "separate",
                    FieldCharKind::End => "end",
                };
                start.push_attribute(("w:fldCharType", val));
                writer.write_event(Event::Empty(start))?;
            }
            RunContent::InstrText(text) => {
                let mut start = BytesStart::new("w:instrText");
                start.push_attribute(("xml:space", "preserve"));
                writer.write_event(Event::Start(start))?;
                writer.write_event(Event::Text(BytesText::new(text)))?;
                writer.write_event(Event::End(BytesEnd::new("w:instrText")))?;
            }
            RunContent::FootnoteReference(id) => {
                let mut start = BytesStart::new("w:footnoteReference");
                start.push_attribute(("w:id", id.to_string().as_str()));
                writer.write_event(Event::Empty(start))?;
            }
            RunContent::EndnoteReference(id) => {
                let mut start = BytesStart::new("w:endnoteReference");
                start.push_attribute(("w:id", id.to_string().as_str()));
                writer.write_event(Event::Empty(start))?;
            }
            RunContent::Separator => {
                writer.write_event(Event::Empty(BytesStart::new("w:separator")))?;
            }
            RunContent::ContinuationSeparator => {
                writer.write_event(Event::Empty(BytesStart::new(
                    "w:continuationSeparator",
                )))?;
            }
        }
        Ok(())
    }
}

impl RunProperties {
    /// Parse from reader (after the w:rPr start tag)
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>) -> Result<Self> {
        let mut props = RunProperties::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => skip_element(reader, &e)?,
                Event::Empty(e) => {
                    let name = e.name();
                    let local = name.local_name();

                    match local.as_ref() {
                        b"rFonts" => {
                            props.font_ascii = get_w_attr(&e, "ascii");
                            props.font_east_asia = get_w_attr(&e, "eastAsia");
                        }
                        b"b" => props.bold = Some(parse_bool(&e)),
                        b"i" => props.italic = Some(parse_bool(&e)),
                        b"u" => props.underline = get_w_val(&e).or(Some("single".into())),
                        b"strike" => props.strike = Some(parse_bool(&e)),
                        b"sz" => props.size = get_w_val(&e).and_then(|v| v.parse().ok()),
                        b"color" => props.color = get_w_val(&e),
                        b"highlight" => props.highlight = get_w_val(&e),
                        _ => {}
                    }
                }
                Event::End(e) => {
                    if e.name().local_name().as_ref() == b"rPr" {
                        break;
                    }
                }
                Event::Eof => {
                    return Err(crate::error::Error::InvalidDocument(
                        "unexpected EOF inside <w:rPr>".into(),
                    ))
                }
                _ => {}
            }
            buf.clear();
        }

        Ok(props)
    }

    fn is_empty(&self) -> bool {
        self.font_ascii.is_none()
            && self.font_east_asia.is_none()
            && self.bold.is_none()
            && self.italic.is_none()
            && self.underline.is_none()
            && self.strike.is_none()
            && self.size.is_none()
            && self.color.is_none()
            && self.highlight.is_none()
    }

    /// Write to XML writer in fixed field order, omitting absent fields.
    /// The font element must precede the color element.
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }

        writer.write_event(Event::Start(BytesStart::new("w:rPr")))?;

        if self.font_ascii.is_some() || self.font_east_asia.is_some() {
            let mut elem = BytesStart::new("w:rFonts");
            if let Some(font) = &self.font_ascii {
                elem.push_attribute(("w:ascii", font.as_str()));
                elem.push_attribute(("w:hAnsi", font.as_str()));
            }
            if let Some(font) = &self.font_east_asia {
                elem.push_attribute(("w:eastAsia", font.as_str()));
            }
            writer.write_event(Event::Empty(elem))?;
        }

        if let Some(bold) = self.bold {
            let mut elem = BytesStart::new("w:b");
            if !bold {
                elem.push_attribute(("w:val", "0"));
            }
            writer.write_event(Event::Empty(elem))?;
        }

        if let Some(italic) = self.italic {
            let mut elem = BytesStart::new("w:i");
            if !italic {
                elem.push_attribute(("w:val", "0"));
            }
            writer.write_event(Event::Empty(elem))?;
        }

        if let Some(strike) = self.strike {
            let mut elem = BytesStart::new("w:strike");
            if !strike {
                elem.push_attribute(("w:val", "0"));
            }
            writer.write_event(Event::Empty(elem))?;
        }

        if let Some(underline) = &self.underline {
            let mut elem = BytesStart::new("w:u");
            elem.push_attribute(("w:val", underline.as_str()));
            writer.write_event(Event::Empty(elem))?;
        }

        if let Some(color) = &self.color {
            let mut elem = BytesStart::new("w:color");
            elem.push_attribute(("w:val", color.as_str()));
            writer.write_event(Event::Empty(elem))?;
        }

        if let Some(size) = self.size {
            let mut elem = BytesStart::new("w:sz");
            elem.push_attribute(("w:val", size.to_string().as_str()));
            writer.write_event(Event::Empty(elem))?;
        }

        if let Some(highlight) = &self.highlight {
            let mut elem = BytesStart::new("w:highlight");
            elem.push_attribute(("w:val", highlight.as_str()));
            writer.write_event(Event::Empty(elem))?;
        }

        writer.write_event(Event::End(BytesEnd::new("w:rPr")))?;
        Ok(())
    }
}

impl Drawing {
    /// EMUs per pixel at 96 DPI
    pub const EMU_PER_PIXEL: u64 = 9525;

    /// Create a drawing from pixel dimensions
    pub fn from_pixels(rel_id: impl Into<String>, width_px: u32, height_px: u32) -> Self {
        Drawing {
            rel_id: rel_id.into(),
            width_emu: width_px as u64 * Self::EMU_PER_PIXEL,
            height_emu: height_px as u64 * Self::EMU_PER_PIXEL,
            description: None,
        }
    }

    /// Parse from reader (after the w:drawing start tag).
    ///
    /// Walks the subtree collecting the blip relationship id, the extents and
    /// the description; the surrounding DrawingML scaffolding is regenerated
    /// on encode rather than preserved.
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>, _start: &BytesStart) -> Result<Self> {
        let mut drawing = Drawing::default();
        let mut depth = 1u32;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    depth += 1;
                    drawing.collect(&e);
                }
                Event::Empty(e) => drawing.collect(&e),
                Event::End(e) => {
                    if e.name().local_name().as_ref() == b"drawing" {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    } else {
                        depth -= 1;
                    }
                }
                Event::Eof => {
                    return Err(crate::error::Error::InvalidDocument(
                        "unexpected EOF inside <w:drawing>".into(),
                    ))
                }
                _ => {}
            }
            buf.clear();
        }

        Ok(drawing)
    }

    fn collect(&mut self, e: &BytesStart) {
        match e.name().local_name().as_ref() {
            b"extent" => {
                if let Some(cx) = get_attr(e, "cx").and_then(|v| v.parse().ok()) {
                    self.width_emu = cx;
                }
                if let Some(cy) = get_attr(e, "cy").and_then(|v| v.parse().ok()) {
                    self.height_emu = cy;
                }
            }
            b"blip" => {
                if let Some(id) = get_attr(e, "r:embed") {
                    self.rel_id = id;
                }
            }
            b"docPr" => {
                if let Some(descr) = get_attr(e, "descr") {
                    if !descr.is_empty() {
                        self.description = Some(descr);
                    }
                }
            }
            _ => {}
        }
    }

    /// Write the full inline-drawing subtree
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let cx = self.width_emu.to_string();
        let cy = self.height_emu.to_string();
        let descr = self.description.as_deref().unwrap_or("");

        writer.write_event(Event::Start(BytesStart::new("w:drawing")))?;

        let mut inline = BytesStart::new("wp:inline");
        for attr in ["distT", "distB", "distL", "distR"] {
            inline.push_attribute((attr, "0"));
        }
        writer.write_event(Event::Start(inline))?;

        let mut extent = BytesStart::new("wp:extent");
        extent.push_attribute(("cx", cx.as_str()));
        extent.push_attribute(("cy", cy.as_str()));
        writer.write_event(Event::Empty(extent))?;

        let mut doc_pr = BytesStart::new("wp:docPr");
        doc_pr.push_attribute(("id", "1"));
        doc_pr.push_attribute(("name", "Picture"));
        if !descr.is_empty() {
            doc_pr.push_attribute(("descr", descr));
        }
        writer.write_event(Event::Empty(doc_pr))?;

        let mut graphic = BytesStart::new("a:graphic");
        graphic.push_attribute(("xmlns:a", crate::xml::A));
        writer.write_event(Event::Start(graphic))?;

        let mut graphic_data = BytesStart::new("a:graphicData");
        graphic_data.push_attribute((
            "uri",
            "http://schemas.openxmlformats.org/drawingml/2006/picture",
        ));
        writer.write_event(Event::Start(graphic_data))?;

        let mut pic = BytesStart::new("pic:pic");
        pic.push_attribute(("xmlns:pic", crate::xml::PIC));
        writer.write_event(Event::Start(pic))?;

        writer.write_event(Event::Start(BytesStart::new("pic:nvPicPr")))?;
        let mut c_nv_pr = BytesStart::new("pic:cNvPr");
        c_nv_pr.push_attribute(("id", "0"));
        c_nv_pr.push_attribute(("name", "Picture"));
        if !descr.is_empty() {
            c_nv_pr.push_attribute(("descr", descr));
        }
        writer.write_event(Event::Empty(c_nv_pr))?;
        writer.write_event(Event::Empty(BytesStart::new("pic:cNvPicPr")))?;
        writer.write_event(Event::End(BytesEnd::new("pic:nvPicPr")))?;

        writer.write_event(Event::Start(BytesStart::new("pic:blipFill")))?;
        let mut blip = BytesStart::new("a:blip");
        blip.push_attribute(("r:embed", self.rel_id.as_str()));
        writer.write_event(Event::Empty(blip))?;
        writer.write_event(Event::Start(BytesStart::new("a:stretch")))?;
        writer.write_event(Event::Empty(BytesStart::new("a:fillRect")))?;
        writer.write_event(Event::End(BytesEnd::new("a:stretch")))?;
        writer.write_event(Event::End(BytesEnd::new("pic:blipFill")))?;

        writer.write_event(Event::Start(BytesStart::new("pic:spPr")))?;
        writer.write_event(Event::Start(BytesStart::new("a:xfrm")))?;
        let mut off = BytesStart::new("a:off");
        off.push_attribute(("x", "0"));
        off.push_attribute(("y", "0"));
        writer.write_event(Event::Empty(off))?;
        let mut ext = BytesStart::new("a:ext");
        ext.push_attribute(("cx", cx.as_str()));
        ext.push_attribute(("cy", cy.as_str()));
        writer.write_event(Event::Empty(ext))?;
        writer.write_event(Event::End(BytesEnd::new("a:xfrm")))?;
        let mut prst = BytesStart::new("a:prstGeom");
        prst.push_attribute(("prst", "rect"));
        writer.write_event(Event::Start(prst))?;
        writer.write_event(Event::Empty(BytesStart::new("a:avLst")))?;
        writer.write_event(Event::End(BytesEnd::new("a:prstGeom")))?;
        writer.write_event(Event::End(BytesEnd::new("pic:spPr")))?;

        writer.write_event(Event::End(BytesEnd::new("pic:pic")))?;
        writer.write_event(Event::End(BytesEnd::new("a:graphicData")))?;
        writer.write_event(Event::End(BytesEnd::new("a:graphic")))?;
        writer.write_event(Event::End(BytesEnd::new("wp:inline")))?;
        writer.write_event(Event::End(BytesEnd::new("w:drawing")))?;

        Ok(())
    }
}
