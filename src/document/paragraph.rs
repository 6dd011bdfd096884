//! Paragraph element (w:p)

use crate::document::Run;
use crate::error::Result;
use crate::xml::{get_w_attr, get_w_val, parse_bool, skip_element};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::BufRead;

/// Paragraph element (w:p): optional properties plus an ordered run sequence
#[derive(Clone, Debug, Default)]
pub struct Paragraph {
    /// Paragraph properties
    pub properties: Option<ParagraphProperties>,
    /// Runs in reading order
    pub runs: Vec<Run>,
}

/// Paragraph properties (w:pPr)
#[derive(Clone, Debug, Default)]
pub struct ParagraphProperties {
    /// Style ID
    pub style: Option<String>,
    /// Keep with next paragraph
    pub keep_next: Option<bool>,
    /// Keep all lines on one page
    pub keep_lines: Option<bool>,
    /// Force a page break before
    pub page_break_before: Option<bool>,
    /// Box border drawn around the paragraph
    pub border: Option<ParagraphBorder>,
    /// Spacing in twips (line per the line rule)
    pub spacing: Option<Spacing>,
    /// Indentation in twips
    pub indent: Option<Indent>,
    /// Justification ("left", "center", "right", "both")
    pub justification: Option<String>,
    /// Outline level (0-based; headings)
    pub outline_level: Option<u8>,
    /// Numbering reference
    pub numbering: Option<NumberingRef>,
}

/// Paragraph spacing (w:spacing)
#[derive(Clone, Copy, Debug, Default)]
pub struct Spacing {
    pub before: Option<u32>,
    pub after: Option<u32>,
    pub line: Option<u32>,
    pub line_rule_exact: bool,
}

/// Paragraph indentation (w:ind)
#[derive(Clone, Copy, Debug, Default)]
pub struct Indent {
    pub left: Option<i32>,
    pub right: Option<i32>,
    pub first_line: Option<u32>,
    pub hanging: Option<u32>,
}

/// A uniform box border (w:pBdr with identical sides)
#[derive(Clone, Debug)]
pub struct ParagraphBorder {
    /// Border style (e.g. "single")
    pub style: String,
    /// Width in eighths of a point
    pub size: u32,
    /// RGB hex color or "auto"
    pub color: String,
}

/// Numbering reference (w:numPr)
#[derive(Clone, Copy, Debug, Default)]
pub struct NumberingRef {
    pub num_id: u32,
    pub level: u32,
}

impl Paragraph {
    /// Create a new paragraph with a single text run
    pub fn new(text: impl Into<String>) -> Self {
        Paragraph {
            runs: vec![Run::new(text)],
            ..Default::default()
        }
    }

    /// Parse from reader (after the w:p start tag).
    ///
    /// Unrecognized children (structured tags, comments, revision marks) are
    /// consumed and dropped.
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>, _start: &BytesStart) -> Result<Self> {
        let mut para = Paragraph::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let name = e.name();
                    let local = name.local_name();

                    match local.as_ref() {
                        b"pPr" => {
                            para.properties = Some(ParagraphProperties::from_reader(reader)?);
                        }
                        b"r" => {
                            let run = Run::from_reader(reader, &e)?;
                            para.runs.push(run);
                        }
                        _ => skip_element(reader, &e)?,
                    }
                }
                Event::Empty(e) => {
                    if e.name().local_name().as_ref() == b"r" {
                        para.runs.push(Run::default());
                    }
                }
                Event::End(e) => {
                    if e.name().local_name().as_ref() == b"p" {
                        break;
                    }
                }
                Event::Eof => {
                    return Err(crate::error::Error::InvalidDocument(
                        "unexpected EOF inside <w:p>".into(),
                    ))
                }
                _ => {}
            }
            buf.clear();
        }

        Ok(para)
    }

    /// Concatenated text of all runs
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text()).collect()
    }

    /// Get style ID
    pub fn style(&self) -> Option<&str> {
        self.properties.as_ref()?.style.as_deref()
    }

    /// Iterate over runs
    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.runs.iter()
    }

    /// Add a run
    pub fn add_run(&mut self, run: Run) -> &mut Run {
        self.runs.push(run);
        self.runs.last_mut().expect("just pushed")
    }

    fn props_mut(&mut self) -> &mut ParagraphProperties {
        self.properties.get_or_insert_with(Default::default)
    }

    /// Set style
    pub fn set_style(&mut self, style: impl Into<String>) -> &mut Self {
        self.props_mut().style = Some(style.into());
        self
    }

    /// Set justification
    pub fn set_justification(&mut self, jc: impl Into<String>) -> &mut Self {
        self.props_mut().justification = Some(jc.into());
        self
    }

    /// Set spacing
    pub fn set_spacing(&mut self, spacing: Spacing) -> &mut Self {
        self.props_mut().spacing = Some(spacing);
        self
    }

    /// Set indentation
    pub fn set_indent(&mut self, indent: Indent) -> &mut Self {
        self.props_mut().indent = Some(indent);
        self
    }

    /// Set a uniform box border
    pub fn set_border(&mut self, border: ParagraphBorder) -> &mut Self {
        self.props_mut().border = Some(border);
        self
    }

    /// Set outline level
    pub fn set_outline_level(&mut self, level: u8) -> &mut Self {
        self.props_mut().outline_level = Some(level);
        self
    }

    /// Set numbering reference
    pub fn set_numbering(&mut self, num_id: u32, level: u32) -> &mut Self {
        self.props_mut().numbering = Some(NumberingRef { num_id, level });
        self
    }

    /// Set page-break-before
    pub fn set_page_break_before(&mut self, v: bool) -> &mut Self {
        self.props_mut().page_break_before = Some(v);
        self
    }

    /// Check if this is a heading (outline level or heading style)
    pub fn is_heading(&self) -> bool {
        if let Some(props) = &self.properties {
            if props.outline_level.is_some() {
                return true;
            }
            if let Some(style) = &props.style {
                return style.starts_with("Heading") || style.starts_with("heading");
            }
        }
        false
    }

    /// Write to XML writer
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        if self.properties.is_none() && self.runs.is_empty() {
            writer.write_event(Event::Empty(BytesStart::new("w:p")))?;
            return Ok(());
        }

        writer.write_event(Event::Start(BytesStart::new("w:p")))?;

        if let Some(props) = &self.properties {
            props.write_to(writer)?;
        }

        for run in &self.runs {
            run.write_to(writer)?;
        }

        writer.write_event(Event::End(BytesEnd::new("w:p")))?;
        Ok(())
    }
}

impl ParagraphProperties {
    /// Parse from reader (after the w:pPr start tag)
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>) -> Result<Self> {
        let mut props = ParagraphProperties::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let name = e.name();
                    let local = name.local_name();

                    match local.as_ref() {
                        b"numPr" => props.numbering = Some(parse_num_pr(reader)?),
                        b"pBdr" => props.border = parse_p_bdr(reader)?,
                        _ => skip_element(reader, &e)?,
                    }
                }
                Event::Empty(e) => {
                    let name = e.name();
                    let local = name.local_name();

                    match local.as_ref() {
                        b"pStyle" => props.style = get_w_val(&e),
                        b"keepNext" => props.keep_next = Some(parse_bool(&e)),
                        b"keepLines" => props.keep_lines = Some(parse_bool(&e)),
                        b"pageBreakBefore" => props.page_break_before = Some(parse_bool(&e)),
                        b"spacing" => {
                            props.spacing = Some(Spacing {
                                before: get_w_attr(&e, "before").and_then(|v| v.parse().ok()),
                                after: get_w_attr(&e, "after").and_then(|v| v.parse().ok()),
                                line: get_w_attr(&e, "line").and_then(|v| v.parse().ok()),
                                line_rule_exact: get_w_attr(&e, "lineRule").as_deref()
                                    == Some("exact"),
                            });
                        }
                        b"ind" => {
                            props.indent = Some(Indent {
                                left: get_w_attr(&e, "left")
                                    .or_else(|| get_w_attr(&e, "start"))
                                    .and_then(|v| v.parse().ok()),
                                right: get_w_attr(&e, "right")
                                    .or_else(|| get_w_attr(&e, "end"))
                                    .and_then(|v| v.parse().ok()),
                                first_line: get_w_attr(&e, "firstLine")
                                    .and_then(|v| v.parse().ok()),
                                hanging: get_w_attr(&e, "hanging").and_then(|v| v.parse().ok()),
                            });
                        }
                        b"jc" => props.justification = get_w_val(&e),
                        b"outlineLvl" => {
                            props.outline_level = get_w_val(&e).and_then(|v| v.parse().ok())
                        }
                        _ => {}
                    }
                }
                Event::End(e) => {
                    if e.name().local_name().as_ref() == b"pPr" {
                        break;
                    }
                }
                Event::Eof => {
                    return Err(crate::error::Error::InvalidDocument(
                        "unexpected EOF inside <w:pPr>".into(),
                    ))
                }
                _ => {}
            }
            buf.clear();
        }

        Ok(props)
    }

    fn is_empty(&self) -> bool {
        self.style.is_none()
            && self.keep_next.is_none()
            && self.keep_lines.is_none()
            && self.page_break_before.is_none()
            && self.border.is_none()
            && self.spacing.is_none()
            && self.indent.is_none()
            && self.justification.is_none()
            && self.outline_level.is_none()
            && self.numbering.is_none()
    }

    /// Write to XML writer in fixed field order, omitting absent fields
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }

        writer.write_event(Event::Start(BytesStart::new("w:pPr")))?;

        if let Some(style) = &self.style {
            let mut elem = BytesStart::new("w:pStyle");
            elem.push_attribute(("w:val", style.as_str()));
            writer.write_event(Event::Empty(elem))?;
        }

        if self.keep_next == Some(true) {
            writer.write_event(Event::Empty(BytesStart::new("w:keepNext")))?;
        }
        if self.keep_lines == Some(true) {
            writer.write_event(Event::Empty(BytesStart::new("w:keepLines")))?;
        }
        if self.page_break_before == Some(true) {
            writer.write_event(Event::Empty(BytesStart::new("w:pageBreakBefore")))?;
        }

        if let Some(border) = &self.border {
            writer.write_event(Event::Start(BytesStart::new("w:pBdr")))?;
            for side in ["w:top", "w:left", "w:bottom", "w:right"] {
                let mut elem = BytesStart::new(side);
                elem.push_attribute(("w:val", border.style.as_str()));
                elem.push_attribute(("w:sz", border.size.to_string().as_str()));
                elem.push_attribute(("w:space", "1"));
                elem.push_attribute(("w:color", border.color.as_str()));
                writer.write_event(Event::Empty(elem))?;
            }
            writer.write_event(Event::End(BytesEnd::new("w:pBdr")))?;
        }

        if let Some(numbering) = &self.numbering {
            writer.write_event(Event::Start(BytesStart::new("w:numPr")))?;
            let mut ilvl = BytesStart::new("w:ilvl");
            ilvl.push_attribute(("w:val", numbering.level.to_string().as_str()));
            writer.write_event(Event::Empty(ilvl))?;
            let mut num_id = BytesStart::new("w:numId");
            num_id.push_attribute(("w:val", numbering.num_id.to_string().as_str()));
            writer.write_event(Event::Empty(num_id))?;
            writer.write_event(Event::End(BytesEnd::new("w:numPr")))?;
        }

        if let Some(spacing) = &self.spacing {
            let mut elem = BytesStart::new("w:spacing");
            if let Some(before) = spacing.before {
                elem.push_attribute(("w:before", before.to_string().as_str()));
            }
            if let Some(after) = spacing.after {
                elem.push_attribute(("w:after", after.to_string().as_str()));
            }
            if let Some(line) = spacing.line {
                elem.push_attribute(("w:line", line.to_string().as_str()));
                elem.push_attribute((
                    "w:lineRule",
                    if spacing.line_rule_exact { "exact" } else { "auto" },
                ));
            }
            writer.write_event(Event::Empty(elem))?;
        }

        if let Some(indent) = &self.indent {
            let mut elem = BytesStart::new("w:ind");
            if let Some(left) = indent.left {
                elem.push_attribute(("w:left", left.to_string().as_str()));
            }
            if let Some(right) = indent.right {
                elem.push_attribute(("w:right", right.to_string().as_str()));
            }
            if let Some(first_line) = indent.first_line {
                elem.push_attribute(("w:firstLine", first_line.to_string().as_str()));
            }
            if let Some(hanging) = indent.hanging {
                elem.push_attribute(("w:hanging", hanging.to_string().as_str()));
            }
            writer.write_event(Event::Empty(elem))?;
        }

        if let Some(jc) = &self.justification {
            let mut elem = BytesStart::new("w:jc");
            elem.push_attribute(("w:val", jc.as_str()));
            writer.write_event(Event::Empty(elem))?;
        }

        if let Some(level) = self.outline_level {
            let mut elem = BytesStart::new("w:outlineLvl");
            elem.push_attribute(("w:val", level.to_string().as_str()));
            writer.write_event(Event::Empty(elem))?;
        }

        writer.write_event(Event::End(BytesEnd::new("w:pPr")))?;
        Ok(())
    }
}

/// Parse numbering properties (w:numPr)
fn parse_num_pr<R: BufRead>(reader: &mut Reader<R>) -> Result<NumberingRef> {
    let mut numbering = NumberingRef::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(e) => match e.name().local_name().as_ref() {
                b"numId" => {
                    if let Some(v) = get_w_val(&e).and_then(|v| v.parse().ok()) {
                        numbering.num_id = v;
                    }
                }
                b"ilvl" => {
                    if let Some(v) = get_w_val(&e).and_then(|v| v.parse().ok()) {
                        numbering.level = v;
                    }
                }
                _ => {}
            },
            Event::End(e) if e.name().local_name().as_ref() == b"numPr" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(numbering)
}

/// Parse a paragraph border box (w:pBdr); the first side's attributes win
fn parse_p_bdr<R: BufRead>(reader: &mut Reader<R>) -> Result<Option<ParagraphBorder>> {
    let mut border = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(e) => {
                if border.is_none() {
                    if let Some(style) = get_w_val(&e) {
                        border = Some(ParagraphBorder {
                            style,
                            size: get_w_attr(&e, "sz").and_then(|v| v.parse().ok()).unwrap_or(4),
                            color: get_w_attr(&e, "color").unwrap_or_else(|| "auto".into()),
                        });
                    }
                }
            }
            Event::End(e) if e.name().local_name().as_ref() == b"pBdr" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(border)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(xml: &str) -> Paragraph {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();
        match reader.read_event_into(&mut buf).unwrap() {
            Event::Start(e) => {
                let e = e.to_owned();
                Paragraph::from_reader(&mut reader, &e).unwrap()
            }
            other => panic!("expected start, got {other:?}"),
        }
    }

    fn encode(para: &Paragraph) -> String {
        let mut buf = Vec::new();
        let mut writer = Writer::new(&mut buf);
        para.write_to(&mut writer).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_parse_styled_paragraph() {
        let para = parse(
            r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/><w:jc w:val="center"/><w:outlineLvl w:val="0"/></w:pPr><w:r><w:t>Title</w:t></w:r></w:p>"#,
        );
        assert_eq!(para.text(), "Title");
        assert_eq!(para.style(), Some("Heading1"));
        assert!(para.is_heading());
    }

    #[test]
    fn test_unknown_children_dropped() {
        let para = parse(
            r#"<w:p><w:proofErr w:type="spellStart"/><w:r><w:t>a</w:t></w:r><w:customXml><w:r><w:t>hidden</w:t></w:r></w:customXml></w:p>"#,
        );
        assert_eq!(para.text(), "a");
        assert_eq!(para.runs.len(), 1);
    }

    #[test]
    fn test_border_encodes_four_sides() {
        let mut para = Paragraph::new("x");
        para.set_border(ParagraphBorder {
            style: "single".into(),
            size: 8,
            color: "000000".into(),
        });
        let xml = encode(&para);
        for side in ["w:top", "w:left", "w:bottom", "w:right"] {
            assert!(xml.contains(&format!("<{side} ")), "missing {side}: {xml}");
        }
    }

    #[test]
    fn test_spacing_and_indent_roundtrip() {
        let mut para = Paragraph::new("x");
        para.set_spacing(Spacing {
            before: Some(120),
            after: Some(240),
            line: Some(360),
            line_rule_exact: false,
        });
        para.set_indent(Indent {
            left: Some(720),
            first_line: Some(480),
            ..Default::default()
        });

        let para2 = parse(&encode(&para));
        let props = para2.properties.unwrap();
        let spacing = props.spacing.unwrap();
        assert_eq!(spacing.before, Some(120));
        assert_eq!(spacing.after, Some(240));
        assert_eq!(spacing.line, Some(360));
        let indent = props.indent.unwrap();
        assert_eq!(indent.left, Some(720));
        assert_eq!(indent.first_line, Some(480));
    }

    #[test]
    fn test_numbering_roundtrip() {
        let mut para = Paragraph::new("item");
        para.set_numbering(3, 1);
        let para2 = parse(&encode(&para));
        let numbering = para2.properties.unwrap().numbering.unwrap();
        assert_eq!(numbering.num_id, 3);
        assert_eq!(numbering.level, 1);
    }
}
