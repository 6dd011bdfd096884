//! Document body (w:body) and its element model

use crate::document::{Paragraph, SectionProperties, Table};
use crate::error::Result;
use crate::xml::{get_w_attr, get_w_val, skip_element, RawXmlElement};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::BufRead;

/// One element of the body's ordered content sequence.
///
/// The set is closed: the decoder drops anything it does not recognize
/// instead of carrying an open-ended dynamic list.
#[derive(Clone, Debug)]
pub enum BodyElement {
    Paragraph(Paragraph),
    Table(Table),
    SectionProperties(SectionProperties),
    StructuredTag(StructuredTag),
    BookmarkStart { id: String, name: String },
    BookmarkEnd { id: String },
    /// Math block (m:oMathPara), carried through without interpretation
    MathParagraph(RawXmlElement),
}

/// A structured document tag (w:sdt) with block-level content
#[derive(Clone, Debug, Default)]
pub struct StructuredTag {
    pub alias: Option<String>,
    pub tag: Option<String>,
    pub id: Option<i64>,
    /// Paragraphs and tables inside w:sdtContent, in reading order
    pub content: Vec<BodyElement>,
}

/// Document body: an ordered, heterogeneous element sequence.
///
/// Insertion order is reading order. Several SectionProperties may be
/// appended, but only the last one survives encoding and it is always
/// emitted as the final child.
#[derive(Clone, Debug, Default)]
pub struct Body {
    /// Body elements in insertion order
    pub elements: Vec<BodyElement>,
}

impl Body {
    /// Parse body from XML reader (after the w:body start tag)
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>) -> Result<Self> {
        let mut body = Body::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let name = e.name();
                    let local = name.local_name();

                    match local.as_ref() {
                        b"p" => {
                            let para = Paragraph::from_reader(reader, &e)?;
                            body.elements.push(BodyElement::Paragraph(para));
                        }
                        b"tbl" => {
                            let table = Table::from_reader(reader, &e)?;
                            body.elements.push(BodyElement::Table(table));
                        }
                        b"sectPr" => {
                            let sect = SectionProperties::from_reader(reader, &e)?;
                            body.elements.push(BodyElement::SectionProperties(sect));
                        }
                        b"sdt" => {
                            let sdt = StructuredTag::from_reader(reader, &e)?;
                            body.elements.push(BodyElement::StructuredTag(sdt));
                        }
                        b"oMathPara" => {
                            let raw = RawXmlElement::from_reader(reader, &e)?;
                            body.elements.push(BodyElement::MathParagraph(raw));
                        }
                        // Bookmarks may be serialized as a start/end pair
                        // instead of a self-closing element.
                        b"bookmarkStart" => {
                            let element = BodyElement::BookmarkStart {
                                id: get_w_attr(&e, "id").unwrap_or_default(),
                                name: get_w_attr(&e, "name").unwrap_or_default(),
                            };
                            skip_element(reader, &e)?;
                            body.elements.push(element);
                        }
                        b"bookmarkEnd" => {
                            let element = BodyElement::BookmarkEnd {
                                id: get_w_attr(&e, "id").unwrap_or_default(),
                            };
                            skip_element(reader, &e)?;
                            body.elements.push(element);
                        }
                        _ => skip_element(reader, &e)?,
                    }
                }
                Event::Empty(e) => {
                    let name = e.name();
                    let local = name.local_name();

                    match local.as_ref() {
                        b"p" => body.elements.push(BodyElement::Paragraph(Paragraph::default())),
                        b"sectPr" => body
                            .elements
                            .push(BodyElement::SectionProperties(SectionProperties::default())),
                        b"bookmarkStart" => {
                            body.elements.push(BodyElement::BookmarkStart {
                                id: get_w_attr(&e, "id").unwrap_or_default(),
                                name: get_w_attr(&e, "name").unwrap_or_default(),
                            });
                        }
                        b"bookmarkEnd" => {
                            body.elements.push(BodyElement::BookmarkEnd {
                                id: get_w_attr(&e, "id").unwrap_or_default(),
                            });
                        }
                        _ => {}
                    }
                }
                Event::End(e) => {
                    if e.name().local_name().as_ref() == b"body" {
                        break;
                    }
                }
                Event::Eof => {
                    return Err(crate::error::Error::InvalidDocument(
                        "unexpected EOF inside <w:body>".into(),
                    ))
                }
                _ => {}
            }
            buf.clear();
        }

        Ok(body)
    }

    /// Write body to XML writer.
    ///
    /// A single pass over the sequence: every element except section
    /// properties is written in order, then the last section properties (if
    /// any) is appended as the final child.
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        writer.write_event(Event::Start(BytesStart::new("w:body")))?;

        let mut last_sect: Option<&SectionProperties> = None;
        for element in &self.elements {
            match element {
                BodyElement::SectionProperties(sect) => last_sect = Some(sect),
                other => other.write_to(writer)?,
            }
        }

        if let Some(sect) = last_sect {
            sect.write_to(writer)?;
        }

        writer.write_event(Event::End(BytesEnd::new("w:body")))?;
        Ok(())
    }

    /// Append a paragraph
    pub fn add_paragraph(&mut self, para: Paragraph) -> &mut Paragraph {
        self.elements.push(BodyElement::Paragraph(para));
        match self.elements.last_mut() {
            Some(BodyElement::Paragraph(p)) => p,
            _ => unreachable!("just pushed a paragraph"),
        }
    }

    /// Append a table
    pub fn add_table(&mut self, table: Table) -> &mut Table {
        self.elements.push(BodyElement::Table(table));
        match self.elements.last_mut() {
            Some(BodyElement::Table(t)) => t,
            _ => unreachable!("just pushed a table"),
        }
    }

    /// Set the section properties (replaces the meaningful one)
    pub fn set_section_properties(&mut self, sect: SectionProperties) {
        self.elements.push(BodyElement::SectionProperties(sect));
    }

    /// The meaningful (last) section properties, if any
    pub fn section_properties(&self) -> Option<&SectionProperties> {
        self.elements.iter().rev().find_map(|el| match el {
            BodyElement::SectionProperties(sect) => Some(sect),
            _ => None,
        })
    }

    /// The meaningful (last) section properties, mutably
    pub fn section_properties_mut(&mut self) -> Option<&mut SectionProperties> {
        self.elements.iter_mut().rev().find_map(|el| match el {
            BodyElement::SectionProperties(sect) => Some(sect),
            _ => None,
        })
    }

    /// Iterate over top-level paragraphs
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.elements.iter().filter_map(|el| match el {
            BodyElement::Paragraph(p) => Some(p),
            _ => None,
        })
    }

    /// Iterate over top-level paragraphs, mutably
    pub fn paragraphs_mut(&mut self) -> impl Iterator<Item = &mut Paragraph> {
        self.elements.iter_mut().filter_map(|el| match el {
            BodyElement::Paragraph(p) => Some(p),
            _ => None,
        })
    }

    /// Iterate over top-level tables
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.elements.iter().filter_map(|el| match el {
            BodyElement::Table(t) => Some(t),
            _ => None,
        })
    }

    /// Iterate over top-level tables, mutably
    pub fn tables_mut(&mut self) -> impl Iterator<Item = &mut Table> {
        self.elements.iter_mut().filter_map(|el| match el {
            BodyElement::Table(t) => Some(t),
            _ => None,
        })
    }
}

impl BodyElement {
    /// Write to XML writer
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        match self {
            BodyElement::Paragraph(para) => para.write_to(writer),
            BodyElement::Table(table) => table.write_to(writer),
            BodyElement::SectionProperties(sect) => sect.write_to(writer),
            BodyElement::StructuredTag(sdt) => sdt.write_to(writer),
            BodyElement::BookmarkStart { id, name } => {
                let mut elem = BytesStart::new("w:bookmarkStart");
                elem.push_attribute(("w:id", id.as_str()));
                elem.push_attribute(("w:name", name.as_str()));
                writer.write_event(Event::Empty(elem))?;
                Ok(())
            }
            BodyElement::BookmarkEnd { id } => {
                let mut elem = BytesStart::new("w:bookmarkEnd");
                elem.push_attribute(("w:id", id.as_str()));
                writer.write_event(Event::Empty(elem))?;
                Ok(())
            }
            BodyElement::MathParagraph(raw) => raw.write_to(writer),
        }
    }
}

impl StructuredTag {
    /// Parse from reader (after the w:sdt start tag)
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>, _start: &BytesStart) -> Result<Self> {
        let mut sdt = StructuredTag::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let name = e.name();
                    let local = name.local_name();

                    match local.as_ref() {
                        b"sdtPr" => sdt.parse_properties(reader)?,
                        b"sdtContent" => sdt.parse_content(reader)?,
                        _ => skip_element(reader, &e)?,
                    }
                }
                Event::End(e) => {
                    if e.name().local_name().as_ref() == b"sdt" {
                        break;
                    }
                }
                Event::Eof => {
                    return Err(crate::error::Error::InvalidDocument(
                        "unexpected EOF inside <w:sdt>".into(),
                    ))
                }
                _ => {}
            }
            buf.clear();
        }

        Ok(sdt)
    }

    fn parse_properties<R: BufRead>(&mut self, reader: &mut Reader<R>) -> Result<()> {
        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => skip_element(reader, &e)?,
                Event::Empty(e) => match e.name().local_name().as_ref() {
                    b"alias" => self.alias = get_w_val(&e),
                    b"tag" => self.tag = get_w_val(&e),
                    b"id" => self.id = get_w_val(&e).and_then(|v| v.parse().ok()),
                    _ => {}
                },
                Event::End(e) if e.name().local_name().as_ref() == b"sdtPr" => break,
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
        Ok(())
    }

    fn parse_content<R: BufRead>(&mut self, reader: &mut Reader<R>) -> Result<()> {
        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let name = e.name();
                    let local = name.local_name();
                    match local.as_ref() {
                        b"p" => {
                            let para = Paragraph::from_reader(reader, &e)?;
                            self.content.push(BodyElement::Paragraph(para));
                        }
                        b"tbl" => {
                            let table = Table::from_reader(reader, &e)?;
                            self.content.push(BodyElement::Table(table));
                        }
                        _ => skip_element(reader, &e)?,
                    }
                }
                Event::Empty(e) => {
                    if e.name().local_name().as_ref() == b"p" {
                        self.content.push(BodyElement::Paragraph(Paragraph::default()));
                    }
                }
                Event::End(e) if e.name().local_name().as_ref() == b"sdtContent" => break,
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
        Ok(())
    }

    /// Concatenated text of the tag content
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|el| match el {
                BodyElement::Paragraph(p) => Some(p.text()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Write to XML writer
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        writer.write_event(Event::Start(BytesStart::new("w:sdt")))?;

        if self.alias.is_some() || self.tag.is_some() || self.id.is_some() {
            writer.write_event(Event::Start(BytesStart::new("w:sdtPr")))?;
            if let Some(alias) = &self.alias {
                let mut elem = BytesStart::new("w:alias");
                elem.push_attribute(("w:val", alias.as_str()));
                writer.write_event(Event::Empty(elem))?;
            }
            if let Some(tag) = &self.tag {
                let mut elem = BytesStart::new("w:tag");
                elem.push_attribute(("w:val", tag.as_str()));
                writer.write_event(Event::Empty(elem))?;
            }
            if let Some(id) = self.id {
                let mut elem = BytesStart::new("w:id");
                elem.push_attribute(("w:val", id.to_string().as_str()));
                writer.write_event(Event::Empty(elem))?;
            }
            writer.write_event(Event::End(BytesEnd::new("w:sdtPr")))?;
        }

        writer.write_event(Event::Start(BytesStart::new("w:sdtContent")))?;
        for element in &self.content {
            element.write_to(writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new("w:sdtContent")))?;

        writer.write_event(Event::End(BytesEnd::new("w:sdt")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_body(inner: &str) -> Body {
        let xml = format!("<w:body>{inner}</w:body>");
        let mut reader = Reader::from_str(&xml);
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();
        match reader.read_event_into(&mut buf).unwrap() {
            Event::Start(e) => {
                assert_eq!(e.name().local_name().as_ref(), b"body");
                Body::from_reader(&mut reader).unwrap()
            }
            other => panic!("expected body start, got {other:?}"),
        }
    }

    fn encode_body(body: &Body) -> String {
        let mut buf = Vec::new();
        let mut writer = Writer::new(&mut buf);
        body.write_to(&mut writer).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_sect_pr_always_last() {
        let mut body = Body::default();
        body.set_section_properties(SectionProperties::default());
        body.add_paragraph(Paragraph::new("after"));

        let xml = encode_body(&body);
        let sect_pos = xml.find("w:sectPr").unwrap();
        let para_pos = xml.find("<w:p>").unwrap();
        assert!(para_pos < sect_pos, "sectPr must be last: {xml}");
        assert!(xml.trim_end().ends_with("</w:sectPr></w:body>"));
    }

    #[test]
    fn test_last_sect_pr_wins() {
        let mut body = Body::default();
        let mut first = SectionProperties::default();
        first.page_size.width = 1000;
        body.set_section_properties(first);
        body.add_paragraph(Paragraph::new("middle"));
        let mut second = SectionProperties::default();
        second.page_size.width = 2000;
        body.set_section_properties(second);

        let xml = encode_body(&body);
        assert!(xml.contains("w:w=\"2000\""));
        assert!(!xml.contains("w:w=\"1000\""));
        assert_eq!(xml.matches("<w:sectPr>").count(), 1);
    }

    #[test]
    fn test_unknown_body_elements_dropped() {
        let body = parse_body(
            r#"<w:p><w:r><w:t>keep</w:t></w:r></w:p><w:vendorExt><w:deep><w:deeper/></w:deep></w:vendorExt><w:p><w:r><w:t>also</w:t></w:r></w:p>"#,
        );
        assert_eq!(body.elements.len(), 2);
        let texts: Vec<_> = body.paragraphs().map(|p| p.text()).collect();
        assert_eq!(texts, vec!["keep", "also"]);
    }

    #[test]
    fn test_bookmarks_roundtrip() {
        let body = parse_body(
            r#"<w:bookmarkStart w:id="1" w:name="intro"/><w:p/><w:bookmarkEnd w:id="1"/>"#,
        );
        assert_eq!(body.elements.len(), 3);

        let xml = encode_body(&body);
        assert!(xml.contains(r#"<w:bookmarkStart w:id="1" w:name="intro"/>"#));
        assert!(xml.contains(r#"<w:bookmarkEnd w:id="1"/>"#));
    }

    #[test]
    fn test_bookmarks_in_start_end_form_kept() {
        // Equivalent serialization of an empty element; must decode the same
        // as the self-closing form.
        let body = parse_body(
            r#"<w:bookmarkStart w:id="1" w:name="intro"></w:bookmarkStart><w:p/><w:bookmarkEnd w:id="1"></w:bookmarkEnd>"#,
        );
        assert_eq!(body.elements.len(), 3);
        match &body.elements[0] {
            BodyElement::BookmarkStart { id, name } => {
                assert_eq!(id, "1");
                assert_eq!(name, "intro");
            }
            other => panic!("expected bookmark start, got {other:?}"),
        }
        assert!(matches!(&body.elements[2], BodyElement::BookmarkEnd { id } if id == "1"));

        let xml = encode_body(&body);
        assert!(xml.contains(r#"<w:bookmarkStart w:id="1" w:name="intro"/>"#));
        assert!(xml.contains(r#"<w:bookmarkEnd w:id="1"/>"#));
    }

    #[test]
    fn test_self_closing_sect_pr_kept() {
        let body = parse_body(r#"<w:p/><w:sectPr/>"#);
        assert!(body.section_properties().is_some());
    }

    #[test]
    fn test_structured_tag_roundtrip() {
        let body = parse_body(
            r#"<w:sdt><w:sdtPr><w:alias w:val="Title"/><w:tag w:val="title"/><w:id w:val="42"/></w:sdtPr><w:sdtContent><w:p><w:r><w:t>inside</w:t></w:r></w:p></w:sdtContent></w:sdt>"#,
        );

        let sdt = match &body.elements[0] {
            BodyElement::StructuredTag(sdt) => sdt,
            other => panic!("expected structured tag, got {other:?}"),
        };
        assert_eq!(sdt.alias.as_deref(), Some("Title"));
        assert_eq!(sdt.id, Some(42));
        assert_eq!(sdt.text(), "inside");

        let xml = encode_body(&body);
        let body2 = parse_body(&xml[8..xml.len() - 9]); // strip w:body wrapper
        match &body2.elements[0] {
            BodyElement::StructuredTag(sdt2) => assert_eq!(sdt2.tag.as_deref(), Some("title")),
            other => panic!("expected structured tag, got {other:?}"),
        }
    }

    #[test]
    fn test_math_paragraph_preserved() {
        let body = parse_body(
            r#"<m:oMathPara><m:oMath><m:r><m:t>x+1</m:t></m:r></m:oMath></m:oMathPara>"#,
        );
        match &body.elements[0] {
            BodyElement::MathParagraph(raw) => {
                assert_eq!(raw.name, "m:oMathPara");
                assert_eq!(raw.text(), "x+1");
            }
            other => panic!("expected math paragraph, got {other:?}"),
        }

        let xml = encode_body(&body);
        assert!(xml.contains("<m:oMath>"));
        assert!(xml.contains("x+1"));
    }
}
