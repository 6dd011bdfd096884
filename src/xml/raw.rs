//! Raw XML capture for modeled-but-opaque subtrees.
//!
//! Used for math blocks (`m:oMathPara`): the element kind is recognized by
//! the body model, but its payload is carried through without interpretation.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::BufRead;

use crate::error::{Error, Result};

/// A node inside a captured subtree
#[derive(Clone, Debug)]
pub enum RawXmlNode {
    Element(RawXmlElement),
    Text(String),
    Comment(String),
}

/// A captured XML element with attributes and children
#[derive(Clone, Debug)]
pub struct RawXmlElement {
    /// Full element name with prefix (e.g. "m:oMathPara")
    pub name: String,
    /// Attributes as (name, value) pairs
    pub attributes: Vec<(String, String)>,
    /// Child nodes
    pub children: Vec<RawXmlNode>,
    /// Whether this was a self-closing tag
    pub self_closing: bool,
}

fn attrs_of(e: &BytesStart) -> Vec<(String, String)> {
    e.attributes()
        .filter_map(|a| a.ok())
        .map(|a| {
            (
                String::from_utf8_lossy(a.key.as_ref()).to_string(),
                String::from_utf8_lossy(&a.value).to_string(),
            )
        })
        .collect()
}

impl RawXmlElement {
    /// Capture a complete element (the start tag has already been read)
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<Self> {
        let name = String::from_utf8_lossy(start.name().as_ref()).to_string();
        let attributes = attrs_of(start);

        let mut children = Vec::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let child = Self::from_reader(reader, &e)?;
                    children.push(RawXmlNode::Element(child));
                }
                Event::Empty(e) => {
                    children.push(RawXmlNode::Element(Self::from_empty(&e)));
                }
                Event::Text(t) => {
                    let text = t.unescape()?.to_string();
                    if !text.is_empty() {
                        children.push(RawXmlNode::Text(text));
                    }
                }
                Event::Comment(c) => {
                    children.push(RawXmlNode::Comment(String::from_utf8_lossy(&c).to_string()));
                }
                Event::End(e) => {
                    if String::from_utf8_lossy(e.name().as_ref()) == name {
                        break;
                    }
                }
                Event::Eof => {
                    return Err(Error::InvalidDocument(format!(
                        "unexpected EOF inside <{name}>"
                    )))
                }
                _ => {}
            }
            buf.clear();
        }

        Ok(Self {
            name,
            attributes,
            children,
            self_closing: false,
        })
    }

    /// Capture a self-closing tag
    pub fn from_empty(e: &BytesStart) -> Self {
        Self {
            name: String::from_utf8_lossy(e.name().as_ref()).to_string(),
            attributes: attrs_of(e),
            children: Vec::new(),
            self_closing: true,
        }
    }

    /// Write the captured subtree back out
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new(&self.name);
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.children.is_empty() && self.self_closing {
            writer.write_event(Event::Empty(start))?;
        } else {
            writer.write_event(Event::Start(start))?;
            for child in &self.children {
                child.write_to(writer)?;
            }
            writer.write_event(Event::End(BytesEnd::new(&self.name)))?;
        }

        Ok(())
    }

    /// Concatenated text of the subtree
    pub fn text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                RawXmlNode::Text(t) => out.push_str(t),
                RawXmlNode::Element(e) => out.push_str(&e.text()),
                RawXmlNode::Comment(_) => {}
            }
        }
        out
    }
}

impl RawXmlNode {
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        match self {
            RawXmlNode::Element(e) => e.write_to(writer),
            RawXmlNode::Text(t) => {
                writer.write_event(Event::Text(BytesText::new(t)))?;
                Ok(())
            }
            RawXmlNode::Comment(c) => {
                writer.write_event(Event::Comment(BytesText::new(c)))?;
                Ok(())
            }
        }
    }
}
