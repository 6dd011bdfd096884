//! XML utilities shared by the streaming decoder and encoder

mod namespace;
mod raw;

pub use namespace::*;
pub use raw::{RawXmlElement, RawXmlNode};

use crate::error::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::BufRead;

/// Get an attribute value from a start tag
pub fn get_attr(element: &BytesStart, name: &str) -> Option<String> {
    element
        .attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.as_ref() == name.as_bytes())
        .map(|a| String::from_utf8_lossy(&a.value).to_string())
}

/// Get the w:val attribute (common in WordprocessingML)
pub fn get_w_val(element: &BytesStart) -> Option<String> {
    get_attr(element, "w:val").or_else(|| get_attr(element, "val"))
}

/// Get an attribute with or without the w: prefix
pub fn get_w_attr(element: &BytesStart, name: &str) -> Option<String> {
    get_attr(element, &format!("w:{}", name)).or_else(|| get_attr(element, name))
}

/// Parse an OOXML toggle value ("1", "true", "on", or missing val)
pub fn parse_bool(element: &BytesStart) -> bool {
    match get_w_val(element) {
        None => true, // no val attribute means true (e.g. <w:b/>)
        Some(v) => matches!(v.as_str(), "1" | "true" | "on"),
    }
}

/// Consume a balanced element sub-tree by depth counting.
///
/// This is the schema-tolerance mechanism: elements the decoder does not
/// recognize are consumed and dropped without aborting the parse. A premature
/// EOF inside the sub-tree is a fatal decode error.
pub fn skip_element<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<()> {
    let target = start.name().as_ref().to_vec();
    let mut depth = 1;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == target => depth += 1,
            Event::End(e) if e.name().as_ref() == target => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Event::Eof => {
                return Err(Error::InvalidDocument(format!(
                    "unexpected EOF inside <{}>",
                    String::from_utf8_lossy(&target)
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

/// Read text content up to the closing tag named `end`
pub fn read_text_until<R: BufRead>(reader: &mut Reader<R>, end: &[u8]) -> Result<String> {
    let mut text = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Text(t) => text.push_str(&t.unescape()?),
            Event::End(e) if e.name().local_name().as_ref() == end => break,
            Event::Eof => {
                return Err(Error::InvalidDocument(format!(
                    "unexpected EOF inside <{}>",
                    String::from_utf8_lossy(end)
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}
