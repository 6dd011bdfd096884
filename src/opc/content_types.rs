//! Content Types handling for OPC packages
//!
//! Parses and generates `[Content_Types].xml`

use crate::error::{Error, Result};
use crate::opc::PartUri;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::collections::BTreeMap;
use std::io::{BufRead, Write};

/// Content-type registry for an OPC package.
///
/// Maps are kept ordered so serialization is deterministic.
#[derive(Clone, Debug, Default)]
pub struct ContentTypes {
    /// Default extension mappings (extension -> content type)
    defaults: BTreeMap<String, String>,
    /// Override mappings (part URI -> content type)
    overrides: BTreeMap<PartUri, String>,
}

impl ContentTypes {
    /// Create a new ContentTypes with standard defaults
    pub fn new() -> Self {
        let mut ct = Self::default();

        ct.add_default("rels", RELATIONSHIPS);
        ct.add_default("xml", XML);

        // Common image types
        ct.add_default("png", "image/png");
        ct.add_default("jpeg", "image/jpeg");
        ct.add_default("jpg", "image/jpeg");
        ct.add_default("gif", "image/gif");
        ct.add_default("bmp", "image/bmp");

        ct
    }

    /// Parse from XML string
    pub fn from_xml(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);
        Self::from_reader(&mut reader)
    }

    /// Parse from a reader
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>) -> Result<Self> {
        let mut ct = Self::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Empty(e) | Event::Start(e) => {
                    let name = e.name();
                    match name.local_name().as_ref() {
                        b"Default" => {
                            let ext = get_attr(&e, "Extension")?;
                            let content_type = get_attr(&e, "ContentType")?;
                            ct.defaults.insert(ext.to_lowercase(), content_type);
                        }
                        b"Override" => {
                            let part_name = get_attr(&e, "PartName")?;
                            let content_type = get_attr(&e, "ContentType")?;
                            let uri = PartUri::new(&part_name)?;
                            ct.overrides.insert(uri, content_type);
                        }
                        _ => {}
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(ct)
    }

    /// Serialize to XML string
    pub fn to_xml(&self) -> String {
        let mut buf = Vec::new();
        self.write_to(&mut buf)
            .expect("write to Vec should not fail");
        String::from_utf8(buf).expect("XML should be valid UTF-8")
    }

    /// Write to a writer
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut xml = Writer::new(writer);

        xml.write_event(Event::Decl(BytesDecl::new(
            "1.0",
            Some("UTF-8"),
            Some("yes"),
        )))?;

        let mut types = BytesStart::new("Types");
        types.push_attribute(("xmlns", crate::xml::CT));
        xml.write_event(Event::Start(types))?;

        for (ext, content_type) in &self.defaults {
            let mut default = BytesStart::new("Default");
            default.push_attribute(("Extension", ext.as_str()));
            default.push_attribute(("ContentType", content_type.as_str()));
            xml.write_event(Event::Empty(default))?;
        }

        for (uri, content_type) in &self.overrides {
            let mut override_elem = BytesStart::new("Override");
            override_elem.push_attribute(("PartName", uri.as_str()));
            override_elem.push_attribute(("ContentType", content_type.as_str()));
            xml.write_event(Event::Empty(override_elem))?;
        }

        xml.write_event(Event::End(BytesEnd::new("Types")))?;

        Ok(())
    }

    /// Add a default extension mapping
    pub fn add_default(&mut self, extension: &str, content_type: &str) {
        self.defaults
            .insert(extension.to_lowercase(), content_type.to_string());
    }

    /// Add or update an override for a specific part
    pub fn register_part(&mut self, uri: &PartUri, content_type: &str) {
        self.overrides.insert(uri.clone(), content_type.to_string());
    }

    /// Get the content type for a part
    pub fn get(&self, uri: &PartUri) -> Option<&str> {
        if let Some(ct) = self.overrides.get(uri) {
            return Some(ct);
        }

        uri.extension()
            .and_then(|ext| self.defaults.get(&ext.to_lowercase()))
            .map(|s| s.as_str())
    }

    /// Remove an override
    pub fn remove_override(&mut self, uri: &PartUri) -> Option<String> {
        self.overrides.remove(uri)
    }
}

fn get_attr(element: &BytesStart, name: &str) -> Result<String> {
    for attr in element.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == name.as_bytes() {
            return Ok(String::from_utf8_lossy(&attr.value).to_string());
        }
    }
    Err(Error::MissingAttribute {
        element: String::from_utf8_lossy(element.name().as_ref()).to_string(),
        attr: name.to_string(),
    })
}

// Well-known content types
pub const RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
pub const XML: &str = "application/xml";
pub const MAIN_DOCUMENT: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
pub const STYLES: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml";
pub const SETTINGS: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml";
pub const FOOTNOTES: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.footnotes+xml";
pub const ENDNOTES: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.endnotes+xml";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_content_types() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#;

        let ct = ContentTypes::from_xml(xml).unwrap();

        let doc_uri = PartUri::new("/word/document.xml").unwrap();
        assert_eq!(ct.get(&doc_uri), Some(MAIN_DOCUMENT));
    }

    #[test]
    fn test_roundtrip() {
        let mut ct = ContentTypes::new();
        ct.register_part(&PartUri::new("/word/document.xml").unwrap(), MAIN_DOCUMENT);

        let xml = ct.to_xml();
        let ct2 = ContentTypes::from_xml(&xml).unwrap();

        let doc_uri = PartUri::new("/word/document.xml").unwrap();
        assert_eq!(ct2.get(&doc_uri), Some(MAIN_DOCUMENT));
    }

    #[test]
    fn test_get_by_extension_default() {
        let ct = ContentTypes::new();
        let uri = PartUri::new("/word/media/image1.png").unwrap();
        assert_eq!(ct.get(&uri), Some("image/png"));
    }

    #[test]
    fn test_register_part_updates() {
        let mut ct = ContentTypes::new();
        let uri = PartUri::new("/word/custom.xml").unwrap();
        ct.register_part(&uri, "application/xml");
        ct.register_part(&uri, MAIN_DOCUMENT);
        assert_eq!(ct.get(&uri), Some(MAIN_DOCUMENT));
    }
}
