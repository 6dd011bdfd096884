//! Relationships handling for OPC packages
//!
//! Parses and generates `.rels` files. A relationship graph is an ordered
//! edge list with stable `rId<N>` identifiers.

use crate::error::{Error, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::{BufRead, Write};

/// An ordered collection of relationship edges
#[derive(Clone, Debug, Default)]
pub struct Relationships {
    items: Vec<Relationship>,
}

/// A single relationship edge
#[derive(Clone, Debug)]
pub struct Relationship {
    /// Relationship ID (e.g. "rId1")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target path (relative to the source part, or absolute)
    pub target: String,
    /// Target mode
    pub target_mode: TargetMode,
}

/// Target mode for relationships
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TargetMode {
    /// Internal target (part within the package)
    #[default]
    Internal,
    /// External target (hyperlink, etc.)
    External,
}

impl Relationships {
    /// Create empty relationships
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from XML string
    pub fn from_xml(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);
        Self::from_reader(&mut reader)
    }

    /// Parse from a reader
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>) -> Result<Self> {
        let mut rels = Self::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Empty(e) | Event::Start(e) => {
                    if e.name().local_name().as_ref() == b"Relationship" {
                        rels.items.push(parse_relationship(&e)?);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
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

        let mut rels_elem = BytesStart::new("Relationships");
        rels_elem.push_attribute(("xmlns", crate::xml::PR));
        xml.write_event(Event::Start(rels_elem))?;

        for rel in &self.items {
            let mut rel_elem = BytesStart::new("Relationship");
            rel_elem.push_attribute(("Id", rel.id.as_str()));
            rel_elem.push_attribute(("Type", rel.rel_type.as_str()));
            rel_elem.push_attribute(("Target", rel.target.as_str()));

            if rel.target_mode == TargetMode::External {
                rel_elem.push_attribute(("TargetMode", "External"));
            }

            xml.write_event(Event::Empty(rel_elem))?;
        }

        xml.write_event(Event::End(BytesEnd::new("Relationships")))?;

        Ok(())
    }

    /// Get a relationship by ID
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.items.iter().find(|r| r.id == id)
    }

    /// Get the first relationship of a given type
    pub fn by_type(&self, rel_type: &str) -> Option<&Relationship> {
        self.items.iter().find(|r| r.rel_type == rel_type)
    }

    /// Get all relationships of a given type
    pub fn all_by_type(&self, rel_type: &str) -> Vec<&Relationship> {
        self.items
            .iter()
            .filter(|r| r.rel_type == rel_type)
            .collect()
    }

    /// Append an internal relationship, allocating the next sequential ID.
    ///
    /// IDs are assigned from the highest `rId<N>` currently present so a
    /// reopened graph never reuses an in-use identifier. Callers must not
    /// allocate IDs out of band.
    pub fn add(&mut self, rel_type: &str, target: &str) -> String {
        let id = self.next_id();
        self.add_with_id(&id, rel_type, target, TargetMode::Internal);
        id
    }

    /// Append an external relationship
    pub fn add_external(&mut self, rel_type: &str, target: &str) -> String {
        let id = self.next_id();
        self.add_with_id(&id, rel_type, target, TargetMode::External);
        id
    }

    /// Append a relationship with a specific ID
    pub fn add_with_id(&mut self, id: &str, rel_type: &str, target: &str, mode: TargetMode) {
        self.items.push(Relationship {
            id: id.to_string(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            target_mode: mode,
        });
    }

    /// Remove a relationship by ID
    pub fn remove(&mut self, id: &str) -> Option<Relationship> {
        let pos = self.items.iter().position(|r| r.id == id)?;
        Some(self.items.remove(pos))
    }

    /// Remove every relationship of the given type.
    ///
    /// Used when re-deriving document relationships on open: the styles edge
    /// is always rebuilt rather than trusted from the file.
    pub fn remove_type(&mut self, rel_type: &str) -> usize {
        let before = self.items.len();
        self.items.retain(|r| r.rel_type != rel_type);
        before - self.items.len()
    }

    /// Iterate over all relationships in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.items.iter()
    }

    /// Number of relationships
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn next_id(&self) -> String {
        let max = self
            .items
            .iter()
            .filter_map(|r| r.id.strip_prefix("rId").and_then(|n| n.parse::<u32>().ok()))
            .max()
            .unwrap_or(0);
        format!("rId{}", max + 1)
    }
}

fn parse_relationship(element: &BytesStart) -> Result<Relationship> {
    let mut id = None;
    let mut rel_type = None;
    let mut target = None;
    let mut target_mode = TargetMode::Internal;

    for attr in element.attributes() {
        let attr = attr?;
        let key = attr.key.local_name();
        let value = String::from_utf8_lossy(&attr.value).to_string();

        match key.as_ref() {
            b"Id" => id = Some(value),
            b"Type" => rel_type = Some(value),
            b"Target" => target = Some(value),
            b"TargetMode" => {
                if value == "External" {
                    target_mode = TargetMode::External;
                }
            }
            _ => {}
        }
    }

    let missing = |attr: &str| Error::MissingAttribute {
        element: "Relationship".into(),
        attr: attr.into(),
    };

    Ok(Relationship {
        id: id.ok_or_else(|| missing("Id"))?,
        rel_type: rel_type.ok_or_else(|| missing("Type"))?,
        target: target.ok_or_else(|| missing("Target"))?,
        target_mode,
    })
}

/// Well-known relationship types
pub mod rel_types {
    pub const OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const STYLES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
    pub const SETTINGS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings";
    pub const FOOTNOTES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footnotes";
    pub const ENDNOTES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/endnotes";
    pub const HEADER: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/header";
    pub const FOOTER: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer";
    pub const IMAGE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
    pub const HYPERLINK: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_relationships() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com" TargetMode="External"/>
</Relationships>"#;

        let rels = Relationships::from_xml(xml).unwrap();

        assert_eq!(rels.len(), 2);
        assert_eq!(rels.get("rId1").unwrap().target, "word/document.xml");
        assert_eq!(rels.get("rId2").unwrap().target_mode, TargetMode::External);
    }

    #[test]
    fn test_sequential_ids() {
        let mut rels = Relationships::new();
        assert_eq!(rels.add(rel_types::STYLES, "styles.xml"), "rId1");
        assert_eq!(rels.add(rel_types::SETTINGS, "settings.xml"), "rId2");
    }

    #[test]
    fn test_ids_never_reused_after_parse() {
        let xml = r#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="t" Target="a"/>
  <Relationship Id="rId7" Type="t" Target="b"/>
</Relationships>"#;

        let mut rels = Relationships::from_xml(xml).unwrap();
        assert_eq!(rels.add(rel_types::IMAGE, "media/image1.png"), "rId8");
    }

    #[test]
    fn test_remove_type() {
        let mut rels = Relationships::new();
        rels.add(rel_types::STYLES, "styles.xml");
        rels.add(rel_types::IMAGE, "media/image1.png");
        rels.add(rel_types::STYLES, "styles2.xml");

        assert_eq!(rels.remove_type(rel_types::STYLES), 2);
        assert_eq!(rels.len(), 1);
        assert!(rels.by_type(rel_types::IMAGE).is_some());
    }

    #[test]
    fn test_remove_type_then_add_does_not_collide() {
        let mut rels = Relationships::new();
        rels.add(rel_types::STYLES, "styles.xml"); // rId1
        rels.add(rel_types::IMAGE, "media/image1.png"); // rId2
        rels.remove_type(rel_types::STYLES);

        let id = rels.add(rel_types::STYLES, "styles.xml");
        assert_eq!(id, "rId3");
        assert!(rels.get("rId2").is_some());
    }

    #[test]
    fn test_roundtrip_preserves_order() {
        let mut rels = Relationships::new();
        rels.add(rel_types::OFFICE_DOCUMENT, "word/document.xml");
        rels.add_external(rel_types::HYPERLINK, "https://example.com");

        let xml = rels.to_xml();
        let rels2 = Relationships::from_xml(&xml).unwrap();

        let ids: Vec<_> = rels2.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["rId1", "rId2"]);
    }
}
