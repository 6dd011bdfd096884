//! OPC Package implementation
//!
//! The part store plus the package registry: content types, package-level
//! relationships (/_rels/.rels) and document-level relationships
//! (/word/_rels/document.xml.rels). Parts the model does not understand pass
//! through save byte-for-byte.

use crate::error::{Error, Result};
use crate::opc::relationships::rel_types;
use crate::opc::{well_known, ContentTypes, Part, PartUri, Relationships};
use log::warn;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, Write};
use std::path::Path;
use zip::read::ZipArchive;
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

/// An OPC package: the ZIP-based container for a word-processing document
#[derive(Debug)]
pub struct Package {
    /// All parts, keyed by URI. Ordered so save output is deterministic.
    parts: BTreeMap<PartUri, Part>,
    /// Package-level relationships (/_rels/.rels)
    package_rels: Relationships,
    /// Document-level relationships (/word/_rels/document.xml.rels)
    document_rels: Relationships,
    /// Content types ([Content_Types].xml)
    content_types: ContentTypes,
}

impl Package {
    /// Create a new empty package
    pub fn new() -> Self {
        Self {
            parts: BTreeMap::new(),
            package_rels: Relationships::new(),
            document_rels: Relationships::new(),
            content_types: ContentTypes::new(),
        }
    }

    /// Open a package from a file path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Open a package from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    /// Open a package from a reader
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut package = Self::new();

        package.content_types = read_registry_part(&mut archive, "[Content_Types].xml")
            .and_then(|xml| match xml {
                Some(xml) => ContentTypes::from_xml(&xml).map(Some),
                None => Ok(None),
            })
            .unwrap_or_else(|err| {
                warn!("unparsable [Content_Types].xml, using defaults: {err}");
                None
            })
            .unwrap_or_else(ContentTypes::new);

        package.package_rels = read_rels(&mut archive, "_rels/.rels");
        package.document_rels = read_rels(&mut archive, "word/_rels/document.xml.rels");

        package.read_parts(&mut archive)?;

        Ok(package)
    }

    /// Save the package to a file, creating parent directories as needed
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(path)?;
        self.write_to(file)
    }

    /// Save the package to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_to(Cursor::new(&mut buf))?;
        Ok(buf)
    }

    /// Write the package to a writer
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let options: FileOptions<()> =
            FileOptions::default().compression_method(CompressionMethod::Deflated);

        zip.start_file("[Content_Types].xml", options)?;
        self.content_types.write_to(&mut zip)?;

        if !self.package_rels.is_empty() {
            zip.start_file("_rels/.rels", options)?;
            self.package_rels.write_to(&mut zip)?;
        }

        if !self.document_rels.is_empty() {
            zip.start_file("word/_rels/document.xml.rels", options)?;
            self.document_rels.write_to(&mut zip)?;
        }

        for (uri, part) in &self.parts {
            zip.start_file(uri.zip_path(), options)?;
            zip.write_all(part.data())?;
        }

        zip.finish()?;
        Ok(())
    }

    /// Get a part by URI
    pub fn part(&self, uri: &PartUri) -> Option<&Part> {
        self.parts.get(uri)
    }

    /// Get a mutable part by URI
    pub fn part_mut(&mut self, uri: &PartUri) -> Option<&mut Part> {
        self.parts.get_mut(uri)
    }

    /// Add a part, registering its content type as an override
    pub fn add_part(&mut self, part: Part) {
        let uri = part.uri().clone();
        self.content_types.register_part(&uri, part.content_type());
        self.parts.insert(uri, part);
    }

    /// Add a binary part, relying on the extension default content type
    pub fn add_binary_part(&mut self, part: Part) {
        self.parts.insert(part.uri().clone(), part);
    }

    /// Remove a part
    pub fn remove_part(&mut self, uri: &PartUri) -> Option<Part> {
        self.content_types.remove_override(uri);
        self.parts.remove(uri)
    }

    /// Check whether a part exists
    pub fn has_part(&self, uri: &PartUri) -> bool {
        self.parts.contains_key(uri)
    }

    /// Get all part URIs
    pub fn part_uris(&self) -> impl Iterator<Item = &PartUri> {
        self.parts.keys()
    }

    /// Get all parts
    pub fn parts(&self) -> impl Iterator<Item = (&PartUri, &Part)> {
        self.parts.iter()
    }

    /// Package-level relationships
    pub fn package_rels(&self) -> &Relationships {
        &self.package_rels
    }

    pub fn package_rels_mut(&mut self) -> &mut Relationships {
        &mut self.package_rels
    }

    /// Document-level relationships
    pub fn document_rels(&self) -> &Relationships {
        &self.document_rels
    }

    pub fn document_rels_mut(&mut self) -> &mut Relationships {
        &mut self.document_rels
    }

    /// Content types registry
    pub fn content_types(&self) -> &ContentTypes {
        &self.content_types
    }

    pub fn content_types_mut(&mut self) -> &mut ContentTypes {
        &mut self.content_types
    }

    /// The main document part, resolved through the package relationships
    /// with a fallback to the conventional location.
    pub fn main_document_part(&self) -> Option<&Part> {
        let uri = self.main_document_uri();
        self.parts.get(&uri)
    }

    /// URI of the main document part
    pub fn main_document_uri(&self) -> PartUri {
        self.package_rels
            .by_type(rel_types::OFFICE_DOCUMENT)
            .and_then(|rel| PartUri::new(&format!("/{}", rel.target.trim_start_matches('/'))).ok())
            .unwrap_or_else(well_known::document)
    }

    // === Private methods ===

    fn read_parts<R: Read + Seek>(&mut self, archive: &mut ZipArchive<R>) -> Result<()> {
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let name = file.name().to_string();

            if name.ends_with('/') {
                continue;
            }
            // Registry parts are parsed separately, not stored.
            if name == "[Content_Types].xml"
                || name == "_rels/.rels"
                || name == "word/_rels/document.xml.rels"
            {
                continue;
            }

            let uri = PartUri::new(&format!("/{}", name))?;
            let content_type = self
                .content_types
                .get(&uri)
                .unwrap_or("application/octet-stream")
                .to_string();

            let mut data = Vec::new();
            file.read_to_end(&mut data)?;

            self.parts.insert(uri.clone(), Part::new(uri, content_type, data));
        }

        Ok(())
    }
}

impl Default for Package {
    fn default() -> Self {
        Self::new()
    }
}

fn read_registry_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<String>> {
    match archive.by_name(name) {
        Ok(mut file) => {
            let mut content = String::new();
            file.read_to_string(&mut content)?;
            Ok(Some(content))
        }
        Err(_) => Ok(None),
    }
}

/// Read a relationships part, degrading to an empty graph when the part is
/// absent or unparsable.
fn read_rels<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Relationships {
    match read_registry_part(archive, name) {
        Ok(Some(xml)) => Relationships::from_xml(&xml).unwrap_or_else(|err| {
            warn!("unparsable {name}, using empty relationships: {err}");
            Relationships::new()
        }),
        Ok(None) => Relationships::new(),
        Err(err) => {
            warn!("unreadable {name}, using empty relationships: {err}");
            Relationships::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_package() {
        let pkg = Package::new();
        assert!(pkg.parts.is_empty());
        assert!(pkg.package_rels.is_empty());
        assert!(pkg.document_rels.is_empty());
    }

    #[test]
    fn test_add_part() {
        let mut pkg = Package::new();
        let uri = PartUri::new("/word/document.xml").unwrap();
        pkg.add_part(Part::new(uri.clone(), "application/xml", b"<doc/>".to_vec()));

        assert!(pkg.part(&uri).is_some());
        assert_eq!(pkg.part(&uri).unwrap().data(), b"<doc/>");
        assert_eq!(pkg.content_types().get(&uri), Some("application/xml"));
    }

    #[test]
    fn test_roundtrip_with_parts() {
        let mut pkg = Package::new();

        let doc_uri = well_known::document();
        pkg.add_part(Part::new(
            doc_uri.clone(),
            crate::opc::MAIN_DOCUMENT,
            b"<?xml version=\"1.0\"?><document/>".to_vec(),
        ));
        pkg.package_rels_mut()
            .add(rel_types::OFFICE_DOCUMENT, "word/document.xml");

        let bytes = pkg.to_bytes().unwrap();
        let pkg2 = Package::from_bytes(&bytes).unwrap();

        assert!(pkg2.part(&doc_uri).is_some());
        assert!(pkg2.main_document_part().is_some());
    }

    #[test]
    fn test_unknown_part_passes_through() {
        let mut pkg = Package::new();
        let uri = PartUri::new("/customXml/item1.xml").unwrap();
        let payload = b"<vendor extension=\"1\"/>".to_vec();
        pkg.add_part(Part::new(uri.clone(), "application/xml", payload.clone()));

        let bytes = pkg.to_bytes().unwrap();
        let pkg2 = Package::from_bytes(&bytes).unwrap();

        assert_eq!(pkg2.part(&uri).unwrap().data(), payload.as_slice());
    }

    #[test]
    fn test_document_rels_roundtrip() {
        let mut pkg = Package::new();
        pkg.document_rels_mut().add(rel_types::STYLES, "styles.xml");

        let bytes = pkg.to_bytes().unwrap();
        let pkg2 = Package::from_bytes(&bytes).unwrap();

        assert_eq!(pkg2.document_rels().len(), 1);
        assert!(pkg2.document_rels().by_type(rel_types::STYLES).is_some());
    }

    #[test]
    fn test_open_degrades_without_rels() {
        // A minimal archive with only a document part: no .rels, no content
        // types. Open succeeds with default registries.
        let mut buf = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut buf));
            let options: FileOptions<()> = FileOptions::default();
            zip.start_file("word/document.xml", options).unwrap();
            zip.write_all(b"<w:document/>").unwrap();
            zip.finish().unwrap();
        }

        let pkg = Package::from_bytes(&buf).unwrap();
        assert!(pkg.part(&well_known::document()).is_some());
        assert!(pkg.package_rels().is_empty());
    }
}
