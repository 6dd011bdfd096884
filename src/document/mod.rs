//! Document model - the high-level API over the package substrate

mod body;
mod media;
mod notes;
mod paragraph;
mod run;
mod section;
mod settings;
mod styles;
mod table;

pub use body::{Body, BodyElement, StructuredTag};
pub use media::{media_content_type, MediaAllocator, NoteAllocator};
pub use notes::{Note, NoteKind, Notes};
pub use paragraph::{
    Indent, NumberingRef, Paragraph, ParagraphBorder, ParagraphProperties, Spacing,
};
pub use run::{BreakKind, Drawing, FieldCharKind, Run, RunContent, RunProperties};
pub use section::{HeaderFooterRef, PageMargins, PageSize, SectionProperties};
pub use settings::{NoteNumbering, Settings};
pub use styles::Styles;
pub use table::{
    BorderEdge, CellAddress, CellBorders, CellMargins, CellWalk, GridColumn, RowHeight, Table,
    TableAlignment, TableBorders, TableCell, TableCellProperties, TableRow, TableRowProperties,
    TableWidth, TextDirection, VMerge, VerticalAlignment,
};

use crate::error::{Error, Result};
use crate::opc::{rel_types, well_known, Package, Part, PartUri};
use crate::xml;
use log::warn;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::{Cursor, Read, Seek};
use std::path::Path;

/// A word-processing document: one package, one body, plus the per-document
/// resource allocators.
///
/// Everything is held in memory; `save`/`to_bytes` re-serialize the
/// structurally owned parts and pass every other part through unchanged, and
/// the document stays usable afterwards.
#[derive(Debug)]
pub struct Document {
    package: Package,
    body: Body,
    styles: Styles,
    settings: Option<Settings>,
    footnotes: Option<Notes>,
    endnotes: Option<Notes>,
    media: MediaAllocator,
    footnote_ids: NoteAllocator,
    endnote_ids: NoteAllocator,
}

impl Document {
    /// Create a new empty document with the built-in stylesheet, default
    /// settings, and an A4 section.
    pub fn new() -> Self {
        let mut package = Package::new();
        package
            .package_rels_mut()
            .add(rel_types::OFFICE_DOCUMENT, "word/document.xml");
        package.document_rels_mut().add(rel_types::STYLES, "styles.xml");
        package
            .document_rels_mut()
            .add(rel_types::SETTINGS, "settings.xml");

        let mut body = Body::default();
        body.set_section_properties(SectionProperties::default());

        Self {
            package,
            body,
            styles: Styles::built_in(),
            settings: Some(Settings::new()),
            footnotes: None,
            endnotes: None,
            media: MediaAllocator::new(),
            footnote_ids: NoteAllocator::new(),
            endnote_ids: NoteAllocator::new(),
        }
    }

    /// Open a document from a file path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_package(Package::open(path)?)
    }

    /// Open a document from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_package(Package::from_bytes(bytes)?)
    }

    /// Open a document from a reader
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        Self::from_package(Package::from_reader(reader)?)
    }

    /// Build the model from an opened package.
    ///
    /// The main document part is required; every other modeled part
    /// degrades to its default with a warning when absent or unparsable.
    fn from_package(mut package: Package) -> Result<Self> {
        let doc_uri = package.main_document_uri();
        let doc_part = package
            .main_document_part()
            .ok_or_else(|| Error::MissingPart(doc_uri.as_str().to_string()))?;

        let xml = doc_part
            .data_as_str()
            .map_err(|e| Error::from(e).in_part(doc_uri.as_str()))?;
        let body = parse_document_xml(xml).map_err(|e| e.in_part(doc_uri.as_str()))?;

        // Styles pass through as raw bytes; the relationship is rebuilt
        // unconditionally so a broken or missing edge heals on open.
        let styles = match package.part(&well_known::styles()) {
            Some(part) => Styles::from_bytes(part.data().to_vec()),
            None => Styles::built_in(),
        };
        package.document_rels_mut().remove_type(rel_types::STYLES);
        package.document_rels_mut().add(rel_types::STYLES, "styles.xml");

        let settings = read_optional_part(&package, &well_known::settings(), |xml| {
            Settings::from_xml(xml)
        });
        let footnotes = read_optional_part(&package, &well_known::footnotes(), |xml| {
            Notes::from_xml(NoteKind::Footnote, xml)
        });
        let endnotes = read_optional_part(&package, &well_known::endnotes(), |xml| {
            Notes::from_xml(NoteKind::Endnote, xml)
        });

        let media = MediaAllocator::from_package(&package);
        let footnote_ids = match &footnotes {
            Some(notes) => NoteAllocator::seeded_from(notes.ids()),
            None => NoteAllocator::new(),
        };
        let endnote_ids = match &endnotes {
            Some(notes) => NoteAllocator::seeded_from(notes.ids()),
            None => NoteAllocator::new(),
        };

        Ok(Self {
            package,
            body,
            styles,
            settings,
            footnotes,
            endnotes,
            media,
            footnote_ids,
            endnote_ids,
        })
    }

    /// Save the document to a file, creating parent directories as needed
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.sync_package()?;
        self.package.save(path)
    }

    /// Save the document to bytes
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.sync_package()?;
        self.package.to_bytes()
    }

    /// Re-serialize every structurally owned part into the package
    fn sync_package(&mut self) -> Result<()> {
        let xml = serialize_document_xml(&self.body)?;
        self.package.add_part(Part::new(
            well_known::document(),
            crate::opc::MAIN_DOCUMENT,
            xml.into_bytes(),
        ));
        if self
            .package
            .package_rels()
            .by_type(rel_types::OFFICE_DOCUMENT)
            .is_none()
        {
            self.package
                .package_rels_mut()
                .add(rel_types::OFFICE_DOCUMENT, "word/document.xml");
        }

        self.package.add_part(Part::new(
            well_known::styles(),
            crate::opc::STYLES,
            self.styles.as_bytes().to_vec(),
        ));
        self.ensure_document_rel(rel_types::STYLES, "styles.xml");

        if let Some(settings) = &self.settings {
            let data = settings.to_xml()?;
            self.package.add_part(Part::new(
                well_known::settings(),
                crate::opc::SETTINGS,
                data,
            ));
            self.ensure_document_rel(rel_types::SETTINGS, "settings.xml");
        }

        if let Some(notes) = &self.footnotes {
            let data = notes.to_xml()?;
            self.package.add_part(Part::new(
                well_known::footnotes(),
                crate::opc::FOOTNOTES,
                data,
            ));
            self.ensure_document_rel(rel_types::FOOTNOTES, "footnotes.xml");
        }

        if let Some(notes) = &self.endnotes {
            let data = notes.to_xml()?;
            self.package.add_part(Part::new(
                well_known::endnotes(),
                crate::opc::ENDNOTES,
                data,
            ));
            self.ensure_document_rel(rel_types::ENDNOTES, "endnotes.xml");
        }

        Ok(())
    }

    fn ensure_document_rel(&mut self, rel_type: &str, target: &str) {
        if self.package.document_rels().by_type(rel_type).is_none() {
            self.package.document_rels_mut().add(rel_type, target);
        }
    }

    // === Content ===

    /// Add a paragraph with text
    pub fn add_paragraph(&mut self, text: impl Into<String>) -> &mut Paragraph {
        self.body.add_paragraph(Paragraph::new(text))
    }

    /// Add an empty paragraph
    pub fn add_empty_paragraph(&mut self) -> &mut Paragraph {
        self.body.add_paragraph(Paragraph::default())
    }

    /// Add a table with the given dimensions
    pub fn add_table(&mut self, rows: usize, cols: usize) -> Result<&mut Table> {
        let table = Table::new(rows, cols)?;
        Ok(self.body.add_table(table))
    }

    /// Add an image as its own paragraph.
    ///
    /// The part name is always generated (`image<N>.<ext>`); `name` only
    /// becomes the drawing's alt text. Returns the relationship id of the
    /// media part.
    pub fn add_image(
        &mut self,
        bytes: Vec<u8>,
        ext: &str,
        name: &str,
        width_px: u32,
        height_px: u32,
    ) -> Result<String> {
        let file_name = self.media.allocate(ext);
        let uri = well_known::media(&file_name);

        if let Some(ext) = uri.extension() {
            let content_type = media_content_type(ext);
            self.package.content_types_mut().add_default(ext, content_type);
            self.package
                .add_binary_part(Part::new(uri.clone(), content_type, bytes));
        }

        let rel_id = self
            .package
            .document_rels_mut()
            .add(rel_types::IMAGE, &format!("media/{file_name}"));

        let mut drawing = Drawing::from_pixels(rel_id.clone(), width_px, height_px);
        drawing.description = Some(name.to_string());
        self.body
            .add_paragraph(Paragraph::default())
            .add_run(Run::new_drawing(drawing));

        Ok(rel_id)
    }

    /// Append a footnote reference to the paragraph at `paragraph_index`
    /// and the note body to the footnotes part. Returns the note id.
    pub fn add_footnote(
        &mut self,
        paragraph_index: usize,
        text: impl Into<String>,
    ) -> Result<i64> {
        let id = self.footnote_ids.next();
        self.push_reference_run(paragraph_index, RunContent::FootnoteReference(id))?;

        self.footnotes
            .get_or_insert_with(|| Notes::new(NoteKind::Footnote))
            .add(Note::new(id, text));
        Ok(id)
    }

    /// Append an endnote reference to the paragraph at `paragraph_index`
    /// and the note body to the endnotes part. Returns the note id.
    pub fn add_endnote(
        &mut self,
        paragraph_index: usize,
        text: impl Into<String>,
    ) -> Result<i64> {
        let id = self.endnote_ids.next();
        self.push_reference_run(paragraph_index, RunContent::EndnoteReference(id))?;

        self.endnotes
            .get_or_insert_with(|| Notes::new(NoteKind::Endnote))
            .add(Note::new(id, text));
        Ok(id)
    }

    fn push_reference_run(&mut self, paragraph_index: usize, content: RunContent) -> Result<()> {
        let len = self.paragraph_count();
        let para = self
            .body
            .paragraphs_mut()
            .nth(paragraph_index)
            .ok_or(Error::OutOfRange {
                what: "paragraph",
                index: paragraph_index,
                len,
            })?;
        para.add_run(Run {
            properties: None,
            content: Some(content),
        });
        Ok(())
    }

    // === Layout ===

    /// Set the page size on the meaningful section properties
    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.section_properties_or_default().page_size = page_size;
    }

    /// Set the page margins on the meaningful section properties
    pub fn set_page_margins(&mut self, margins: PageMargins) {
        self.section_properties_or_default().margins = margins;
    }

    fn section_properties_or_default(&mut self) -> &mut SectionProperties {
        if self.body.section_properties().is_none() {
            self.body.set_section_properties(SectionProperties::default());
        }
        match self.body.section_properties_mut() {
            Some(sect) => sect,
            None => unreachable!("section properties were just added"),
        }
    }

    // === Read access ===

    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.body.paragraphs()
    }

    pub fn paragraph_count(&self) -> usize {
        self.body.paragraphs().count()
    }

    pub fn paragraph(&self, index: usize) -> Option<&Paragraph> {
        self.body.paragraphs().nth(index)
    }

    pub fn paragraph_mut(&mut self, index: usize) -> Option<&mut Paragraph> {
        self.body.paragraphs_mut().nth(index)
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.body.tables()
    }

    pub fn table_count(&self) -> usize {
        self.body.tables().count()
    }

    pub fn table(&self, index: usize) -> Option<&Table> {
        self.body.tables().nth(index)
    }

    pub fn table_mut(&mut self, index: usize) -> Option<&mut Table> {
        self.body.tables_mut().nth(index)
    }

    /// All top-level paragraph text, newline-joined
    pub fn text(&self) -> String {
        self.body
            .paragraphs()
            .map(|p| p.text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    pub fn package(&self) -> &Package {
        &self.package
    }

    pub fn settings(&self) -> Option<&Settings> {
        self.settings.as_ref()
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        self.settings.get_or_insert_with(Settings::new)
    }

    pub fn footnotes(&self) -> Option<&Notes> {
        self.footnotes.as_ref()
    }

    pub fn endnotes(&self) -> Option<&Notes> {
        self.endnotes.as_ref()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode an optional modeled part. Absent parts and unparsable parts both
/// yield None, the latter with a warning; the raw bytes then pass through
/// save untouched.
fn read_optional_part<T>(
    package: &Package,
    uri: &PartUri,
    parse: impl FnOnce(&str) -> Result<T>,
) -> Option<T> {
    let part = package.part(uri)?;
    let xml = match part.data_as_str() {
        Ok(xml) => xml,
        Err(err) => {
            warn!("part {uri} is not valid UTF-8, passing through unmodeled: {err}");
            return None;
        }
    };
    match parse(xml) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("part {uri} failed to parse, passing through unmodeled: {err}");
            None
        }
    }
}

/// Parse document.xml content
fn parse_document_xml(xml: &str) -> Result<Body> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut body = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = e.name();
                let local = name.local_name();

                match local.as_ref() {
                    b"body" => body = Some(Body::from_reader(&mut reader)?),
                    b"document" => {}
                    _ => crate::xml::skip_element(&mut reader, &e)?,
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    body.ok_or_else(|| Error::InvalidDocument("missing w:body element".into()))
}

/// Serialize the body into document.xml content
fn serialize_document_xml(body: &Body) -> Result<String> {
    let mut buffer = Cursor::new(Vec::new());
    let mut writer = Writer::new(&mut buffer);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

    let mut doc_start = BytesStart::new("w:document");
    for (attr, value) in xml::document_namespaces() {
        doc_start.push_attribute((attr, value));
    }
    writer.write_event(Event::Start(doc_start))?;

    body.write_to(&mut writer)?;

    writer.write_event(Event::End(BytesEnd::new("w:document")))?;

    let xml_bytes = buffer.into_inner();
    String::from_utf8(xml_bytes).map_err(|e| Error::InvalidDocument(e.to_string()))
}
