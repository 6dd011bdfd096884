//! Integration test: building, saving and reopening documents

use pretty_assertions::assert_eq;
use wordpack::document::{PageMargins, PageSize, RunContent};
use wordpack::opc::{rel_types, well_known, Part, PartUri};
use wordpack::{Document, Package};

fn reopen(doc: &mut Document) -> Document {
    let bytes = doc.to_bytes().expect("serialize");
    Document::from_bytes(&bytes).expect("reopen")
}

#[test]
fn test_new_document_roundtrip() {
    let mut doc = Document::new();
    doc.add_paragraph("Hello, World!");
    doc.add_paragraph("Second paragraph")
        .set_style("Heading1");
    doc.add_empty_paragraph();

    let doc2 = reopen(&mut doc);
    assert_eq!(doc2.paragraph_count(), 3);
    assert_eq!(doc2.paragraph(0).unwrap().text(), "Hello, World!");
    assert_eq!(doc2.paragraph(1).unwrap().style(), Some("Heading1"));
    assert!(doc2.paragraph(1).unwrap().is_heading());
    assert_eq!(doc2.paragraph(2).unwrap().text(), "");
    assert_eq!(doc2.text(), "Hello, World!\nSecond paragraph\n");
}

#[test]
fn test_new_document_carries_styles_and_settings_parts() {
    let mut doc = Document::new();
    doc.add_paragraph("x");
    let doc2 = reopen(&mut doc);

    let pkg = doc2.package();
    assert!(pkg.has_part(&well_known::styles()));
    assert!(pkg.has_part(&well_known::settings()));
    assert!(pkg.document_rels().by_type(rel_types::STYLES).is_some());
    assert!(pkg.document_rels().by_type(rel_types::SETTINGS).is_some());
    assert!(pkg
        .package_rels()
        .by_type(rel_types::OFFICE_DOCUMENT)
        .is_some());
}

#[test]
fn test_page_setup_survives_roundtrip() {
    let mut doc = Document::new();
    doc.add_paragraph("layout");
    doc.set_page_size(PageSize::LETTER);
    doc.set_page_margins(PageMargins {
        top: 720,
        ..Default::default()
    });

    let doc2 = reopen(&mut doc);
    let sect = doc2.body().section_properties().expect("section properties");
    assert_eq!(sect.page_size, PageSize::LETTER);
    assert_eq!(sect.margins.top, 720);
    assert_eq!(sect.margins.left, 1440);
}

#[test]
fn test_run_formatting_roundtrip() {
    let mut doc = Document::new();
    {
        let para = doc.add_paragraph("");
        para.add_run(wordpack::Run::new("styled"))
            .set_bold(true)
            .set_italic(true)
            .set_font_size_pt(14.0)
            .set_color("FF0000");
    }

    let doc2 = reopen(&mut doc);
    let para = doc2.paragraph(0).unwrap();
    let run = para.runs().find(|r| r.text() == "styled").unwrap();
    assert!(run.bold());
    assert!(run.italic());
    assert_eq!(run.font_size_pt(), Some(14.0));
    assert_eq!(run.color(), Some("FF0000"));
}

#[test]
fn test_unmodeled_parts_pass_through() {
    let mut doc = Document::new();
    doc.add_paragraph("body");
    let bytes = doc.to_bytes().unwrap();

    // Inject a vendor part the model knows nothing about.
    let mut pkg = Package::from_bytes(&bytes).unwrap();
    let uri = PartUri::new("/customXml/item1.xml").unwrap();
    let payload = b"<vendor answer=\"42\"/>".to_vec();
    pkg.add_part(Part::new(uri.clone(), "application/xml", payload.clone()));
    let bytes = pkg.to_bytes().unwrap();

    let mut doc2 = Document::from_bytes(&bytes).unwrap();
    doc2.add_paragraph("appended");
    let bytes2 = doc2.to_bytes().unwrap();

    let pkg2 = Package::from_bytes(&bytes2).unwrap();
    assert_eq!(pkg2.part(&uri).unwrap().data(), payload.as_slice());
}

#[test]
fn test_opened_styles_pass_through_bytes() {
    let mut doc = Document::new();
    doc.add_paragraph("x");
    let bytes = doc.to_bytes().unwrap();

    let mut pkg = Package::from_bytes(&bytes).unwrap();
    let custom_styles = b"<w:styles><!-- corporate theme --></w:styles>".to_vec();
    pkg.add_part(Part::new(
        well_known::styles(),
        wordpack::opc::STYLES,
        custom_styles.clone(),
    ));
    let bytes = pkg.to_bytes().unwrap();

    let mut doc2 = Document::from_bytes(&bytes).unwrap();
    let bytes2 = doc2.to_bytes().unwrap();
    let pkg2 = Package::from_bytes(&bytes2).unwrap();
    assert_eq!(
        pkg2.part(&well_known::styles()).unwrap().data(),
        custom_styles.as_slice()
    );
    // The styles relationship exists exactly once after the rebuild.
    assert_eq!(
        pkg2.document_rels().all_by_type(rel_types::STYLES).len(),
        1
    );
}

#[test]
fn test_save_is_not_destructive() {
    let mut doc = Document::new();
    doc.add_paragraph("first");
    let _ = doc.to_bytes().unwrap();

    // The document stays usable after serialization.
    doc.add_paragraph("second");
    let doc2 = reopen(&mut doc);
    assert_eq!(doc2.paragraph_count(), 2);
}

#[test]
fn test_save_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/deeper/out.docx");

    let mut doc = Document::new();
    doc.add_paragraph("to disk");
    doc.save(&path).unwrap();

    let doc2 = Document::open(&path).unwrap();
    assert_eq!(doc2.text(), "to disk");
}

#[test]
fn test_degraded_open_without_optional_parts() {
    let _ = env_logger::builder().is_test(true).try_init();

    // A minimal archive with only the main document part.
    let xml = br#"<?xml version="1.0"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body><w:p><w:r><w:t>bare</w:t></w:r></w:p></w:body>
</w:document>"#;

    let mut buf = Vec::new();
    {
        use std::io::Write;
        let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("word/document.xml", options).unwrap();
        zip.write_all(xml).unwrap();
        zip.finish().unwrap();
    }

    let mut doc = Document::from_bytes(&buf).unwrap();
    assert_eq!(doc.text(), "bare");
    assert!(doc.footnotes().is_none());

    // Saving heals the missing registry parts.
    let doc2 = reopen(&mut doc);
    assert!(doc2.package().has_part(&well_known::styles()));
}

#[test]
fn test_open_without_main_document_fails() {
    let mut buf = Vec::new();
    {
        use std::io::Write;
        let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("word/styles.xml", options).unwrap();
        zip.write_all(b"<w:styles/>").unwrap();
        zip.finish().unwrap();
    }

    assert!(matches!(
        Document::from_bytes(&buf),
        Err(wordpack::Error::MissingPart(_))
    ));
}

#[test]
fn test_footnotes_and_endnotes_roundtrip() {
    let mut doc = Document::new();
    doc.add_paragraph("cited claim");
    doc.add_paragraph("another claim");

    let first = doc.add_footnote(0, "source one").unwrap();
    let second = doc.add_footnote(1, "source two").unwrap();
    let endnote = doc.add_endnote(1, "closing remark").unwrap();
    assert_eq!((first, second), (2, 3));
    assert_eq!(endnote, 2); // endnote ids are an independent sequence

    let doc2 = reopen(&mut doc);
    let footnotes = doc2.footnotes().expect("footnotes part");
    assert_eq!(footnotes.user_notes().count(), 2);
    assert_eq!(footnotes.get(3).unwrap().text(), "source two");
    assert_eq!(doc2.endnotes().unwrap().get(2).unwrap().text(), "closing remark");

    // References sit in the right paragraphs.
    let has_ref = doc2.paragraph(0).unwrap().runs().any(|r| {
        matches!(r.content, Some(RunContent::FootnoteReference(2)))
    });
    assert!(has_ref);

    // New ids continue after the decoded maximum.
    let mut doc3 = reopen(&mut doc);
    doc3.add_paragraph("later");
    let next = doc3.add_footnote(2, "source three").unwrap();
    assert_eq!(next, 4);
}

#[test]
fn test_note_parts_registered_once() {
    let mut doc = Document::new();
    doc.add_paragraph("p");
    doc.add_footnote(0, "a").unwrap();
    doc.add_footnote(0, "b").unwrap();

    let doc2 = reopen(&mut doc);
    let rels = doc2.package().document_rels();
    assert_eq!(rels.all_by_type(rel_types::FOOTNOTES).len(), 1);
    assert!(doc2.package().has_part(&well_known::footnotes()));
}

#[test]
fn test_relationship_ids_stable_across_reopen() {
    let mut doc = Document::new();
    doc.add_paragraph("p");
    let rel_id = doc
        .add_image(vec![0x89, 0x50, 0x4E, 0x47], "png", "chart", 100, 50)
        .unwrap();

    let mut doc2 = reopen(&mut doc);
    // The decoded relationship still resolves.
    assert!(doc2.package().document_rels().get(&rel_id).is_some());

    // A fresh edge gets an id that does not collide with any decoded one.
    let second = doc2
        .add_image(vec![1, 2, 3], "png", "chart2", 10, 10)
        .unwrap();
    assert_ne!(rel_id, second);
    assert!(doc2.package().document_rels().get(&second).is_some());
}
