//! Integration test: image insertion and media name allocation

use pretty_assertions::assert_eq;
use wordpack::document::RunContent;
use wordpack::opc::{rel_types, PartUri};
use wordpack::Document;

const PNG_STUB: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

fn reopen(doc: &mut Document) -> Document {
    let bytes = doc.to_bytes().expect("serialize");
    Document::from_bytes(&bytes).expect("reopen")
}

fn media_names(doc: &Document) -> Vec<String> {
    doc.package()
        .part_uris()
        .filter(|uri| uri.is_media())
        .filter_map(|uri| uri.file_name().map(str::to_string))
        .collect()
}

#[test]
fn test_add_image_generates_part_and_relationship() {
    let mut doc = Document::new();
    let rel_id = doc
        .add_image(PNG_STUB.to_vec(), "png", "sales chart", 640, 480)
        .unwrap();

    let doc2 = reopen(&mut doc);
    assert_eq!(media_names(&doc2), vec!["image0.png"]);

    let rel = doc2.package().document_rels().get(&rel_id).unwrap();
    assert_eq!(rel.rel_type, rel_types::IMAGE);
    assert_eq!(rel.target, "media/image0.png");

    let part = doc2
        .package()
        .part(&PartUri::new("/word/media/image0.png").unwrap())
        .unwrap();
    assert_eq!(part.data(), PNG_STUB);
}

#[test]
fn test_image_indices_monotonic_across_reopen() {
    let mut doc = Document::new();
    doc.add_image(PNG_STUB.to_vec(), "png", "first", 10, 10).unwrap();
    doc.add_image(PNG_STUB.to_vec(), "jpg", "second", 10, 10).unwrap();

    let mut doc2 = reopen(&mut doc);
    doc2.add_image(PNG_STUB.to_vec(), "png", "third", 10, 10).unwrap();

    let mut names = media_names(&doc2);
    names.sort();
    assert_eq!(names, vec!["image0.png", "image1.jpg", "image2.png"]);
}

#[test]
fn test_caller_name_never_becomes_part_path() {
    let mut doc = Document::new();
    doc.add_image(PNG_STUB.to_vec(), "png", "拡大図 (最終版).png", 20, 20)
        .unwrap();

    let doc2 = reopen(&mut doc);
    let names = media_names(&doc2);
    assert_eq!(names, vec!["image0.png"]);
    assert!(names[0].is_ascii());

    // The caller's name survives only as alt text on the drawing.
    let drawing = doc2
        .paragraphs()
        .flat_map(|p| p.runs())
        .find_map(|r| match &r.content {
            Some(RunContent::Drawing(d)) => Some(d.clone()),
            _ => None,
        })
        .expect("drawing run");
    assert_eq!(drawing.description.as_deref(), Some("拡大図 (最終版).png"));
}

#[test]
fn test_drawing_extents_roundtrip() {
    let mut doc = Document::new();
    doc.add_image(PNG_STUB.to_vec(), "png", "sized", 200, 100).unwrap();

    let doc2 = reopen(&mut doc);
    let drawing = doc2
        .paragraphs()
        .flat_map(|p| p.runs())
        .find_map(|r| match &r.content {
            Some(RunContent::Drawing(d)) => Some(d.clone()),
            _ => None,
        })
        .expect("drawing run");

    // 9525 EMU per pixel.
    assert_eq!(drawing.width_emu, 200 * 9525);
    assert_eq!(drawing.height_emu, 100 * 9525);
}

#[test]
fn test_image_content_type_defaults_registered() {
    let mut doc = Document::new();
    doc.add_image(PNG_STUB.to_vec(), "png", "a", 1, 1).unwrap();
    doc.add_image(PNG_STUB.to_vec(), "jpeg", "b", 1, 1).unwrap();

    let doc2 = reopen(&mut doc);
    let png_uri = PartUri::new("/word/media/image0.png").unwrap();
    let jpg_uri = PartUri::new("/word/media/image1.jpeg").unwrap();
    assert_eq!(doc2.package().content_types().get(&png_uri), Some("image/png"));
    assert_eq!(doc2.package().content_types().get(&jpg_uri), Some("image/jpeg"));
}
