//! XML namespaces used in OOXML

/// WordprocessingML main namespace
pub const W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
/// Relationships namespace
pub const R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
/// WordprocessingDrawing namespace
pub const WP: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
/// DrawingML main namespace
pub const A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
/// Pictures namespace
pub const PIC: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";
/// Office Math namespace
pub const M: &str = "http://schemas.openxmlformats.org/officeDocument/2006/math";
/// Content Types namespace
pub const CT: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
/// Package Relationships namespace
pub const PR: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Namespace declarations emitted on the w:document root
pub fn document_namespaces() -> Vec<(&'static str, &'static str)> {
    vec![
        ("xmlns:w", W),
        ("xmlns:r", R),
        ("xmlns:wp", WP),
        ("xmlns:a", A),
        ("xmlns:pic", PIC),
        ("xmlns:m", M),
    ]
}

/// Namespace declarations for auxiliary WordprocessingML parts
/// (footnotes.xml, endnotes.xml, settings.xml)
pub fn part_namespaces() -> Vec<(&'static str, &'static str)> {
    vec![("xmlns:w", W), ("xmlns:r", R)]
}
