//! Per-document resource allocation: media part names and note ids.
//!
//! Both allocators are plain fields of the owning Document. They are seeded
//! from the decoded package on open so that generated names and ids never
//! collide with existing ones, and they only count upward; removal does not
//! free a name for reuse.

use crate::opc::{Package, PartUri};

/// Allocates `image<N>.<ext>` part names under /word/media/.
///
/// The caller-supplied image name is never used as a part path; it only
/// survives as alt-text on the drawing. Generated names are ASCII-safe by
/// construction.
#[derive(Clone, Debug)]
pub struct MediaAllocator {
    next_index: u32,
}

impl MediaAllocator {
    /// A fresh allocator for a new document
    pub fn new() -> Self {
        MediaAllocator { next_index: 0 }
    }

    /// Seed from an opened package: scan /word/media/ for `image<N>.<ext>`
    /// names and start at `max(N) + 1`, or 0 when no media exists.
    pub fn from_package(package: &Package) -> Self {
        let next_index = package
            .part_uris()
            .filter(|uri| uri.is_media())
            .filter_map(|uri| parse_image_index(uri))
            .max()
            .map(|n| n + 1)
            .unwrap_or(0);
        MediaAllocator { next_index }
    }

    /// Allocate the next media file name for the given extension.
    ///
    /// The extension is normalized to lowercase ASCII alphanumerics;
    /// anything unusable falls back to `bin`.
    pub fn allocate(&mut self, ext: &str) -> String {
        let ext = normalize_extension(ext);
        let name = format!("image{}.{ext}", self.next_index);
        self.next_index += 1;
        name
    }

    /// The index the next allocation will use
    pub fn next_index(&self) -> u32 {
        self.next_index
    }
}

impl Default for MediaAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Allocates footnote/endnote ids for one document.
///
/// Ids 0 and 1 are reserved for the separator and continuation-separator
/// entries, so user notes start at 2.
#[derive(Clone, Debug)]
pub struct NoteAllocator {
    next_id: i64,
}

impl NoteAllocator {
    pub const FIRST_USER_ID: i64 = 2;

    /// A fresh allocator for a new document
    pub fn new() -> Self {
        NoteAllocator {
            next_id: Self::FIRST_USER_ID,
        }
    }

    /// Seed from the ids already present in decoded notes
    pub fn seeded_from(existing_ids: impl IntoIterator<Item = i64>) -> Self {
        let max_id = existing_ids
            .into_iter()
            .max()
            .unwrap_or(Self::FIRST_USER_ID - 1);
        NoteAllocator {
            next_id: max_id.max(Self::FIRST_USER_ID - 1) + 1,
        }
    }

    /// Take the next free note id
    pub fn next(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl Default for NoteAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// MIME content type for a media extension
pub fn media_content_type(ext: &str) -> &'static str {
    match normalize_extension(ext).as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        "wmf" => "image/x-wmf",
        "emf" => "image/x-emf",
        _ => "application/octet-stream",
    }
}

fn normalize_extension(ext: &str) -> String {
    let cleaned: String = ext
        .trim_start_matches('.')
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if cleaned.is_empty() {
        "bin".to_string()
    } else {
        cleaned
    }
}

/// Extract N from a /word/media/image<N>.<ext> part name
fn parse_image_index(uri: &PartUri) -> Option<u32> {
    let file = uri.as_str().rsplit('/').next()?;
    let stem = file.split('.').next()?;
    stem.strip_prefix("image")?.parse().ok()
}
