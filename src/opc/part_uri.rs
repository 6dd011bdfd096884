//! Part URI handling for OPC packages

use crate::error::{Error, Result};
use std::fmt;

/// A URI to a part within an OPC package.
///
/// Part URIs are always absolute paths starting with '/'.
/// Example: `/word/document.xml`
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartUri {
    path: String,
}

impl PartUri {
    /// Create a new PartUri from a string.
    ///
    /// The path is normalized (leading '/' ensured, no trailing '/').
    pub fn new(path: &str) -> Result<Self> {
        let path = path.trim();

        if path.is_empty() {
            return Err(Error::InvalidPartUri("empty path".into()));
        }

        let normalized = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };
        let normalized = normalized.trim_end_matches('/').to_string();

        if normalized.contains("//") {
            return Err(Error::InvalidPartUri(format!(
                "invalid path '{}': contains double slashes",
                path
            )));
        }

        Ok(Self { path: normalized })
    }

    pub(crate) fn from_string_unchecked(path: String) -> Self {
        Self { path }
    }

    /// Get the path as a string slice
    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// Path inside the ZIP archive (no leading '/')
    pub fn zip_path(&self) -> &str {
        &self.path[1..]
    }

    /// Get the file name portion
    pub fn file_name(&self) -> Option<&str> {
        self.path.rsplit('/').next()
    }

    /// Get the file extension
    pub fn extension(&self) -> Option<&str> {
        self.file_name()
            .and_then(|name| name.rsplit('.').next())
            .filter(|ext| !ext.is_empty() && !ext.contains('/'))
    }

    /// Get the parent directory URI
    pub fn parent(&self) -> Option<PartUri> {
        let pos = self.path.rfind('/')?;
        if pos == 0 {
            None
        } else {
            Some(PartUri {
                path: self.path[..pos].to_string(),
            })
        }
    }

    /// The relationships URI for this part.
    ///
    /// For `/word/document.xml`, returns `/word/_rels/document.xml.rels`
    pub fn relationships_uri(&self) -> PartUri {
        let file_name = self.file_name().unwrap_or("");
        let parent = self.parent().map(|p| p.path).unwrap_or_default();
        PartUri {
            path: format!("{}/_rels/{}.rels", parent, file_name),
        }
    }

    /// Resolve a relative path against this URI.
    ///
    /// For `/word/document.xml` and `media/image1.png`, returns
    /// `/word/media/image1.png`
    pub fn resolve(&self, relative: &str) -> Result<PartUri> {
        if relative.starts_with('/') {
            return PartUri::new(relative);
        }

        let base_dir = self.parent().map(|p| p.path).unwrap_or_default();
        let mut parts: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();

        for segment in relative.split('/') {
            match segment {
                "" | "." => continue,
                ".." => {
                    parts.pop();
                }
                s => parts.push(s),
            }
        }

        PartUri::new(&format!("/{}", parts.join("/")))
    }

    /// Check if this URI points to a relationships file
    pub fn is_relationships(&self) -> bool {
        self.path.ends_with(".rels") && (self.path.contains("/_rels/") || self.path.starts_with("/_rels/"))
    }

    /// Check if this URI is a media part (`/word/media/...`)
    pub fn is_media(&self) -> bool {
        self.path.starts_with("/word/media/")
    }
}

impl fmt::Display for PartUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}

impl std::str::FromStr for PartUri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        PartUri::new(s)
    }
}

/// Well-known part URIs
pub mod well_known {
    use super::PartUri;

    pub fn content_types() -> PartUri {
        PartUri::from_string_unchecked("/[Content_Types].xml".into())
    }

    pub fn package_rels() -> PartUri {
        PartUri::from_string_unchecked("/_rels/.rels".into())
    }

    pub fn document() -> PartUri {
        PartUri::from_string_unchecked("/word/document.xml".into())
    }

    pub fn document_rels() -> PartUri {
        PartUri::from_string_unchecked("/word/_rels/document.xml.rels".into())
    }

    pub fn styles() -> PartUri {
        PartUri::from_string_unchecked("/word/styles.xml".into())
    }

    pub fn settings() -> PartUri {
        PartUri::from_string_unchecked("/word/settings.xml".into())
    }

    pub fn footnotes() -> PartUri {
        PartUri::from_string_unchecked("/word/footnotes.xml".into())
    }

    pub fn endnotes() -> PartUri {
        PartUri::from_string_unchecked("/word/endnotes.xml".into())
    }

    pub fn media(file_name: &str) -> PartUri {
        PartUri::from_string_unchecked(format!("/word/media/{}", file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes_leading_slash() {
        let uri = PartUri::new("word/document.xml").unwrap();
        assert_eq!(uri.as_str(), "/word/document.xml");
        assert_eq!(uri.zip_path(), "word/document.xml");
    }

    #[test]
    fn test_file_name_and_extension() {
        let uri = PartUri::new("/word/media/image3.png").unwrap();
        assert_eq!(uri.file_name(), Some("image3.png"));
        assert_eq!(uri.extension(), Some("png"));
        assert!(uri.is_media());
    }

    #[test]
    fn test_relationships_uri() {
        let uri = PartUri::new("/word/document.xml").unwrap();
        assert_eq!(
            uri.relationships_uri().as_str(),
            "/word/_rels/document.xml.rels"
        );
        assert!(uri.relationships_uri().is_relationships());
    }

    #[test]
    fn test_resolve_relative() {
        let uri = PartUri::new("/word/document.xml").unwrap();
        assert_eq!(
            uri.resolve("media/image1.png").unwrap().as_str(),
            "/word/media/image1.png"
        );
        assert_eq!(
            uri.resolve("../docProps/core.xml").unwrap().as_str(),
            "/docProps/core.xml"
        );
    }

    #[test]
    fn test_double_slash_rejected() {
        assert!(PartUri::new("/word//document.xml").is_err());
    }
}
