//! Error types for wordpack

use thiserror::Error;

/// Main error type
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML encoding error: {0}")]
    XmlEncoding(#[from] quick_xml::encoding::EncodingError),

    #[error("XML attribute error: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// A required part is absent from the package.
    #[error("Missing required part: {0}")]
    MissingPart(String),

    #[error("Invalid part URI: {0}")]
    InvalidPartUri(String),

    #[error("Missing attribute '{attr}' on element '{element}'")]
    MissingAttribute { element: String, attr: String },

    /// Malformed or unbalanced XML in a modeled part.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// A decode failure wrapped with the name of the failing part.
    #[error("Failed to parse part '{part}': {source}")]
    Parse {
        part: String,
        #[source]
        source: Box<Error>,
    },

    /// Caller-supplied structural configuration is invalid (zero row or
    /// column count, mismatched widths, degenerate merge range).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An index that does not exist in the current structure.
    #[error("{what} index {index} out of range (len {len})")]
    OutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },
}

impl Error {
    /// Wrap a decode error with the part name it occurred in.
    pub(crate) fn in_part(self, part: &str) -> Self {
        match self {
            Error::Parse { .. } => self,
            other => Error::Parse {
                part: part.to_string(),
                source: Box::new(other),
            },
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_part_wraps_once() {
        let err = Error::InvalidDocument("unbalanced".into()).in_part("word/document.xml");
        let err = err.in_part("word/other.xml");
        match err {
            Error::Parse { part, source } => {
                assert_eq!(part, "word/document.xml");
                assert!(matches!(*source, Error::InvalidDocument(_)));
            }
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn test_out_of_range_display() {
        let err = Error::OutOfRange {
            what: "row",
            index: 5,
            len: 3,
        };
        assert_eq!(err.to_string(), "row index 5 out of range (len 3)");
    }
}
