//! Open Packaging Convention (OPC) substrate
//!
//! The ZIP-based container: part store, content-type registry, and the two
//! relationship graphs (package-level and document-level).

mod content_types;
mod package;
mod part;
mod part_uri;
mod relationships;

pub use content_types::{
    ContentTypes, ENDNOTES, FOOTNOTES, MAIN_DOCUMENT, RELATIONSHIPS, SETTINGS, STYLES, XML,
};
pub use package::Package;
pub use part::Part;
pub use part_uri::{well_known, PartUri};
pub use relationships::{rel_types, Relationship, Relationships, TargetMode};
