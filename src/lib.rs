//! # wordpack
//!
//! A DOCX package codec with a mutable in-memory document model.
//!
//! The crate splits into an OPC substrate (`opc`: ZIP container, parts,
//! content types, relationships) and a document model (`document`: body,
//! paragraphs, runs, tables, notes, media). Parts the model does not own
//! pass through save byte-for-byte.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use wordpack::Document;
//!
//! // Open a document
//! let doc = Document::open("report.docx")?;
//! for para in doc.paragraphs() {
//!     println!("{}", para.text());
//! }
//!
//! // Create a new document with a table
//! let mut doc = Document::new();
//! doc.add_paragraph("Quarterly results");
//! let table = doc.add_table(2, 3)?;
//! table.set_cell_text(0, 0, "Region")?;
//! doc.save("out.docx")?;
//! ```

pub mod document;
pub mod error;
pub mod opc;
pub mod xml;

pub use document::{Document, Paragraph, Run, Table};
pub use error::{Error, Result};
pub use opc::{Package, Part, PartUri};
