//! # texsmith-core
//!
//! Core document model and shared error types for the texsmith LaTeX
//! authoring engine.
//!
//! A document is a flat, ordered sequence of typed [`Block`] values with
//! three fixed metadata slots (title, author, date) at the front. Inline
//! content is a flat run of [`TextSpan`] values carrying independent style
//! flags; overlapping styles split into adjacent spans with the full
//! combined attribute set rather than nesting.
//!
//! The model is a projection: the serialized LaTeX text is the durable,
//! persisted form, and a [`Document`] is re-derived from it on demand by
//! the `texsmith-latex` parser. The model serializes to JSON via serde,
//! which is the wire format used by the persistence layer.
//!
//! ## Quick start
//!
//! ```rust
//! use texsmith_core::{Block, Document, TextSpan};
//!
//! let doc = Document::new(
//!     "Trip Report",
//!     "R. Hamilton",
//!     "May 1, 2024",
//!     vec![
//!         Block::heading(1, "Summary"),
//!         Block::paragraph(vec![
//!             TextSpan::plain("The trip was "),
//!             TextSpan::styled("excellent", true, false, false, false, None),
//!             TextSpan::plain("."),
//!         ]),
//!     ],
//! );
//!
//! assert_eq!(doc.title(), "Trip Report");
//! assert_eq!(doc.body().len(), 2);
//! ```

pub mod block;
pub mod document;
pub mod error;

pub use block::{
    merge_adjacent_spans, Block, ListItem, MetadataKind, TableCell, TableRow, TextSpan,
    MAX_HEADING_LEVEL,
};
pub use document::{
    default_date, Document, DEFAULT_AUTHOR, DEFAULT_TITLE, METADATA_BLOCKS,
};
pub use error::{Result, TexsmithError};
