//! Error types for document editing and conversion operations.
//!
//! This module defines the error types shared across the texsmith crates
//! and provides a convenience [`Result`] alias.

use thiserror::Error;

/// Error types that can occur across the texsmith editing engine.
///
/// The LaTeX parser and serializer are total by design and never surface
/// errors through this type: malformed input degrades to plain-text blocks
/// and every model value has a defined LaTeX mapping. The variants here
/// cover the fallible edges of the system: I/O, persistence, remote
/// compilation, HTML import, versioning, and editing-session rules.
///
/// # Examples
///
/// ```rust
/// use texsmith_core::{Result, TexsmithError};
///
/// fn load(path: &str) -> Result<String> {
///     Ok(std::fs::read_to_string(path)?)
/// }
///
/// match load("missing.tex") {
///     Err(TexsmithError::IoError(e)) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
///     other => panic!("expected IoError, got {other:?}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum TexsmithError {
    /// File I/O error.
    ///
    /// Reading a source document or writing a converted artifact failed.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    ///
    /// The document model and version records travel as JSON; this covers
    /// failures on that wire format.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// HTML import error.
    ///
    /// The visual-editor DOM importer could not produce a document from
    /// the given markup.
    #[error("HTML import error: {0}")]
    ImportError(String),

    /// Version history error.
    ///
    /// A requested version label does not exist or a history operation
    /// was rejected.
    #[error("Version error: {0}")]
    VersionError(String),

    /// Editing-session rule violation.
    ///
    /// An edit was refused, for example a block-type toggle on a
    /// protected heading.
    #[error("Session error: {0}")]
    SessionError(String),

    /// Remote PDF compilation failure.
    ///
    /// The compilation service returned an error log or was unreachable.
    #[error("Compile error: {0}")]
    CompileError(String),

    /// Persistence API failure.
    ///
    /// A save/update/delete call against the document store failed.
    #[error("Persistence error: {0}")]
    PersistenceError(String),
}

/// Type alias for [`Result<T, TexsmithError>`].
pub type Result<T> = std::result::Result<T, TexsmithError>;
