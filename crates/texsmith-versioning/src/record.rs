//! Immutable version snapshots.
//!
//! A [`VersionRecord`] captures the full serialized LaTeX text of a
//! document at a save point. Records never change once created; a revert
//! appends a new record rather than rewriting history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Classification of the change that produced a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Content was predominantly added.
    Insertion,
    /// Content was predominantly removed.
    Deletion,
    /// Content was rewritten in place (reverts classify here).
    Modification,
    /// An explicit manual save.
    Save,
}

impl std::fmt::Display for ChangeKind {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Insertion => "insertion",
            Self::Deletion => "deletion",
            Self::Modification => "modification",
            Self::Save => "save",
        };
        write!(f, "{s}")
    }
}

/// One immutable snapshot of a document's serialized text.
///
/// Fields are private to enforce immutability after creation; the
/// accessors are the only way in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    version: String,
    content: String,
    timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    author: Option<String>,
    change: ChangeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    note: Option<String>,
}

impl VersionRecord {
    /// Creates a snapshot stamped with the current time.
    #[must_use]
    pub fn new(
        version: String,
        content: String,
        author: Option<String>,
        change: ChangeKind,
        note: Option<String>,
    ) -> Self {
        Self {
            version,
            content,
            timestamp: Utc::now(),
            author,
            change,
            note,
        }
    }

    /// The sequential version label, e.g. `"1.0"`, `"1.1"`.
    ///
    /// Labels are purely sequential, not semantic.
    #[inline]
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The full serialized LaTeX text of the snapshot.
    #[inline]
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// When the snapshot was created.
    #[inline]
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Who saved, when known.
    #[inline]
    #[must_use]
    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    /// The change classification.
    #[inline]
    #[must_use]
    pub fn change(&self) -> ChangeKind {
        self.change
    }

    /// The free-text note, when present.
    #[inline]
    #[must_use]
    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }
}
