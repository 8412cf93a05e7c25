//! # texsmith-versioning
//!
//! Snapshot history and line diffing for texsmith documents.
//!
//! The layer operates purely on serialized LaTeX text, independent of the
//! structured document model: a [`VersionHistory`] stores immutable
//! [`VersionRecord`] snapshots (newest first, capped at
//! [`MAX_VERSIONS`]), gates auto-save churn through the
//! meaningful-change threshold, and supports non-destructive reverts.
//! [`diff_lines`] compares two snapshots positionally.
//!
//! ## Quick start
//!
//! ```rust
//! use texsmith_versioning::{ChangeKind, VersionHistory};
//!
//! let mut history = VersionHistory::new();
//! history.record_save("first draft with enough text\n", None, ChangeKind::Save, None);
//! history.record_save(
//!     "first draft with enough text\nand a substantial second line\n",
//!     None,
//!     ChangeKind::Insertion,
//!     None,
//! );
//!
//! assert_eq!(history.latest().unwrap().version(), "1.1");
//! let back = history.revert_to("1.0", None).unwrap();
//! assert_eq!(back.note(), Some("Reverted to version 1.0"));
//! ```

pub mod diff;
pub mod history;
pub mod record;

pub use diff::{diff_lines, DiffEntry, DiffKind};
pub use history::{is_meaningful_change, next_version_label, VersionHistory, MAX_VERSIONS};
pub use record::{ChangeKind, VersionRecord};
