//! Line-level comparison between two snapshots.
//!
//! The diff is strictly positional: line N of the old text is compared to
//! line N of the new text, with no LCS alignment. A line inserted near
//! the top therefore reports every subsequent line as modified. This
//! over-reporting on shifted content is a known, accepted limitation of
//! the layer, kept for predictability — not a defect to silently fix.

use serde::{Deserialize, Serialize};

/// What happened to one line position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffKind {
    /// Only the new side has content at this position.
    Added,
    /// Only the old side has content at this position.
    Removed,
    /// Both sides have content and it differs.
    Modified,
}

impl std::fmt::Display for DiffKind {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Modified => "modified",
        };
        write!(f, "{s}")
    }
}

/// One differing line position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffEntry {
    /// 1-based line number.
    pub line: usize,
    /// The change at this position.
    pub kind: DiffKind,
    /// The old side's line ("" when absent).
    pub old: String,
    /// The new side's line ("" when absent).
    pub new: String,
}

/// Index-aligned line diff between two texts.
///
/// For each line position: if only the old side is empty the line is
/// added, if only the new side is empty it is removed, otherwise a
/// difference is a modification. Identical positions produce no entry.
///
/// # Examples
///
/// ```rust
/// use texsmith_versioning::{diff_lines, DiffKind};
///
/// let entries = diff_lines("a\nb", "a\nB\nc");
/// assert_eq!(entries.len(), 2);
/// assert_eq!(entries[0].kind, DiffKind::Modified);
/// assert_eq!(entries[1].kind, DiffKind::Added);
/// ```
#[must_use]
pub fn diff_lines(old: &str, new: &str) -> Vec<DiffEntry> {
    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();
    let mut entries = Vec::new();

    for i in 0..old_lines.len().max(new_lines.len()) {
        let old_line = old_lines.get(i).copied().unwrap_or("");
        let new_line = new_lines.get(i).copied().unwrap_or("");

        let kind = if old_line == new_line {
            continue;
        } else if old_line.is_empty() {
            DiffKind::Added
        } else if new_line.is_empty() {
            DiffKind::Removed
        } else {
            DiffKind::Modified
        };

        entries.push(DiffEntry {
            line: i + 1,
            kind,
            old: old_line.to_string(),
            new: new_line.to_string(),
        });
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_texts_diff_empty() {
        assert!(diff_lines("a\nb\nc", "a\nb\nc").is_empty());
    }

    #[test]
    fn test_modified_line() {
        let entries = diff_lines("hello\nworld", "hello\nthere");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].line, 2);
        assert_eq!(entries[0].kind, DiffKind::Modified);
        assert_eq!(entries[0].old, "world");
        assert_eq!(entries[0].new, "there");
    }

    #[test]
    fn test_appended_lines_are_added() {
        let entries = diff_lines("a", "a\nb\nc");
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.kind == DiffKind::Added));
        assert_eq!(entries[0].line, 2);
        assert_eq!(entries[1].line, 3);
    }

    #[test]
    fn test_truncated_lines_are_removed() {
        let entries = diff_lines("a\nb\nc", "a");
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.kind == DiffKind::Removed));
    }

    #[test]
    fn test_shifted_lines_over_report() {
        // Positional alignment: one insertion at the top cascades into
        // modifications below it. Accepted behavior.
        let entries = diff_lines("a\nb", "x\na\nb");
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].kind, DiffKind::Modified);
        assert_eq!(entries[1].kind, DiffKind::Modified);
        assert_eq!(entries[2].kind, DiffKind::Added);
    }

    #[test]
    fn test_blank_old_line_counts_as_added() {
        let entries = diff_lines("a\n\nc", "a\nb\nc");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, DiffKind::Added);
        assert_eq!(entries[0].line, 2);
    }
}
