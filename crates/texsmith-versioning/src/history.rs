//! Per-document version history.
//!
//! Snapshots are created on save events when the new content differs
//! meaningfully from the latest stored snapshot — the threshold exists to
//! suppress snapshot spam from whitespace-only edits during auto-save.
//! History is capped; the oldest entries are evicted first.

use crate::record::{ChangeKind, VersionRecord};
use texsmith_core::{Result, TexsmithError};

/// Maximum retained snapshots per document; oldest evicted first.
pub const MAX_VERSIONS: usize = 50;

/// Minimum non-whitespace character delta for a meaningful change.
const MIN_CHAR_DELTA: usize = 5;

/// Minimum character delta as a fraction of the larger content.
const MIN_CHAR_DELTA_RATIO: f64 = 0.05;

/// Counts non-whitespace characters.
fn non_ws_len(text: &str) -> usize {
    text.chars().filter(|c| !c.is_whitespace()).count()
}

/// The meaningful-change test.
///
/// New content is worth snapshotting against the previous content when it
/// is non-empty, its trimmed form differs, and either the line count
/// moved by more than one or the non-whitespace character delta exceeds
/// both [`MIN_CHAR_DELTA`] and [`MIN_CHAR_DELTA_RATIO`] of the larger
/// content's non-whitespace length.
#[must_use]
pub fn is_meaningful_change(previous: &str, new: &str) -> bool {
    if new.trim().is_empty() {
        return false;
    }
    if previous.trim() == new.trim() {
        return false;
    }

    let line_delta = previous.lines().count().abs_diff(new.lines().count());
    if line_delta > 1 {
        return true;
    }

    let old_len = non_ws_len(previous);
    let new_len = non_ws_len(new);
    let char_delta = old_len.abs_diff(new_len);
    let larger = old_len.max(new_len);

    #[allow(clippy::cast_precision_loss)] // document sizes fit f64 exactly enough
    let ratio_floor = larger as f64 * MIN_CHAR_DELTA_RATIO;
    #[allow(clippy::cast_precision_loss)]
    let delta = char_delta as f64;

    char_delta > MIN_CHAR_DELTA && delta > ratio_floor
}

/// Computes the next sequential version label.
///
/// The first snapshot is `"1.0"`; each subsequent label increments the
/// latest numeric version by 0.1. Labels are not semantic.
#[must_use]
pub fn next_version_label(latest: Option<&str>) -> String {
    let Some(latest) = latest else {
        return "1.0".to_string();
    };
    #[allow(clippy::cast_possible_truncation)] // labels stay tiny
    let tenths = latest
        .trim()
        .parse::<f64>()
        .map_or(10, |v| (v * 10.0).round() as i64);
    let next = tenths + 1;
    format!("{}.{}", next / 10, next % 10)
}

/// Version history for a single document, newest first.
///
/// # Examples
///
/// ```rust
/// use texsmith_versioning::{ChangeKind, VersionHistory};
///
/// let mut history = VersionHistory::new();
/// history.record_save("\\section{One}\nfirst draft of the text\n", None, ChangeKind::Save, None);
/// assert_eq!(history.latest().unwrap().version(), "1.0");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionHistory {
    records: Vec<VersionRecord>,
}

impl VersionHistory {
    /// Creates an empty history.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All snapshots, newest first.
    #[inline]
    #[must_use]
    pub fn records(&self) -> &[VersionRecord] {
        &self.records
    }

    /// Number of retained snapshots.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` when no snapshot has been taken.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The most recent snapshot.
    #[inline]
    #[must_use]
    pub fn latest(&self) -> Option<&VersionRecord> {
        self.records.first()
    }

    /// Looks up a snapshot by version label.
    #[must_use]
    pub fn get(&self, version: &str) -> Option<&VersionRecord> {
        self.records.iter().find(|r| r.version() == version)
    }

    /// Records a save if the content change is meaningful.
    ///
    /// Returns the new snapshot, or `None` when the change was below the
    /// threshold and no snapshot was taken.
    pub fn record_save(
        &mut self,
        content: &str,
        author: Option<String>,
        change: ChangeKind,
        note: Option<String>,
    ) -> Option<&VersionRecord> {
        let meaningful = match self.latest() {
            Some(latest) => is_meaningful_change(latest.content(), content),
            None => !content.trim().is_empty(),
        };
        if !meaningful {
            log::debug!("save below meaningful-change threshold; no snapshot taken");
            return None;
        }
        Some(self.push(content.to_string(), author, change, note))
    }

    /// Reverts to a past version.
    ///
    /// Resolves the target's content and appends a new snapshot with a
    /// synthetic `"Reverted to version {v}"` note, classified as a
    /// modification. History is never rewritten; the revert bypasses the
    /// meaningful-change gate so it always lands.
    ///
    /// # Errors
    ///
    /// Returns [`TexsmithError::VersionError`] when the label is unknown.
    pub fn revert_to(&mut self, version: &str, author: Option<String>) -> Result<&VersionRecord> {
        let target = self
            .get(version)
            .ok_or_else(|| TexsmithError::VersionError(format!("version {version} not found")))?;
        let content = target.content().to_string();
        let note = format!("Reverted to version {version}");
        log::info!("reverting document to version {version}");
        Ok(self.push(content, author, ChangeKind::Modification, Some(note)))
    }

    fn push(
        &mut self,
        content: String,
        author: Option<String>,
        change: ChangeKind,
        note: Option<String>,
    ) -> &VersionRecord {
        let label = next_version_label(self.latest().map(VersionRecord::version));
        let record = VersionRecord::new(label, content, author, change, note);
        self.records.insert(0, record);
        if self.records.len() > MAX_VERSIONS {
            self.records.truncate(MAX_VERSIONS);
        }
        &self.records[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "\\section{Intro}\nSome opening text to start from.\n";

    fn seeded() -> VersionHistory {
        let mut history = VersionHistory::new();
        history.record_save(BASE, None, ChangeKind::Save, None);
        history
    }

    #[test]
    fn test_first_snapshot_is_one_point_zero() {
        let history = seeded();
        assert_eq!(history.latest().unwrap().version(), "1.0");
    }

    #[test]
    fn test_version_numbering_sequence() {
        let mut history = seeded();
        let v2 = format!("{BASE}A whole new paragraph with plenty of words.\n");
        let v3 = format!("{v2}And yet another line of substantial content.\n");
        history.record_save(&v2, None, ChangeKind::Insertion, None);
        history.record_save(&v3, None, ChangeKind::Insertion, None);

        let labels: Vec<&str> = history.records().iter().map(VersionRecord::version).collect();
        assert_eq!(labels, vec!["1.2", "1.1", "1.0"]);
    }

    #[test]
    fn test_numbering_rolls_over_tenths() {
        assert_eq!(next_version_label(None), "1.0");
        assert_eq!(next_version_label(Some("1.9")), "2.0");
        assert_eq!(next_version_label(Some("2.3")), "2.4");
    }

    #[test]
    fn test_whitespace_append_not_meaningful() {
        let mut history = seeded();
        let padded = format!("{BASE}   \n\n");
        assert!(history
            .record_save(&padded, None, ChangeKind::Save, None)
            .is_none());
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_inserted_line_is_meaningful() {
        let mut history = seeded();
        let grown = format!("{BASE}This inserted line carries real new content.\n");
        assert!(history
            .record_save(&grown, None, ChangeKind::Insertion, None)
            .is_some());
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_empty_content_never_snapshots() {
        let mut history = seeded();
        assert!(history
            .record_save("   \n", None, ChangeKind::Deletion, None)
            .is_none());
    }

    #[test]
    fn test_tiny_edit_below_threshold() {
        let mut history = seeded();
        // Same line count, three characters of drift: below both floors.
        let tweaked = BASE.replace("opening", "openin");
        assert!(history
            .record_save(&tweaked, None, ChangeKind::Modification, None)
            .is_none());
    }

    #[test]
    fn test_revert_is_non_destructive() {
        let mut history = seeded();
        let v2 = format!("{BASE}Second version adds this sentence of text.\n");
        let v3 = format!("{v2}Third version adds one more full sentence.\n");
        history.record_save(&v2, None, ChangeKind::Insertion, None);
        history.record_save(&v3, None, ChangeKind::Insertion, None);
        assert_eq!(history.len(), 3);

        let reverted = history.revert_to("1.0", None).unwrap();
        assert_eq!(reverted.version(), "1.3");
        assert_eq!(reverted.content(), BASE);
        assert_eq!(reverted.note(), Some("Reverted to version 1.0"));
        assert_eq!(reverted.change(), ChangeKind::Modification);

        // All prior versions remain, in place, newest first.
        assert_eq!(history.len(), 4);
        let labels: Vec<&str> = history.records().iter().map(VersionRecord::version).collect();
        assert_eq!(labels, vec!["1.3", "1.2", "1.1", "1.0"]);
        assert_eq!(history.get("1.2").unwrap().content(), v3);
    }

    #[test]
    fn test_revert_unknown_version_errors() {
        let mut history = seeded();
        let err = history.revert_to("9.9", None).unwrap_err();
        assert!(err.to_string().contains("9.9"));
    }

    #[test]
    fn test_history_capped_at_fifty() {
        let mut history = VersionHistory::new();
        for i in 0..60 {
            // Each iteration changes the line count by more than one so
            // every save passes the threshold.
            let content = format!("line one\n{}", "filler line\n".repeat(i * 2 + 1));
            history.record_save(&content, None, ChangeKind::Insertion, None);
        }
        assert_eq!(history.len(), MAX_VERSIONS);
        // Newest retained, oldest evicted.
        assert_eq!(history.latest().unwrap().version(), "6.9");
        assert!(history.get("1.0").is_none());
    }
}
