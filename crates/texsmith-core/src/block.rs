//! Block and inline-run types for the structured document representation.
//!
//! A document is an ordered sequence of [`Block`] values. Blocks own their
//! children exclusively; no block is shared between two parents. Inline
//! content is a flat list of [`TextSpan`] runs: overlapping styles are
//! represented by splitting text into adjacent spans, each carrying the
//! full combined attribute set, never by nesting spans.

use serde::{Deserialize, Serialize};

/// The three required metadata slots of every document.
///
/// Metadata blocks occupy positions 0–2 of a document, in this order, and
/// are never reordered by editing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataKind {
    /// Document title (`\title{...}`).
    Title,
    /// Author line (`\author{...}`).
    Author,
    /// Date line (`\date{...}`).
    Date,
}

impl std::fmt::Display for MetadataKind {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Title => "title",
            Self::Author => "author",
            Self::Date => "date",
        };
        write!(f, "{s}")
    }
}

/// A contiguous run of text sharing one combined set of style attributes.
///
/// Style attributes are independent flags on the span, not nested markup.
/// Two adjacent spans with identical attributes are equivalent to one span
/// with their concatenated text.
///
/// # Examples
///
/// ```rust
/// use texsmith_core::TextSpan;
///
/// let plain = TextSpan::plain("hello");
/// assert!(!plain.has_styling());
///
/// let strong = TextSpan::styled("hi", true, true, false, false, None);
/// assert!(strong.bold && strong.italic);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSpan {
    /// The plain text content of the run.
    pub text: String,

    /// Bold (`\textbf`).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bold: bool,

    /// Italic (`\textit` / `\emph`).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub italic: bool,

    /// Underline (`\underline`).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub underline: bool,

    /// Monospace code (`\texttt`).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub code: bool,

    /// Font-family override: `"rm"`, `"sf"`, `"tt"` for the standard
    /// switches, any other value for a `\fontfamily{...}` name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
}

impl TextSpan {
    /// Creates an unstyled span.
    #[inline]
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Creates a span with the given combined attribute set.
    #[must_use]
    pub fn styled(
        text: impl Into<String>,
        bold: bool,
        italic: bool,
        underline: bool,
        code: bool,
        font: Option<String>,
    ) -> Self {
        Self {
            text: text.into(),
            bold,
            italic,
            underline,
            code,
            font,
        }
    }

    /// Returns `true` if any style attribute is set.
    #[inline]
    #[must_use]
    pub fn has_styling(&self) -> bool {
        self.bold || self.italic || self.underline || self.code || self.font.is_some()
    }

    /// Returns `true` if `other` carries the identical attribute set
    /// (text content is not compared).
    #[inline]
    #[must_use]
    pub fn same_styling(&self, other: &Self) -> bool {
        self.bold == other.bold
            && self.italic == other.italic
            && self.underline == other.underline
            && self.code == other.code
            && self.font == other.font
    }
}

/// One element of a bullet or numbered list.
///
/// List items hold inline runs, the same shape as paragraph content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    /// Inline runs of the item.
    pub spans: Vec<TextSpan>,
}

impl ListItem {
    /// Creates a list item from inline runs.
    #[inline]
    #[must_use]
    pub fn new(spans: Vec<TextSpan>) -> Self {
        Self { spans }
    }

    /// Creates a list item holding a single unstyled run.
    #[inline]
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            spans: vec![TextSpan::plain(text)],
        }
    }

    /// Concatenated plain text of all runs.
    #[must_use]
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    /// Returns `true` if the item has no non-whitespace content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spans.iter().all(|s| s.text.trim().is_empty())
    }
}

/// A single table cell holding inline runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCell {
    /// Inline runs of the cell.
    pub spans: Vec<TextSpan>,
}

impl TableCell {
    /// Creates a cell from inline runs.
    #[inline]
    #[must_use]
    pub fn new(spans: Vec<TextSpan>) -> Self {
        Self { spans }
    }

    /// Creates a cell holding a single unstyled run.
    #[inline]
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            spans: vec![TextSpan::plain(text)],
        }
    }

    /// Concatenated plain text of all runs.
    #[must_use]
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// An ordered sequence of cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    /// The cells of the row, left to right.
    pub cells: Vec<TableCell>,
}

impl TableRow {
    /// Creates a row from cells.
    #[inline]
    #[must_use]
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self { cells }
    }
}

/// Deepest heading level representable in the model.
///
/// Levels map 1→`\section`, 2→`\subsection`, 3→`\subsubsection`,
/// 4→`\paragraph`, 5→`\subparagraph`.
pub const MAX_HEADING_LEVEL: u8 = 5;

/// A top-level structural unit of a document.
///
/// The variants form a closed set: every variant has exactly one LaTeX
/// serialization, which is what makes the serializer total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    /// One of the three required metadata slots.
    Metadata {
        /// Which slot this block fills.
        meta: MetadataKind,
        /// The slot's text value.
        value: String,
    },
    /// A run of body text.
    Paragraph {
        /// Inline runs of the paragraph.
        spans: Vec<TextSpan>,
    },
    /// A sectioning heading, levels 1–5.
    Heading {
        /// 1→`\section` … 5→`\subparagraph`.
        level: u8,
        /// Plain heading text.
        text: String,
    },
    /// An unordered (`itemize`) list.
    BulletList {
        /// The list elements, in order.
        items: Vec<ListItem>,
    },
    /// An ordered (`enumerate`) list.
    NumberedList {
        /// The list elements, in order.
        items: Vec<ListItem>,
    },
    /// A `tabular` table.
    Table {
        /// Rows, top to bottom.
        rows: Vec<TableRow>,
        /// Declared column count; equals the maximum cell count across
        /// rows, enforced at construction.
        cols: usize,
        /// The author's original column-spec string (e.g. `"|c|r|"`),
        /// reused verbatim on re-serialization when present.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        col_spec: Option<String>,
    },
    /// An `\includegraphics` image, optionally captioned.
    Image {
        /// Image location (URL or path).
        url: String,
        /// Optional `\caption` text.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    /// A display equation; the formula is stored raw.
    Equation {
        /// Raw formula source, without delimiters.
        formula: String,
    },
}

impl Block {
    /// Creates a paragraph from inline runs.
    #[inline]
    #[must_use]
    pub fn paragraph(spans: Vec<TextSpan>) -> Self {
        Self::Paragraph { spans }
    }

    /// Creates a paragraph holding a single unstyled run.
    #[inline]
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Paragraph {
            spans: vec![TextSpan::plain(text)],
        }
    }

    /// Creates a heading, clamping the level into `1..=MAX_HEADING_LEVEL`.
    #[must_use]
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Self::Heading {
            level: level.clamp(1, MAX_HEADING_LEVEL),
            text: text.into(),
        }
    }

    /// Creates a table, deriving `cols` from the widest row.
    ///
    /// The `cols == max cell count` invariant is enforced here, at
    /// construction, not continuously.
    #[must_use]
    pub fn table(rows: Vec<TableRow>, col_spec: Option<String>) -> Self {
        let cols = rows.iter().map(|r| r.cells.len()).max().unwrap_or(0);
        Self::Table {
            rows,
            cols,
            col_spec,
        }
    }

    /// Returns `true` for the three metadata variants.
    #[inline]
    #[must_use]
    pub fn is_metadata(&self) -> bool {
        matches!(self, Self::Metadata { .. })
    }

    /// Returns `true` for heading blocks.
    #[inline]
    #[must_use]
    pub fn is_heading(&self) -> bool {
        matches!(self, Self::Heading { .. })
    }

    /// Returns `true` for either list variant.
    #[inline]
    #[must_use]
    pub fn is_list(&self) -> bool {
        matches!(self, Self::BulletList { .. } | Self::NumberedList { .. })
    }

    /// A short lowercase label for the block kind, used in logs and the
    /// CLI block census.
    #[must_use]
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::Metadata { .. } => "metadata",
            Self::Paragraph { .. } => "paragraph",
            Self::Heading { .. } => "heading",
            Self::BulletList { .. } => "bullet_list",
            Self::NumberedList { .. } => "numbered_list",
            Self::Table { .. } => "table",
            Self::Image { .. } => "image",
            Self::Equation { .. } => "equation",
        }
    }

    /// Concatenated plain text of the block, ignoring styling.
    #[must_use]
    pub fn plain_text(&self) -> String {
        fn join(spans: &[TextSpan]) -> String {
            spans.iter().map(|s| s.text.as_str()).collect()
        }
        match self {
            Self::Metadata { value, .. } => value.clone(),
            Self::Paragraph { spans } => join(spans),
            Self::Heading { text, .. } => text.clone(),
            Self::BulletList { items } | Self::NumberedList { items } => items
                .iter()
                .map(ListItem::text)
                .collect::<Vec<_>>()
                .join("\n"),
            Self::Table { rows, .. } => rows
                .iter()
                .map(|r| {
                    r.cells
                        .iter()
                        .map(TableCell::text)
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .collect::<Vec<_>>()
                .join("\n"),
            Self::Image { url, .. } => url.clone(),
            Self::Equation { formula } => formula.clone(),
        }
    }
}

/// Merges adjacent spans that carry the identical attribute set.
///
/// Parsing and editing can both leave runs fragmented (`bold "a"` followed
/// by `bold "b"`); merging keeps the flat-span invariant canonical so that
/// serialization output is stable.
#[must_use]
pub fn merge_adjacent_spans(spans: Vec<TextSpan>) -> Vec<TextSpan> {
    let mut merged: Vec<TextSpan> = Vec::with_capacity(spans.len());
    for span in spans {
        if span.text.is_empty() {
            continue;
        }
        match merged.last_mut() {
            Some(last) if last.same_styling(&span) => last.text.push_str(&span.text),
            _ => merged.push(span),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_span_has_no_styling() {
        let span = TextSpan::plain("hello");
        assert!(!span.has_styling());
        assert_eq!(span.text, "hello");
    }

    #[test]
    fn test_styled_span_combined_attributes() {
        let span = TextSpan::styled("x", true, false, true, false, Some("sf".to_string()));
        assert!(span.bold);
        assert!(span.underline);
        assert!(!span.italic);
        assert_eq!(span.font.as_deref(), Some("sf"));
        assert!(span.has_styling());
    }

    #[test]
    fn test_heading_level_clamped() {
        match Block::heading(9, "Deep") {
            Block::Heading { level, .. } => assert_eq!(level, MAX_HEADING_LEVEL),
            other => panic!("expected heading, got {other:?}"),
        }
        match Block::heading(0, "Shallow") {
            Block::Heading { level, .. } => assert_eq!(level, 1),
            other => panic!("expected heading, got {other:?}"),
        }
    }

    #[test]
    fn test_table_cols_equals_widest_row() {
        let rows = vec![
            TableRow::new(vec![TableCell::plain("a")]),
            TableRow::new(vec![
                TableCell::plain("b"),
                TableCell::plain("c"),
                TableCell::plain("d"),
            ]),
        ];
        match Block::table(rows, None) {
            Block::Table { cols, .. } => assert_eq!(cols, 3),
            other => panic!("expected table, got {other:?}"),
        }
    }

    #[test]
    fn test_merge_adjacent_spans_same_styling() {
        let spans = vec![
            TextSpan::styled("a", true, false, false, false, None),
            TextSpan::styled("b", true, false, false, false, None),
            TextSpan::plain("c"),
        ];
        let merged = merge_adjacent_spans(spans);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].text, "ab");
        assert!(merged[0].bold);
        assert_eq!(merged[1].text, "c");
    }

    #[test]
    fn test_merge_drops_empty_spans() {
        let spans = vec![TextSpan::plain(""), TextSpan::plain("x")];
        let merged = merge_adjacent_spans(spans);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].text, "x");
    }

    #[test]
    fn test_block_serde_round_trip() {
        let block = Block::table(
            vec![TableRow::new(vec![
                TableCell::plain("h1"),
                TableCell::plain("h2"),
            ])],
            Some("|c|r|".to_string()),
        );
        let json = serde_json::to_string(&block).unwrap();
        assert!(json.contains("\"kind\":\"table\""));
        assert!(json.contains("|c|r|"));
        let back: Block = serde_json::from_str(&json).unwrap();
        assert_eq!(back, block);
    }

    #[test]
    fn test_span_serde_skips_default_flags() {
        let json = serde_json::to_string(&TextSpan::plain("t")).unwrap();
        assert_eq!(json, "{\"text\":\"t\"}");
    }

    #[test]
    fn test_list_item_is_empty() {
        assert!(ListItem::plain("   ").is_empty());
        assert!(!ListItem::plain("x").is_empty());
    }
}
