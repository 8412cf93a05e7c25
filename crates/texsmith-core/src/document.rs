//! The structured document: an ordered block sequence with fixed metadata
//! slots at the front.
//!
//! The serialized LaTeX text is the durable, persisted form of a document;
//! a [`Document`] value is a disposable, re-derivable projection of it,
//! owned exclusively by the editing session that constructed it.

use crate::block::{Block, MetadataKind};
use serde::{Deserialize, Serialize};

/// Title used when the source declares none.
pub const DEFAULT_TITLE: &str = "LaTeX Document";

/// Author used when the source declares none.
pub const DEFAULT_AUTHOR: &str = "Author";

/// The current local date, formatted the way `\today` renders it.
#[must_use]
pub fn default_date() -> String {
    chrono::Local::now().format("%B %d, %Y").to_string()
}

/// A structured document: three metadata blocks followed by at least one
/// content block.
///
/// Invariants, maintained by every constructor and mutator:
/// - positions 0–2 hold the title, author, and date metadata blocks, in
///   that order, and are never reordered;
/// - at least one content block follows the metadata.
///
/// The block list is private so the invariants cannot be broken from
/// outside; body mutation goes through the body-indexed methods.
///
/// # Examples
///
/// ```rust
/// use texsmith_core::{Block, Document};
///
/// let doc = Document::new("Notes", "Ada", "May 1, 2024", vec![Block::text("Hello")]);
/// assert_eq!(doc.title(), "Notes");
/// assert_eq!(doc.body().len(), 1);
/// assert_eq!(doc.blocks().len(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    blocks: Vec<Block>,
}

/// Number of fixed metadata blocks at the front of every document.
pub const METADATA_BLOCKS: usize = 3;

impl Document {
    /// Creates a document from metadata values and body blocks.
    ///
    /// An empty body is replaced by a single empty paragraph so the
    /// at-least-one-content-block invariant holds.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        date: impl Into<String>,
        body: Vec<Block>,
    ) -> Self {
        let mut blocks = Vec::with_capacity(METADATA_BLOCKS + body.len().max(1));
        blocks.push(Block::Metadata {
            meta: MetadataKind::Title,
            value: title.into(),
        });
        blocks.push(Block::Metadata {
            meta: MetadataKind::Author,
            value: author.into(),
        });
        blocks.push(Block::Metadata {
            meta: MetadataKind::Date,
            value: date.into(),
        });
        if body.is_empty() {
            blocks.push(Block::paragraph(Vec::new()));
        } else {
            blocks.extend(body);
        }
        Self { blocks }
    }

    /// Creates an empty document with default metadata.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(DEFAULT_TITLE, DEFAULT_AUTHOR, default_date(), Vec::new())
    }

    /// Rebuilds a document from an arbitrary block sequence, repairing the
    /// metadata invariant.
    ///
    /// Metadata blocks found anywhere in the input fill their slots (first
    /// occurrence wins); missing slots fall back to the defaults. All
    /// non-metadata blocks keep their relative order.
    #[must_use]
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        let mut title: Option<String> = None;
        let mut author: Option<String> = None;
        let mut date: Option<String> = None;
        let mut body = Vec::with_capacity(blocks.len());

        for block in blocks {
            match block {
                Block::Metadata { meta, value } => {
                    let slot = match meta {
                        MetadataKind::Title => &mut title,
                        MetadataKind::Author => &mut author,
                        MetadataKind::Date => &mut date,
                    };
                    if slot.is_none() {
                        *slot = Some(value);
                    } else {
                        log::trace!("duplicate {meta} metadata block dropped");
                    }
                }
                other => body.push(other),
            }
        }

        Self::new(
            title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            author.unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
            date.unwrap_or_else(default_date),
            body,
        )
    }

    /// All blocks, metadata first.
    #[inline]
    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// The content blocks after the metadata slots.
    #[inline]
    #[must_use]
    pub fn body(&self) -> &[Block] {
        &self.blocks[METADATA_BLOCKS..]
    }

    fn metadata_value(&self, kind: MetadataKind) -> &str {
        // Positions 0-2 are fixed by construction.
        let idx = match kind {
            MetadataKind::Title => 0,
            MetadataKind::Author => 1,
            MetadataKind::Date => 2,
        };
        match &self.blocks[idx] {
            Block::Metadata { value, .. } => value,
            _ => unreachable!("metadata invariant violated"),
        }
    }

    fn set_metadata_value(&mut self, kind: MetadataKind, value: String) {
        let idx = match kind {
            MetadataKind::Title => 0,
            MetadataKind::Author => 1,
            MetadataKind::Date => 2,
        };
        self.blocks[idx] = Block::Metadata { meta: kind, value };
    }

    /// Document title.
    #[inline]
    #[must_use]
    pub fn title(&self) -> &str {
        self.metadata_value(MetadataKind::Title)
    }

    /// Document author.
    #[inline]
    #[must_use]
    pub fn author(&self) -> &str {
        self.metadata_value(MetadataKind::Author)
    }

    /// Document date.
    #[inline]
    #[must_use]
    pub fn date(&self) -> &str {
        self.metadata_value(MetadataKind::Date)
    }

    /// Replaces the title.
    pub fn set_title(&mut self, value: impl Into<String>) {
        self.set_metadata_value(MetadataKind::Title, value.into());
    }

    /// Replaces the author.
    pub fn set_author(&mut self, value: impl Into<String>) {
        self.set_metadata_value(MetadataKind::Author, value.into());
    }

    /// Replaces the date.
    pub fn set_date(&mut self, value: impl Into<String>) {
        self.set_metadata_value(MetadataKind::Date, value.into());
    }

    /// Number of content blocks.
    #[inline]
    #[must_use]
    pub fn body_len(&self) -> usize {
        self.blocks.len() - METADATA_BLOCKS
    }

    /// Borrows a content block by body index.
    #[must_use]
    pub fn body_block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(METADATA_BLOCKS + index)
    }

    /// Mutably borrows a content block by body index.
    pub fn body_block_mut(&mut self, index: usize) -> Option<&mut Block> {
        self.blocks.get_mut(METADATA_BLOCKS + index)
    }

    /// Inserts a content block at the given body index (clamped to the
    /// body range). Metadata blocks are refused and dropped.
    pub fn insert_body_block(&mut self, index: usize, block: Block) {
        if block.is_metadata() {
            log::warn!("refusing to insert a metadata block into the body");
            return;
        }
        let index = index.min(self.body_len());
        self.blocks.insert(METADATA_BLOCKS + index, block);
    }

    /// Appends a content block.
    pub fn push_body_block(&mut self, block: Block) {
        let end = self.body_len();
        self.insert_body_block(end, block);
    }

    /// Removes the content block at the given body index, returning it.
    ///
    /// Removing the last remaining content block leaves an empty
    /// paragraph in its place so the invariant holds.
    pub fn remove_body_block(&mut self, index: usize) -> Option<Block> {
        if index >= self.body_len() {
            return None;
        }
        let removed = self.blocks.remove(METADATA_BLOCKS + index);
        if self.body_len() == 0 {
            self.blocks.push(Block::paragraph(Vec::new()));
        }
        Some(removed)
    }

    /// Replaces the content block at the given body index, returning the
    /// previous block. Metadata replacements are refused.
    pub fn replace_body_block(&mut self, index: usize, block: Block) -> Option<Block> {
        if block.is_metadata() || index >= self.body_len() {
            return None;
        }
        Some(std::mem::replace(
            &mut self.blocks[METADATA_BLOCKS + index],
            block,
        ))
    }

    /// Total character count of the plain-text projection.
    #[must_use]
    pub fn char_count(&self) -> usize {
        self.blocks.iter().map(|b| b.plain_text().len()).sum()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}
