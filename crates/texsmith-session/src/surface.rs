//! The editing-surface adapter: block-level editing rules over the
//! document model, template protection, and the external-update echo
//! guard.
//!
//! The surface owns the session's [`Document`] exclusively; it is never
//! shared across two concurrent surfaces. All indices here are
//! body-relative — the metadata slots are not addressable through the
//! surface at all.

use texsmith_core::{Block, Document, ListItem, Result, TexsmithError};

/// Target kind for a block-type toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToggleKind {
    /// Plain paragraph.
    Paragraph,
    /// Heading at the given level (clamped to 1–5).
    Heading(u8),
    /// Unordered list.
    BulletList,
    /// Ordered list.
    NumberedList,
}

/// What the surface did with a user interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceOutcome {
    /// The interaction was applied.
    Accepted,
    /// A protected heading intercepted the click; the cursor was
    /// redirected and a transient warning should be shown.
    ProtectedRedirect {
        /// Body index the cursor landed on.
        to: usize,
    },
    /// The cursor left a list; the given body index holds the paragraph
    /// that now has focus.
    ListExited {
        /// Body index of the focus paragraph.
        paragraph: usize,
    },
    /// Nothing to do.
    Ignored,
}

/// Cursor position: a body block, and the item within it for lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    /// Body-relative block index.
    pub block: usize,
    /// Item index when the block is a list.
    pub item: Option<usize>,
}

/// Block-level editing surface over a [`Document`].
///
/// When the document derives from a protected template, heading blocks
/// are read-only: clicks on them are intercepted and block-type toggles
/// involving them are refused.
#[derive(Debug)]
pub struct EditingSurface {
    doc: Document,
    protected: bool,
    cursor: Cursor,
    suppress_next_change: bool,
}

impl EditingSurface {
    /// Creates a surface over a document.
    ///
    /// `protected` flags the document as derived from a protected
    /// template, making its headings read-only.
    #[must_use]
    pub fn new(doc: Document, protected: bool) -> Self {
        Self {
            doc,
            protected,
            cursor: Cursor::default(),
            suppress_next_change: false,
        }
    }

    /// The document under edit.
    #[inline]
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Mutable access for block edits; use the surface operations where
    /// a rule applies.
    #[inline]
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    /// Whether template protection is active.
    #[inline]
    #[must_use]
    pub fn is_protected(&self) -> bool {
        self.protected
    }

    /// Current cursor position.
    #[inline]
    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    fn block_is_protected(&self, index: usize) -> bool {
        self.protected
            && self
                .doc
                .body_block(index)
                .is_some_and(Block::is_heading)
    }

    /// Handles a click on a body block.
    ///
    /// Clicking a protected heading is intercepted: the cursor is
    /// redirected to the nearest following non-protected block (one is
    /// appended when none exists) and the caller shows a transient
    /// warning.
    pub fn click(&mut self, index: usize) -> SurfaceOutcome {
        if index >= self.doc.body_len() {
            return SurfaceOutcome::Ignored;
        }
        if self.block_is_protected(index) {
            let to = self.nearest_unprotected_after(index);
            log::debug!("click on protected heading {index} redirected to block {to}");
            self.cursor = Cursor {
                block: to,
                item: None,
            };
            return SurfaceOutcome::ProtectedRedirect { to };
        }
        self.cursor = Cursor {
            block: index,
            item: self.doc.body_block(index).and_then(|b| match b {
                Block::BulletList { .. } | Block::NumberedList { .. } => Some(0),
                _ => None,
            }),
        };
        SurfaceOutcome::Accepted
    }

    fn nearest_unprotected_after(&mut self, index: usize) -> usize {
        let len = self.doc.body_len();
        for i in index + 1..len {
            if !self.block_is_protected(i) {
                return i;
            }
        }
        // Nothing editable after the heading; give the cursor a fresh
        // paragraph to land on.
        self.doc.push_body_block(Block::paragraph(Vec::new()));
        self.doc.body_len() - 1
    }

    /// Toggles the type of a body block.
    ///
    /// # Errors
    ///
    /// Returns [`TexsmithError::SessionError`] when the source block is a
    /// protected heading, when the target kind is a heading under
    /// protection, or when the index is out of range.
    pub fn toggle_block_kind(&mut self, index: usize, target: ToggleKind) -> Result<()> {
        if self.block_is_protected(index) {
            return Err(TexsmithError::SessionError(format!(
                "block {index} is a protected heading"
            )));
        }
        if self.protected && matches!(target, ToggleKind::Heading(_)) {
            return Err(TexsmithError::SessionError(
                "cannot create headings in a protected document".to_string(),
            ));
        }
        let block = self
            .doc
            .body_block(index)
            .ok_or_else(|| TexsmithError::SessionError(format!("no block at index {index}")))?
            .clone();

        let converted = convert_block(block, target);
        self.doc.replace_body_block(index, converted);
        Ok(())
    }

    /// Handles Enter within the cursor block.
    ///
    /// Inside a list: Enter on a non-empty item opens a new item below
    /// it; Enter on an empty item — the second Enter of a "double Enter"
    /// — exits the list and converts the empty item into a paragraph
    /// after it.
    pub fn press_enter(&mut self) -> SurfaceOutcome {
        enum EnterAction {
            ExitEmptyItem(usize),
            NewItem(usize),
            NewParagraph,
        }

        let Cursor { block, item } = self.cursor;
        let action = match self.doc.body_block(block) {
            Some(Block::BulletList { items } | Block::NumberedList { items }) => {
                let idx = item.unwrap_or(0).min(items.len().saturating_sub(1));
                if items.get(idx).is_some_and(ListItem::is_empty) {
                    EnterAction::ExitEmptyItem(idx)
                } else {
                    EnterAction::NewItem(idx)
                }
            }
            Some(_) => EnterAction::NewParagraph,
            None => return SurfaceOutcome::Ignored,
        };

        match action {
            EnterAction::ExitEmptyItem(idx) => {
                // Double Enter on an empty item: drop the item and leave
                // the list, landing on a paragraph.
                let list_now_empty = match self.doc.body_block_mut(block) {
                    Some(Block::BulletList { items } | Block::NumberedList { items }) => {
                        items.remove(idx);
                        items.is_empty()
                    }
                    _ => false,
                };
                let paragraph = if list_now_empty {
                    self.doc
                        .replace_body_block(block, Block::paragraph(Vec::new()));
                    block
                } else {
                    self.doc
                        .insert_body_block(block + 1, Block::paragraph(Vec::new()));
                    block + 1
                };
                self.cursor = Cursor {
                    block: paragraph,
                    item: None,
                };
                SurfaceOutcome::ListExited { paragraph }
            }
            EnterAction::NewItem(idx) => {
                if let Some(Block::BulletList { items } | Block::NumberedList { items }) =
                    self.doc.body_block_mut(block)
                {
                    items.insert(idx + 1, ListItem::new(Vec::new()));
                }
                self.cursor.item = Some(idx + 1);
                SurfaceOutcome::Accepted
            }
            EnterAction::NewParagraph => {
                let paragraph = block + 1;
                self.doc
                    .insert_body_block(paragraph, Block::paragraph(Vec::new()));
                self.cursor = Cursor {
                    block: paragraph,
                    item: None,
                };
                SurfaceOutcome::Accepted
            }
        }
    }

    /// Handles Escape: inside a list the cursor unconditionally exits to
    /// a paragraph after it.
    pub fn press_escape(&mut self) -> SurfaceOutcome {
        let Cursor { block, .. } = self.cursor;
        if !self.doc.body_block(block).is_some_and(Block::is_list) {
            return SurfaceOutcome::Ignored;
        }
        let paragraph = block + 1;
        self.doc
            .insert_body_block(paragraph, Block::paragraph(Vec::new()));
        self.cursor = Cursor {
            block: paragraph,
            item: None,
        };
        SurfaceOutcome::ListExited { paragraph }
    }

    /// Replaces the document from outside the surface (revert, reload).
    ///
    /// The surface's own echo of this update must not look like a user
    /// edit: the next change notification is suppressed, exactly once.
    pub fn apply_external(&mut self, doc: Document) {
        self.doc = doc;
        self.cursor = Cursor::default();
        self.suppress_next_change = true;
    }

    /// Reports a content-change event from the surface widget.
    ///
    /// Returns `true` when the event counts as a user edit (and should
    /// feed change callbacks, auto-save, and version tracking), `false`
    /// for the one echo following [`apply_external`].
    ///
    /// [`apply_external`]: Self::apply_external
    pub fn notify_content_changed(&mut self) -> bool {
        if self.suppress_next_change {
            self.suppress_next_change = false;
            return false;
        }
        true
    }
}

/// Converts a block to the target kind, carrying content across.
fn convert_block(block: Block, target: ToggleKind) -> Block {
    let spans = match &block {
        Block::Paragraph { spans } => spans.clone(),
        Block::BulletList { items } | Block::NumberedList { items } => items
            .iter()
            .flat_map(|i| i.spans.clone())
            .collect(),
        other => vec![texsmith_core::TextSpan::plain(other.plain_text())],
    };

    match target {
        ToggleKind::Paragraph => Block::paragraph(spans),
        ToggleKind::Heading(level) => Block::heading(
            level,
            spans.iter().map(|s| s.text.as_str()).collect::<String>(),
        ),
        ToggleKind::BulletList => Block::BulletList {
            items: vec![ListItem::new(spans)],
        },
        ToggleKind::NumberedList => Block::NumberedList {
            items: vec![ListItem::new(spans)],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use texsmith_core::TextSpan;

    fn doc_with(blocks: Vec<Block>) -> Document {
        Document::new("T", "A", "D", blocks)
    }

    #[test]
    fn test_click_plain_block_moves_cursor() {
        let mut surface = EditingSurface::new(
            doc_with(vec![Block::text("one"), Block::text("two")]),
            false,
        );
        assert_eq!(surface.click(1), SurfaceOutcome::Accepted);
        assert_eq!(surface.cursor().block, 1);
    }

    #[test]
    fn test_click_protected_heading_redirects() {
        let mut surface = EditingSurface::new(
            doc_with(vec![Block::heading(1, "Locked"), Block::text("editable")]),
            true,
        );
        let outcome = surface.click(0);
        assert_eq!(outcome, SurfaceOutcome::ProtectedRedirect { to: 1 });
        assert_eq!(surface.cursor().block, 1);
    }

    #[test]
    fn test_protected_heading_at_end_appends_paragraph() {
        let mut surface =
            EditingSurface::new(doc_with(vec![Block::heading(1, "Only")]), true);
        let outcome = surface.click(0);
        assert_eq!(outcome, SurfaceOutcome::ProtectedRedirect { to: 1 });
        assert_eq!(surface.document().body_len(), 2);
    }

    #[test]
    fn test_unprotected_heading_clickable() {
        let mut surface =
            EditingSurface::new(doc_with(vec![Block::heading(1, "Open")]), false);
        assert_eq!(surface.click(0), SurfaceOutcome::Accepted);
    }

    #[test]
    fn test_toggle_refused_on_protected_heading() {
        let mut surface = EditingSurface::new(
            doc_with(vec![Block::heading(1, "Locked")]),
            true,
        );
        let err = surface
            .toggle_block_kind(0, ToggleKind::Paragraph)
            .unwrap_err();
        assert!(matches!(err, TexsmithError::SessionError(_)));
    }

    #[test]
    fn test_toggle_to_heading_refused_when_protected() {
        let mut surface =
            EditingSurface::new(doc_with(vec![Block::text("body")]), true);
        assert!(surface
            .toggle_block_kind(0, ToggleKind::Heading(2))
            .is_err());
        // Non-heading toggles stay allowed.
        assert!(surface
            .toggle_block_kind(0, ToggleKind::BulletList)
            .is_ok());
    }

    #[test]
    fn test_toggle_paragraph_to_heading() {
        let mut surface = EditingSurface::new(
            doc_with(vec![Block::paragraph(vec![
                TextSpan::plain("plain "),
                TextSpan::styled("bold", true, false, false, false, None),
            ])]),
            false,
        );
        surface.toggle_block_kind(0, ToggleKind::Heading(2)).unwrap();
        match &surface.document().body()[0] {
            Block::Heading { level, text } => {
                assert_eq!(*level, 2);
                assert_eq!(text, "plain bold");
            }
            other => panic!("expected heading, got {other:?}"),
        }
    }

    #[test]
    fn test_enter_on_filled_item_adds_item() {
        let mut surface = EditingSurface::new(
            doc_with(vec![Block::BulletList {
                items: vec![ListItem::plain("A")],
            }]),
            false,
        );
        surface.click(0);
        assert_eq!(surface.press_enter(), SurfaceOutcome::Accepted);
        match &surface.document().body()[0] {
            Block::BulletList { items } => assert_eq!(items.len(), 2),
            other => panic!("expected list, got {other:?}"),
        }
        assert_eq!(surface.cursor().item, Some(1));
    }

    #[test]
    fn test_double_enter_on_empty_item_exits_list() {
        let mut surface = EditingSurface::new(
            doc_with(vec![Block::BulletList {
                items: vec![ListItem::plain("A")],
            }]),
            false,
        );
        surface.click(0);
        surface.press_enter(); // opens an empty second item
        let outcome = surface.press_enter(); // empty item: exit
        assert_eq!(outcome, SurfaceOutcome::ListExited { paragraph: 1 });
        let body = surface.document().body();
        match &body[0] {
            Block::BulletList { items } => assert_eq!(items.len(), 1),
            other => panic!("expected list, got {other:?}"),
        }
        assert!(matches!(body[1], Block::Paragraph { .. }));
    }

    #[test]
    fn test_escape_exits_list_unconditionally() {
        let mut surface = EditingSurface::new(
            doc_with(vec![Block::BulletList {
                items: vec![ListItem::plain("A"), ListItem::plain("B")],
            }]),
            false,
        );
        surface.click(0);
        let outcome = surface.press_escape();
        assert_eq!(outcome, SurfaceOutcome::ListExited { paragraph: 1 });
        // The list keeps all its items.
        match &surface.document().body()[0] {
            Block::BulletList { items } => assert_eq!(items.len(), 2),
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn test_escape_outside_list_ignored() {
        let mut surface =
            EditingSurface::new(doc_with(vec![Block::text("p")]), false);
        surface.click(0);
        assert_eq!(surface.press_escape(), SurfaceOutcome::Ignored);
    }

    #[test]
    fn test_external_update_suppresses_one_notification() {
        let mut surface =
            EditingSurface::new(doc_with(vec![Block::text("v1")]), false);

        surface.apply_external(doc_with(vec![Block::text("v2")]));
        // The surface's own echo of the external update: suppressed.
        assert!(!surface.notify_content_changed());
        // The next real user edit notifies again.
        assert!(surface.notify_content_changed());
    }
}
