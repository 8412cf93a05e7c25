//! Per-document editing session.
//!
//! One session owns one document: its model projection, its version
//! history, its last-saved cursor, and its debounce timers. No mutable
//! state crosses documents; switching the open document tears the
//! session's pending work down first.

use crate::debounce::{Debouncer, AUTO_COMPILE_QUIET, AUTO_SAVE_QUIET};
use crate::surface::EditingSurface;
use texsmith_core::Result;
use texsmith_latex::{LatexParser, LatexSerializer};
use texsmith_versioning::{ChangeKind, VersionHistory, VersionRecord};

/// An open document under edit.
///
/// The serialized LaTeX text is the durable form; the session's model is
/// re-derived from it on open and on every external replacement.
///
/// # Examples
///
/// ```rust
/// use texsmith_session::DocumentSession;
///
/// let mut session = DocumentSession::open("doc-1", "\\section{Hi}\nSome text here.\n", false);
/// assert_eq!(session.surface().document().body().len(), 2);
/// let latex = session.source();
/// assert!(latex.contains("\\section{Hi}"));
/// ```
#[derive(Debug)]
pub struct DocumentSession {
    doc_id: String,
    surface: EditingSurface,
    history: VersionHistory,
    last_saved: Option<String>,
    auto_save: Debouncer,
    auto_compile: Debouncer,
}

impl DocumentSession {
    /// Opens a session over raw LaTeX source.
    #[must_use]
    pub fn open(doc_id: impl Into<String>, source: &str, protected: bool) -> Self {
        let doc = LatexParser::new().parse(source);
        Self {
            doc_id: doc_id.into(),
            surface: EditingSurface::new(doc, protected),
            history: VersionHistory::new(),
            last_saved: None,
            auto_save: Debouncer::new(AUTO_SAVE_QUIET),
            auto_compile: Debouncer::new(AUTO_COMPILE_QUIET),
        }
    }

    /// The document identifier.
    #[inline]
    #[must_use]
    pub fn doc_id(&self) -> &str {
        &self.doc_id
    }

    /// The editing surface.
    #[inline]
    #[must_use]
    pub fn surface(&self) -> &EditingSurface {
        &self.surface
    }

    /// Mutable editing surface.
    #[inline]
    pub fn surface_mut(&mut self) -> &mut EditingSurface {
        &mut self.surface
    }

    /// The version history.
    #[inline]
    #[must_use]
    pub fn history(&self) -> &VersionHistory {
        &self.history
    }

    /// Serializes the current model to LaTeX.
    #[must_use]
    pub fn source(&self) -> String {
        LatexSerializer::new().serialize(self.surface.document())
    }

    /// Content last confirmed written, if any.
    #[inline]
    #[must_use]
    pub fn last_saved(&self) -> Option<&str> {
        self.last_saved.as_deref()
    }

    /// Reports a content change from the surface and, when it is a real
    /// user edit, (re)arms the debounced auto-save and auto-recompile.
    ///
    /// Returns `true` for user edits, `false` for the suppressed echo of
    /// an external update (which must not re-enter auto-save).
    pub fn content_changed<S, C, SF, CF>(&mut self, save_action: S, compile_action: C) -> bool
    where
        S: FnOnce() -> SF + Send + 'static,
        SF: std::future::Future<Output = ()> + Send + 'static,
        C: FnOnce() -> CF + Send + 'static,
        CF: std::future::Future<Output = ()> + Send + 'static,
    {
        if !self.surface.notify_content_changed() {
            log::debug!("external-update echo for {}; debounce untouched", self.doc_id);
            return false;
        }
        self.auto_save.poke(save_action);
        self.auto_compile.poke(compile_action);
        true
    }

    /// Records a snapshot of the current content if the change is
    /// meaningful, marking it saved.
    pub fn snapshot(
        &mut self,
        change: ChangeKind,
        author: Option<String>,
        note: Option<String>,
    ) -> Option<&VersionRecord> {
        let content = self.source();
        self.last_saved = Some(content.clone());
        self.history.record_save(&content, author, change, note)
    }

    /// Reverts the session to a stored version.
    ///
    /// The target content is appended to history (never rewriting it),
    /// re-parsed into the surface through the external-update path — so
    /// the surface's echo is suppressed — and any pending debounced work
    /// is cancelled so the revert cannot trigger an auto-save of itself.
    ///
    /// # Errors
    ///
    /// Returns a version error when the label is unknown.
    pub fn revert_to(&mut self, version: &str, author: Option<String>) -> Result<String> {
        let record = self.history.revert_to(version, author)?;
        let content = record.content().to_string();

        self.auto_save.cancel();
        self.auto_compile.cancel();

        let doc = LatexParser::new().parse(&content);
        self.surface.apply_external(doc);
        self.last_saved = Some(content.clone());
        Ok(content)
    }

    /// Tears down pending work before the user switches surfaces or
    /// documents, so stale content is never written afterwards.
    pub fn suspend(&mut self) {
        self.auto_save.cancel();
        self.auto_compile.cancel();
        log::debug!("session {} suspended; pending debounces cancelled", self.doc_id);
    }

    /// Whether a debounced save is still pending.
    #[must_use]
    pub fn save_pending(&self) -> bool {
        self.auto_save.is_pending()
    }
}
