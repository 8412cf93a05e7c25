//! # texsmith-session
//!
//! Editing-session orchestration: the surface adapter binding the
//! document model to an interactive editor, template protection, the
//! debounced auto-save/auto-recompile timers, and the narrow async
//! interfaces to the persistence and PDF-compilation collaborators.
//!
//! Execution is single-session, event-driven: parsing, serialization,
//! and surface operations are synchronous; the only suspension points
//! are the collaborator calls and the debounce timers. Each open
//! document owns an independent [`DocumentSession`] — model, version
//! history, last-saved cursor, and timers — and nothing is shared
//! across documents.
//!
//! ## Ordering guarantees
//!
//! - An externally triggered content replacement (revert, reload)
//!   suppresses the surface's change notification for exactly that one
//!   update and never re-enters auto-save.
//! - Switching surfaces or documents cancels pending debounced work, so
//!   stale content is never written after the user has moved on.

pub mod debounce;
pub mod remote;
pub mod session;
pub mod surface;

pub use debounce::{Debouncer, AUTO_COMPILE_QUIET, AUTO_SAVE_QUIET};
pub use remote::{
    CompileOutput, FileNode, HttpCompiler, LocalFallbackStore, MemoryPersistence, PdfCompiler,
    PersistenceApi,
};
pub use session::DocumentSession;
pub use surface::{Cursor, EditingSurface, SurfaceOutcome, ToggleKind};
