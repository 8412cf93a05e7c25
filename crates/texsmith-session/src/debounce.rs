//! Edit-settling timers.
//!
//! Auto-save and auto-recompile fire only after a quiet period; every
//! edit cancels and restarts the timer, so the fired action always sees
//! the last-settled content, never an intermediate keystroke. Exactly one
//! timer of each kind is live per editing session.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Quiet period before a debounced auto-save fires.
pub const AUTO_SAVE_QUIET: Duration = Duration::from_millis(2500);

/// Quiet period before a debounced auto-recompile fires.
pub const AUTO_COMPILE_QUIET: Duration = Duration::from_millis(2000);

/// A restartable single-action timer.
///
/// [`poke`] arms the timer, cancelling any pending action; [`cancel`]
/// drops the pending action outright (used when the user switches
/// surfaces or documents, so stale content is never written after they
/// have moved on). Dropping the debouncer cancels too.
///
/// [`poke`]: Debouncer::poke
/// [`cancel`]: Debouncer::cancel
#[derive(Debug)]
pub struct Debouncer {
    quiet: Duration,
    handle: Option<JoinHandle<()>>,
}

impl Debouncer {
    /// Creates a debouncer with the given quiet period.
    #[must_use]
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            handle: None,
        }
    }

    /// Arms the timer: after the quiet period with no further pokes, the
    /// action runs. A poke while armed cancels the previous action.
    pub fn poke<F, Fut>(&mut self, action: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let quiet = self.quiet;
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            action().await;
        }));
    }

    /// Drops any pending action without running it.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Returns `true` while an action is armed and has not yet run.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
