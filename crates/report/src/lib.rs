//! Reporting channel between the installer core and a front-end.
//!
//! The core never touches widgets. It is handed a [`Reporter`] and emits
//! console lines, progress percentages and dialogs against it. Production
//! front-ends use [`ChannelReporter`], which marshals every event onto the
//! thread that owns the UI; tests use [`RecordingReporter`].

mod channel;
mod event;
mod ledger;
mod recording;

pub use channel::{ChannelReporter, channel};
pub use event::{ReportEvent, UiMessage};
pub use ledger::{FALLBACK_TOTAL, ProgressLedger};
pub use recording::RecordingReporter;

/// Sink for everything the core wants the user to see.
///
/// All methods except [`confirm`](Reporter::confirm) are fire-and-forget.
/// Implementations must preserve emission order per channel.
pub trait Reporter: Send + Sync {
    /// Appends a line to the console.
    fn console(&self, line: &str);

    /// Sets the progress bar, `0..=100`.
    fn progress(&self, percent: u8);

    /// Shows a modal error.
    fn critical(&self, title: &str, message: &str);

    /// Shows a modal notice.
    fn info(&self, title: &str, message: &str);

    /// Asks a yes/no question and blocks until the user answers.
    ///
    /// Must only be called from a worker thread, never from the thread that
    /// drives the front-end.
    fn confirm(&self, title: &str, message: &str) -> bool;

    /// Toggles the busy state (cursor and disabled inputs).
    fn busy(&self, busy: bool);

    /// Clears the game path entry after the game has been removed.
    fn clear_game_path(&self);
}

impl<R: Reporter + ?Sized> Reporter for std::sync::Arc<R> {
    fn console(&self, line: &str) {
        (**self).console(line);
    }

    fn progress(&self, percent: u8) {
        (**self).progress(percent);
    }

    fn critical(&self, title: &str, message: &str) {
        (**self).critical(title, message);
    }

    fn info(&self, title: &str, message: &str) {
        (**self).info(title, message);
    }

    fn confirm(&self, title: &str, message: &str) -> bool {
        (**self).confirm(title, message)
    }

    fn busy(&self, busy: bool) {
        (**self).busy(busy);
    }

    fn clear_game_path(&self) {
        (**self).clear_game_path();
    }
}
