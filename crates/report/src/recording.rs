use std::sync::Mutex;

use crate::{ReportEvent, Reporter};

/// Reporter that stores every event, for tests and headless runs.
///
/// `confirm` answers with a fixed reply chosen at construction.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<ReportEvent>>,
    confirm_reply: bool,
}

impl RecordingReporter {
    /// Creates a recorder that declines every prompt.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a recorder that answers every prompt with `reply`.
    pub fn answering(reply: bool) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            confirm_reply: reply,
        }
    }

    fn push(&self, event: ReportEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }

    /// Returns a snapshot of all recorded events.
    pub fn events(&self) -> Vec<ReportEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn console_lines(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|ev| match ev {
                ReportEvent::Console { line } => Some(line),
                _ => None,
            })
            .collect()
    }

    pub fn progress_values(&self) -> Vec<u8> {
        self.events()
            .into_iter()
            .filter_map(|ev| match ev {
                ReportEvent::Progress { percent } => Some(percent),
                _ => None,
            })
            .collect()
    }

    /// `(title, message)` of every critical dialog.
    pub fn criticals(&self) -> Vec<(String, String)> {
        self.events()
            .into_iter()
            .filter_map(|ev| match ev {
                ReportEvent::Critical { title, message } => Some((title, message)),
                _ => None,
            })
            .collect()
    }

    /// `(title, message)` of every info dialog.
    pub fn infos(&self) -> Vec<(String, String)> {
        self.events()
            .into_iter()
            .filter_map(|ev| match ev {
                ReportEvent::Info { title, message } => Some((title, message)),
                _ => None,
            })
            .collect()
    }

    pub fn confirm_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|ev| matches!(ev, ReportEvent::Confirm { .. }))
            .count()
    }

    /// True if any console line contains `needle`.
    pub fn console_contains(&self, needle: &str) -> bool {
        self.console_lines().iter().any(|l| l.contains(needle))
    }
}

impl Reporter for RecordingReporter {
    fn console(&self, line: &str) {
        self.push(ReportEvent::Console { line: line.into() });
    }

    fn progress(&self, percent: u8) {
        self.push(ReportEvent::Progress { percent });
    }

    fn critical(&self, title: &str, message: &str) {
        self.push(ReportEvent::Critical {
            title: title.into(),
            message: message.into(),
        });
    }

    fn info(&self, title: &str, message: &str) {
        self.push(ReportEvent::Info {
            title: title.into(),
            message: message.into(),
        });
    }

    fn confirm(&self, title: &str, message: &str) -> bool {
        self.push(ReportEvent::Confirm {
            title: title.into(),
            message: message.into(),
        });
        self.confirm_reply
    }

    fn busy(&self, busy: bool) {
        self.push(ReportEvent::Busy { busy });
    }

    fn clear_game_path(&self) {
        self.push(ReportEvent::GamePathCleared);
    }
}
