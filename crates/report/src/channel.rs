use tokio::sync::{mpsc, oneshot};

use crate::{ReportEvent, Reporter, UiMessage};

/// Reporter that forwards every event to the front-end thread.
///
/// The channel is unbounded so the worker never waits on the UI for one-way
/// events; a single queue keeps all events in emission order.
#[derive(Debug, Clone)]
pub struct ChannelReporter {
    tx: mpsc::UnboundedSender<UiMessage>,
}

/// Creates a reporter and the receiver the front-end drains.
pub fn channel() -> (ChannelReporter, mpsc::UnboundedReceiver<UiMessage>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelReporter { tx }, rx)
}

impl ChannelReporter {
    fn send(&self, event: ReportEvent) {
        if self.tx.send(UiMessage::Event(event)).is_err() {
            tracing::debug!("front-end receiver closed, dropping event");
        }
    }
}

impl Reporter for ChannelReporter {
    fn console(&self, line: &str) {
        self.send(ReportEvent::Console { line: line.into() });
    }

    fn progress(&self, percent: u8) {
        self.send(ReportEvent::Progress {
            percent: percent.min(100),
        });
    }

    fn critical(&self, title: &str, message: &str) {
        self.send(ReportEvent::Critical {
            title: title.into(),
            message: message.into(),
        });
    }

    fn info(&self, title: &str, message: &str) {
        self.send(ReportEvent::Info {
            title: title.into(),
            message: message.into(),
        });
    }

    fn confirm(&self, title: &str, message: &str) -> bool {
        let (reply, answer) = oneshot::channel();
        let prompt = UiMessage::Prompt {
            title: title.into(),
            message: message.into(),
            reply,
        };
        if self.tx.send(prompt).is_err() {
            tracing::warn!(title, "front-end receiver closed, treating prompt as declined");
            return false;
        }
        answer.blocking_recv().unwrap_or(false)
    }

    fn busy(&self, busy: bool) {
        self.send(ReportEvent::Busy { busy });
    }

    fn clear_game_path(&self) {
        self.send(ReportEvent::GamePathCleared);
    }
}
