use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

/// A one-way event emitted by the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ReportEvent {
    Console { line: String },
    Progress { percent: u8 },
    Critical { title: String, message: String },
    Info { title: String, message: String },
    /// A confirmation prompt was shown. Recorded for bookkeeping; the reply
    /// travels through [`UiMessage::Prompt`].
    Confirm { title: String, message: String },
    Busy { busy: bool },
    GamePathCleared,
}

/// Message delivered to the front-end thread.
#[derive(Debug)]
pub enum UiMessage {
    Event(ReportEvent),
    /// A synchronous yes/no question. The worker is blocked until `reply`
    /// is answered or dropped (dropped counts as "no").
    Prompt {
        title: String,
        message: String,
        reply: oneshot::Sender<bool>,
    },
}
