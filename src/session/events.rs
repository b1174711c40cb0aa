//! One-way channel from pipeline threads to the UI
//!
//! Turn and dispatcher threads only ever post; the UI drains the receiver
//! on its own loop and owns all rendering.

use std::sync::mpsc::{self, Receiver, Sender};

use crate::core::types::ExecutionResult;

/// Something the UI should show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// Immediate feedback for enqueued commands, warnings included
    Status(String),
    /// Conversational reply, suggestion or acknowledgement
    Reply(String),
    /// A command finished, successfully or not
    Executed(ExecutionResult),
}

/// Cloneable posting end of the UI channel
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: Sender<UiEvent>,
}

impl EventSink {
    /// Post an event; a closed UI is logged, never an error
    pub fn post(&self, event: UiEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("UI channel closed, dropping event");
        }
    }
}

/// New sink plus the receiver the UI drains
pub fn channel() -> (EventSink, Receiver<UiEvent>) {
    let (tx, rx) = mpsc::channel();
    (EventSink { tx }, rx)
}
