//! Change notifications for session observers.

use crate::recording::feedback::FeedbackMessage;
use crate::recording::schema::{RecordingState, ViewMode};
use serde::Serialize;
use tokio::sync::broadcast;

/// Maximum number of events buffered per subscriber.
const CHANNEL_CAPACITY: usize = 100;

/// What changed. Observers re-read the session for the new state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum SessionEvent {
    RecordingStateChanged { state: RecordingState },
    ActionsChanged { count: usize },
    ViewModeChanged { mode: ViewMode },
    SelectionChanged { selected: Vec<usize> },
    FeedbackChanged { message: Option<FeedbackMessage> },
    ConfigurationChanged { name: String, description: String },
    SavedConfigurationsChanged { names: Vec<String> },
}

#[derive(Clone)]
pub struct SessionBroadcaster {
    tx: broadcast::Sender<SessionEvent>,
}

impl SessionBroadcaster {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Having no subscribers is fine.
    pub fn broadcast(&self, event: SessionEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }
}

impl Default for SessionBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}
