//! Transient user feedback.
//!
//! A message stays current until a newer one replaces it, it is dismissed, or
//! its timeout elapses. The timeout clear only fires if the message it was
//! scheduled for is still the current one.

use crate::recording::events::{SessionBroadcaster, SessionEvent};
use crate::recording::schema::now_ms;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

pub const DEFAULT_FEEDBACK_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackMessage {
    /// Unique per channel; identifies the message for its delayed clear.
    pub id: u64,
    pub text: String,
    pub kind: FeedbackKind,
    pub timestamp: u64,
}

struct FeedbackState {
    current: Mutex<Option<FeedbackMessage>>,
    next_id: AtomicU64,
    events: SessionBroadcaster,
}

impl FeedbackState {
    fn clear_if_current(&self, id: u64) -> bool {
        let mut current = self.current.lock();
        if current.as_ref().is_some_and(|m| m.id == id) {
            *current = None;
            drop(current);
            self.events
                .broadcast(SessionEvent::FeedbackChanged { message: None });
            true
        } else {
            false
        }
    }
}

/// Holds the current feedback message and its pending clear.
pub struct FeedbackChannel {
    state: Arc<FeedbackState>,
    timeout: Duration,
    pending_clear: Mutex<Option<JoinHandle<()>>>,
}

impl FeedbackChannel {
    pub fn new(events: SessionBroadcaster, timeout: Duration) -> Self {
        Self {
            state: Arc::new(FeedbackState {
                current: Mutex::new(None),
                next_id: AtomicU64::new(1),
                events,
            }),
            timeout,
            pending_clear: Mutex::new(None),
        }
    }

    pub fn current(&self) -> Option<FeedbackMessage> {
        self.state.current.lock().clone()
    }

    /// Make `text` the current message and schedule its clear. Without a
    /// tokio runtime the message simply stays until replaced or dismissed.
    pub fn show(&self, text: impl Into<String>, kind: FeedbackKind) -> FeedbackMessage {
        let message = FeedbackMessage {
            id: self.state.next_id.fetch_add(1, Ordering::Relaxed),
            text: text.into(),
            kind,
            timestamp: now_ms(),
        };

        match kind {
            FeedbackKind::Error => tracing::warn!("{}", message.text),
            _ => tracing::debug!("Feedback: {}", message.text),
        }

        *self.state.current.lock() = Some(message.clone());
        self.state.events.broadcast(SessionEvent::FeedbackChanged {
            message: Some(message.clone()),
        });

        let clear = match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let state = Arc::clone(&self.state);
                let id = message.id;
                let timeout = self.timeout;
                Some(handle.spawn(async move {
                    tokio::time::sleep(timeout).await;
                    state.clear_if_current(id);
                }))
            }
            Err(_) => None,
        };

        // A superseded message's clear has nothing left to do.
        if let Some(previous) = std::mem::replace(&mut *self.pending_clear.lock(), clear) {
            previous.abort();
        }

        message
    }

    pub fn dismiss(&self) {
        self.cancel_pending();
        let had_message = self.state.current.lock().take().is_some();
        if had_message {
            self.state
                .events
                .broadcast(SessionEvent::FeedbackChanged { message: None });
        }
    }

    /// Abort the scheduled clear, if any. The current message is left as is.
    pub fn cancel_pending(&self) {
        if let Some(handle) = self.pending_clear.lock().take() {
            handle.abort();
        }
    }
}

impl Drop for FeedbackChannel {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
