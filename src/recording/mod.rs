//! Recording module: capture, curate and view browser interactions.

pub mod events;
pub mod feedback;
pub mod filter;
pub mod log;
pub mod schema;
pub mod session;
pub mod validation;

pub use events::{SessionBroadcaster, SessionEvent};
pub use feedback::{FeedbackChannel, FeedbackKind, FeedbackMessage, DEFAULT_FEEDBACK_TIMEOUT};
pub use filter::{filter_actions, filtered_positions};
pub use log::ActionLog;
pub use schema::{
    ActionKind, RecordedAction, RecordingState, Selector, SelectorKind, ViewMode,
};
pub use session::{session_at, RecordingSession, DEFAULT_CONFIGURATION_NAME};
pub use validation::validate_action;
