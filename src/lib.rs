pub mod configuration;
pub mod error;
pub mod plugin;
pub mod recording;
pub mod settings;
pub mod storage;

pub use configuration::{Configuration, ConfigurationStore};
pub use error::{RecorderError, Result};
pub use plugin::{BrowserService, PluginContext, PluginInfo, RecorderPlugin};
pub use recording::{RecordedAction, RecordingSession, ViewMode};
