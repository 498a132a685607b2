use crate::recording::schema::ViewMode;
use serde::{Deserialize, Serialize};

/// Persisted recorder preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecorderSettings {
    /// Directory of the last successful export
    #[serde(default)]
    pub last_export_path: String,

    /// View mode restored when a session opens
    #[serde(default)]
    pub default_view_mode: ViewMode,

    #[serde(default = "default_true")]
    pub auto_save_recordings: bool,

    /// Names of saved configurations, in save order
    #[serde(default)]
    pub saved_configurations: Vec<String>,
}

impl Default for RecorderSettings {
    fn default() -> Self {
        Self {
            last_export_path: String::new(),
            default_view_mode: ViewMode::Clean,
            auto_save_recordings: true,
            saved_configurations: Vec::new(),
        }
    }
}

impl RecorderSettings {
    pub fn remember_configuration(&mut self, name: &str) {
        if !self.saved_configurations.iter().any(|n| n == name) {
            self.saved_configurations.push(name.to_string());
        }
    }

    pub fn forget_configuration(&mut self, name: &str) {
        self.saved_configurations.retain(|n| n != name);
    }
}

fn default_true() -> bool {
    true
}
