//! Recorded action data structures.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Locator strategy used by a [`Selector`].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SelectorKind {
    Css,
    #[default]
    Xpath,
    Id,
    Text,
    None,
}

impl SelectorKind {
    pub const ALL: [SelectorKind; 5] = [
        SelectorKind::Xpath,
        SelectorKind::Css,
        SelectorKind::Id,
        SelectorKind::Text,
        SelectorKind::None,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SelectorKind::Css => "css",
            SelectorKind::Xpath => "xpath",
            SelectorKind::Id => "id",
            SelectorKind::Text => "text",
            SelectorKind::None => "none",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SelectorKind::Css => "CSS Selector",
            SelectorKind::Xpath => "XPath",
            SelectorKind::Id => "Element ID",
            SelectorKind::Text => "Text Content",
            SelectorKind::None => "None",
        }
    }
}

impl fmt::Display for SelectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SelectorKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("Unknown selector type: {}", s))
    }
}

/// Identifies a page element.
///
/// `value` is absent only when `kind` is [`SelectorKind::None`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Selector {
    #[serde(rename = "type", default)]
    pub kind: SelectorKind,
    #[serde(default)]
    pub value: Option<String>,
    /// Capture-time uniqueness hint. Carried through, never interpreted.
    #[serde(rename = "isUnique", default)]
    pub is_unique: Option<bool>,
}

impl Selector {
    pub fn new(kind: SelectorKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: Some(value.into()),
            is_unique: None,
        }
    }

    pub fn css(value: impl Into<String>) -> Self {
        Self::new(SelectorKind::Css, value)
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Self::new(SelectorKind::Xpath, value)
    }

    pub fn id(value: impl Into<String>) -> Self {
        Self::new(SelectorKind::Id, value)
    }

    /// Selector for page-level actions that target no element.
    pub fn none() -> Self {
        Self {
            kind: SelectorKind::None,
            value: None,
            is_unique: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.kind == SelectorKind::None || self.value.is_some()
    }
}

/// Kind of a recorded action.
///
/// Known kinds get their own variant; anything else is kept verbatim in
/// [`ActionKind::Other`] so it survives a load/save cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionKind {
    Click,
    Input,
    Select,
    Navigate,
    Wait,
    Scroll,
    Screenshot,
    Assert,
    Other(String),
}

impl ActionKind {
    pub const KNOWN: [ActionKind; 8] = [
        ActionKind::Click,
        ActionKind::Input,
        ActionKind::Select,
        ActionKind::Navigate,
        ActionKind::Wait,
        ActionKind::Scroll,
        ActionKind::Screenshot,
        ActionKind::Assert,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            ActionKind::Click => "click",
            ActionKind::Input => "input",
            ActionKind::Select => "select",
            ActionKind::Navigate => "navigate",
            ActionKind::Wait => "wait",
            ActionKind::Scroll => "scroll",
            ActionKind::Screenshot => "screenshot",
            ActionKind::Assert => "assert",
            ActionKind::Other(s) => s,
        }
    }

    /// Label shown in action pickers.
    pub fn display_name(&self) -> String {
        match self {
            ActionKind::Click => "Click".to_string(),
            ActionKind::Input => "Type Input".to_string(),
            ActionKind::Select => "Select Option".to_string(),
            ActionKind::Navigate => "Navigate".to_string(),
            ActionKind::Wait => "Wait".to_string(),
            ActionKind::Scroll => "Scroll".to_string(),
            ActionKind::Screenshot => "Screenshot".to_string(),
            ActionKind::Assert => "Assert".to_string(),
            ActionKind::Other(s) => {
                let mut chars = s.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        }
    }
}

impl From<&str> for ActionKind {
    fn from(value: &str) -> Self {
        match value {
            "click" => ActionKind::Click,
            "input" => ActionKind::Input,
            "select" => ActionKind::Select,
            "navigate" => ActionKind::Navigate,
            "wait" => ActionKind::Wait,
            "scroll" => ActionKind::Scroll,
            "screenshot" => ActionKind::Screenshot,
            "assert" => ActionKind::Assert,
            other => ActionKind::Other(other.to_string()),
        }
    }
}

impl From<String> for ActionKind {
    fn from(value: String) -> Self {
        match ActionKind::from(value.as_str()) {
            ActionKind::Other(_) => ActionKind::Other(value),
            known => known,
        }
    }
}

impl From<ActionKind> for String {
    fn from(value: ActionKind) -> Self {
        match value {
            ActionKind::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single captured interaction. Never edited in place: edits replace the
/// entry at the same position in the log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecordedAction {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    pub selector: Selector,
    #[serde(default)]
    pub value: Option<String>,
    /// Wall clock at capture time (Unix ms).
    #[serde(default = "now_ms")]
    pub timestamp: u64,
    #[serde(default)]
    pub element_text: Option<String>,
    /// Page URL at capture time.
    #[serde(rename = "url", default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub element_type: Option<String>,
}

impl RecordedAction {
    pub fn new(kind: ActionKind, selector: Selector) -> Self {
        Self {
            kind,
            selector,
            value: None,
            timestamp: now_ms(),
            element_text: None,
            source_url: None,
            element_type: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_element_text(mut self, text: impl Into<String>) -> Self {
        self.element_text = Some(text.into());
        self
    }

    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }
}

/// Recording lifecycle state.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecordingState {
    #[default]
    Idle,
    Recording,
    Paused,
}

/// Named transformation applied to the raw log for display and export.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// Redundant intermediate actions collapsed.
    #[default]
    Clean,
    /// Everything that was captured.
    Raw,
    Editor,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Clean => "clean",
            ViewMode::Raw => "raw",
            ViewMode::Editor => "editor",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "clean" => Ok(ViewMode::Clean),
            "raw" => Ok(ViewMode::Raw),
            "editor" => Ok(ViewMode::Editor),
            other => Err(format!("Unknown view mode: {}", other)),
        }
    }
}

pub(crate) fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
