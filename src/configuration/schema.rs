//! Replay-ready configuration format.

use crate::error::Result;
use crate::recording::schema::{ActionKind, Selector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Entry category understood by the execution engine.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Default,
    Assertion,
    Screenshot,
    Network,
    Custom,
}

/// One replayable instruction. Always derived from a recorded action,
/// regenerated on every export.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionConfigEntry {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "actionType", default)]
    pub category: Category,
    #[serde(rename = "type")]
    pub kind: ActionKind,
    pub selector: Selector,
    #[serde(default)]
    pub value: Option<String>,
    /// Ordered so identical input serializes byte-identically.
    #[serde(default)]
    pub meta: Option<BTreeMap<String, String>>,
}

/// A named, ordered list of entries: the unit that is saved, loaded,
/// exported and imported.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Configuration {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(alias = "actions", default)]
    pub entries: Vec<ActionConfigEntry>,
}

impl Configuration {
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}
