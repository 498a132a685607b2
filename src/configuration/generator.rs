//! Maps recorded actions to configuration entries and back.

use crate::configuration::schema::{ActionConfigEntry, Category, Configuration};
use crate::recording::schema::{ActionKind, RecordedAction, Selector};
use std::collections::BTreeMap;

const DEFAULT_WAIT_MS: &str = "1000";
const DEFAULT_SCROLL_POSITION: &str = "0,0";

/// Build a configuration from `actions`, one entry per action, in order.
///
/// Pure: the same input always produces the same (and identically
/// serialized) output.
pub fn generate(actions: &[RecordedAction], name: &str, description: &str) -> Configuration {
    Configuration {
        name: name.to_string(),
        description: description.to_string(),
        entries: actions
            .iter()
            .enumerate()
            .map(|(index, action)| entry_for(index, action))
            .collect(),
    }
}

/// Entry for the action at zero-based `position` in the exported sequence.
pub fn entry_for(position: usize, action: &RecordedAction) -> ActionConfigEntry {
    let selector_value = action.selector.value.as_deref();
    let value = action.value.as_deref();

    let (name, category, selector, value, meta) = match &action.kind {
        ActionKind::Click => {
            let mut meta = BTreeMap::new();
            meta.insert("button".to_string(), "left".to_string());
            if let Some(text) = &action.element_text {
                meta.insert("text".to_string(), text.clone());
            }
            let target = action
                .element_text
                .as_deref()
                .or(selector_value)
                .unwrap_or("element");
            (
                format!("Click on {}", target),
                Category::Default,
                action.selector.clone(),
                None,
                Some(meta),
            )
        }
        ActionKind::Input => (
            format!("Type into {}", selector_value.unwrap_or("input field")),
            Category::Default,
            action.selector.clone(),
            action.value.clone(),
            None,
        ),
        ActionKind::Select => (
            format!(
                "Select {} in {}",
                value.unwrap_or("option"),
                selector_value.unwrap_or("dropdown")
            ),
            Category::Default,
            action.selector.clone(),
            action.value.clone(),
            None,
        ),
        ActionKind::Navigate => {
            let target = action.source_url.clone().or_else(|| action.value.clone());
            (
                format!("Navigate to {}", target.as_deref().unwrap_or("page")),
                Category::Default,
                Selector::none(),
                target,
                None,
            )
        }
        ActionKind::Wait => {
            let duration = value.unwrap_or(DEFAULT_WAIT_MS);
            let target = match selector_value {
                Some(sel) => sel.to_string(),
                None => format!("{}ms", duration),
            };
            (
                format!("Wait for {}", target),
                Category::Default,
                action.selector.clone(),
                Some(duration.to_string()),
                None,
            )
        }
        ActionKind::Scroll => (
            "Scroll to position".to_string(),
            Category::Default,
            Selector::none(),
            Some(value.unwrap_or(DEFAULT_SCROLL_POSITION).to_string()),
            None,
        ),
        ActionKind::Screenshot => (
            "Take screenshot".to_string(),
            Category::Screenshot,
            Selector::none(),
            action.value.clone(),
            None,
        ),
        ActionKind::Assert => (
            format!("Assert {}", value.unwrap_or("condition")),
            Category::Assertion,
            action.selector.clone(),
            action.value.clone(),
            None,
        ),
        ActionKind::Other(_) => (
            format!("Action {}", position + 1),
            Category::Default,
            action.selector.clone(),
            action.value.clone(),
            None,
        ),
    };

    ActionConfigEntry {
        name,
        category,
        kind: action.kind.clone(),
        selector,
        value,
        meta,
    }
}

/// Rebuild a recorded action sequence from a configuration.
///
/// Timestamps count up from `start_timestamp` one millisecond per entry so
/// that timestamp-ordered views keep the file order.
pub fn to_recorded_actions(config: &Configuration, start_timestamp: u64) -> Vec<RecordedAction> {
    config
        .entries
        .iter()
        .enumerate()
        .map(|(index, entry)| RecordedAction {
            kind: entry.kind.clone(),
            selector: entry.selector.clone(),
            value: entry.value.clone(),
            timestamp: start_timestamp + index as u64,
            element_text: entry.meta.as_ref().and_then(|m| m.get("text").cloned()),
            source_url: None,
            element_type: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::schema::SelectorKind;

    fn action(kind: ActionKind, selector: Selector) -> RecordedAction {
        RecordedAction::new(kind, selector).with_timestamp(1)
    }

    #[test]
    fn test_click_entry() {
        let with_text = action(ActionKind::Click, Selector::css("#buy")).with_element_text("Buy now");
        let entry = entry_for(0, &with_text);
        assert_eq!(entry.name, "Click on Buy now");
        assert_eq!(entry.category, Category::Default);
        assert_eq!(entry.value, None);
        let meta = entry.meta.unwrap();
        assert_eq!(meta.get("button").map(String::as_str), Some("left"));
        assert_eq!(meta.get("text").map(String::as_str), Some("Buy now"));

        let bare = entry_for(0, &action(ActionKind::Click, Selector::css("#buy")));
        assert_eq!(bare.name, "Click on #buy");
        assert_eq!(bare.meta.unwrap().len(), 1);

        let nothing = entry_for(0, &action(ActionKind::Click, Selector::none()));
        assert_eq!(nothing.name, "Click on element");
    }

    #[test]
    fn test_input_and_select_entries() {
        let input = action(ActionKind::Input, Selector::css("#email")).with_value("a@b.c");
        let entry = entry_for(0, &input);
        assert_eq!(entry.name, "Type into #email");
        assert_eq!(entry.value.as_deref(), Some("a@b.c"));
        assert!(entry.meta.is_none());

        let input_none = entry_for(0, &action(ActionKind::Input, Selector::none()));
        assert_eq!(input_none.name, "Type into input field");

        let select = action(ActionKind::Select, Selector::id("country")).with_value("NZ");
        assert_eq!(entry_for(0, &select).name, "Select NZ in country");
        let select_bare = entry_for(0, &action(ActionKind::Select, Selector::none()));
        assert_eq!(select_bare.name, "Select option in dropdown");
    }

    #[test]
    fn test_navigate_prefers_source_url() {
        let nav = action(ActionKind::Navigate, Selector::css("a.link"))
            .with_value("https://value.example")
            .with_source_url("https://url.example");
        let entry = entry_for(0, &nav);
        assert_eq!(entry.name, "Navigate to https://url.example");
        assert_eq!(entry.value.as_deref(), Some("https://url.example"));
        assert_eq!(entry.selector, Selector::none());

        let by_value =
            entry_for(0, &action(ActionKind::Navigate, Selector::none()).with_value("https://v.io"));
        assert_eq!(by_value.value.as_deref(), Some("https://v.io"));
    }

    #[test]
    fn test_wait_entry_defaults() {
        let on_selector = entry_for(0, &action(ActionKind::Wait, Selector::css(".spinner")));
        assert_eq!(on_selector.name, "Wait for .spinner");
        assert_eq!(on_selector.value.as_deref(), Some("1000"));

        let timed = entry_for(0, &action(ActionKind::Wait, Selector::none()).with_value("250"));
        assert_eq!(timed.name, "Wait for 250ms");
        assert_eq!(timed.value.as_deref(), Some("250"));
    }

    #[test]
    fn test_scroll_screenshot_assert_entries() {
        let scroll = entry_for(0, &action(ActionKind::Scroll, Selector::css("body")));
        assert_eq!(scroll.name, "Scroll to position");
        assert_eq!(scroll.value.as_deref(), Some("0,0"));
        assert_eq!(scroll.selector.kind, SelectorKind::None);

        let shot = entry_for(0, &action(ActionKind::Screenshot, Selector::css("body")));
        assert_eq!(shot.name, "Take screenshot");
        assert_eq!(shot.category, Category::Screenshot);
        assert_eq!(shot.selector, Selector::none());

        let assert_entry = entry_for(
            0,
            &action(ActionKind::Assert, Selector::css("h1")).with_value("title visible"),
        );
        assert_eq!(assert_entry.name, "Assert title visible");
        assert_eq!(assert_entry.category, Category::Assertion);
        let bare_assert = entry_for(0, &action(ActionKind::Assert, Selector::css("h1")));
        assert_eq!(bare_assert.name, "Assert condition");
    }

    #[test]
    fn test_unknown_kind_uses_position() {
        let hover = action(ActionKind::from("hover"), Selector::css("#menu")).with_value("x");
        let entry = entry_for(2, &hover);
        assert_eq!(entry.name, "Action 3");
        assert_eq!(entry.kind, ActionKind::Other("hover".to_string()));
        assert_eq!(entry.selector, Selector::css("#menu"));
        assert_eq!(entry.value.as_deref(), Some("x"));
    }

    #[test]
    fn test_generate_is_idempotent() {
        let actions = vec![
            action(ActionKind::Click, Selector::css("#a")).with_element_text("A"),
            action(ActionKind::Input, Selector::css("#b")).with_value("typed"),
        ];
        let first = generate(&actions, "Flow", "desc");
        let second = generate(&actions, "Flow", "desc");
        assert_eq!(first, second);
        assert_eq!(
            first.to_json_pretty().unwrap(),
            second.to_json_pretty().unwrap()
        );
    }

    #[test]
    fn test_inverse_roundtrip_for_every_kind() {
        let actions = vec![
            action(ActionKind::Click, Selector::css("#a")).with_element_text("A"),
            action(ActionKind::Input, Selector::css("#b")).with_value("typed"),
            action(ActionKind::Select, Selector::xpath("//select")).with_value("2"),
            action(ActionKind::Navigate, Selector::none()).with_source_url("https://x.io"),
            action(ActionKind::Wait, Selector::none()).with_value("300"),
            action(ActionKind::Scroll, Selector::none()).with_value("0,400"),
            action(ActionKind::Screenshot, Selector::none()).with_value("full"),
            action(ActionKind::Assert, Selector::css("h1")).with_value("visible"),
            action(ActionKind::from("hover"), Selector::css("#menu")),
        ];

        let config = generate(&actions, "All", "");
        let restored = to_recorded_actions(&config, 500);
        let regenerated = generate(&restored, "All", "");

        assert_eq!(regenerated, config);
        for (entry, action) in config.entries.iter().zip(&restored) {
            assert_eq!(entry.kind, action.kind);
            assert_eq!(entry.selector, action.selector);
            assert_eq!(entry.value, action.value);
        }
        assert_eq!(restored[0].element_text.as_deref(), Some("A"));
        let timestamps: Vec<u64> = restored.iter().map(|a| a.timestamp).collect();
        assert_eq!(timestamps, (500..509).collect::<Vec<u64>>());
    }
}
