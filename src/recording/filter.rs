//! View filter: turns the raw capture sequence into what a view mode shows.
//!
//! Pure functions, recomputed on every read. Positions in the filtered view
//! are what selection and index-based edits refer to, so
//! [`filtered_positions`] also exposes the raw index behind each one.

use crate::recording::schema::{ActionKind, RecordedAction, ViewMode};
use std::collections::HashMap;

/// Group key for input actions without a selector value.
const UNKNOWN_SELECTOR: &str = "unknown";

/// Raw-log indices of the actions visible in `mode`, in view order.
pub fn filtered_positions(actions: &[RecordedAction], mode: ViewMode) -> Vec<usize> {
    match mode {
        ViewMode::Raw | ViewMode::Editor => (0..actions.len()).collect(),
        ViewMode::Clean => clean_positions(actions),
    }
}

/// The actions visible in `mode`, in view order.
pub fn filter_actions(actions: &[RecordedAction], mode: ViewMode) -> Vec<RecordedAction> {
    filtered_positions(actions, mode)
        .into_iter()
        .map(|i| actions[i].clone())
        .collect()
}

/// Collapse keystroke-level input snapshots to the final value per field and
/// runs of consecutive scrolls to their first event, then restore temporal
/// order.
fn clean_positions(actions: &[RecordedAction]) -> Vec<usize> {
    let mut last_input_by_selector: HashMap<&str, usize> = HashMap::new();
    let mut others: Vec<usize> = Vec::new();

    for (index, action) in actions.iter().enumerate() {
        match action.kind {
            ActionKind::Input => {
                let key = action.selector.value.as_deref().unwrap_or(UNKNOWN_SELECTOR);
                last_input_by_selector.insert(key, index);
            }
            ActionKind::Scroll => {
                let follows_scroll = others
                    .last()
                    .is_some_and(|&prev| actions[prev].kind == ActionKind::Scroll);
                if !follows_scroll {
                    others.push(index);
                }
            }
            _ => others.push(index),
        }
    }

    let mut kept = others;
    kept.extend(last_input_by_selector.into_values());
    // Ties on timestamp keep capture order.
    kept.sort_by_key(|&i| (actions[i].timestamp, i));
    kept
}
