use crate::error::{RecorderError, Result};
use crate::recording::schema::{ActionKind, RecordedAction, SelectorKind};

/// Validate an action before it enters the log through manual entry.
pub fn validate_action(action: &RecordedAction) -> Result<()> {
    if let ActionKind::Other(kind) = &action.kind {
        if kind.trim().is_empty() {
            return Err(RecorderError::Validation(
                "Action type cannot be empty".to_string(),
            ));
        }
    }

    match (&action.selector.kind, &action.selector.value) {
        (SelectorKind::None, _) => {}
        (kind, None) => {
            return Err(RecorderError::Validation(format!(
                "Selector of type {} requires a value",
                kind
            )));
        }
        (kind, Some(value)) if value.trim().is_empty() => {
            return Err(RecorderError::Validation(format!(
                "Selector of type {} cannot be blank",
                kind
            )));
        }
        _ => {}
    }

    if action.kind == ActionKind::Navigate
        && action.source_url.as_deref().unwrap_or("").is_empty()
        && action.value.as_deref().unwrap_or("").is_empty()
    {
        return Err(RecorderError::Validation(
            "Navigate action needs a URL".to_string(),
        ));
    }

    Ok(())
}
