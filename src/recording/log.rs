//! Ordered, copy-on-write log of recorded actions.
//!
//! Every mutation produces a fresh snapshot; a reader holding an earlier
//! [`ActionLog::snapshot`] keeps seeing exactly what it saw.

use crate::recording::schema::RecordedAction;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct ActionLog {
    actions: Arc<Vec<RecordedAction>>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_actions(actions: Vec<RecordedAction>) -> Self {
        Self {
            actions: Arc::new(actions),
        }
    }

    /// Current contents. Cheap: clones the `Arc`, not the actions.
    pub fn snapshot(&self) -> Arc<Vec<RecordedAction>> {
        Arc::clone(&self.actions)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&RecordedAction> {
        self.actions.get(index)
    }

    pub fn append(&mut self, action: RecordedAction) {
        Arc::make_mut(&mut self.actions).push(action);
    }

    /// Out-of-range indices are ignored. Returns whether anything was removed.
    pub fn remove_at(&mut self, index: usize) -> bool {
        if index >= self.actions.len() {
            return false;
        }
        Arc::make_mut(&mut self.actions).remove(index);
        true
    }

    /// Removes the given index set from the current sequence, independent of
    /// the order or duplication of `indices`. Returns how many were removed.
    pub fn remove_many(&mut self, indices: &[usize]) -> usize {
        let len = self.actions.len();
        let mut targets: Vec<usize> = indices.iter().copied().filter(|&i| i < len).collect();
        if targets.is_empty() {
            return 0;
        }
        targets.sort_unstable_by(|a, b| b.cmp(a));
        targets.dedup();

        let actions = Arc::make_mut(&mut self.actions);
        for &index in &targets {
            actions.remove(index);
        }
        targets.len()
    }

    /// Out-of-range indices are ignored. Returns whether a replacement happened.
    pub fn replace_at(&mut self, index: usize, action: RecordedAction) -> bool {
        if index >= self.actions.len() {
            return false;
        }
        Arc::make_mut(&mut self.actions)[index] = action;
        true
    }

    /// No-op for index 0 and out-of-range indices.
    pub fn move_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.actions.len() {
            return false;
        }
        Arc::make_mut(&mut self.actions).swap(index - 1, index);
        true
    }

    /// No-op for the last index and out-of-range indices.
    pub fn move_down(&mut self, index: usize) -> bool {
        if index.checked_add(1).map_or(true, |next| next >= self.actions.len()) {
            return false;
        }
        Arc::make_mut(&mut self.actions).swap(index, index + 1);
        true
    }

    pub fn clear(&mut self) {
        self.actions = Arc::new(Vec::new());
    }

    /// Replace the whole contents (used when loading a configuration).
    pub fn replace_all(&mut self, actions: Vec<RecordedAction>) {
        self.actions = Arc::new(actions);
    }
}
