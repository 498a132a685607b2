//! The live recording session.
//!
//! Owns the action log and every piece of UI-facing state around it. All
//! mutations are synchronous; persistence operations snapshot what they need
//! when called and return a future that applies the outcome once it
//! resolves. Positions passed to index-based operations refer to the current
//! filtered view, not the raw log.

use crate::configuration::generator::{generate, to_recorded_actions};
use crate::configuration::schema::Configuration;
use crate::configuration::store::{sanitize_filename, ConfigurationStore};
use crate::error::Result;
use crate::plugin::BrowserService;
use crate::recording::events::{SessionBroadcaster, SessionEvent};
use crate::recording::feedback::{
    FeedbackChannel, FeedbackKind, FeedbackMessage, DEFAULT_FEEDBACK_TIMEOUT,
};
use crate::recording::filter::{filter_actions, filtered_positions};
use crate::recording::log::ActionLog;
use crate::recording::schema::{
    now_ms, ActionKind, RecordedAction, RecordingState, Selector, SelectorKind, ViewMode,
};
use crate::recording::validation::validate_action;
use crate::settings::default_export_dir;
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeSet;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

pub const DEFAULT_CONFIGURATION_NAME: &str = "Recorded RPA Process";

/// Longest configuration-name fragment used in export file names.
const EXPORT_NAME_LENGTH: usize = 50;

struct SessionState {
    recording_state: RecordingState,
    view_mode: ViewMode,
    /// Set once the view mode is chosen explicitly; persisted preferences
    /// no longer override it after that.
    view_mode_chosen: bool,
    log: ActionLog,
    /// Positions in the filtered view.
    selected: BTreeSet<usize>,
    editing: Option<usize>,
    current_url: String,
    configuration_name: String,
    configuration_description: String,
    saved_configurations: Vec<String>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            recording_state: RecordingState::Idle,
            view_mode: ViewMode::default(),
            view_mode_chosen: false,
            log: ActionLog::new(),
            selected: BTreeSet::new(),
            editing: None,
            current_url: String::new(),
            configuration_name: DEFAULT_CONFIGURATION_NAME.to_string(),
            configuration_description: String::new(),
            saved_configurations: Vec::new(),
        }
    }

    fn view_positions(&self) -> Vec<usize> {
        filtered_positions(&self.log.snapshot(), self.view_mode)
    }

    fn filtered(&self) -> Vec<RecordedAction> {
        filter_actions(&self.log.snapshot(), self.view_mode)
    }

    fn raw_index(&self, view_index: usize) -> Option<usize> {
        self.view_positions().get(view_index).copied()
    }

    /// Drop selection and editing positions that no longer exist in the view.
    fn prune_to_view(&mut self) {
        let len = self.view_positions().len();
        self.selected.retain(|&i| i < len);
        if self.editing.is_some_and(|i| i >= len) {
            self.editing = None;
        }
    }

    /// Selected actions if there is a selection, otherwise the whole view.
    fn configuration(&self) -> Configuration {
        let filtered = self.filtered();
        let exported: Vec<RecordedAction> = if self.selected.is_empty() {
            filtered
        } else {
            filtered
                .into_iter()
                .enumerate()
                .filter(|(i, _)| self.selected.contains(i))
                .map(|(_, action)| action)
                .collect()
        };
        generate(
            &exported,
            &self.configuration_name,
            &self.configuration_description,
        )
    }
}

struct SessionInner {
    id: String,
    state: RwLock<SessionState>,
    store: ConfigurationStore,
    browser: Option<Arc<dyn BrowserService>>,
    feedback: FeedbackChannel,
    events: SessionBroadcaster,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    disposed: AtomicBool,
}

impl SessionInner {
    fn abort_tasks(&self) {
        for task in self.tasks.lock().drain(..) {
            task.abort();
        }
        self.feedback.cancel_pending();
    }
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        self.abort_tasks();
    }
}

/// Handle to a recording session. Clones share the same session.
#[derive(Clone)]
pub struct RecordingSession {
    inner: Arc<SessionInner>,
}

impl RecordingSession {
    pub fn new(store: ConfigurationStore, browser: Option<Arc<dyn BrowserService>>) -> Self {
        Self::with_feedback_timeout(store, browser, DEFAULT_FEEDBACK_TIMEOUT)
    }

    pub fn with_feedback_timeout(
        store: ConfigurationStore,
        browser: Option<Arc<dyn BrowserService>>,
        feedback_timeout: Duration,
    ) -> Self {
        let events = SessionBroadcaster::new();
        let id = uuid::Uuid::new_v4().to_string();
        tracing::info!(
            "Created recording session {} (browser service: {})",
            id,
            browser.as_ref().map(|b| b.name()).unwrap_or("none")
        );
        Self {
            inner: Arc::new(SessionInner {
                id,
                state: RwLock::new(SessionState::new()),
                store,
                browser,
                feedback: FeedbackChannel::new(events.clone(), feedback_timeout),
                events,
                tasks: Mutex::new(Vec::new()),
                disposed: AtomicBool::new(false),
            }),
        }
    }

    // ------------------------------------------------------------------
    // Observation
    // ------------------------------------------------------------------

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn store(&self) -> &ConfigurationStore {
        &self.inner.store
    }

    pub fn has_browser_service(&self) -> bool {
        self.inner.browser.is_some()
    }

    pub fn recording_state(&self) -> RecordingState {
        self.inner.state.read().recording_state
    }

    pub fn view_mode(&self) -> ViewMode {
        self.inner.state.read().view_mode
    }

    /// Raw log snapshot, unaffected by later mutations.
    pub fn actions(&self) -> Arc<Vec<RecordedAction>> {
        self.inner.state.read().log.snapshot()
    }

    /// The log as seen through the current view mode.
    pub fn filtered_actions(&self) -> Vec<RecordedAction> {
        self.inner.state.read().filtered()
    }

    pub fn selected_indices(&self) -> Vec<usize> {
        self.inner.state.read().selected.iter().copied().collect()
    }

    pub fn editing_index(&self) -> Option<usize> {
        self.inner.state.read().editing
    }

    pub fn current_url(&self) -> String {
        self.inner.state.read().current_url.clone()
    }

    pub fn configuration_name(&self) -> String {
        self.inner.state.read().configuration_name.clone()
    }

    pub fn configuration_description(&self) -> String {
        self.inner.state.read().configuration_description.clone()
    }

    pub fn saved_configurations(&self) -> Vec<String> {
        self.inner.state.read().saved_configurations.clone()
    }

    pub fn feedback(&self) -> Option<FeedbackMessage> {
        self.inner.feedback.current()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }

    // ------------------------------------------------------------------
    // Recording state machine
    // ------------------------------------------------------------------

    /// Idle starts, Recording stops, Paused resumes.
    pub fn toggle_recording(&self) -> RecordingState {
        match self.recording_state() {
            RecordingState::Idle => self.start_recording(),
            RecordingState::Recording => self.stop_recording(),
            RecordingState::Paused => self.resume_recording(),
        };
        self.recording_state()
    }

    /// Does not clear previously recorded actions.
    pub fn start_recording(&self) -> bool {
        if !self.transition(RecordingState::Idle, RecordingState::Recording) {
            return false;
        }
        if self.has_browser_service() {
            self.notify("Recording started - browser integration active", FeedbackKind::Success);
        } else {
            self.notify("Recording mode active - add actions manually", FeedbackKind::Info);
        }
        true
    }

    pub fn pause_recording(&self) -> bool {
        let changed = self.transition(RecordingState::Recording, RecordingState::Paused);
        if changed {
            self.notify("Recording paused", FeedbackKind::Info);
        }
        changed
    }

    pub fn resume_recording(&self) -> bool {
        let changed = self.transition(RecordingState::Paused, RecordingState::Recording);
        if changed {
            self.notify("Recording resumed", FeedbackKind::Info);
        }
        changed
    }

    pub fn stop_recording(&self) -> bool {
        let changed = self.transition(RecordingState::Recording, RecordingState::Idle);
        if changed {
            self.notify("Recording stopped", FeedbackKind::Info);
        }
        changed
    }

    fn transition(&self, from: RecordingState, to: RecordingState) -> bool {
        {
            let mut state = self.inner.state.write();
            if state.recording_state != from {
                tracing::debug!(
                    "Ignoring transition {:?} -> {:?} while {:?}",
                    from,
                    to,
                    state.recording_state
                );
                return false;
            }
            state.recording_state = to;
        }
        tracing::info!("Session {}: {:?} -> {:?}", self.inner.id, from, to);
        self.emit(SessionEvent::RecordingStateChanged { state: to });
        true
    }

    // ------------------------------------------------------------------
    // Action log mutations
    // ------------------------------------------------------------------

    /// Append unconditionally (manual entry and programmatic use).
    pub fn add_action(&self, action: RecordedAction) {
        tracing::debug!("Adding {} action", action.kind);
        self.mutate_log(|state| state.log.append(action));
    }

    /// Append an event-source action; dropped unless currently recording.
    pub fn record_event(&self, action: RecordedAction) -> bool {
        if self.recording_state() != RecordingState::Recording {
            tracing::debug!(
                "Dropping {} event: session is {:?}",
                action.kind,
                self.recording_state()
            );
            return false;
        }
        if let Some(url) = action.source_url.clone().filter(|u| !u.is_empty()) {
            self.inner.state.write().current_url = url;
        }
        self.add_action(action);
        true
    }

    /// Build, validate and append an action entered by hand.
    pub fn add_manual_action(
        &self,
        kind: ActionKind,
        selector_kind: SelectorKind,
        selector_value: Option<String>,
        value: Option<String>,
        element_text: Option<String>,
    ) -> bool {
        let current_url = self.current_url();
        let action = RecordedAction {
            kind,
            selector: Selector {
                kind: selector_kind,
                value: selector_value.filter(|v| !v.is_empty()),
                is_unique: None,
            },
            value: value.filter(|v| !v.is_empty()),
            timestamp: now_ms(),
            element_text: element_text.filter(|t| !t.is_empty()),
            source_url: Some(current_url).filter(|u| !u.is_empty()),
            element_type: None,
        };

        if let Err(e) = validate_action(&action) {
            self.notify(format!("Invalid action: {}", e), FeedbackKind::Error);
            return false;
        }

        self.add_action(action);
        self.notify("Action added", FeedbackKind::Success);
        true
    }

    pub fn remove_action(&self, index: usize) -> bool {
        self.mutate_log(|state| {
            let Some(raw) = state.raw_index(index) else {
                return false;
            };
            if !state.log.remove_at(raw) {
                return false;
            }
            state.selected = state
                .selected
                .iter()
                .filter(|&&i| i != index)
                .map(|&i| if i > index { i - 1 } else { i })
                .collect();
            state.editing = match state.editing {
                Some(e) if e == index => None,
                Some(e) if e > index => Some(e - 1),
                other => other,
            };
            true
        })
    }

    /// Remove every selected action and clear the selection.
    pub fn remove_selected(&self) -> usize {
        let removed = self.mutate_log(|state| {
            let positions = state.view_positions();
            let raw: Vec<usize> = state
                .selected
                .iter()
                .filter_map(|&i| positions.get(i).copied())
                .collect();
            state.selected.clear();
            state.editing = None;
            state.log.remove_many(&raw)
        });
        self.notify(format!("{} actions removed", removed), FeedbackKind::Info);
        removed
    }

    /// Replace the action at `index` and leave edit mode.
    pub fn edit_action(&self, index: usize, action: RecordedAction) -> bool {
        self.mutate_log(|state| {
            state.editing = None;
            match state.raw_index(index) {
                Some(raw) => state.log.replace_at(raw, action),
                None => false,
            }
        })
    }

    pub fn start_editing(&self, index: usize) -> bool {
        let mut state = self.inner.state.write();
        if index >= state.view_positions().len() {
            return false;
        }
        state.editing = Some(index);
        true
    }

    pub fn cancel_editing(&self) {
        self.inner.state.write().editing = None;
    }

    /// Swap with the raw-log predecessor of the action at `index`.
    pub fn move_action_up(&self, index: usize) -> bool {
        self.mutate_log(|state| match state.raw_index(index) {
            Some(raw) => state.log.move_up(raw),
            None => false,
        })
    }

    /// Swap with the raw-log successor of the action at `index`.
    pub fn move_action_down(&self, index: usize) -> bool {
        self.mutate_log(|state| match state.raw_index(index) {
            Some(raw) => state.log.move_down(raw),
            None => false,
        })
    }

    /// Remove every action. Also resets the selection.
    pub fn clear_recording(&self) {
        self.mutate_log(|state| {
            state.log.clear();
            state.selected.clear();
            state.editing = None;
        });
        self.notify("All actions cleared", FeedbackKind::Info);
    }

    // ------------------------------------------------------------------
    // Selection and view
    // ------------------------------------------------------------------

    pub fn toggle_selection(&self, index: usize) -> bool {
        let selected = {
            let mut state = self.inner.state.write();
            if index >= state.view_positions().len() {
                return false;
            }
            if !state.selected.remove(&index) {
                state.selected.insert(index);
            }
            state.selected.iter().copied().collect()
        };
        self.emit(SessionEvent::SelectionChanged { selected });
        true
    }

    /// Select every action in the current view.
    pub fn select_all(&self) {
        let selected: Vec<usize> = {
            let mut state = self.inner.state.write();
            let len = state.view_positions().len();
            state.selected = (0..len).collect();
            state.selected.iter().copied().collect()
        };
        self.emit(SessionEvent::SelectionChanged { selected });
    }

    pub fn clear_selection(&self) {
        self.inner.state.write().selected.clear();
        self.emit(SessionEvent::SelectionChanged {
            selected: Vec::new(),
        });
    }

    /// Switch view mode. Clears the selection and persists the choice.
    pub fn set_view_mode(&self, mode: ViewMode) {
        self.switch_view_mode(mode, true);

        // Queued now so any later settings write includes it.
        let write = self
            .inner
            .store
            .settings()
            .update(move |s| s.default_view_mode = mode);
        self.spawn_tracked(async move {
            write.await;
        });
    }

    /// `explicit` marks a user choice. A non-explicit switch (restored
    /// preference) is skipped once a choice has been made.
    fn switch_view_mode(&self, mode: ViewMode, explicit: bool) -> bool {
        {
            let mut state = self.inner.state.write();
            if !explicit && state.view_mode_chosen {
                tracing::debug!(
                    "Keeping chosen view mode {}; ignoring stored {}",
                    state.view_mode,
                    mode
                );
                return false;
            }
            state.view_mode_chosen |= explicit;
            state.view_mode = mode;
            state.selected.clear();
            state.editing = None;
        }
        tracing::debug!("View mode set to {}", mode);
        self.emit(SessionEvent::ViewModeChanged { mode });
        self.emit(SessionEvent::SelectionChanged {
            selected: Vec::new(),
        });
        true
    }

    pub fn set_configuration_name(&self, name: impl Into<String>) {
        self.inner.state.write().configuration_name = name.into();
        self.emit_configuration_changed();
    }

    pub fn set_configuration_description(&self, description: impl Into<String>) {
        self.inner.state.write().configuration_description = description.into();
        self.emit_configuration_changed();
    }

    pub fn update_current_url(&self, url: impl Into<String>) {
        self.inner.state.write().current_url = url.into();
    }

    pub fn dismiss_feedback(&self) {
        self.inner.feedback.dismiss();
    }

    // ------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------

    /// Configuration for the selected actions, or the whole view when
    /// nothing is selected.
    pub fn generate_configuration(&self) -> Configuration {
        self.inner.state.read().configuration()
    }

    pub fn export_configuration_json(&self) -> Result<String> {
        self.generate_configuration().to_json_pretty()
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Adopt the persisted default view mode, unless a view mode has been
    /// chosen on this session in the meantime. Resolves to the stored mode.
    pub fn restore_preferences(&self) -> impl Future<Output = ViewMode> + Send + 'static {
        let session = self.clone();
        async move {
            let settings = session.inner.store.settings().load().await;
            if !session.is_disposed() {
                session.switch_view_mode(settings.default_view_mode, false);
            }
            settings.default_view_mode
        }
    }

    /// Restore preferences and the saved configuration list in the
    /// background. Aborted by [`RecordingSession::dispose`]. Without a
    /// tokio runtime this does nothing.
    pub fn load_persisted_state(&self) {
        let restore = self.restore_preferences();
        let refresh = self.refresh_saved_configurations();
        self.spawn_tracked(async move {
            restore.await;
            refresh.await;
        });
    }

    /// Rename, describe and save the current configuration. What gets saved
    /// is fixed when this is called.
    pub fn save_configuration(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> impl Future<Output = bool> + Send + 'static {
        let name = name.into();
        let config = {
            let mut state = self.inner.state.write();
            state.configuration_name = name.clone();
            state.configuration_description = description.into();
            state.configuration()
        };
        self.emit_configuration_changed();

        let session = self.clone();
        async move {
            let saved = session.inner.store.save(&config).await;
            if session.is_disposed() {
                return saved;
            }
            if saved {
                session.notify(format!("Configuration saved: {}", name), FeedbackKind::Success);
                session.refresh_saved_configurations().await;
            } else {
                session.notify("Failed to save configuration", FeedbackKind::Error);
            }
            saved
        }
    }

    /// Replace the log with a saved configuration.
    pub fn load_configuration(
        &self,
        name: impl Into<String>,
    ) -> impl Future<Output = bool> + Send + 'static {
        let name = name.into();
        let session = self.clone();
        async move {
            let loaded = session.inner.store.load(&name).await;
            session.apply_loaded(
                loaded,
                format!("Configuration loaded: {}", name),
                "Failed to load configuration",
            )
        }
    }

    /// Replace the log with a configuration read from an arbitrary file.
    pub fn import_configuration(
        &self,
        path: impl Into<PathBuf>,
    ) -> impl Future<Output = bool> + Send + 'static {
        let path = path.into();
        let session = self.clone();
        async move {
            let imported = session.inner.store.import_from(&path).await;
            session.apply_loaded(
                imported,
                format!("Configuration imported: {}", path.display()),
                "Failed to import configuration",
            )
        }
    }

    pub fn delete_configuration(
        &self,
        name: impl Into<String>,
    ) -> impl Future<Output = bool> + Send + 'static {
        let name = name.into();
        let session = self.clone();
        async move {
            let deleted = session.inner.store.delete(&name).await;
            if session.is_disposed() {
                return deleted;
            }
            if deleted {
                session.notify(format!("Configuration deleted: {}", name), FeedbackKind::Info);
                session.refresh_saved_configurations().await;
            } else {
                session.notify("Failed to delete configuration", FeedbackKind::Error);
            }
            deleted
        }
    }

    /// Export the current configuration into the default export directory.
    pub fn export_to_file(&self) -> impl Future<Output = Option<PathBuf>> + Send + 'static {
        self.export_to_directory(default_export_dir())
    }

    /// Export as `rpa_<name>_<millis>.json` inside `dir`.
    pub fn export_to_directory(
        &self,
        dir: impl Into<PathBuf>,
    ) -> impl Future<Output = Option<PathBuf>> + Send + 'static {
        let dir = dir.into();
        let config = self.generate_configuration();
        let file_name = format!(
            "rpa_{}_{}.json",
            sanitize_filename(&config.name, EXPORT_NAME_LENGTH),
            now_ms()
        );
        let path = dir.join(file_name);

        let session = self.clone();
        async move {
            let exported = session.inner.store.export_to(&config, &path).await;
            if session.is_disposed() {
                return exported.then_some(path);
            }
            if exported {
                session.notify(
                    format!("Exported {} actions to {}", config.entries.len(), dir.display()),
                    FeedbackKind::Success,
                );
                Some(path)
            } else {
                session.notify("Failed to export configuration", FeedbackKind::Error);
                None
            }
        }
    }

    /// Re-read the list of saved configuration names.
    pub fn refresh_saved_configurations(
        &self,
    ) -> impl Future<Output = Vec<String>> + Send + 'static {
        let session = self.clone();
        async move {
            let names: Vec<String> = session.inner.store.list().await.into_iter().collect();
            if !session.is_disposed() {
                session.inner.state.write().saved_configurations = names.clone();
                session.emit(SessionEvent::SavedConfigurationsChanged {
                    names: names.clone(),
                });
            }
            names
        }
    }

    fn apply_loaded(
        &self,
        loaded: Option<Configuration>,
        success: String,
        failure: &str,
    ) -> bool {
        if self.is_disposed() {
            return false;
        }
        let Some(config) = loaded else {
            self.notify(failure, FeedbackKind::Error);
            return false;
        };

        let actions = to_recorded_actions(&config, now_ms());
        let count = actions.len();
        self.mutate_log(|state| {
            state.log.replace_all(actions);
            state.selected.clear();
            state.editing = None;
            state.configuration_name = config.name.clone();
            state.configuration_description = config.description.clone();
        });
        self.emit_configuration_changed();
        tracing::info!("{} ({} actions)", success, count);
        self.notify(success, FeedbackKind::Success);
        true
    }

    // ------------------------------------------------------------------
    // Event sources and teardown
    // ------------------------------------------------------------------

    /// Feed actions from an event source. Needs a tokio runtime; returns
    /// `false` without one.
    pub fn attach_event_source(&self, mut rx: mpsc::Receiver<RecordedAction>) -> bool {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("No async runtime; event source not attached");
            return false;
        };

        let weak = Arc::downgrade(&self.inner);
        let task = handle.spawn(async move {
            while let Some(action) = rx.recv().await {
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                if inner.disposed.load(Ordering::SeqCst) {
                    break;
                }
                RecordingSession { inner }.record_event(action);
            }
            tracing::debug!("Event source closed");
        });
        self.track(task);
        true
    }

    /// Tear down: cancel timers, event pumps and background writes. Pending
    /// persistence futures still resolve but no longer touch session state.
    pub fn dispose(&self) {
        if self.inner.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.inner.abort_tasks();
        tracing::info!("Disposed recording session {}", self.inner.id);
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Run `f` against the state, then fix up the selection and notify.
    fn mutate_log<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let (result, count, selection) = {
            let mut state = self.inner.state.write();
            let before = state.selected.clone();
            let result = f(&mut state);
            state.prune_to_view();
            let selection = (state.selected != before)
                .then(|| state.selected.iter().copied().collect::<Vec<usize>>());
            (result, state.log.len(), selection)
        };

        self.emit(SessionEvent::ActionsChanged { count });
        if let Some(selected) = selection {
            self.emit(SessionEvent::SelectionChanged { selected });
        }
        result
    }

    fn notify(&self, text: impl Into<String>, kind: FeedbackKind) {
        if self.is_disposed() {
            return;
        }
        self.inner.feedback.show(text, kind);
    }

    fn emit(&self, event: SessionEvent) {
        self.inner.events.broadcast(event);
    }

    fn emit_configuration_changed(&self) {
        let (name, description) = {
            let state = self.inner.state.read();
            (
                state.configuration_name.clone(),
                state.configuration_description.clone(),
            )
        };
        self.emit(SessionEvent::ConfigurationChanged { name, description });
    }

    fn spawn_tracked<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.is_disposed() {
            tracing::debug!("Session {} disposed; not spawning", self.inner.id);
            return;
        }
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => self.track(handle.spawn(fut)),
            Err(_) => tracing::debug!("No async runtime; skipping background task"),
        }
    }

    fn track(&self, task: JoinHandle<()>) {
        let mut tasks = self.inner.tasks.lock();
        tasks.retain(|t| !t.is_finished());
        tasks.push(task);
    }
}

impl std::fmt::Debug for RecordingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.read();
        f.debug_struct("RecordingSession")
            .field("id", &self.inner.id)
            .field("state", &state.recording_state)
            .field("actions", &state.log.len())
            .finish()
    }
}

/// Convenience for tests and headless hosts: a session whose configurations
/// live in `root` on `storage`.
pub fn session_at(storage: Arc<dyn crate::storage::Storage>, root: &Path) -> RecordingSession {
    RecordingSession::new(ConfigurationStore::new(storage, root), None)
}
