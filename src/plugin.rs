//! Host integration: plugin metadata, the browser-service seam and
//! registration.

use crate::configuration::store::ConfigurationStore;
use crate::recording::schema::RecordedAction;
use crate::recording::session::RecordingSession;
use crate::settings::default_root;
use crate::storage::{FsStorage, Storage};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

pub const PLUGIN_ID: &str = "ai.rever.boss.plugin.dynamic.rparecorder";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginInfo {
    pub id: String,
    pub display_name: String,
    pub version: String,
    pub description: String,
}

/// Browser integration supplied by the host. Optional: without one the
/// recorder works in manual-entry mode.
pub trait BrowserService: Send + Sync {
    fn name(&self) -> &str;

    /// URL of the page currently shown, if any.
    fn current_url(&self) -> Option<String>;

    /// Hand over the stream of captured interactions. Only the first call
    /// returns a receiver.
    fn take_event_stream(&self) -> Option<mpsc::Receiver<RecordedAction>>;
}

/// What the host provides at registration time.
#[derive(Default, Clone)]
pub struct PluginContext {
    pub browser_service: Option<Arc<dyn BrowserService>>,
    pub storage: Option<Arc<dyn Storage>>,
    /// Directory holding settings and configurations. Defaults to the
    /// per-user config directory.
    pub storage_root: Option<PathBuf>,
}

pub struct RecorderPlugin;

impl RecorderPlugin {
    pub fn info() -> PluginInfo {
        PluginInfo {
            id: PLUGIN_ID.to_string(),
            display_name: "RPA Recorder".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: "Record browser interactions and export them as RPA configurations"
                .to_string(),
        }
    }

    /// Build a session for the host. Within a tokio runtime the persisted
    /// view mode and the saved configuration list are loaded in the
    /// background. When a browser service is present its event stream is
    /// attached and its current URL seeds the session.
    pub fn register(ctx: PluginContext) -> RecordingSession {
        let storage = ctx.storage.unwrap_or_else(FsStorage::shared);
        let root = ctx.storage_root.unwrap_or_else(default_root);
        let store = ConfigurationStore::new(storage, root);

        let session = RecordingSession::new(store, ctx.browser_service.clone());
        tracing::info!("Registered {} v{}", PLUGIN_ID, env!("CARGO_PKG_VERSION"));

        session.load_persisted_state();

        if let Some(browser) = ctx.browser_service {
            if let Some(url) = browser.current_url() {
                session.update_current_url(url);
            }
            match browser.take_event_stream() {
                Some(rx) => {
                    session.attach_event_source(rx);
                }
                None => tracing::warn!("Browser service {} has no event stream", browser.name()),
            }
        }
        session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::generator::generate;
    use std::path::Path;
    use crate::recording::schema::{ActionKind, RecordingState, Selector, ViewMode};
    use crate::settings::SettingsManager;
    use crate::storage::MemoryStorage;
    use parking_lot::Mutex;

    struct FakeBrowser {
        stream: Mutex<Option<mpsc::Receiver<RecordedAction>>>,
    }

    impl BrowserService for FakeBrowser {
        fn name(&self) -> &str {
            "fake"
        }

        fn current_url(&self) -> Option<String> {
            Some("https://start.example".to_string())
        }

        fn take_event_stream(&self) -> Option<mpsc::Receiver<RecordedAction>> {
            self.stream.lock().take()
        }
    }

    fn memory_context() -> PluginContext {
        PluginContext {
            browser_service: None,
            storage: Some(Arc::new(MemoryStorage::new())),
            storage_root: Some(PathBuf::from("/plugin")),
        }
    }

    fn context_on(storage: &MemoryStorage) -> PluginContext {
        PluginContext {
            storage: Some(Arc::new(storage.clone())),
            storage_root: Some(PathBuf::from("/plugin")),
            ..Default::default()
        }
    }

    async fn settle() {
        for _ in 0..50 {
            tokio::task::yield_now().await;
        }
    }

    #[test]
    fn test_plugin_info() {
        let info = RecorderPlugin::info();
        assert_eq!(info.id, "ai.rever.boss.plugin.dynamic.rparecorder");
        assert_eq!(info.display_name, "RPA Recorder");
        assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_register_without_browser() {
        let session = RecorderPlugin::register(memory_context());
        assert!(!session.has_browser_service());
        assert_eq!(session.store().root(), std::path::Path::new("/plugin"));
        assert!(session.current_url().is_empty());
    }

    #[tokio::test]
    async fn test_register_with_browser_attaches_stream() {
        let (tx, rx) = mpsc::channel(4);
        let ctx = PluginContext {
            browser_service: Some(Arc::new(FakeBrowser {
                stream: Mutex::new(Some(rx)),
            })),
            ..memory_context()
        };
        let session = RecorderPlugin::register(ctx);
        assert!(session.has_browser_service());
        assert_eq!(session.current_url(), "https://start.example");

        session.start_recording();
        assert_eq!(session.recording_state(), RecordingState::Recording);
        assert_eq!(
            session.feedback().map(|m| m.text),
            Some("Recording started - browser integration active".to_string())
        );

        tx.send(RecordedAction::new(ActionKind::Click, Selector::css("#x")))
            .await
            .unwrap();
        drop(tx);
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(session.actions().len(), 1);
        session.dispose();
    }

    #[tokio::test]
    async fn test_register_restores_view_mode() {
        let storage = MemoryStorage::new();
        let settings = SettingsManager::new(Arc::new(storage.clone()), Path::new("/plugin"));
        assert!(settings.update(|s| s.default_view_mode = ViewMode::Editor).await);

        let session = RecorderPlugin::register(context_on(&storage));
        settle().await;
        assert_eq!(session.view_mode(), ViewMode::Editor);
    }

    #[tokio::test]
    async fn test_chosen_view_mode_survives_restore() {
        let storage = MemoryStorage::new();
        let settings = SettingsManager::new(Arc::new(storage.clone()), Path::new("/plugin"));
        assert!(settings.update(|s| s.default_view_mode = ViewMode::Editor).await);

        let session = RecorderPlugin::register(context_on(&storage));
        session.set_view_mode(ViewMode::Raw);
        settle().await;
        assert_eq!(session.view_mode(), ViewMode::Raw);

        // Flush queued settings writes, then read back with no cache.
        assert!(session.store().settings().update(|_| {}).await);
        let persisted = SettingsManager::new(Arc::new(storage), Path::new("/plugin"))
            .load()
            .await;
        assert_eq!(persisted.default_view_mode, ViewMode::Raw);
    }

    #[tokio::test]
    async fn test_register_loads_saved_configurations() {
        let storage = MemoryStorage::new();
        let store = ConfigurationStore::new(Arc::new(storage.clone()), "/plugin");
        assert!(store.save(&generate(&[], "existing", "")).await);

        let session = RecorderPlugin::register(context_on(&storage));
        settle().await;
        assert_eq!(session.saved_configurations(), vec!["existing"]);
    }

    #[tokio::test]
    async fn test_dispose_stops_startup_loading() {
        let storage = MemoryStorage::new();
        let store = ConfigurationStore::new(Arc::new(storage.clone()), "/plugin");
        assert!(store.save(&generate(&[], "existing", "")).await);

        let session = RecorderPlugin::register(context_on(&storage));
        session.dispose();
        settle().await;
        assert!(session.saved_configurations().is_empty());
    }
}
