use crate::error::Result;
use crate::settings::schema::RecorderSettings;
use crate::storage::Storage;
use parking_lot::{Mutex, RwLock};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

const APP_DIR: &str = "rparecorder";
const SETTINGS_FILE: &str = "settings.toml";
const CONFIGURATIONS_DIR: &str = "configurations";

/// Root directory for everything the recorder persists.
pub fn default_root() -> PathBuf {
    dirs::config_dir()
        .map(|p| p.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(".").join(APP_DIR))
}

pub fn settings_path(root: &Path) -> PathBuf {
    root.join(SETTINGS_FILE)
}

pub fn configurations_dir(root: &Path) -> PathBuf {
    root.join(CONFIGURATIONS_DIR)
}

/// Downloads if it exists, else home, else the working directory.
pub fn default_export_dir() -> PathBuf {
    dirs::download_dir()
        .filter(|p| p.is_dir())
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// A queued settings change.
type Change = Box<dyn FnOnce(&mut RecorderSettings) + Send>;

/// Loads and saves [`RecorderSettings`], caching the last value seen.
///
/// Writes are serialized. Changes passed to [`SettingsManager::update`] are
/// queued when `update` is called and applied in that order, so a write
/// started later always includes every change queued before it.
#[derive(Clone)]
pub struct SettingsManager {
    storage: Arc<dyn Storage>,
    path: PathBuf,
    cached: Arc<RwLock<Option<RecorderSettings>>>,
    pending: Arc<Mutex<Vec<Change>>>,
    write_lock: Arc<tokio::sync::Mutex<()>>,
    last_write_ok: Arc<AtomicBool>,
}

impl SettingsManager {
    pub fn new(storage: Arc<dyn Storage>, root: &Path) -> Self {
        Self {
            storage,
            path: settings_path(root),
            cached: Arc::new(RwLock::new(None)),
            pending: Arc::new(Mutex::new(Vec::new())),
            write_lock: Arc::new(tokio::sync::Mutex::new(())),
            last_write_ok: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings. A missing file is created with defaults; an unreadable
    /// or corrupt one yields defaults without being overwritten.
    pub async fn load(&self) -> RecorderSettings {
        let cached = self.cached.read().clone();
        if let Some(settings) = cached {
            return settings;
        }

        let _guard = self.write_lock.lock().await;
        self.load_locked().await
    }

    /// Persist settings. The cache is updated even when the write fails.
    pub async fn save(&self, settings: RecorderSettings) -> bool {
        let _guard = self.write_lock.lock().await;
        self.save_locked(settings).await
    }

    /// Queue `f` and write the result. The change is queued before this
    /// returns, even if the future is never polled by the caller.
    pub fn update<F>(&self, f: F) -> impl Future<Output = bool> + Send + 'static
    where
        F: FnOnce(&mut RecorderSettings) + Send + 'static,
    {
        self.pending.lock().push(Box::new(f));
        let manager = self.clone();
        async move { manager.flush().await }
    }

    /// Apply every queued change in one write. A flush that finds the queue
    /// already drained reports the outcome of the write that took it.
    async fn flush(&self) -> bool {
        let _guard = self.write_lock.lock().await;
        let changes: Vec<Change> = std::mem::take(&mut *self.pending.lock());
        if changes.is_empty() {
            return self.last_write_ok.load(Ordering::SeqCst);
        }

        let mut settings = self.load_locked().await;
        for change in changes {
            change(&mut settings);
        }
        self.save_locked(settings).await
    }

    async fn load_locked(&self) -> RecorderSettings {
        let cached = self.cached.read().clone();
        if let Some(settings) = cached {
            return settings;
        }

        let settings = if self.storage.exists(&self.path).await {
            match self.read_from_storage().await {
                Ok(settings) => {
                    tracing::debug!("Loaded recorder settings from {:?}", self.path);
                    settings
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to read settings from {:?}: {}. Using defaults.",
                        self.path,
                        e
                    );
                    RecorderSettings::default()
                }
            }
        } else {
            tracing::info!(
                "Settings file not found at {:?}, creating default",
                self.path
            );
            let settings = RecorderSettings::default();
            self.save_locked(settings.clone()).await;
            settings
        };

        *self.cached.write() = Some(settings.clone());
        settings
    }

    async fn save_locked(&self, settings: RecorderSettings) -> bool {
        *self.cached.write() = Some(settings.clone());
        let ok = match self.write_to_storage(&settings).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to write settings to {:?}: {}", self.path, e);
                false
            }
        };
        self.last_write_ok.store(ok, Ordering::SeqCst);
        ok
    }

    async fn read_from_storage(&self) -> Result<RecorderSettings> {
        let content = self.storage.read(&self.path).await?;
        Ok(toml::from_str(&content)?)
    }

    async fn write_to_storage(&self, settings: &RecorderSettings) -> Result<()> {
        let content = toml::to_string_pretty(settings)?;
        self.storage.write(&self.path, &content).await?;
        Ok(())
    }
}
