//! Configuration store: named configurations under
//! `<root>/configurations/<key>.json`.
//!
//! Every public operation is best-effort. Failures are logged and reported as
//! `false` / `None`, never returned as errors.
//!
//! Keys come from [`sanitize_key`]. Two names that sanitize to the same key
//! (for example `"a b"` and `"a_b"`) share one file; the later save wins.

use crate::configuration::schema::Configuration;
use crate::error::{RecorderError, Result};
use crate::settings::{configurations_dir, default_root, SettingsManager};
use crate::storage::{FsStorage, Storage};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Upper bound on storage key length.
pub const MAX_KEY_LENGTH: usize = 100;

/// Replace every character outside `[A-Za-z0-9_-]` with `_` and keep at most
/// `max_len` characters.
pub fn sanitize_filename(name: &str, max_len: usize) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .take(max_len)
        .collect()
}

/// Storage key for a configuration name.
pub fn sanitize_key(name: &str) -> String {
    sanitize_filename(name, MAX_KEY_LENGTH)
}

#[derive(Clone)]
pub struct ConfigurationStore {
    storage: Arc<dyn Storage>,
    root: PathBuf,
    settings: SettingsManager,
}

impl ConfigurationStore {
    pub fn new(storage: Arc<dyn Storage>, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let settings = SettingsManager::new(Arc::clone(&storage), &root);
        Self {
            storage,
            root,
            settings,
        }
    }

    /// Local disk under the per-user config directory.
    pub fn open_default() -> Self {
        Self::new(FsStorage::shared(), default_root())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn settings(&self) -> &SettingsManager {
        &self.settings
    }

    pub fn configuration_path(&self, name: &str) -> PathBuf {
        configurations_dir(&self.root).join(format!("{}.json", sanitize_key(name)))
    }

    /// Save under the name's key, overwriting any previous file.
    pub async fn save(&self, config: &Configuration) -> bool {
        match self.try_save(config).await {
            Ok(path) => {
                tracing::info!("Saved configuration {:?} to {:?}", config.name, path);
                let name = config.name.clone();
                self.settings
                    .update(move |s| s.remember_configuration(&name))
                    .await;
                true
            }
            Err(e) => {
                tracing::warn!("Failed to save configuration {:?}: {}", config.name, e);
                false
            }
        }
    }

    pub async fn load(&self, name: &str) -> Option<Configuration> {
        let path = self.configuration_path(name);
        match self.read_configuration(&path).await {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!("Failed to load configuration {:?} from {:?}: {}", name, path, e);
                None
            }
        }
    }

    /// Names of the configurations currently on storage. Unreadable files
    /// are skipped.
    pub async fn list(&self) -> BTreeSet<String> {
        let dir = configurations_dir(&self.root);
        let files = match self.storage.list(&dir).await {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!("Failed to list configurations in {:?}: {}", dir, e);
                return BTreeSet::new();
            }
        };

        let mut names = BTreeSet::new();
        for path in files {
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            match self.read_configuration(&path).await {
                Ok(config) => {
                    names.insert(config.name);
                }
                Err(e) => tracing::warn!("Skipping unreadable configuration {:?}: {}", path, e),
            }
        }
        names
    }

    /// `false` when nothing was stored under the name.
    pub async fn delete(&self, name: &str) -> bool {
        let path = self.configuration_path(name);
        if !self.storage.exists(&path).await {
            tracing::debug!("No configuration {:?} to delete at {:?}", name, path);
            return false;
        }

        match self.storage.remove(&path).await {
            Ok(()) => {
                tracing::info!("Deleted configuration {:?}", name);
                let name = name.to_string();
                self.settings
                    .update(move |s| s.forget_configuration(&name))
                    .await;
                true
            }
            Err(e) => {
                tracing::warn!("Failed to delete configuration {:?}: {}", name, e);
                false
            }
        }
    }

    /// Write to an arbitrary path and remember its directory as the last
    /// export location.
    pub async fn export_to(&self, config: &Configuration, path: &Path) -> bool {
        match self.write_configuration(config, path).await {
            Ok(()) => {
                tracing::info!("Exported configuration {:?} to {:?}", config.name, path);
                let parent = path
                    .parent()
                    .map(|p| p.to_string_lossy().into_owned())
                    .unwrap_or_default();
                self.settings
                    .update(move |s| s.last_export_path = parent)
                    .await;
                true
            }
            Err(e) => {
                tracing::warn!("Failed to export configuration to {:?}: {}", path, e);
                false
            }
        }
    }

    pub async fn import_from(&self, path: &Path) -> Option<Configuration> {
        match self.read_configuration(path).await {
            Ok(config) => {
                tracing::info!("Imported configuration {:?} from {:?}", config.name, path);
                Some(config)
            }
            Err(e) => {
                tracing::warn!("Failed to import configuration from {:?}: {}", path, e);
                None
            }
        }
    }

    async fn try_save(&self, config: &Configuration) -> Result<PathBuf> {
        if sanitize_key(&config.name).is_empty() {
            return Err(RecorderError::Validation(
                "Configuration name cannot be empty".to_string(),
            ));
        }
        let path = self.configuration_path(&config.name);
        self.write_configuration(config, &path).await?;
        Ok(path)
    }

    async fn read_configuration(&self, path: &Path) -> Result<Configuration> {
        if !self.storage.exists(path).await {
            return Err(RecorderError::NotFound(path.display().to_string()));
        }
        let content = self.storage.read(path).await?;
        Configuration::from_json(&content)
    }

    async fn write_configuration(&self, config: &Configuration, path: &Path) -> Result<()> {
        let content = config.to_json_pretty()?;
        self.storage.write(path, &content).await?;
        Ok(())
    }
}
