//! File-system-like storage collaborator.
//!
//! The recorder never touches the disk directly; everything goes through a
//! [`Storage`] so the host can supply its own backend (or none, in which case
//! [`FsStorage`] is used).

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[async_trait]
pub trait Storage: Send + Sync {
    async fn read(&self, path: &Path) -> io::Result<String>;

    /// Write `content`, creating parent directories as needed.
    async fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Files directly inside `dir`. A missing directory lists as empty.
    async fn list(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    async fn remove(&self, path: &Path) -> io::Result<()>;

    async fn exists(&self, path: &Path) -> bool;
}

/// Local disk backend on `tokio::fs`.
#[derive(Debug, Clone, Default)]
pub struct FsStorage;

impl FsStorage {
    pub fn new() -> Self {
        Self
    }

    pub fn shared() -> Arc<dyn Storage> {
        Arc::new(Self)
    }
}

#[async_trait]
impl Storage for FsStorage {
    async fn read(&self, path: &Path) -> io::Result<String> {
        tokio::fs::read_to_string(path).await
    }

    async fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        // Write to a sibling temp file first so readers never see a torn file.
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp_path = PathBuf::from(tmp);
        tokio::fs::write(&tmp_path, content).await?;
        tokio::fs::rename(&tmp_path, path).await
    }

    async fn list(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }

    async fn remove(&self, path: &Path) -> io::Result<()> {
        tokio::fs::remove_file(path).await
    }

    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }
}

/// In-process backend. Used when the host wants nothing on disk, and in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    files: Arc<Mutex<BTreeMap<PathBuf, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file_count(&self) -> usize {
        self.files.lock().len()
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("{} not found", path.display()))
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn read(&self, path: &Path) -> io::Result<String> {
        self.files
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| not_found(path))
    }

    async fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        self.files
            .lock()
            .insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    async fn list(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        Ok(self
            .files
            .lock()
            .keys()
            .filter(|p| p.parent() == Some(dir))
            .cloned()
            .collect())
    }

    async fn remove(&self, path: &Path) -> io::Result<()> {
        self.files
            .lock()
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| not_found(path))
    }

    async fn exists(&self, path: &Path) -> bool {
        self.files.lock().contains_key(path)
    }
}

/// [`MemoryStorage`] that yields to the scheduler before every call, so
/// concurrent callers interleave the way they would on a real disk.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub(crate) struct YieldingStorage(pub MemoryStorage);

#[cfg(test)]
#[async_trait]
impl Storage for YieldingStorage {
    async fn read(&self, path: &Path) -> io::Result<String> {
        tokio::task::yield_now().await;
        self.0.read(path).await
    }

    async fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        tokio::task::yield_now().await;
        self.0.write(path, content).await
    }

    async fn list(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        tokio::task::yield_now().await;
        self.0.list(dir).await
    }

    async fn remove(&self, path: &Path) -> io::Result<()> {
        tokio::task::yield_now().await;
        self.0.remove(path).await
    }

    async fn exists(&self, path: &Path) -> bool {
        tokio::task::yield_now().await;
        self.0.exists(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_storage_crud() {
        let storage = MemoryStorage::new();
        let dir = Path::new("/cfg/configurations");
        let file = dir.join("a.json");

        assert!(!storage.exists(&file).await);
        storage.write(&file, "{}").await.unwrap();
        storage.write(Path::new("/cfg/settings.toml"), "").await.unwrap();

        assert_eq!(storage.read(&file).await.unwrap(), "{}");
        assert_eq!(storage.list(dir).await.unwrap(), vec![file.clone()]);

        storage.remove(&file).await.unwrap();
        assert!(storage.remove(&file).await.is_err());
        assert!(storage.read(&file).await.is_err());
        assert_eq!(storage.file_count(), 1);
    }

    #[tokio::test]
    async fn test_fs_storage_roundtrip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let storage = FsStorage::new();
        let file = tmp.path().join("nested").join("one.json");

        storage.write(&file, "hello").await.unwrap();
        assert!(storage.exists(&file).await);
        assert_eq!(storage.read(&file).await.unwrap(), "hello");

        let listed = storage.list(&tmp.path().join("nested")).await.unwrap();
        assert_eq!(listed, vec![file.clone()]);

        storage.remove(&file).await.unwrap();
        assert!(!storage.exists(&file).await);
    }

    #[tokio::test]
    async fn test_fs_storage_missing_dir_lists_empty() {
        let tmp = tempfile::TempDir::new().unwrap();
        let listed = FsStorage::new()
            .list(&tmp.path().join("nope"))
            .await
            .unwrap();
        assert!(listed.is_empty());
    }
}
