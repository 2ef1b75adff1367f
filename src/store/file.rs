//! Key-value store backed by a JSON file.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{KeyValueStore, StoreResult};

/// File name used inside the data directory.
pub const DEFAULT_FILE_NAME: &str = "device_state.json";

/// Durable per-device storage in a single JSON object file.
///
/// Writes go to a sibling temporary file which is then renamed over the
/// original, so a crash mid-write leaves the previous contents intact.
#[derive(Debug)]
pub struct FileKeyValueStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileKeyValueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Store at [`DEFAULT_FILE_NAME`] inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(DEFAULT_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> StoreResult<BTreeMap<String, String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, values: &BTreeMap<String, String>) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let content = serde_json::to_string_pretty(values)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let _guard = self.lock.lock().await;
        let mut values = self.load().await?;
        values.insert(key.to_string(), value.to_string());
        self.save(&values).await
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        let _guard = self.lock.lock().await;
        let mut values = match self.load().await {
            Ok(values) => values,
            // A corrupt file holds nothing worth keeping
            Err(super::StoreError::Malformed(_)) => return self.save(&BTreeMap::new()).await,
            Err(e) => return Err(e),
        };
        if values.remove(key).is_none() {
            return Ok(());
        }
        self.save(&values).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::in_dir(dir.path());
        assert_eq!(store.get("active_session_id").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_survives_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = FileKeyValueStore::in_dir(dir.path());
            store.set("active_session_id", "abc").await.unwrap();
        }

        let reopened = FileKeyValueStore::in_dir(dir.path());
        assert_eq!(
            reopened.get("active_session_id").await.unwrap(),
            Some("abc".into())
        );
    }

    #[tokio::test]
    async fn test_remove() {
        let dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::in_dir(dir.path());
        store.set("a", "1").await.unwrap();
        store.set("b", "2").await.unwrap();

        store.remove("a").await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), None);
        assert_eq!(store.get("b").await.unwrap(), Some("2".into()));

        store.remove("missing").await.unwrap();
    }

    #[tokio::test]
    async fn test_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::in_dir(dir.path().join("nested/state"));
        store.set("k", "v").await.unwrap();
        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn test_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::in_dir(dir.path());
        std::fs::write(store.path(), "{ not json").unwrap();

        assert!(matches!(
            store.get("k").await,
            Err(StoreError::Malformed(_))
        ));

        // Removing from a corrupt file resets it
        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }
}
