//! Key-value collaborators backing the persisted preferences and id sets
//!
//! The core only ever sees [`KeyValueStore`]. Writes are fire-and-forget:
//! an implementation that fails to persist logs the failure and moves on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{FilterError, Result};

/// Opaque string key-value storage
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore {
    fn get_value(&self, key: &str) -> Option<String>;
    fn set_value(&mut self, key: &str, value: &str);
    fn delete_value(&mut self, key: &str);
}

/// In-memory store, used by tests and as a scratch store
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_value(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set_value(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    fn delete_value(&mut self, key: &str) {
        self.values.remove(key);
    }
}

/// On-disk layout of [`JsonFileStore`]
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreFile {
    updated_at: DateTime<Utc>,
    #[serde(default)]
    values: BTreeMap<String, String>,
}

/// Store persisted as a single JSON document, written through on every change
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
    updated_at: DateTime<Utc>,
}

impl JsonFileStore {
    /// Empty store that will be written to `path` on the first change
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            values: BTreeMap::new(),
            updated_at: Utc::now(),
        }
    }

    /// Load the store from disk, starting empty if the file does not exist
    pub async fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No store file at {:?}, starting empty", path);
            return Ok(Self::new(path));
        }

        let json = tokio::fs::read_to_string(path).await?;
        Self::from_json(path, &json)
    }

    /// Load the store synchronously (for use in non-async contexts)
    pub fn load_sync(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No store file at {:?}, starting empty", path);
            return Ok(Self::new(path));
        }

        let json = std::fs::read_to_string(path)?;
        Self::from_json(path, &json)
    }

    fn from_json(path: &Path, json: &str) -> Result<Self> {
        let file: StoreFile = serde_json::from_str(json)
            .map_err(|e| FilterError::StateError(format!("Failed to parse store file: {}", e)))?;

        debug!("Loaded {} values from {:?}", file.values.len(), path);
        Ok(Self {
            path: path.to_path_buf(),
            values: file.values,
            updated_at: file.updated_at,
        })
    }

    /// Write the store to disk
    pub async fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&self.path, self.to_json()?).await?;
        Ok(())
    }

    /// Write the store synchronously
    pub fn save_sync(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&self.path, self.to_json()?)?;
        Ok(())
    }

    fn to_json(&self) -> Result<String> {
        let file = StoreFile {
            updated_at: self.updated_at,
            values: self.values.clone(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn write_through(&mut self) {
        self.updated_at = Utc::now();
        if let Err(e) = self.save_sync() {
            warn!("Failed to write store file {:?}: {}", self.path, e);
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get_value(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set_value(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
        self.write_through();
    }

    fn delete_value(&mut self, key: &str) {
        if self.values.remove(key).is_some() {
            self.write_through();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert!(store.is_empty());
        store.set_value("a", "1");
        assert_eq!(store.get_value("a").as_deref(), Some("1"));
        store.delete_value("a");
        assert_eq!(store.get_value("a"), None);
    }

    #[test]
    fn test_file_store_writes_through() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let mut store = JsonFileStore::load_sync(&path).unwrap();
        store.set_value("FilterThreads.FAVORITES", "[1,2]");
        assert!(path.exists());

        let reloaded = JsonFileStore::load_sync(&path).unwrap();
        assert_eq!(
            reloaded.get_value("FilterThreads.FAVORITES").as_deref(),
            Some("[1,2]")
        );
    }

    #[tokio::test]
    async fn test_file_store_async_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");

        let mut store = JsonFileStore::new(&path);
        store.set_value("k", "v");
        store.delete_value("missing");
        store.save().await.unwrap();

        let loaded = JsonFileStore::load(&path).await.unwrap();
        assert_eq!(loaded.get_value("k").as_deref(), Some("v"));
    }

    #[test]
    fn test_file_store_load_nonexistent() {
        let store = JsonFileStore::load_sync(Path::new("/nonexistent/store.json")).unwrap();
        assert_eq!(store.get_value("anything"), None);
    }

    #[test]
    fn test_file_store_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "not json").unwrap();

        let result = JsonFileStore::load_sync(&path);
        assert!(matches!(result, Err(FilterError::StateError(_))));
    }
}
