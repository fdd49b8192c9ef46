/*!
 * Preference store backends.
 *
 * - `MemoryPreferenceStore`: process-local map, used by tests and embedders
 * - `JsonFilePreferenceStore`: a JSON object on disk, one entry per key
 */

use async_trait::async_trait;
use log::debug;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::errors::PreferenceError;

/// Async key-value persistence for preferences.
///
/// No transactional guarantees: concurrent writers are last-write-wins per key.
#[async_trait]
pub trait PreferenceStore: Send + Sync + Debug {
    /// Read a key; `Ok(None)` when it was never written
    async fn get(&self, key: &str) -> Result<Option<Value>, PreferenceError>;

    /// Write a single key
    async fn set(&self, key: &str, value: Value) -> Result<(), PreferenceError>;
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferenceStore {
    values: Arc<RwLock<HashMap<String, Value>>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with `values`
    pub fn with_values<I, K>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let map = values.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self {
            values: Arc::new(RwLock::new(map)),
        }
    }

    /// Snapshot of a raw stored value
    pub fn raw(&self, key: &str) -> Option<Value> {
        self.values.read().get(key).cloned()
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferenceStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, PreferenceError> {
        Ok(self.values.read().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), PreferenceError> {
        self.values.write().insert(key.to_string(), value);
        Ok(())
    }
}

/// Store persisted as a single JSON object file
#[derive(Debug)]
pub struct JsonFilePreferenceStore {
    path: PathBuf,
    cache: Mutex<Option<Map<String, Value>>>,
}

impl JsonFilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: Mutex::new(None),
        }
    }

    /// `<config dir>/pinyin-annotator/preferences.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pinyin-annotator").join("preferences.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_file(&self) -> Result<Map<String, Value>, PreferenceError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(Map::new()),
            Ok(content) => match serde_json::from_str::<Value>(&content)? {
                Value::Object(map) => Ok(map),
                other => Err(PreferenceError::Backend(format!(
                    "Expected a JSON object in {:?}, found {}",
                    self.path, other
                ))),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl PreferenceStore for JsonFilePreferenceStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, PreferenceError> {
        let mut cache = self.cache.lock().await;
        if cache.is_none() {
            *cache = Some(self.read_file().await?);
        }
        Ok(cache.as_ref().and_then(|map| map.get(key).cloned()))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), PreferenceError> {
        let mut cache = self.cache.lock().await;
        let mut map = match cache.take() {
            Some(map) => map,
            None => self.read_file().await?,
        };
        map.insert(key.to_string(), value);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let content = serde_json::to_string_pretty(&Value::Object(map.clone()))?;
        tokio::fs::write(&self.path, content).await?;
        debug!("Stored preference '{}' in {:?}", key, self.path);

        *cache = Some(map);
        Ok(())
    }
}
