//! Storage port and reference adapters
//!
//! The engine persists three named JSON records through [`StoragePort`]
//! and never touches a concrete store directly. Adapters are expected
//! to behave like a key-value store: `get` returns only the keys that
//! exist, `set` overwrites whole records, and a write acknowledged once
//! is durable as far as the engine is concerned.
//!
//! Two adapters ship with the crate: [`MemoryStore`] for tests and
//! demos, and [`FileStore`] keeping all records in a single JSON file.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

/// Record name of the prompt collection.
pub const PROMPTS_KEY: &str = "prompts";
/// Record name of the tag taxonomy.
pub const TAGS_KEY: &str = "availableTags";
/// Record name of the persisted filter/sort selection.
pub const SETTINGS_KEY: &str = "filterSettings";

/// Asynchronous key-value storage over named JSON records.
///
/// The engine issues one write per logical operation and awaits the
/// acknowledgment before anything depends on it. Retries, if wanted,
/// belong to the adapter. Failures abort the in-flight operation and
/// propagate to the caller unmodified.
#[async_trait]
pub trait StoragePort: Send + Sync {
    /// Fetch the named records. Keys with no stored value are simply
    /// absent from the result.
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, Value>>;

    /// Store every entry, overwriting existing records of the same name.
    async fn set(&self, entries: HashMap<String, Value>) -> Result<()>;

    /// Delete the named records. Unknown keys are ignored.
    async fn remove(&self, keys: &[&str]) -> Result<()>;
}

/// In-memory adapter. Contents live as long as the value does.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a record, for setting up test fixtures.
    pub async fn seed(&self, key: &str, value: Value) {
        self.records.lock().await.insert(key.to_string(), value);
    }

    /// Read back a stored record, for asserting on persisted state.
    pub async fn snapshot(&self, key: &str) -> Option<Value> {
        self.records.lock().await.get(key).cloned()
    }
}

#[async_trait]
impl StoragePort for MemoryStore {
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, Value>> {
        let records = self.records.lock().await;
        Ok(keys
            .iter()
            .filter_map(|&k| records.get(k).map(|v| (k.to_string(), v.clone())))
            .collect())
    }

    async fn set(&self, entries: HashMap<String, Value>) -> Result<()> {
        self.records.lock().await.extend(entries);
        Ok(())
    }

    async fn remove(&self, keys: &[&str]) -> Result<()> {
        let mut records = self.records.lock().await;
        for key in keys {
            records.remove(*key);
        }
        Ok(())
    }
}

/// File-backed adapter storing every record in one JSON object.
///
/// A missing file reads as an empty store. Writes re-serialize the
/// whole object, which matches the engine's whole-collection persist
/// model.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    async fn read_all(&self) -> Result<HashMap<String, Value>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => serde_json::from_str(&content)
                .with_context(|| format!("could not parse store file {}", self.path.display())),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(err) => Err(err)
                .with_context(|| format!("could not read store file {}", self.path.display())),
        }
    }

    async fn write_all(&self, records: &HashMap<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("could not create directory {}", parent.display()))?;
        }

        let content =
            serde_json::to_string_pretty(records).context("could not serialize store contents")?;

        tokio::fs::write(&self.path, content)
            .await
            .with_context(|| format!("could not write store file {}", self.path.display()))
    }
}

#[async_trait]
impl StoragePort for FileStore {
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, Value>> {
        let mut records = self.read_all().await?;
        Ok(keys
            .iter()
            .filter_map(|&k| records.remove(k).map(|v| (k.to_string(), v)))
            .collect())
    }

    async fn set(&self, entries: HashMap<String, Value>) -> Result<()> {
        let mut records = self.read_all().await?;
        records.extend(entries);
        self.write_all(&records).await
    }

    async fn remove(&self, keys: &[&str]) -> Result<()> {
        let mut records = self.read_all().await?;
        for key in keys {
            records.remove(*key);
        }
        self.write_all(&records).await
    }
}
