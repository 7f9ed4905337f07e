//! Document store seam used by the favorites repository.
//!
//! The store is a black box holding JSON documents grouped in named
//! collections and addressed by a string key.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::{Error, Result};

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>>;

    /// Insert or overwrite the document at `key`.
    async fn put(&self, collection: &str, key: &str, document: Value) -> Result<()>;

    /// Delete the document at `key`. Missing keys are not an error.
    async fn delete(&self, collection: &str, key: &str) -> Result<()>;

    /// All documents whose top-level `field` equals `value`.
    async fn query_eq(&self, collection: &str, field: &str, value: &Value) -> Result<Vec<Value>>;
}

type Collections = HashMap<String, BTreeMap<String, Value>>;

fn matching(docs: Option<&BTreeMap<String, Value>>, field: &str, value: &Value) -> Vec<Value> {
    docs.map(|docs| {
        docs.values()
            .filter(|doc| doc.get(field) == Some(value))
            .cloned()
            .collect()
    })
    .unwrap_or_default()
}

#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<Collections>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, BTreeMap::len)
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).and_then(|c| c.get(key)).cloned())
    }

    async fn put(&self, collection: &str, key: &str, document: Value) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), document);
        Ok(())
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        if let Some(docs) = collections.get_mut(collection) {
            docs.remove(key);
        }
        Ok(())
    }

    async fn query_eq(&self, collection: &str, field: &str, value: &Value) -> Result<Vec<Value>> {
        let collections = self.collections.read().await;
        Ok(matching(collections.get(collection), field, value))
    }
}

/// Keeps each collection in `<dir>/<collection>.json`, rewritten on every
/// mutation.
pub struct JsonFileDocumentStore {
    dir: PathBuf,
    // serializes read-modify-write cycles on the files
    lock: RwLock<()>,
}

impl JsonFileDocumentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock: RwLock::new(()),
        }
    }

    fn path(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{collection}.json"))
    }

    fn load(path: &Path) -> Result<BTreeMap<String, Value>> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(|e| {
            Error::upstream(None, format!("corrupt collection {}: {e}", path.display()))
        })
    }

    fn save(&self, path: &Path, docs: &BTreeMap<String, Value>) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        let content = serde_json::to_string_pretty(docs)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for JsonFileDocumentStore {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>> {
        let _guard = self.lock.read().await;
        let mut docs = Self::load(&self.path(collection))?;
        Ok(docs.remove(key))
    }

    async fn put(&self, collection: &str, key: &str, document: Value) -> Result<()> {
        let _guard = self.lock.write().await;
        let path = self.path(collection);
        let mut docs = Self::load(&path)?;
        docs.insert(key.to_string(), document);
        self.save(&path, &docs)
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<()> {
        let _guard = self.lock.write().await;
        let path = self.path(collection);
        let mut docs = Self::load(&path)?;
        if docs.remove(key).is_some() {
            self.save(&path, &docs)?;
        }
        Ok(())
    }

    async fn query_eq(&self, collection: &str, field: &str, value: &Value) -> Result<Vec<Value>> {
        let _guard = self.lock.read().await;
        let docs = Self::load(&self.path(collection))?;
        Ok(matching(Some(&docs), field, value))
    }
}
