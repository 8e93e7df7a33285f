use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::KvStore;
use crate::db::{DbPool, queries};
use crate::error::{AppError, Result};

/// Key-value store backed by the `kv_entries` table of the relational pool.
#[derive(Clone)]
pub struct SqliteKvStore {
    db: DbPool,
}

impl SqliteKvStore {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl KvStore for SqliteKvStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let conn = self.db.get()?;
        match queries::get_kv_entry(&conn, key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        let conn = self.db.get()?;
        queries::put_kv_entry(&conn, key, &serde_json::to_string(value)?)
    }
}

#[derive(Default)]
pub struct MemoryKvStore {
    entries: RwLock<HashMap<String, serde_json::Value>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| AppError::Internal("kv store lock poisoned".into()))?;
        Ok(entries.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| AppError::Internal("kv store lock poisoned".into()))?;
        entries.insert(key.to_string(), value.clone());
        Ok(())
    }
}
