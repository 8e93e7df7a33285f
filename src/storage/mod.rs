//! Key-value and blob collaborators.
//!
//! Both are held as trait objects in `AppState` so deployments can swap the
//! backing service and tests can use the in-memory versions.

mod blob;
mod kv;

pub use blob::{BlobObject, ByteStream, FsBlobStore, MemoryBlobStore};
pub use kv::{MemoryKvStore, SqliteKvStore};

use async_trait::async_trait;

use crate::error::Result;

/// Get-by-key access to structured values.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Parsed JSON value for `key`, or None when absent.
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>>;

    async fn put(&self, key: &str, value: &serde_json::Value) -> Result<()>;
}

/// Get-by-key access to large binary objects.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Open the object for streaming, or None when no object exists at `key`.
    async fn get(&self, key: &str) -> Result<Option<BlobObject>>;
}
