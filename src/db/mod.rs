mod from_row;
pub mod queries;
mod schema;

pub use schema::init_db;

use std::sync::Arc;
use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::licensing::TokenPolicy;
use crate::storage::{BlobStore, KvStore};

pub type DbPool = Pool<SqliteConnectionManager>;

/// Application state shared by every handler.
///
/// Holds only handles to collaborators; no mutable state lives in-process.
#[derive(Clone)]
pub struct AppState {
    /// Relational store (licenses, activations, releases, update tokens)
    pub db: DbPool,
    /// Key-value store for prompt bundles
    pub kv: Arc<dyn KvStore>,
    /// Blob store holding release archives
    pub blobs: Arc<dyn BlobStore>,
    /// Base URL for download links (e.g., https://updates.example.com)
    pub base_url: String,
    pub token_policy: TokenPolicy,
}

fn connection_manager(manager: SqliteConnectionManager) -> SqliteConnectionManager {
    manager.with_init(|conn| {
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
    })
}

pub fn create_pool(database_path: &str) -> Result<DbPool, r2d2::Error> {
    let manager = connection_manager(SqliteConnectionManager::file(database_path));
    Pool::builder().max_size(10).build(manager)
}

/// Single-connection in-memory pool. Every in-memory connection is its own
/// database, so the pool must never open a second one.
pub fn create_memory_pool() -> Result<DbPool, r2d2::Error> {
    let manager = connection_manager(SqliteConnectionManager::memory());
    Pool::builder().max_size(1).build(manager)
}
