//! Article persistence.
//!
//! Routes talk to storage only through [`ArticleStore`]. Two engines ship:
//! an in-process [`MemoryStore`] and an embedded SQLite [`SqliteStore`].
//! Neither validates writes; whatever fields a request carries are stored.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;

use crate::error::Error;
use crate::model::{Article, ArticleFields, DeleteResult, UpdateResult};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// A failed store operation.
///
/// One kind only. Callers never branch on why the store failed; they hand
/// the message back to the client.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct StoreError {
    message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The body sent to clients: `{"name":"StoreError","message":"..."}`.
    pub fn to_json(&self) -> Vec<u8> {
        json!({ "name": "StoreError", "message": self.message })
            .to_string()
            .into_bytes()
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::new(format!("store task failed: {e}"))
    }
}

/// The article collection.
///
/// Single-record operations act on the first record, in insertion order,
/// whose title equals `title` exactly. A missing match is not an error:
/// lookups return `None` and writes report zero matched records.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Every record, in insertion order.
    async fn find_all(&self) -> StoreResult<Vec<Article>>;

    async fn find_one(&self, title: &str) -> StoreResult<Option<Article>>;

    /// Stores a new record with a fresh id and returns it.
    async fn insert(&self, fields: ArticleFields) -> StoreResult<Article>;

    /// Overwrites the whole document: fields absent from `fields` are cleared.
    async fn replace_one(&self, title: &str, fields: ArticleFields) -> StoreResult<UpdateResult>;

    /// Sets only the fields present in `fields`.
    async fn update_one(&self, title: &str, fields: ArticleFields) -> StoreResult<UpdateResult>;

    async fn delete_one(&self, title: &str) -> StoreResult<DeleteResult>;

    async fn delete_all(&self) -> StoreResult<DeleteResult>;

    /// Releases the underlying handle. Operations after `close` fail.
    async fn close(&self) -> StoreResult<()>;
}

/// Which engine to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Memory,
    Sqlite { path: PathBuf },
}

/// Opens the configured store. Engine failures surface as [`Error::Store`].
pub fn open_store(config: &StoreConfig) -> Result<Arc<dyn ArticleStore>, Error> {
    match config {
        StoreConfig::Memory => Ok(Arc::new(MemoryStore::new())),
        StoreConfig::Sqlite { path } => Ok(Arc::new(SqliteStore::open(path)?)),
    }
}
