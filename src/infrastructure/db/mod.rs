//! Transactional key-value backing store.
//!
//! Values live in named buckets. Reads go through a [`ReadTxn`] that sees one
//! consistent view; writes go through a [`WriteTxn`] that is applied as a
//! whole on [`WriteTxn::commit`] and discarded if dropped.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use std::sync::Arc;

pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("bucket `{0}` does not exist")]
    BucketNotFound(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type BackendResult<T> = Result<T, BackendError>;

#[async_trait]
pub trait KvBackend: Send + Sync {
    /// Create `bucket` unless it already exists.
    async fn create_bucket_if_absent(&self, bucket: &str) -> BackendResult<()>;

    async fn begin_read(&self) -> BackendResult<Box<dyn ReadTxn>>;

    async fn begin_write(&self) -> BackendResult<Box<dyn WriteTxn>>;

    /// Cheap round trip used by readiness probes.
    async fn check_connection(&self) -> BackendResult<()>;

    /// Release underlying resources. Later calls may fail.
    async fn close(&self) {}
}

#[async_trait]
pub trait ReadTxn: Send {
    /// Returns `Ok(None)` when the key has no value and
    /// [`BackendError::BucketNotFound`] when the bucket itself is missing.
    async fn get(&mut self, bucket: &str, key: &str) -> BackendResult<Option<Vec<u8>>>;
}

#[async_trait]
pub trait WriteTxn: ReadTxn {
    async fn put(&mut self, bucket: &str, key: &str, value: Vec<u8>) -> BackendResult<()>;

    async fn commit(self: Box<Self>) -> BackendResult<()>;
}

/// Open the backend named by `url`.
///
/// `memory` (or anything starting with `memory:`) gives a process-local
/// [`MemoryBackend`]; everything else is handed to SQLite.
pub async fn connect(url: &str) -> BackendResult<Arc<dyn KvBackend>> {
    if url == "memory" || url.starts_with("memory:") {
        return Ok(Arc::new(MemoryBackend::new()));
    }

    Ok(Arc::new(SqliteBackend::connect(url).await?))
}
