//! In-process backend for tests and throwaway deployments. Data is lost when
//! the backend is dropped.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

use super::{BackendError, BackendResult, KvBackend, ReadTxn, WriteTxn};

type Buckets = HashMap<String, HashMap<String, Vec<u8>>>;

/// Buckets held in nested maps behind one lock. Readers share the lock; a
/// write transaction holds it exclusively until it commits or is dropped.
#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    buckets: Arc<RwLock<Buckets>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove a bucket and everything in it, bypassing any store built on
    /// top. Returns whether the bucket existed.
    pub async fn delete_bucket(&self, bucket: &str) -> bool {
        self.buckets.write().await.remove(bucket).is_some()
    }
}

#[async_trait]
impl KvBackend for MemoryBackend {
    async fn create_bucket_if_absent(&self, bucket: &str) -> BackendResult<()> {
        self.buckets
            .write()
            .await
            .entry(bucket.to_string())
            .or_default();
        Ok(())
    }

    async fn begin_read(&self) -> BackendResult<Box<dyn ReadTxn>> {
        let guard = self.buckets.clone().read_owned().await;
        Ok(Box::new(MemoryReadTxn { guard }))
    }

    async fn begin_write(&self) -> BackendResult<Box<dyn WriteTxn>> {
        let guard = self.buckets.clone().write_owned().await;
        Ok(Box::new(MemoryWriteTxn {
            guard,
            staged: Vec::new(),
        }))
    }

    async fn check_connection(&self) -> BackendResult<()> {
        Ok(())
    }
}

fn lookup(buckets: &Buckets, bucket: &str, key: &str) -> BackendResult<Option<Vec<u8>>> {
    let entries = buckets
        .get(bucket)
        .ok_or_else(|| BackendError::BucketNotFound(bucket.to_string()))?;
    Ok(entries.get(key).cloned())
}

struct MemoryReadTxn {
    guard: OwnedRwLockReadGuard<Buckets>,
}

#[async_trait]
impl ReadTxn for MemoryReadTxn {
    async fn get(&mut self, bucket: &str, key: &str) -> BackendResult<Option<Vec<u8>>> {
        lookup(&self.guard, bucket, key)
    }
}

struct MemoryWriteTxn {
    guard: OwnedRwLockWriteGuard<Buckets>,
    staged: Vec<(String, String, Vec<u8>)>,
}

#[async_trait]
impl ReadTxn for MemoryWriteTxn {
    async fn get(&mut self, bucket: &str, key: &str) -> BackendResult<Option<Vec<u8>>> {
        let committed = lookup(&self.guard, bucket, key)?;
        let pending = self
            .staged
            .iter()
            .rev()
            .find(|(b, k, _)| b == bucket && k == key)
            .map(|(_, _, value)| value.clone());
        Ok(pending.or(committed))
    }
}

#[async_trait]
impl WriteTxn for MemoryWriteTxn {
    async fn put(&mut self, bucket: &str, key: &str, value: Vec<u8>) -> BackendResult<()> {
        if !self.guard.contains_key(bucket) {
            return Err(BackendError::BucketNotFound(bucket.to_string()));
        }
        self.staged
            .push((bucket.to_string(), key.to_string(), value));
        Ok(())
    }

    async fn commit(self: Box<Self>) -> BackendResult<()> {
        let MemoryWriteTxn { mut guard, staged } = *self;
        for (bucket, key, value) in staged {
            if let Some(entries) = guard.get_mut(&bucket) {
                entries.insert(key, value);
            }
        }
        Ok(())
    }
}
