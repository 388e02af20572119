use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::error::FeedListError;
use super::model::Feed;
use crate::infrastructure::db::{BackendError, KvBackend};

pub const FEED_LIST_BUCKET: &str = "feedlist";
pub const ALL_FEEDS_KEY: &str = "all";

/// The catalog of known feeds: an immutable default list followed by the
/// feeds users have registered, which are persisted as a single JSON array
/// in the backing store.
///
/// A store built with [`FeedListStore::new`] is uninitialized and every
/// operation fails with [`FeedListError::UnconfiguredBucket`] until
/// [`FeedListStore::init`] succeeds. [`FeedListStore::open`] does both.
pub struct FeedListStore {
    backend: Arc<dyn KvBackend>,
    defaults: Arc<[Feed]>,
    // Held for the whole read-check-write of `add`.
    add_lock: Mutex<()>,
}

#[async_trait]
pub trait FeedListApi: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Feed>, FeedListError>;

    async fn get_by_id(&self, id: &str) -> Result<Feed, FeedListError>;

    async fn add(&self, candidate: Feed) -> Result<String, FeedListError>;
}

impl FeedListStore {
    pub fn new(backend: Arc<dyn KvBackend>, defaults: Arc<[Feed]>) -> Self {
        Self {
            backend,
            defaults,
            add_lock: Mutex::new(()),
        }
    }

    pub async fn open(
        backend: Arc<dyn KvBackend>,
        defaults: Arc<[Feed]>,
    ) -> Result<Self, FeedListError> {
        let store = Self::new(backend, defaults);
        store.init().await?;
        Ok(store)
    }

    /// Create the store's bucket if it does not exist yet.
    pub async fn init(&self) -> Result<(), FeedListError> {
        self.backend
            .create_bucket_if_absent(FEED_LIST_BUCKET)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, bucket = FEED_LIST_BUCKET, "Error creating bucket");
                FeedListError::Initialization(e)
            })
    }

    pub fn defaults(&self) -> &[Feed] {
        &self.defaults
    }

    /// The user-registered feeds, in insertion order.
    pub async fn list_stored(&self) -> Result<Vec<Feed>, FeedListError> {
        let mut txn = self.backend.begin_read().await?;
        let raw = txn
            .get(FEED_LIST_BUCKET, ALL_FEEDS_KEY)
            .await
            .map_err(log_missing_bucket)?;

        decode_stored(raw)
    }
}

#[async_trait]
impl FeedListApi for FeedListStore {
    /// Defaults first, then stored feeds in insertion order.
    async fn list_all(&self) -> Result<Vec<Feed>, FeedListError> {
        let stored = self.list_stored().await?;

        let mut feeds = Vec::with_capacity(self.defaults.len() + stored.len());
        feeds.extend_from_slice(&self.defaults);
        feeds.extend(stored);
        Ok(feeds)
    }

    async fn get_by_id(&self, id: &str) -> Result<Feed, FeedListError> {
        self.list_all()
            .await?
            .into_iter()
            .find(|feed| feed.id == id)
            .ok_or_else(|| FeedListError::NotFound(id.to_string()))
    }

    /// Register `candidate` and return its id. If a feed with the same URL is
    /// already known, its id is returned and nothing is written.
    ///
    /// The store always assigns the id; whatever the caller put in
    /// `candidate.id` is replaced.
    async fn add(&self, mut candidate: Feed) -> Result<String, FeedListError> {
        candidate.id = Uuid::new_v4().to_string();

        let _guard = self.add_lock.lock().await;
        let mut txn = self.backend.begin_write().await?;

        let raw = txn
            .get(FEED_LIST_BUCKET, ALL_FEEDS_KEY)
            .await
            .map_err(log_missing_bucket)?;
        let mut stored = decode_stored(raw)?;

        if let Some(existing) = self
            .defaults
            .iter()
            .chain(stored.iter())
            .find(|feed| feed.url == candidate.url)
        {
            tracing::debug!(url = %candidate.url, id = %existing.id, "Feed already registered");
            return Ok(existing.id.clone());
        }

        let id = candidate.id.clone();
        let url = candidate.url.clone();
        stored.push(candidate);

        let raw = serde_json::to_vec(&stored).map_err(|e| {
            tracing::error!(error = %e, url = %url, "Failed to serialize feed list");
            FeedListError::Serialization(e)
        })?;

        txn.put(FEED_LIST_BUCKET, ALL_FEEDS_KEY, raw)
            .await
            .map_err(log_missing_bucket)?;
        txn.commit().await?;

        tracing::info!(id = %id, url = %url, stored = stored.len(), "Registered feed");

        Ok(id)
    }
}

fn log_missing_bucket(err: BackendError) -> FeedListError {
    if let BackendError::BucketNotFound(bucket) = &err {
        tracing::error!(bucket = %bucket, "Bucket is unconfigured");
    }
    err.into()
}

fn decode_stored(raw: Option<Vec<u8>>) -> Result<Vec<Feed>, FeedListError> {
    match raw {
        None => Ok(Vec::new()),
        Some(bytes) if bytes.is_empty() => Ok(Vec::new()),
        // A JSON `null` is an empty list too.
        Some(bytes) => serde_json::from_slice::<Option<Vec<Feed>>>(&bytes)
            .map(Option::unwrap_or_default)
            .map_err(|e| {
                tracing::error!(error = %e, bytes = bytes.len(), "Can't decode stored feed list");
                FeedListError::Corrupted(e)
            }),
    }
}
