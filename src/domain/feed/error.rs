use crate::error::AppError;
use crate::infrastructure::db::BackendError;

#[derive(Debug, thiserror::Error)]
pub enum FeedListError {
    /// The store's bucket could not be created. The store is unusable.
    #[error("failed to initialize feed list store: {0}")]
    Initialization(#[source] BackendError),

    /// The bucket is missing: the store was never initialized or the bucket
    /// was removed behind its back.
    #[error("bucket `{0}` is not configured")]
    UnconfiguredBucket(String),

    #[error("stored feed list is corrupted: {0}")]
    Corrupted(#[source] serde_json::Error),

    #[error("feed `{0}` does not exist")]
    NotFound(String),

    #[error("failed to serialize feed list: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("backing store error: {0}")]
    Backend(#[source] BackendError),
}

impl From<BackendError> for FeedListError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::BucketNotFound(bucket) => FeedListError::UnconfiguredBucket(bucket),
            other => FeedListError::Backend(other),
        }
    }
}

impl From<FeedListError> for AppError {
    fn from(err: FeedListError) -> Self {
        match err {
            FeedListError::NotFound(_) => AppError::NotFound(err.to_string()),
            _ => AppError::Internal(err.to_string()),
        }
    }
}
