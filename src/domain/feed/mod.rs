pub mod catalog;
pub mod error;
pub mod model;
pub mod store;

pub use catalog::{load_catalog, reference_catalog};
pub use error::FeedListError;
pub use model::{CreateFeedRequest, CreatedFeedResponse, Feed};
pub use store::{FeedListApi, FeedListStore};
