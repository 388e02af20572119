use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::domain::feed::{CreateFeedRequest, CreatedFeedResponse, Feed, FeedListApi};
use crate::error::{AppError, AppResult};

pub struct FeedController {
    feed_list: Arc<dyn FeedListApi>,
}

impl FeedController {
    pub fn new(feed_list: Arc<dyn FeedListApi>) -> Self {
        Self { feed_list }
    }

    /// GET /api/feeds - Default catalog followed by registered feeds
    pub async fn list_feeds(
        State(controller): State<Arc<FeedController>>,
    ) -> AppResult<Json<Vec<Feed>>> {
        let feeds = controller.feed_list.list_all().await?;
        Ok(Json(feeds))
    }

    /// GET /api/feeds/{id} - Single feed
    pub async fn get_feed(
        State(controller): State<Arc<FeedController>>,
        Path(feed_id): Path<String>,
    ) -> AppResult<Json<Feed>> {
        let feed = controller.feed_list.get_by_id(&feed_id).await?;
        Ok(Json(feed))
    }

    /// POST /api/feeds - Register a feed, or look up the one already
    /// registered under the same URL
    ///
    /// The body is decoded here rather than by the `Json` extractor: the
    /// media type has already been checked by the API middleware, which
    /// allows headers listing several types.
    pub async fn create_feed(
        State(controller): State<Arc<FeedController>>,
        body: Bytes,
    ) -> AppResult<Json<CreatedFeedResponse>> {
        let request = decode_request(&body)?;
        validate_url(&request.url)?;

        let id = controller.feed_list.add(Feed::from(request)).await?;
        Ok(Json(CreatedFeedResponse { id }))
    }
}

fn decode_request(body: &[u8]) -> AppResult<CreateFeedRequest> {
    serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Failed to parse the request body as JSON: {e}")))
}

fn validate_url(url: &str) -> AppResult<()> {
    if url.is_empty() {
        return Err(AppError::BadRequest("URL is required".to_string()));
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(AppError::BadRequest("Invalid URL format".to_string()));
    }
    Ok(())
}
