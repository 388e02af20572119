pub mod content_type;
pub mod request_id;

use axum::{middleware, routing::get, Router};
use std::future::Future;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::controllers::{feed::FeedController, health};
use crate::error::AppError;
use crate::infrastructure::config::Config;
use crate::infrastructure::db::KvBackend;

pub use content_type::json_content_type_middleware;
pub use request_id::{request_id_middleware, RequestId};

/// Assemble every route. Kept apart from [`start_http_server`] so tests can
/// serve the same router on their own listener.
pub fn build_router(backend: Arc<dyn KvBackend>, feed_controller: Arc<FeedController>) -> Router {
    let feed_routes = Router::new()
        .route(
            "/api/feeds",
            get(FeedController::list_feeds).post(FeedController::create_feed),
        )
        .route("/api/feeds/:id", get(FeedController::get_feed))
        .with_state(feed_controller)
        .layer(middleware::from_fn(json_content_type_middleware));

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(backend)
        .merge(feed_routes)
        .fallback(endpoint_not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(request_id_middleware)),
        )
}

async fn endpoint_not_found() -> AppError {
    AppError::NotFound("Endpoint not found".to_string())
}

/// Bind to the configured address and serve until `shutdown` resolves.
pub async fn start_http_server(
    config: &Config,
    app: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), std::io::Error> {
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}
