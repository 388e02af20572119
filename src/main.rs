use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use feedlist_backend::controllers::feed::FeedController;
use feedlist_backend::domain::feed::{load_catalog, reference_catalog, FeedListStore};
use feedlist_backend::infrastructure::config::{Config, LogFormat};
use feedlist_backend::infrastructure::db;
use feedlist_backend::infrastructure::http::{build_router, start_http_server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        "Starting feed list service on {}:{}",
        config.host,
        config.port
    );

    let backend = db::connect(&config.database_url).await?;
    backend.check_connection().await?;
    tracing::info!("Backing store connected");

    let catalog = match &config.default_catalog_path {
        Some(path) => load_catalog(path)?,
        None => reference_catalog(),
    };
    tracing::info!(feeds = catalog.len(), "Default catalog ready");

    // A store whose bucket cannot be created is unusable, so this aborts startup.
    let feed_list = Arc::new(FeedListStore::open(backend.clone(), catalog).await?);
    let feed_controller = Arc::new(FeedController::new(feed_list));

    let app = build_router(backend.clone(), feed_controller);
    start_http_server(&config, app, shutdown_signal()).await?;

    backend.close().await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.default_log_filter().into());

    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
