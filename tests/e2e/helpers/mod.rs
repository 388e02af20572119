use anyhow::Result;
use feedlist_backend::controllers::feed::FeedController;
use feedlist_backend::domain::feed::{reference_catalog, FeedListStore};
use feedlist_backend::infrastructure::db::{self, KvBackend};
use feedlist_backend::infrastructure::http::build_router;
use std::sync::Arc;
use tempfile::TempDir;
use test_context::AsyncTestContext;
use tokio::net::TcpListener;

pub mod api_client;

use api_client::TestClient;
use fixtures::TestFixtures;

pub struct TestContext {
    pub client: TestClient,
    pub fixtures: TestFixtures,
    pub backend: Arc<dyn KvBackend>,
    _dir: TempDir,
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        async {
            let dir = tempfile::tempdir().expect("Failed to create temp dir");
            let database_url = sqlite_url(&dir);

            let backend = db::connect(&database_url)
                .await
                .expect("Failed to open backing store");
            let store = FeedListStore::open(backend.clone(), reference_catalog())
                .await
                .expect("Failed to initialize feed list store");

            let client = spawn_app(backend.clone(), store)
                .await
                .expect("Failed to start app");
            let fixtures = TestFixtures::new(backend.clone());

            Self {
                client,
                fixtures,
                backend,
                _dir: dir,
            }
        }
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async move {
            self.backend.close().await;
        }
    }
}

pub fn sqlite_url(dir: &TempDir) -> String {
    format!("sqlite://{}", dir.path().join("feeds.db").display())
}

/// Serve the application router for `store` on a fresh local port.
pub async fn spawn_app(backend: Arc<dyn KvBackend>, store: FeedListStore) -> Result<TestClient> {
    let controller = Arc::new(FeedController::new(Arc::new(store)));
    let app = build_router(backend, controller);

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let base_url = format!("http://{}", listener.local_addr()?);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Ok(TestClient::new(&base_url))
}
