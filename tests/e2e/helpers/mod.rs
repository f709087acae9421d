use anyhow::Result;
use axum::Router;
use hyper::StatusCode;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use suttavoice_backend::{
    controllers::{
        download::DownloadController, playback::PlaybackController, voices::VoicesController,
    },
    domain::{
        download::{DownloadDefaults, DownloadService, TaskRegistry},
        playback::PlaybackService,
        playlist::{CharRateEstimator, PlaylistAssembler},
        synthesis::SynthesisBackendFactory,
        voice::{VoiceCatalog, VoiceResolver},
    },
    infrastructure::{
        http::create_router,
        repositories::{ContentCache, JsonDocumentRepository, RecordingRepository},
    },
};
use tempfile::TempDir;
use test_context::AsyncTestContext;
use tokio::net::TcpListener;

pub mod api_client;
pub mod fakes;
pub mod fixtures;

use api_client::TestClient;
use fakes::{FakeCompositor, FakeTts};
use fixtures::TestFixtures;

pub struct TestContext {
    pub client: TestClient,
    pub tts: Arc<FakeTts>,
    pub compositor: Arc<FakeCompositor>,
    pub fixtures: TestFixtures,
    _dir: TempDir,
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        async {
            let dir = tempfile::tempdir().expect("Failed to create temp dir");
            let tts = Arc::new(FakeTts::default());
            let compositor = Arc::new(FakeCompositor::default());

            let fixtures = TestFixtures::new(dir.path().join("suttas"), dir.path().join("recordings"));
            fixtures
                .create_document(&TestFixtures::document("thig1.1", "soma", 2))
                .await
                .expect("Failed to create thig1.1");
            fixtures
                .create_document(&TestFixtures::document("thig1.2", "soma", 1))
                .await
                .expect("Failed to create thig1.2");

            let app = create_app_with_fakes(&dir, tts.clone(), compositor.clone())
                .await
                .expect("Failed to create app");

            // Start server
            let listener = TcpListener::bind("127.0.0.1:0")
                .await
                .expect("Failed to bind listener");
            let addr = listener.local_addr().expect("Failed to get local addr");
            let base_url = format!("http://{}", addr);

            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            Self {
                client: TestClient::new(&base_url),
                tts,
                compositor,
                fixtures,
                _dir: dir,
            }
        }
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async {
            // Temporary files are removed when `_dir` drops
        }
    }
}

impl TestContext {
    /// Poll a build task until it leaves the active state
    pub async fn wait_for_task(&self, hash: &str) -> Value {
        for _ in 0..200 {
            let response = self
                .client
                .get(&format!("/scv/build-task/{}", hash))
                .await
                .unwrap();
            response.assert_status(StatusCode::OK);
            let task = response.body.clone().expect("Missing task body");
            if task.get("isActive").and_then(Value::as_bool) == Some(false) {
                return task;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("Build task {} never finished", hash);
    }
}

async fn create_app_with_fakes(
    dir: &TempDir,
    tts: Arc<FakeTts>,
    compositor: Arc<FakeCompositor>,
) -> Result<Router> {
    let root = dir.path();
    let catalog = Arc::new(VoiceCatalog::load("config/voices.json").await?);

    let cache = Arc::new(ContentCache::new(root.join("sounds"), false));
    let recordings = Arc::new(RecordingRepository::new(root.join("recordings")));
    let documents = Arc::new(JsonDocumentRepository::new(root.join("suttas")));
    let factory = Arc::new(SynthesisBackendFactory::new(tts, recordings, cache.clone()));
    let resolver = Arc::new(VoiceResolver::new(catalog.clone(), factory));

    let playback_service = Arc::new(PlaybackService::new(
        resolver.clone(),
        documents.clone(),
        cache.clone(),
    ));
    let download_service = Arc::new(DownloadService::new(
        resolver,
        documents,
        PlaylistAssembler::new(Arc::new(CharRateEstimator::default())),
        cache,
        compositor,
        Arc::new(TaskRegistry::new()),
        DownloadDefaults {
            max_results: 5,
            max_duration_secs: 3 * 60 * 60,
        },
    ));

    Ok(create_router(
        Arc::new(VoicesController::new(catalog)),
        Arc::new(PlaybackController::new(playback_service)),
        Arc::new(DownloadController::new(download_service)),
    ))
}
