use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use suttavoice_backend::controllers::{
    download::DownloadController, playback::PlaybackController, voices::VoicesController,
};
use suttavoice_backend::domain::download::{DownloadDefaults, DownloadService, TaskRegistry};
use suttavoice_backend::domain::playback::PlaybackService;
use suttavoice_backend::domain::playlist::{CharRateEstimator, PlaylistAssembler};
use suttavoice_backend::domain::synthesis::SynthesisBackendFactory;
use suttavoice_backend::domain::voice::{CatalogLoader, VoiceResolver};
use suttavoice_backend::infrastructure::audio::FfmpegCompositor;
use suttavoice_backend::infrastructure::config::{Config, LogFormat};
use suttavoice_backend::infrastructure::http::start_http_server;
use suttavoice_backend::infrastructure::repositories::{
    ContentCache, JsonDocumentRepository, PollyTtsRepository, RecordingRepository,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        environment = ?config.environment,
        "Starting SuttaVoice Backend on {}:{}",
        config.host,
        config.port
    );
    if config.is_development() {
        tracing::debug!(config = ?config, "Loaded configuration");
    }

    // Voice catalog is required before anything can be spoken
    let catalog = CatalogLoader::new(&config.voices_path).get().await?;
    tracing::info!(
        voices = catalog.voices().len(),
        languages = ?catalog.supported_languages(),
        path = %config.voices_path.display(),
        "Voice catalog loaded"
    );

    // Create AWS Polly client
    tracing::info!("Initializing AWS Polly client with region: {}", config.aws_region);

    let has_access_key = std::env::var("AWS_ACCESS_KEY_ID").is_ok();
    let has_secret_key = std::env::var("AWS_SECRET_ACCESS_KEY").is_ok();
    if !has_access_key || !has_secret_key {
        tracing::warn!("AWS credentials not found in environment variables. Will attempt to use other credential providers (instance metadata, etc.)");
    }

    let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.aws_region.clone()))
        .load()
        .await;
    let polly_client = Arc::new(aws_sdk_polly::Client::new(&aws_config));
    tracing::info!("AWS Polly client initialized successfully");

    let config = Arc::new(config);

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Instantiate repositories
    tracing::info!("Instantiating repositories...");
    let cache = Arc::new(ContentCache::new(
        config.sounds_path.clone(),
        config.audio_memory_cache_enabled,
    ));
    let recordings = Arc::new(RecordingRepository::new(config.recordings_path.clone()));
    let documents = Arc::new(JsonDocumentRepository::new(config.documents_path.clone()));
    let tts_provider = Arc::new(PollyTtsRepository::new(polly_client));
    let compositor = Arc::new(FfmpegCompositor::new(
        config.ffmpeg_path.clone(),
        config.ffprobe_path.clone(),
        config.sounds_path.join("tmp"),
    ));

    // 2. Voices and their backends
    let factory = Arc::new(SynthesisBackendFactory::new(
        tts_provider,
        recordings,
        cache.clone(),
    ));
    let resolver = Arc::new(VoiceResolver::new(catalog.clone(), factory));

    // 3. Build registry with its abandoned-task reaper
    let registry = Arc::new(TaskRegistry::new());
    registry.spawn_reaper(
        Duration::from_secs(config.build_reaper_interval_secs),
        Duration::from_secs(config.build_task_timeout_secs),
    );

    // 4. Instantiate services
    tracing::info!("Instantiating services...");
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
        registry,
        DownloadDefaults {
            max_results: config.default_max_results,
            max_duration_secs: config.default_max_duration_secs,
        },
    ));

    // 5. Instantiate controllers
    tracing::info!("Instantiating controllers...");
    let voices_controller = Arc::new(VoicesController::new(catalog));
    let playback_controller = Arc::new(PlaybackController::new(playback_service));
    let download_controller = Arc::new(DownloadController::new(download_service));

    start_http_server(config, voices_controller, playback_controller, download_controller).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "suttavoice_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "suttavoice_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
