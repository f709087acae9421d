pub mod request_id;

pub use request_id::{request_id_middleware, RequestId, X_REQUEST_ID};

use axum::{extract::Request, middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::controllers::{
    download::DownloadController, health, playback::PlaybackController,
    voices::VoicesController,
};
use crate::infrastructure::config::Config;

/// All routes with request ids and tracing applied
pub fn create_router(
    voices_controller: Arc<VoicesController>,
    playback_controller: Arc<PlaybackController>,
    download_controller: Arc<DownloadController>,
) -> Router {
    let voice_routes = Router::new()
        .route("/scv/voices", get(VoicesController::list_voices))
        .with_state(voices_controller);

    let playback_routes = Router::new()
        .route(
            "/scv/play/segment/:sutta_uid/:lang/:translator/:scid/:vname_trans",
            get(PlaybackController::play_segment),
        )
        .route(
            "/scv/play/segment/:sutta_uid/:lang/:translator/:scid/:vname_trans/:vname_root",
            get(PlaybackController::play_segment),
        )
        .route(
            "/scv/audio/:sutta_uid/:lang/:translator/:voice/:guid",
            get(PlaybackController::get_audio),
        )
        .with_state(playback_controller);

    let download_routes = Router::new()
        .route(
            "/scv/build-download/:audio_suffix/:langs/:vtrans/:pattern",
            get(DownloadController::build_download),
        )
        .route(
            "/scv/build-download/:audio_suffix/:langs/:vtrans/:pattern/:vroot",
            get(DownloadController::build_download),
        )
        .route("/scv/build-task/:hash", get(DownloadController::build_task))
        .route(
            "/scv/download/:audio_suffix/:langs/:vtrans/:pattern",
            get(DownloadController::download_playlist),
        )
        .route(
            "/scv/download/:audio_suffix/:langs/:vtrans/:pattern/:vroot",
            get(DownloadController::download_playlist),
        )
        .with_state(download_controller);

    Router::new()
        .route("/health", get(health::health))
        .merge(voice_routes)
        .merge(playback_routes)
        .merge(download_routes)
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(middleware::from_fn(request_id_middleware))
}

/// Request span carrying the id assigned by `request_id_middleware`
fn request_span(request: &Request) -> tracing::Span {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.as_str())
        .unwrap_or_default();
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}

/// Start the HTTP server with all routes configured
pub async fn start_http_server(
    config: Arc<Config>,
    voices_controller: Arc<VoicesController>,
    playback_controller: Arc<PlaybackController>,
    download_controller: Arc<DownloadController>,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(voices_controller, playback_controller, download_controller);

    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
