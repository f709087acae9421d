use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use super::playback::attachment;
use crate::{
    domain::download::{BuildStatus, DownloadRequest, DownloadService, TaskSnapshot},
    error::AppResult,
};

#[derive(Debug, Deserialize)]
pub struct DownloadPath {
    pub audio_suffix: String,
    pub langs: String,
    pub vtrans: String,
    pub pattern: String,
    pub vroot: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadQuery {
    pub lang: Option<String>,
    pub max_results: Option<String>,
    pub max_duration: Option<String>,
}

impl DownloadPath {
    fn into_request(self, query: DownloadQuery) -> DownloadRequest {
        DownloadRequest {
            pattern: Some(self.pattern),
            audio_suffix: Some(self.audio_suffix),
            vroot: self.vroot,
            vtrans: Some(self.vtrans),
            langs: Some(self.langs),
            lang: query.lang,
            max_results: query.max_results,
            max_duration: query.max_duration,
        }
    }
}

pub struct DownloadController {
    download_service: Arc<DownloadService>,
}

impl DownloadController {
    pub fn new(download_service: Arc<DownloadService>) -> Self {
        Self { download_service }
    }

    /// GET /scv/build-download/{audio_suffix}/{langs}/{vtrans}/{pattern}[/{vroot}]
    ///
    /// Starts the build in the background and answers with its current state.
    pub async fn build_download(
        State(controller): State<Arc<DownloadController>>,
        Path(path): Path<DownloadPath>,
        Query(query): Query<DownloadQuery>,
    ) -> AppResult<Json<BuildStatus>> {
        let request = path.into_request(query);
        let status = controller.download_service.start_build(&request).await?;
        Ok(Json(status))
    }

    /// GET /scv/build-task/{hash}
    pub async fn build_task(
        State(controller): State<Arc<DownloadController>>,
        Path(hash): Path<String>,
    ) -> AppResult<Json<TaskSnapshot>> {
        let snapshot = controller.download_service.task_status(&hash)?;
        Ok(Json(snapshot))
    }

    /// GET /scv/download/{audio_suffix}/{langs}/{vtrans}/{pattern}[/{vroot}]
    pub async fn download_playlist(
        State(controller): State<Arc<DownloadController>>,
        Path(path): Path<DownloadPath>,
        Query(query): Query<DownloadQuery>,
    ) -> AppResult<(StatusCode, HeaderMap, Body)> {
        let request = path.into_request(query);
        let download = controller.download_service.download_playlist(&request).await?;

        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(download.mime_type));
        headers.insert(header::CONTENT_DISPOSITION, attachment(&download.filename)?);

        Ok((StatusCode::OK, headers, Body::from(download.bytes)))
    }
}
