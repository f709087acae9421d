use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    domain::playback::{AudioRequest, PlaySegment, PlaySegmentRequest, PlaybackService},
    error::{AppError, AppResult},
};

#[derive(Debug, Deserialize)]
pub struct PlaySegmentPath {
    pub sutta_uid: String,
    pub lang: String,
    pub translator: String,
    pub scid: String,
    pub vname_trans: String,
    pub vname_root: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AudioPath {
    pub sutta_uid: String,
    pub lang: String,
    pub translator: String,
    pub voice: String,
    pub guid: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct AudioQuery {
    pub filename: Option<String>,
}

pub struct PlaybackController {
    playback_service: Arc<PlaybackService>,
}

impl PlaybackController {
    pub fn new(playback_service: Arc<PlaybackService>) -> Self {
        Self { playback_service }
    }

    /// GET /scv/play/segment/{sutta_uid}/{lang}/{translator}/{scid}/{vname_trans}[/{vname_root}]
    pub async fn play_segment(
        State(controller): State<Arc<PlaybackController>>,
        Path(path): Path<PlaySegmentPath>,
    ) -> AppResult<Json<PlaySegment>> {
        let request = PlaySegmentRequest {
            sutta_uid: path.sutta_uid,
            lang_trans: path.lang,
            translator: path.translator,
            scid: path.scid,
            vname_trans: Some(path.vname_trans),
            vname_root: path.vname_root,
        };
        let played = controller.playback_service.play_segment(&request).await?;
        Ok(Json(played))
    }

    /// GET /scv/audio/{sutta_uid}/{lang}/{translator}/{voice}/{guid}
    pub async fn get_audio(
        State(controller): State<Arc<PlaybackController>>,
        Path(path): Path<AudioPath>,
        Query(query): Query<AudioQuery>,
    ) -> AppResult<(StatusCode, HeaderMap, Body)> {
        let request = AudioRequest {
            sutta_uid: Some(path.sutta_uid),
            lang_trans: path.lang,
            translator: path.translator,
            voice: path.voice,
            guid: path.guid,
        };
        let audio = controller.playback_service.audio(&request).await?;

        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("audio/mpeg"));
        headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
        if let Some(filename) = query.filename {
            headers.insert(header::CONTENT_DISPOSITION, attachment(&filename)?);
        }

        Ok((StatusCode::OK, headers, Body::from(audio.bytes)))
    }
}

pub(crate) fn attachment(filename: &str) -> AppResult<HeaderValue> {
    HeaderValue::from_str(&format!("attachment; filename={}", filename))
        .map_err(|_| AppError::BadRequest(format!("invalid filename: {}", filename)))
}
