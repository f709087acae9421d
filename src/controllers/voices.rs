use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::{
    domain::voice::{BackendKind, VoiceCatalog, VoiceProfile},
    error::AppResult,
};

/// Public view of a catalog voice
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceInfo {
    pub name: String,
    pub label: String,
    pub lang_trans: String,
    pub gender: String,
    pub i_voice: Option<u32>,
    pub locale: String,
    pub service: BackendKind,
}

impl From<&VoiceProfile> for VoiceInfo {
    fn from(profile: &VoiceProfile) -> Self {
        Self {
            name: profile.name.clone(),
            label: profile.label().to_string(),
            lang_trans: profile.lang_trans.clone(),
            gender: profile.gender.clone(),
            i_voice: profile.i_voice,
            locale: profile.locale.clone(),
            service: profile.service,
        }
    }
}

pub struct VoicesController {
    catalog: Arc<VoiceCatalog>,
}

impl VoicesController {
    pub fn new(catalog: Arc<VoiceCatalog>) -> Self {
        Self { catalog }
    }

    /// GET /scv/voices - English voices first, Pali voices last
    pub async fn list_voices(
        State(controller): State<Arc<VoicesController>>,
    ) -> AppResult<Json<Vec<VoiceInfo>>> {
        let voices = controller
            .catalog
            .sorted()
            .iter()
            .map(|profile| VoiceInfo::from(profile.as_ref()))
            .collect();
        Ok(Json(voices))
    }
}
