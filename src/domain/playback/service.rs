use super::error::PlaybackError;
use crate::domain::document::Segment;
use crate::domain::synthesis::{
    sutta_volume_name, SpeakResult, SpeakSegment, SynthesisError, Voice, PLAY_WORD_VOLUME,
    SEGMENT_AUDIO_SUFFIX,
};
use crate::domain::voice::VoiceResolver;
use crate::infrastructure::repositories::{ContentCache, DocumentRepository};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

pub const DEFAULT_TRANS_VOICE: &str = "Amy";
pub const DEFAULT_ROOT_VOICE: &str = "Aditi";
pub const PLAY_USAGE: &str = "recite";

const ROOT_LANGUAGE: &str = "pli";

#[derive(Debug, Clone, Default)]
pub struct PlaySegmentRequest {
    pub sutta_uid: String,
    pub lang_trans: String,
    pub translator: String,
    pub scid: String,
    pub vname_trans: Option<String>,
    pub vname_root: Option<String>,
}

/// Segment text plus the guid of every language that was spoken
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayedSegment {
    #[serde(flatten)]
    pub segment: Segment,
    pub audio: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaySegment {
    #[serde(rename = "sutta_uid")]
    pub sutta_uid: String,
    pub scid: String,
    pub lang_trans: String,
    pub translator: String,
    pub title: Option<String>,
    pub section: usize,
    pub n_sections: usize,
    pub vname_trans: String,
    pub vname_root: String,
    pub i_segment: usize,
    pub segment: PlayedSegment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AudioRequest {
    pub sutta_uid: Option<String>,
    pub lang_trans: String,
    pub translator: String,
    pub voice: String,
    pub guid: String,
}

#[derive(Debug, Clone)]
pub struct AudioFile {
    pub bytes: Vec<u8>,
    pub guid: String,
}

pub struct PlaybackService {
    resolver: Arc<VoiceResolver>,
    documents: Arc<dyn DocumentRepository>,
    cache: Arc<ContentCache>,
}

impl PlaybackService {
    pub fn new(
        resolver: Arc<VoiceResolver>,
        documents: Arc<dyn DocumentRepository>,
        cache: Arc<ContentCache>,
    ) -> Self {
        Self {
            resolver,
            documents,
            cache,
        }
    }

    /// Speak one segment in its translation and root language.
    ///
    /// Lookup failures are errors. Synthesis failures are reported in the
    /// `error` field so the segment text is still returned.
    pub async fn play_segment(
        &self,
        request: &PlaySegmentRequest,
    ) -> Result<PlaySegment, PlaybackError> {
        let document = self
            .documents
            .load_document(
                &request.sutta_uid,
                &request.lang_trans,
                Some(&request.translator),
            )
            .await?;
        let i_segment = document
            .segment_index(&request.scid)
            .ok_or_else(|| PlaybackError::NotFound(format!("segment {} not found", request.scid)))?;
        let segment = document.segments[i_segment].clone();

        let vname_trans = request.vname_trans.as_deref().unwrap_or(DEFAULT_TRANS_VOICE);
        let vname_root = request.vname_root.as_deref().unwrap_or(DEFAULT_ROOT_VOICE);
        let voice_trans = self.resolver.voice_of_name(vname_trans)?;
        let voice_root = self.resolver.voice_of_name(vname_root)?;

        let mut played = PlayedSegment {
            segment,
            audio: BTreeMap::new(),
        };
        let mut speakers = (
            voice_trans.name().to_string(),
            voice_root.name().to_string(),
        );

        let spoken = self
            .speak_languages(request, &mut played, &voice_trans, &voice_root)
            .await;
        let error = match spoken {
            Ok((trans, root)) => {
                if let Some(name) = trans {
                    speakers.0 = name;
                }
                if let Some(name) = root {
                    speakers.1 = name;
                }
                None
            }
            Err(e) => {
                tracing::warn!(
                    scid = %request.scid,
                    voice_trans = %vname_trans,
                    voice_root = %vname_root,
                    error = %e,
                    "Cannot speak segment"
                );
                Some(e.to_string())
            }
        };

        Ok(PlaySegment {
            sutta_uid: request.sutta_uid.clone(),
            scid: request.scid.clone(),
            lang_trans: request.lang_trans.clone(),
            translator: request.translator.clone(),
            title: document.title.clone(),
            section: 0,
            n_sections: 1,
            vname_trans: speakers.0,
            vname_root: speakers.1,
            i_segment,
            segment: played,
            error,
        })
    }

    /// Returns the effective speaker of each language that had text
    async fn speak_languages(
        &self,
        request: &PlaySegmentRequest,
        played: &mut PlayedSegment,
        voice_trans: &Voice,
        voice_root: &Voice,
    ) -> Result<(Option<String>, Option<String>), SynthesisError> {
        let mut speakers = (None, None);
        let segment = played.segment.clone();
        let languages = [
            (request.lang_trans.as_str(), voice_trans),
            (ROOT_LANGUAGE, voice_root),
        ];

        for (i, (language, voice)) in languages.into_iter().enumerate() {
            if segment.text_of(language).is_none() {
                continue;
            }
            let result = voice
                .speak_segment(&SpeakSegment {
                    sutta_uid: &request.sutta_uid,
                    segment: &segment,
                    language,
                    translator: &request.translator,
                    usage: Some(PLAY_USAGE),
                })
                .await?;
            played
                .audio
                .insert(language.to_string(), result.signature.guid.clone());
            let speaker = Some(speaker_name(&result));
            if i == 0 {
                speakers.0 = speaker;
            } else {
                speakers.1 = speaker;
            }
        }
        Ok(speakers)
    }

    /// Cached segment audio. An empty or `word` document id addresses the
    /// free text volume.
    pub async fn audio(&self, request: &AudioRequest) -> Result<AudioFile, PlaybackError> {
        let volume = match request.sutta_uid.as_deref() {
            None | Some("") | Some("word") => PLAY_WORD_VOLUME.to_string(),
            Some(sutta_uid) => sutta_volume_name(
                sutta_uid,
                &request.lang_trans,
                &request.translator,
                &request.voice,
            ),
        };
        let path = self
            .cache
            .checked_guid_path(&volume, &request.guid, SEGMENT_AUDIO_SUFFIX)?;
        let bytes = self.cache.read(&path).await?;
        tracing::debug!(guid = %request.guid, volume = %volume, size = bytes.len(), "Audio served");
        Ok(AudioFile {
            bytes,
            guid: request.guid.clone(),
        })
    }
}

/// Human recordings are credited to their reader, machine speech to its voice
fn speaker_name(result: &SpeakResult) -> String {
    result
        .signature
        .reader
        .clone()
        .unwrap_or_else(|| result.signature.voice.clone())
}
