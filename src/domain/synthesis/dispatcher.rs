use super::backend::{BackendStats, SegmentRequest, SynthesisBackend, SynthesisOutput};
use super::error::{BackendError, SynthesisError};
use super::normalize::{compile_trim_suffix, normalize_text};
use super::signature::{sutta_volume_name, Signature, PLAY_WORD_VOLUME};
use crate::domain::document::Segment;
use crate::domain::voice::{BackendKind, VoiceProfile};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Outcome of a speak call
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakResult {
    pub signature: Signature,
    #[serde(skip)]
    pub path: PathBuf,
    pub cached: bool,
    pub stats: BackendStats,
}

/// One segment spoken in one language on behalf of a translator
#[derive(Debug, Clone, Copy)]
pub struct SpeakSegment<'a> {
    pub sutta_uid: &'a str,
    pub segment: &'a Segment,
    pub language: &'a str,
    pub translator: &'a str,
    pub usage: Option<&'a str>,
}

/// A resolved voice: its profile plus one backend per usage.
///
/// When the primary backend is human recordings, `alt` is the machine
/// backend that speaks whatever was never recorded.
pub struct Voice {
    profile: Arc<VoiceProfile>,
    services: BTreeMap<String, Arc<dyn SynthesisBackend>>,
    alt: Option<Arc<dyn SynthesisBackend>>,
    trim_suffix: Option<Regex>,
}

impl std::fmt::Debug for Voice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Voice")
            .field("name", &self.profile.name)
            .field("usages", &self.services.keys().collect::<Vec<_>>())
            .field("alt", &self.alt.as_ref().map(|alt| alt.voice_name()))
            .finish()
    }
}

impl Voice {
    pub fn new(
        profile: Arc<VoiceProfile>,
        services: BTreeMap<String, Arc<dyn SynthesisBackend>>,
        alt: Option<Arc<dyn SynthesisBackend>>,
    ) -> Result<Self, SynthesisError> {
        let trim_suffix = profile
            .trim_segment_suffix
            .as_deref()
            .map(compile_trim_suffix)
            .transpose()
            .map_err(|e| {
                SynthesisError::Config(format!("{} trimSegmentSuffix: {}", profile.name, e))
            })?;

        Ok(Self {
            profile,
            services,
            alt,
            trim_suffix,
        })
    }

    pub fn name(&self) -> &str {
        &self.profile.name
    }

    pub fn profile(&self) -> &Arc<VoiceProfile> {
        &self.profile
    }

    pub fn alt(&self) -> Option<&Arc<dyn SynthesisBackend>> {
        self.alt.as_ref()
    }

    pub fn usages(&self) -> Vec<String> {
        self.services.keys().cloned().collect()
    }

    pub fn service(&self, usage: Option<&str>) -> Result<&Arc<dyn SynthesisBackend>, SynthesisError> {
        let usage = usage.unwrap_or(&self.profile.usage);
        self.services
            .get(usage)
            .ok_or_else(|| SynthesisError::UnsupportedUsage {
                usage: usage.to_string(),
                available: self.usages(),
            })
    }

    pub fn normalize_text(&self, text: &str) -> String {
        normalize_text(text, self.trim_suffix.as_ref())
    }

    /// Speak free text outside of any document
    pub async fn speak(&self, text: &str, usage: Option<&str>) -> Result<SpeakResult, SynthesisError> {
        let service = self.service(usage)?;
        let text = self.normalize_text(text);
        let (backend, output) = match service.synthesize_text(&text, PLAY_WORD_VOLUME).await {
            Err(BackendError::NoRecording(reason)) => {
                let alt = self.fallback(service, reason)?;
                (alt, alt.synthesize_text(&text, PLAY_WORD_VOLUME).await?)
            }
            result => (service, result?),
        };
        Ok(Self::result(backend, output))
    }

    /// Speak one language of a segment into the cache volume of its
    /// document, translator and this voice
    pub async fn speak_segment(
        &self,
        request: &SpeakSegment<'_>,
    ) -> Result<SpeakResult, SynthesisError> {
        let service = self.service(request.usage)?;

        let mut segment = request.segment.clone();
        if let Some(text) = segment.text.get_mut(request.language) {
            *text = self.normalize_text(text);
        }
        let volume = sutta_volume_name(
            request.sutta_uid,
            request.language,
            request.translator,
            &self.profile.name,
        );
        let segment_request = SegmentRequest {
            segment: &segment,
            language: request.language,
            author: request.translator,
            volume: &volume,
        };

        let (backend, output) = match service.synthesize_segment(&segment_request).await {
            Err(BackendError::NoRecording(reason)) => {
                let alt = self.fallback(service, reason)?;
                (alt, alt.synthesize_segment(&segment_request).await?)
            }
            result => (service, result?),
        };
        Ok(Self::result(backend, output))
    }

    pub async fn speak_break(
        &self,
        seconds: f32,
        volume: &str,
        usage: Option<&str>,
    ) -> Result<SpeakResult, SynthesisError> {
        let service = self.service(usage)?;
        let (backend, output) = match service.synthesize_break(seconds, volume).await {
            Err(BackendError::NoRecording(reason)) => {
                let alt = self.fallback(service, reason)?;
                (alt, alt.synthesize_break(seconds, volume).await?)
            }
            result => (service, result?),
        };
        Ok(Self::result(backend, output))
    }

    fn fallback<'a>(
        &'a self,
        service: &Arc<dyn SynthesisBackend>,
        reason: String,
    ) -> Result<&'a Arc<dyn SynthesisBackend>, SynthesisError> {
        match (&self.alt, service.kind()) {
            (Some(alt), BackendKind::HumanTts) => {
                tracing::info!(
                    voice = %self.profile.name,
                    alt_voice = %alt.voice_name(),
                    reason = %reason,
                    "Falling back to machine speech"
                );
                Ok(alt)
            }
            _ => Err(BackendError::NoRecording(reason).into()),
        }
    }

    fn result(backend: &Arc<dyn SynthesisBackend>, output: SynthesisOutput) -> SpeakResult {
        SpeakResult {
            signature: output.signature,
            path: output.path,
            cached: output.cached,
            stats: backend.stats(),
        }
    }
}
