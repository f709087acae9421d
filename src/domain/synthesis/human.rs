use super::backend::{
    BackendCounters, BackendStats, SegmentRequest, SynthesisBackend, SynthesisOutput,
    SEGMENT_AUDIO_SUFFIX,
};
use super::error::BackendError;
use super::signature::{content_hash, Signature};
use crate::domain::voice::{BackendKind, VoiceProfile};
use crate::infrastructure::repositories::{ContentCache, RecordingRepository};
use async_trait::async_trait;
use serde_json::json;
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Pre-recorded human readings. Only segments can be served; anything else
/// reports `NoRecording` so the voice can fall back to machine speech.
pub struct HumanTtsBackend {
    profile: Arc<VoiceProfile>,
    usage: String,
    recordings: Arc<RecordingRepository>,
    cache: Arc<ContentCache>,
    counters: BackendCounters,
}

impl HumanTtsBackend {
    pub fn new(
        profile: Arc<VoiceProfile>,
        usage: impl Into<String>,
        recordings: Arc<RecordingRepository>,
        cache: Arc<ContentCache>,
    ) -> Self {
        Self {
            profile,
            usage: usage.into(),
            recordings,
            cache,
            counters: BackendCounters::default(),
        }
    }

    /// Person whose recordings back this voice (`sujato_pli` -> `sujato`)
    pub fn reader(&self) -> &str {
        self.profile
            .name
            .split('_')
            .next()
            .unwrap_or(&self.profile.name)
    }

    /// Segment address. Includes a digest of the recording so a re-recorded
    /// segment gets a new guid.
    fn segment_signature(
        &self,
        request: &SegmentRequest<'_>,
        text: &str,
        recording: &[u8],
    ) -> Signature {
        let api = self.kind().as_str();
        let guid = content_hash(&json!({
            "api": api,
            "audioSuffix": SEGMENT_AUDIO_SUFFIX,
            "language": request.language,
            "reader": self.reader(),
            "recording": hex::encode(Sha256::digest(recording)),
            "scid": request.segment.scid,
            "usage": self.usage,
            "voiceVersion": self.profile.voice_version,
        }));

        Signature {
            guid,
            api: api.to_string(),
            voice: self.profile.name.clone(),
            reader: Some(self.reader().to_string()),
            volume: request.volume.to_string(),
            audio_suffix: SEGMENT_AUDIO_SUFFIX.to_string(),
            text: text.to_string(),
        }
    }
}

#[async_trait]
impl SynthesisBackend for HumanTtsBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::HumanTts
    }

    fn voice_name(&self) -> &str {
        &self.profile.name
    }

    fn signature(&self, text: &str, volume: &str) -> Signature {
        let api = self.kind().as_str();
        Signature {
            guid: content_hash(&json!({
                "api": api,
                "reader": self.reader(),
                "text": text,
                "voiceVersion": self.profile.voice_version,
            })),
            api: api.to_string(),
            voice: self.profile.name.clone(),
            reader: Some(self.reader().to_string()),
            volume: volume.to_string(),
            audio_suffix: SEGMENT_AUDIO_SUFFIX.to_string(),
            text: text.to_string(),
        }
    }

    async fn synthesize_text(
        &self,
        text: &str,
        _volume: &str,
    ) -> Result<SynthesisOutput, BackendError> {
        Err(BackendError::NoRecording(format!(
            "{} has no recording of text {:?}",
            self.profile.name, text
        )))
    }

    async fn synthesize_segment(
        &self,
        request: &SegmentRequest<'_>,
    ) -> Result<SynthesisOutput, BackendError> {
        let scid = &request.segment.scid;
        let Some(recording) = self
            .recordings
            .find(request.language, self.reader(), scid)
            .await
        else {
            return Err(BackendError::NoRecording(format!(
                "{} has no {} recording of {}",
                self.reader(),
                request.language,
                scid
            )));
        };

        let bytes = tokio::fs::read(&recording).await?;
        let text = request.segment.text_of(request.language).unwrap_or_default();
        let signature = self.segment_signature(request, text, &bytes);
        let (path, cached) = self
            .cache
            .fetch_or_store(&signature, move || async move {
                Ok::<_, BackendError>(bytes)
            })
            .await?;

        self.counters.record(cached);
        tracing::debug!(
            guid = %signature.guid,
            reader = %self.reader(),
            scid = %scid,
            cached,
            "Human recording ready"
        );

        Ok(SynthesisOutput {
            signature,
            path,
            cached,
        })
    }

    async fn synthesize_break(
        &self,
        seconds: f32,
        _volume: &str,
    ) -> Result<SynthesisOutput, BackendError> {
        Err(BackendError::NoRecording(format!(
            "{} has no recording of a {}s break",
            self.profile.name, seconds
        )))
    }

    fn stats(&self) -> BackendStats {
        self.counters.snapshot()
    }
}
