use super::backend::{
    BackendCounters, BackendStats, SegmentRequest, SynthesisBackend, SynthesisOutput,
    SEGMENT_AUDIO_SUFFIX,
};
use super::error::BackendError;
use super::normalize::{strip_numbers, strip_quotes};
use super::signature::{content_hash, Signature};
use crate::domain::voice::{BackendKind, UsageConfig, VoiceProfile};
use crate::infrastructure::repositories::{ContentCache, SpeechContent, SpeechRequest, TtsRepository};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

/// Speech synthesized by a machine TTS provider (AWS Polly)
pub struct MachineTtsBackend {
    profile: Arc<VoiceProfile>,
    usage: String,
    config: UsageConfig,
    provider: Arc<dyn TtsRepository>,
    cache: Arc<ContentCache>,
    counters: BackendCounters,
}

impl MachineTtsBackend {
    pub fn new(
        profile: Arc<VoiceProfile>,
        usage: impl Into<String>,
        config: UsageConfig,
        provider: Arc<dyn TtsRepository>,
        cache: Arc<ContentCache>,
    ) -> Self {
        Self {
            profile,
            usage: usage.into(),
            config,
            provider,
            cache,
            counters: BackendCounters::default(),
        }
    }

    fn prepare_text(&self, text: &str) -> String {
        let mut text = text.trim().to_string();
        if self.profile.strip_numbers {
            text = strip_numbers(&text);
        }
        if self.profile.strip_quotes {
            text = strip_quotes(&text);
        }
        text
    }

    async fn synthesize(
        &self,
        content: SpeechContent,
        signature: Signature,
    ) -> Result<SynthesisOutput, BackendError> {
        let request = SpeechRequest {
            content,
            voice: self.profile.name.clone(),
            locale: self.profile.locale.clone(),
            rate: self.config.rate.clone(),
            pitch: self.profile.pitch.clone(),
        };

        let (path, cached) = self
            .cache
            .fetch_or_store(&signature, || async {
                self.provider
                    .synthesize(&request)
                    .await
                    .map_err(BackendError::Provider)
            })
            .await?;

        self.counters.record(cached);
        tracing::debug!(
            guid = %signature.guid,
            voice = %signature.voice,
            usage = %self.usage,
            cached,
            "Machine speech ready"
        );

        Ok(SynthesisOutput {
            signature,
            path,
            cached,
        })
    }
}

#[async_trait]
impl SynthesisBackend for MachineTtsBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::AwsPolly
    }

    fn voice_name(&self) -> &str {
        &self.profile.name
    }

    fn signature(&self, text: &str, volume: &str) -> Signature {
        let api = self.kind().as_str();
        let guid = content_hash(&json!({
            "api": api,
            "audioSuffix": SEGMENT_AUDIO_SUFFIX,
            "locale": self.profile.locale,
            "pitch": self.profile.pitch,
            "rate": self.config.rate,
            "text": text,
            "usage": self.usage,
            "voice": self.profile.name,
            "voiceVersion": self.profile.voice_version,
        }));

        Signature {
            guid,
            api: api.to_string(),
            voice: self.profile.name.clone(),
            reader: None,
            volume: volume.to_string(),
            audio_suffix: SEGMENT_AUDIO_SUFFIX.to_string(),
            text: text.to_string(),
        }
    }

    async fn synthesize_text(
        &self,
        text: &str,
        volume: &str,
    ) -> Result<SynthesisOutput, BackendError> {
        let text = self.prepare_text(text);
        let signature = self.signature(&text, volume);
        self.synthesize(SpeechContent::Text(text), signature).await
    }

    async fn synthesize_segment(
        &self,
        request: &SegmentRequest<'_>,
    ) -> Result<SynthesisOutput, BackendError> {
        let text = request.text()?;
        self.synthesize_text(text, request.volume).await
    }

    async fn synthesize_break(
        &self,
        seconds: f32,
        volume: &str,
    ) -> Result<SynthesisOutput, BackendError> {
        let marker = format!(r#"<break time="{:.3}s"/>"#, seconds);
        let signature = self.signature(&marker, volume);
        self.synthesize(SpeechContent::Break { seconds }, signature)
            .await
    }

    fn stats(&self) -> BackendStats {
        self.counters.snapshot()
    }
}
