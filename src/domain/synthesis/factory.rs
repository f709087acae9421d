use super::backend::SynthesisBackend;
use super::human::HumanTtsBackend;
use super::machine::MachineTtsBackend;
use crate::domain::voice::{BackendKind, UsageConfig, VoiceProfile};
use crate::infrastructure::repositories::{ContentCache, RecordingRepository, TtsRepository};
use std::sync::Arc;

/// Builds the backend bound to one usage of a voice
pub trait BackendFactory: Send + Sync {
    fn create_backend(
        &self,
        profile: Arc<VoiceProfile>,
        usage: &str,
        config: &UsageConfig,
    ) -> Arc<dyn SynthesisBackend>;
}

pub struct SynthesisBackendFactory {
    provider: Arc<dyn TtsRepository>,
    recordings: Arc<RecordingRepository>,
    cache: Arc<ContentCache>,
}

impl SynthesisBackendFactory {
    pub fn new(
        provider: Arc<dyn TtsRepository>,
        recordings: Arc<RecordingRepository>,
        cache: Arc<ContentCache>,
    ) -> Self {
        Self {
            provider,
            recordings,
            cache,
        }
    }
}

impl BackendFactory for SynthesisBackendFactory {
    fn create_backend(
        &self,
        profile: Arc<VoiceProfile>,
        usage: &str,
        config: &UsageConfig,
    ) -> Arc<dyn SynthesisBackend> {
        match profile.service {
            BackendKind::AwsPolly => Arc::new(MachineTtsBackend::new(
                profile,
                usage,
                config.clone(),
                self.provider.clone(),
                self.cache.clone(),
            )),
            BackendKind::HumanTts => Arc::new(HumanTtsBackend::new(
                profile,
                usage,
                self.recordings.clone(),
                self.cache.clone(),
            )),
        }
    }
}
