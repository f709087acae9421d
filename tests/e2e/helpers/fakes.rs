use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use suttavoice_backend::infrastructure::audio::{
    AudioCompositor, AudioMetadata, ComposedAudio, CompositorError,
};
use suttavoice_backend::infrastructure::repositories::{
    SpeechContent, SpeechRequest, TtsRepository,
};

/// Speech provider that answers `{voice}|{text}` and records every request
#[derive(Default)]
pub struct FakeTts {
    pub requests: Mutex<Vec<SpeechRequest>>,
    pub failing: AtomicBool,
}

impl FakeTts {
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl TtsRepository for FakeTts {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>, String> {
        if self.failing.load(Ordering::SeqCst) {
            return Err("speech provider unavailable".to_string());
        }
        self.requests.lock().push(request.clone());
        Ok(match &request.content {
            SpeechContent::Text(text) => format!("{}|{}", request.voice, text).into_bytes(),
            SpeechContent::Break { seconds } => format!("silence|{}", seconds).into_bytes(),
        })
    }
}

/// Compositor that joins its inputs with `+`
#[derive(Default)]
pub struct FakeCompositor {
    pub calls: AtomicUsize,
    pub last_metadata: Mutex<Option<AudioMetadata>>,
}

impl FakeCompositor {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AudioCompositor for FakeCompositor {
    async fn concat(
        &self,
        inputs: &[PathBuf],
        metadata: &AudioMetadata,
        _audio_suffix: &str,
    ) -> Result<ComposedAudio, CompositorError> {
        if inputs.is_empty() {
            return Err(CompositorError::Empty);
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_metadata.lock() = Some(metadata.clone());

        let mut parts = Vec::with_capacity(inputs.len());
        for input in inputs {
            parts.push(tokio::fs::read(input).await?);
        }
        Ok(ComposedAudio {
            bytes: parts.join(&b'+'),
            duration_seconds: inputs.len() as f64,
            track_boundaries: (0..inputs.len()).map(|i| i as f64).collect(),
        })
    }
}
