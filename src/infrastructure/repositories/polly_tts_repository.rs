use super::tts_repository::{to_ssml, SpeechContent, SpeechRequest, TtsRepository};
use async_trait::async_trait;
use aws_sdk_polly::{
    types::{Engine, OutputFormat, TextType, VoiceId},
    Client as PollyClient,
};
use regex::Regex;
use std::sync::{Arc, LazyLock};

/// AWS Polly has a limit of 3000 characters per request
const MAX_BATCH_SIZE: usize = 3000;

static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([.!?]+\s+)").expect("valid sentence pattern"));

/// AWS Polly implementation of TTS repository
pub struct PollyTtsRepository {
    polly_client: Arc<PollyClient>,
}

impl PollyTtsRepository {
    pub fn new(polly_client: Arc<PollyClient>) -> Self {
        Self { polly_client }
    }

    /// Call AWS Polly to synthesize a single SSML document
    async fn call_polly(&self, ssml: &str, request: &SpeechRequest) -> Result<Vec<u8>, String> {
        let voice_id = VoiceId::from(request.voice.as_str());
        let engine = Engine::Standard;

        tracing::info!(
            voice = %request.voice,
            locale = %request.locale,
            engine = ?engine,
            output_format = "Mp3",
            ssml_length = ssml.len(),
            "Calling AWS Polly synthesize_speech"
        );

        let result = self
            .polly_client
            .synthesize_speech()
            .text(ssml)
            .text_type(TextType::Ssml)
            .voice_id(voice_id)
            .output_format(OutputFormat::Mp3)
            .engine(engine.clone())
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = ?e,
                    error_display = %e,
                    voice = %request.voice,
                    engine = ?engine,
                    "AWS Polly synthesize_speech failed"
                );
                format!("AWS Polly error: {:?}", e)
            })?;

        let audio_stream = result.audio_stream.collect().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to collect audio stream from Polly response");
            format!("Failed to read audio stream: {}", e)
        })?;

        Ok(audio_stream.into_bytes().to_vec())
    }
}

/// Split text into batches that respect sentence boundaries.
/// Each batch is at most MAX_BATCH_SIZE characters.
fn split_into_batches(text: &str) -> Vec<String> {
    if text.len() <= MAX_BATCH_SIZE {
        return vec![text.to_string()];
    }

    let mut batches = Vec::new();
    let mut current_batch = String::new();
    let mut last_end = 0;

    for mat in SENTENCE_END.find_iter(text) {
        let sentence = &text[last_end..mat.end()];
        if !current_batch.is_empty() && current_batch.len() + sentence.len() > MAX_BATCH_SIZE {
            batches.push(current_batch.trim().to_string());
            current_batch = String::new();
        }
        current_batch.push_str(sentence);
        last_end = mat.end();
    }

    if last_end < text.len() {
        let remaining = &text[last_end..];
        if !current_batch.is_empty() && current_batch.len() + remaining.len() > MAX_BATCH_SIZE {
            batches.push(current_batch.trim().to_string());
            current_batch = String::new();
        }

        // No sentence boundary left: split by characters
        if remaining.len() > MAX_BATCH_SIZE {
            let chars: Vec<char> = remaining.chars().collect();
            for chunk in chars.chunks(MAX_BATCH_SIZE) {
                batches.push(chunk.iter().collect());
            }
        } else {
            current_batch.push_str(remaining);
        }
    }

    if !current_batch.is_empty() {
        batches.push(current_batch.trim().to_string());
    }

    batches
}

#[async_trait]
impl TtsRepository for PollyTtsRepository {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>, String> {
        let start_time = std::time::Instant::now();

        let documents: Vec<String> = match &request.content {
            SpeechContent::Text(text) => split_into_batches(text)
                .into_iter()
                .map(|batch| to_ssml(&SpeechContent::Text(batch), &request.rate, &request.pitch))
                .collect(),
            content @ SpeechContent::Break { .. } => {
                vec![to_ssml(content, &request.rate, &request.pitch)]
            }
        };

        let mut merged_audio = Vec::new();
        for (index, ssml) in documents.iter().enumerate() {
            let audio_data = self.call_polly(ssml, request).await?;
            merged_audio.extend(audio_data);
            tracing::debug!(
                batch_index = index,
                total_audio_size = merged_audio.len(),
                "Batch synthesized and merged"
            );
        }

        tracing::info!(
            provider = "polly",
            voice = %request.voice,
            latency_ms = start_time.elapsed().as_millis(),
            batch_count = documents.len(),
            audio_size_bytes = merged_audio.len(),
            "TTS synthesis completed"
        );

        Ok(merged_audio)
    }
}
