use async_trait::async_trait;

/// What to say: prose spoken with prosody, or a silent pause
#[derive(Debug, Clone, PartialEq)]
pub enum SpeechContent {
    Text(String),
    Break { seconds: f32 },
}

/// One provider call, fully parameterized by the resolved voice
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    pub content: SpeechContent,
    /// Provider voice id (e.g. `Amy`, `Aditi`)
    pub voice: String,
    pub locale: String,
    pub rate: String,
    pub pitch: String,
}

/// Repository for machine TTS synthesis.
/// Abstracts the underlying provider (AWS Polly today).
///
/// Implementations are responsible for:
/// - Handling provider-specific text length limitations
/// - Merging audio chunks into a single MP3 stream
#[async_trait]
pub trait TtsRepository: Send + Sync {
    /// Synthesize the request and return MP3 bytes
    ///
    /// # Errors
    /// Returns error if synthesis fails or provider is unavailable
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>, String>;
}

/// Escape text for inclusion in SSML
pub fn escape_ssml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render a text batch or pause as an SSML document
pub fn to_ssml(content: &SpeechContent, rate: &str, pitch: &str) -> String {
    match content {
        SpeechContent::Text(text) => format!(
            r#"<speak><prosody rate="{}" pitch="{}">{}</prosody></speak>"#,
            rate,
            pitch,
            escape_ssml(text)
        ),
        SpeechContent::Break { seconds } => {
            format!(r#"<speak><break time="{:.3}s"/></speak>"#, seconds)
        }
    }
}
