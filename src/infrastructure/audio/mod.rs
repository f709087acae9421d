pub mod ffmpeg;

pub use ffmpeg::FfmpegCompositor;

use async_trait::async_trait;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CompositorError {
    #[error("unsupported audio type: {0}")]
    Unsupported(String),
    #[error("nothing to compose")]
    Empty,
    #[error("{tool} failed: {message}")]
    Process { tool: String, message: String },
    #[error("compositor io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Tags written into a composed file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioMetadata {
    pub title: String,
    pub album: String,
    pub artist: String,
    pub album_artist: String,
    pub languages: String,
    pub copyright: String,
    pub publisher: String,
}

impl AudioMetadata {
    /// Non-empty tags as `key=value` pairs in a stable order
    pub fn tags(&self) -> Vec<(&'static str, &str)> {
        [
            ("title", self.title.as_str()),
            ("album", self.album.as_str()),
            ("artist", self.artist.as_str()),
            ("album_artist", self.album_artist.as_str()),
            ("language", self.languages.as_str()),
            ("copyright", self.copyright.as_str()),
            ("publisher", self.publisher.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComposedAudio {
    pub bytes: Vec<u8>,
    pub duration_seconds: f64,
    /// Start offset in seconds of every input
    pub track_boundaries: Vec<f64>,
}

/// Concatenates audio files into one encoded artifact
#[async_trait]
pub trait AudioCompositor: Send + Sync {
    async fn concat(
        &self,
        inputs: &[PathBuf],
        metadata: &AudioMetadata,
        audio_suffix: &str,
    ) -> Result<ComposedAudio, CompositorError>;
}
