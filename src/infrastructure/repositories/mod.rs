pub mod content_cache;
pub mod document_repository;
pub mod polly_tts_repository;
pub mod recording_repository;
pub mod tts_repository;

pub use content_cache::{CacheError, ContentCache};
pub use document_repository::{DocumentRepository, DocumentStoreError, JsonDocumentRepository};
pub use polly_tts_repository::PollyTtsRepository;
pub use recording_repository::RecordingRepository;
pub use tts_repository::{SpeechContent, SpeechRequest, TtsRepository};

/// True when `name` can be joined onto a storage root as one path component
/// without leaving it
pub fn is_path_component(name: &str) -> bool {
    !name.is_empty()
        && !name.contains("..")
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
