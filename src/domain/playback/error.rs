use crate::domain::voice::VoiceError;
use crate::error::AppError;
use crate::infrastructure::repositories::{CacheError, DocumentStoreError};

#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Voice(#[from] VoiceError),
    #[error(transparent)]
    Document(#[from] DocumentStoreError),
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl From<PlaybackError> for AppError {
    fn from(err: PlaybackError) -> Self {
        let message = err.to_string();
        match err {
            PlaybackError::Voice(e) => e.into(),
            PlaybackError::NotFound(_)
            | PlaybackError::Document(DocumentStoreError::NotFound(_))
            | PlaybackError::Cache(CacheError::NotFound(_)) => AppError::NotFound(message),
            PlaybackError::Document(DocumentStoreError::Invalid(_))
            | PlaybackError::Cache(CacheError::InvalidAddress(_)) => AppError::BadRequest(message),
            PlaybackError::Document(_) | PlaybackError::Cache(_) => AppError::Internal(message),
        }
    }
}
