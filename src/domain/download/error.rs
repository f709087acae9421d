use crate::domain::synthesis::SynthesisError;
use crate::domain::voice::VoiceError;
use crate::error::AppError;
use crate::infrastructure::audio::CompositorError;
use crate::infrastructure::repositories::{CacheError, DocumentStoreError};

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("Unsupported audio type:{0}")]
    UnsupportedFormat(String),
    #[error("{0}")]
    Invalid(String),
    #[error("not found: {0}")]
    NotFound(String),
    /// Terminal error of the registered build, as recorded on its task
    #[error("{0}")]
    Build(String),
    #[error(transparent)]
    Voice(#[from] VoiceError),
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
    #[error(transparent)]
    Document(#[from] DocumentStoreError),
    #[error(transparent)]
    Compositor(#[from] CompositorError),
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl From<DownloadError> for AppError {
    fn from(err: DownloadError) -> Self {
        let message = err.to_string();
        match err {
            DownloadError::Voice(e) => e.into(),
            DownloadError::Synthesis(e) => e.into(),
            DownloadError::UnsupportedFormat(_)
            | DownloadError::Compositor(CompositorError::Unsupported(_)) => {
                AppError::UnsupportedFormat(message)
            }
            DownloadError::Invalid(_) | DownloadError::Document(DocumentStoreError::Invalid(_)) => {
                AppError::BadRequest(message)
            }
            DownloadError::NotFound(_)
            | DownloadError::Document(DocumentStoreError::NotFound(_))
            | DownloadError::Cache(CacheError::NotFound(_)) => AppError::NotFound(message),
            DownloadError::Compositor(_) => AppError::ExternalService(message),
            DownloadError::Build(_) | DownloadError::Document(_) | DownloadError::Cache(_) => {
                AppError::Internal(message)
            }
        }
    }
}
