use crate::error::AppError;
use crate::infrastructure::repositories::CacheError;

/// Failure reported by a single synthesis backend
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("no recording: {0}")]
    NoRecording(String),
    #[error("segment {scid} has no {language} text")]
    MissingText { scid: String, language: String },
    #[error("provider error: {0}")]
    Provider(String),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("unsupported usage:{usage} available:{}", available.join(","))]
    UnsupportedUsage {
        usage: String,
        available: Vec<String>,
    },
    #[error("invalid voice configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        let message = err.to_string();
        match err {
            BackendError::MissingText { .. } | BackendError::Cache(CacheError::NotFound(_)) => {
                AppError::NotFound(message)
            }
            _ => AppError::ExternalService(message),
        }
    }
}

impl From<SynthesisError> for AppError {
    fn from(err: SynthesisError) -> Self {
        let message = err.to_string();
        match err {
            SynthesisError::UnsupportedUsage { .. } => AppError::UnsupportedUsage(message),
            SynthesisError::Config(_) => AppError::Config(message),
            SynthesisError::Backend(e) => e.into(),
        }
    }
}
