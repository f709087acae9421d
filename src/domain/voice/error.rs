use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    #[error("voice not found: {0}")]
    NotFound(String),
    #[error("voice configuration error: {0}")]
    Config(String),
}

impl From<VoiceError> for AppError {
    fn from(err: VoiceError) -> Self {
        let message = err.to_string();
        match err {
            VoiceError::NotFound(_) => AppError::NotFound(message),
            VoiceError::Config(_) => AppError::Config(message),
        }
    }
}
