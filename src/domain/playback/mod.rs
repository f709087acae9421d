pub mod error;
pub mod service;

pub use error::PlaybackError;
pub use service::{
    AudioFile, AudioRequest, PlaySegment, PlaySegmentRequest, PlaybackService, PlayedSegment,
    DEFAULT_ROOT_VOICE, DEFAULT_TRANS_VOICE, PLAY_USAGE,
};
