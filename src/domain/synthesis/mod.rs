pub mod backend;
pub mod dispatcher;
pub mod error;
pub mod factory;
pub mod human;
pub mod machine;
pub mod normalize;
pub mod signature;

pub use backend::{
    BackendStats, SegmentRequest, SynthesisBackend, SynthesisOutput, SEGMENT_AUDIO_SUFFIX,
};
pub use dispatcher::{SpeakResult, SpeakSegment, Voice};
pub use error::{BackendError, SynthesisError};
pub use factory::{BackendFactory, SynthesisBackendFactory};
pub use signature::{content_hash, sutta_volume_name, Signature, COMMON_VOLUME, PLAY_WORD_VOLUME};
