pub mod assembler;
pub mod estimator;
pub mod model;

pub use assembler::{PlaylistAssembler, ERROR_TRACK_ID};
pub use estimator::{CharRateEstimator, DurationEstimator, TextFeatures};
pub use model::{Playlist, PlaylistStats, Track};
