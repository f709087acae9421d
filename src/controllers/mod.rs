pub mod download;
pub mod health;
pub mod playback;
pub mod voices;
