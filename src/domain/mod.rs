pub mod document;
pub mod download;
pub mod playback;
pub mod playlist;
pub mod synthesis;
pub mod voice;
