// End-to-end tests for the SuttaVoice Backend API
//
// Every test starts the real router on an ephemeral port. Documents,
// recordings and the sound cache live in a per-test temporary directory.
// Speech and audio composition are served by in-process fakes so the
// tests need neither AWS credentials nor ffmpeg.

mod helpers;
mod test_download;
mod test_health;
mod test_playback;
mod test_voices;
