use super::error::BackendError;
use super::signature::Signature;
use crate::domain::document::Segment;
use crate::domain::voice::BackendKind;
use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

/// Every backend stores segment audio as MP3
pub const SEGMENT_AUDIO_SUFFIX: &str = ".mp3";

/// Audio produced (or found in the cache) by a backend
#[derive(Debug, Clone)]
pub struct SynthesisOutput {
    pub signature: Signature,
    pub path: PathBuf,
    pub cached: bool,
}

/// One language field of one segment, with its cache namespace
#[derive(Debug, Clone, Copy)]
pub struct SegmentRequest<'a> {
    pub segment: &'a Segment,
    pub language: &'a str,
    pub author: &'a str,
    pub volume: &'a str,
}

impl SegmentRequest<'_> {
    pub fn text(&self) -> Result<&str, BackendError> {
        self.segment
            .text_of(self.language)
            .ok_or_else(|| BackendError::MissingText {
                scid: self.segment.scid.clone(),
                language: self.language.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BackendStats {
    pub hits: u64,
    pub misses: u64,
}

/// Cache hit/miss accounting shared by all callers of a backend
#[derive(Debug, Default)]
pub struct BackendCounters {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl BackendCounters {
    pub fn record(&self, cached: bool) {
        if cached {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> BackendStats {
        BackendStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// A speech source bound to one voice and one usage.
///
/// Implementations compute a content signature for every output and go
/// through the content cache, so repeated requests are served from disk.
#[async_trait]
pub trait SynthesisBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Provider voice name (`Amy`) or recording voice (`sujato_pli`)
    fn voice_name(&self) -> &str;

    /// Signature of `text` as this backend would speak it. Pure.
    fn signature(&self, text: &str, volume: &str) -> Signature;

    async fn synthesize_text(&self, text: &str, volume: &str)
        -> Result<SynthesisOutput, BackendError>;

    async fn synthesize_segment(
        &self,
        request: &SegmentRequest<'_>,
    ) -> Result<SynthesisOutput, BackendError>;

    async fn synthesize_break(
        &self,
        seconds: f32,
        volume: &str,
    ) -> Result<SynthesisOutput, BackendError>;

    fn stats(&self) -> BackendStats;
}
