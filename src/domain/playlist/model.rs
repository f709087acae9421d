use super::estimator::{DurationEstimator, TextFeatures};
use crate::domain::document::Segment;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Contiguous segments of one document by one author
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub sutta_uid: String,
    pub author: String,
    pub lang: String,
    pub title: Option<String>,
    pub segments: Vec<Segment>,
}

impl Track {
    pub fn features(&self, language: &str) -> TextFeatures {
        let mut features = TextFeatures {
            segments: self.segments.len(),
            ..Default::default()
        };
        for segment in &self.segments {
            match segment.text_of(language) {
                Some(text) => features.chars += text.chars().count(),
                None => features.empty_segments += 1,
            }
        }
        features
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlaylistStats {
    pub tracks: usize,
    pub chars: BTreeMap<String, usize>,
    pub segments: BTreeMap<String, usize>,
    /// Estimated seconds
    pub duration: u64,
}

pub struct Playlist {
    tracks: Vec<Track>,
    languages: Vec<String>,
    estimator: Arc<dyn DurationEstimator>,
}

impl std::fmt::Debug for Playlist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Playlist")
            .field("tracks", &self.tracks)
            .field("languages", &self.languages)
            .finish()
    }
}

impl Playlist {
    pub fn new(
        tracks: Vec<Track>,
        languages: Vec<String>,
        estimator: Arc<dyn DurationEstimator>,
    ) -> Self {
        Self {
            tracks,
            languages,
            estimator,
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    /// Distinct track authors in playlist order
    pub fn author_uids(&self) -> Vec<String> {
        let mut authors: Vec<String> = Vec::new();
        for track in &self.tracks {
            if !track.author.is_empty() && !authors.contains(&track.author) {
                authors.push(track.author.clone());
            }
        }
        authors
    }

    pub fn segment_count(&self) -> usize {
        self.tracks.iter().map(|t| t.segments.len()).sum()
    }

    pub fn track_seconds(&self, track: &Track) -> f64 {
        self.languages
            .iter()
            .map(|lang| self.estimator.estimate_seconds(&track.features(lang)))
            .sum()
    }

    /// Aggregates computed from the current tracks
    pub fn stats(&self) -> PlaylistStats {
        let mut stats = PlaylistStats {
            tracks: self.tracks.len(),
            ..Default::default()
        };
        let mut seconds = 0.0;
        for track in &self.tracks {
            for lang in &self.languages {
                let features = track.features(lang);
                *stats.chars.entry(lang.clone()).or_default() += features.chars;
                *stats.segments.entry(lang.clone()).or_default() +=
                    features.segments - features.empty_segments;
            }
            seconds += self.track_seconds(track);
        }
        stats.duration = seconds.round() as u64;
        stats
    }
}
