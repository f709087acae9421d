/// Text features of one track in one language
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextFeatures {
    pub chars: usize,
    pub segments: usize,
    pub empty_segments: usize,
}

/// Estimated spoken length of text, in seconds
pub trait DurationEstimator: Send + Sync {
    fn estimate_seconds(&self, features: &TextFeatures) -> f64;
}

/// Linear estimate from recitation speed plus a pause per spoken segment
#[derive(Debug, Clone)]
pub struct CharRateEstimator {
    pub chars_per_minute: f64,
    pub segment_pause_secs: f64,
}

impl Default for CharRateEstimator {
    fn default() -> Self {
        Self {
            chars_per_minute: 800.0,
            segment_pause_secs: 0.5,
        }
    }
}

impl DurationEstimator for CharRateEstimator {
    fn estimate_seconds(&self, features: &TextFeatures) -> f64 {
        let spoken = features.segments.saturating_sub(features.empty_segments);
        features.chars as f64 * 60.0 / self.chars_per_minute
            + spoken as f64 * self.segment_pause_secs
    }
}
