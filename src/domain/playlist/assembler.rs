use super::estimator::DurationEstimator;
use super::model::{Playlist, Track};
use crate::domain::document::{Document, Segment};
use std::sync::Arc;

pub const ERROR_TRACK_ID: &str = "createPlaylist_error1";

/// Groups matched segments into tracks and enforces the duration budget
pub struct PlaylistAssembler {
    estimator: Arc<dyn DurationEstimator>,
}

impl PlaylistAssembler {
    pub fn new(estimator: Arc<dyn DurationEstimator>) -> Self {
        Self { estimator }
    }

    /// Build a playlist from documents in order. A playlist longer than
    /// `max_duration_secs` is replaced by a single error track.
    pub fn assemble(
        &self,
        documents: &[Document],
        languages: &[String],
        max_duration_secs: u64,
    ) -> Playlist {
        let mut tracks: Vec<Track> = Vec::new();
        for document in documents {
            for segment in document.segments.iter().filter(|s| s.matched) {
                let sutta_uid = segment.sutta_uid();
                let current = tracks
                    .last_mut()
                    .filter(|t| t.sutta_uid == sutta_uid && t.author == document.author);
                match current {
                    Some(track) => track.segments.push(segment.clone()),
                    None => tracks.push(Track {
                        sutta_uid: sutta_uid.to_string(),
                        author: document.author.clone(),
                        lang: document.lang.clone(),
                        title: document.title.clone(),
                        segments: vec![segment.clone()],
                    }),
                }
            }
        }

        let playlist = Playlist::new(tracks, languages.to_vec(), self.estimator.clone());
        let duration = playlist.stats().duration;
        if duration <= max_duration_secs {
            return playlist;
        }

        tracing::warn!(
            duration_secs = duration,
            max_duration_secs,
            tracks = playlist.tracks().len(),
            "Playlist exceeds duration limit"
        );
        Playlist::new(
            vec![error_track(languages, max_duration_secs)],
            languages.to_vec(),
            self.estimator.clone(),
        )
    }
}

fn error_track(languages: &[String], max_duration_secs: u64) -> Track {
    let minutes = (max_duration_secs as f64 / 60.0).round();
    let message = format!(
        "Play list is too long to be played. All play lists must be less than {} minutes long",
        minutes
    );

    let mut segment = Segment::new(format!("{}:0.1", ERROR_TRACK_ID)).with_text("en", &message);
    for lang in languages.iter().filter(|l| l.as_str() != "pli") {
        segment = segment.with_text(lang, &message);
    }

    Track {
        sutta_uid: ERROR_TRACK_ID.to_string(),
        author: String::new(),
        lang: "en".to_string(),
        title: None,
        segments: vec![segment],
    }
}
