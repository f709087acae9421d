use super::is_path_component;
use std::path::PathBuf;

/// Pre-recorded human readings stored as
/// `{root}/{language}/{author}/{scid with ':' as '_'}.mp3`
pub struct RecordingRepository {
    root: PathBuf,
}

impl RecordingRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn recording_path(&self, language: &str, author: &str, scid: &str) -> PathBuf {
        self.root
            .join(language)
            .join(author)
            .join(format!("{}.mp3", scid.replace(':', "_")))
    }

    pub async fn find(&self, language: &str, author: &str, scid: &str) -> Option<PathBuf> {
        if ![language, author, scid.replace(':', "_").as_str()]
            .into_iter()
            .all(is_path_component)
        {
            tracing::warn!(language, author, scid, "Rejected recording reference");
            return None;
        }
        let path = self.recording_path(language, author, scid);
        match tokio::fs::try_exists(&path).await {
            Ok(true) => Some(path),
            _ => None,
        }
    }
}
