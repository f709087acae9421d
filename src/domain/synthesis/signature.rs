use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Volume for text spoken outside of any document
pub const PLAY_WORD_VOLUME: &str = "play-word";

/// Volume for composed downloads
pub const COMMON_VOLUME: &str = "common";

/// Content address and provenance of one synthesized audio artifact.
///
/// `guid` is derived only from the inputs that affect the audio, so the same
/// text spoken by the same voice always lands on the same cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signature {
    pub guid: String,
    pub api: String,
    pub voice: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reader: Option<String>,
    pub volume: String,
    pub audio_suffix: String,
    pub text: String,
}

/// Deterministic hash of a JSON value.
///
/// `serde_json::Value` objects keep their keys sorted, so key order of the
/// caller's `json!` literal does not affect the result.
pub fn content_hash(value: &serde_json::Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.to_string().as_bytes());
    let digest = hasher.finalize();
    hex::encode(&digest[..16])
}

/// Cache namespace for one document/language/translator/voice combination
pub fn sutta_volume_name(sutta_uid: &str, language: &str, author: &str, voice: &str) -> String {
    let collection: String = sutta_uid
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    let collection = if collection.is_empty() {
        sutta_uid
    } else {
        collection.as_str()
    };
    format!("{}_{}_{}_{}", collection, language, author, voice).to_lowercase()
}
