use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One segment of a document, keyed by segment id (e.g. `thig1.1:1.1`),
/// carrying the text of every language it was loaded with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub scid: String,
    #[serde(default = "default_matched")]
    pub matched: bool,
    #[serde(flatten)]
    pub text: BTreeMap<String, String>,
}

fn default_matched() -> bool {
    true
}

impl Segment {
    pub fn new(scid: impl Into<String>) -> Self {
        Self {
            scid: scid.into(),
            matched: true,
            text: BTreeMap::new(),
        }
    }

    pub fn with_text(mut self, language: &str, text: impl Into<String>) -> Self {
        self.text.insert(language.to_string(), text.into());
        self
    }

    /// Text for a language, ignoring blank entries
    pub fn text_of(&self, language: &str) -> Option<&str> {
        self.text
            .get(language)
            .map(String::as_str)
            .filter(|text| !text.trim().is_empty())
    }

    /// Document id part of the segment id (`sn1.1:0.2` -> `sn1.1`)
    pub fn sutta_uid(&self) -> &str {
        sutta_uid_of(&self.scid)
    }
}

pub fn sutta_uid_of(scid: &str) -> &str {
    scid.split(':').next().unwrap_or(scid)
}

/// A segmented document as returned by the document store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub sutta_uid: String,
    pub lang: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub segments: Vec<Segment>,
}

impl Document {
    pub fn segment_index(&self, scid: &str) -> Option<usize> {
        self.segments.iter().position(|segment| segment.scid == scid)
    }
}

/// Query resolved by the document store for multi-segment builds
#[derive(Debug, Clone)]
pub struct DocumentQuery {
    pub pattern: String,
    pub lang: String,
    pub max_results: usize,
}
