use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const RATE_FAST: &str = "+5%";
pub const RATE_SLOW: &str = "-20%";

/// Synthesis backend a voice is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BackendKind {
    #[default]
    #[serde(rename = "aws-polly")]
    AwsPolly,
    #[serde(rename = "human-tts")]
    HumanTts,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::AwsPolly => "aws-polly",
            BackendKind::HumanTts => "human-tts",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-usage synthesis settings of a voice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageConfig {
    #[serde(default = "default_rate")]
    pub rate: String,
    /// Higher priority wins when several voices offer the same usage
    #[serde(default)]
    pub priority: i32,
    /// Pause lengths in seconds, indexed by break strength
    #[serde(default)]
    pub breaks: Vec<f32>,
}

impl Default for UsageConfig {
    fn default() -> Self {
        Self {
            rate: default_rate(),
            priority: 0,
            breaks: Vec::new(),
        }
    }
}

/// Immutable voice definition loaded from the voice catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceProfile {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    pub locale: String,
    #[serde(default, rename = "localeIPA")]
    pub locale_ipa: Option<String>,
    #[serde(default = "default_lang_trans")]
    pub lang_trans: String,
    #[serde(default)]
    pub service: BackendKind,
    #[serde(default = "default_gender")]
    pub gender: String,
    #[serde(default)]
    pub voice_version: u32,
    #[serde(default)]
    pub i_voice: Option<u32>,
    #[serde(default = "default_usage")]
    pub usage: String,
    #[serde(default)]
    pub usages: BTreeMap<String, UsageConfig>,
    /// Pronunciation lexicon by language. Required for synthesis.
    #[serde(default)]
    pub ipa: Option<BTreeMap<String, BTreeMap<String, String>>>,
    #[serde(default)]
    pub trim_segment_suffix: Option<String>,
    /// Name of the machine voice used when no human recording exists
    #[serde(default)]
    pub alt_tts: Option<String>,
    #[serde(default = "default_pitch")]
    pub pitch: String,
    #[serde(default)]
    pub strip_numbers: bool,
    #[serde(default)]
    pub strip_quotes: bool,
}

impl VoiceProfile {
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    pub fn locale_ipa(&self) -> &str {
        self.locale_ipa.as_deref().unwrap_or(&self.lang_trans)
    }

    pub fn usage_config(&self, usage: &str) -> Option<&UsageConfig> {
        self.usages.get(usage)
    }

    pub fn usage_priority(&self, usage: &str) -> i32 {
        self.usages.get(usage).map(|u| u.priority).unwrap_or(0)
    }

    pub fn has_lexicon(&self) -> bool {
        self.ipa.is_some()
    }
}

fn default_rate() -> String {
    RATE_SLOW.to_string()
}

fn default_lang_trans() -> String {
    "en".to_string()
}

fn default_gender() -> String {
    "female".to_string()
}

fn default_usage() -> String {
    "recite".to_string()
}

fn default_pitch() -> String {
    "-0%".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_profile_defaults_from_minimal_json() {
        let json = r#"{ "name": "Raveena", "locale": "en-IN", "ipa": {} }"#;
        let profile: VoiceProfile = serde_json::from_str(json).unwrap();

        assert_eq!(profile.service, BackendKind::AwsPolly);
        assert_eq!(profile.lang_trans, "en");
        assert_eq!(profile.locale_ipa(), "en");
        assert_eq!(profile.usage, "recite");
        assert_eq!(profile.gender, "female");
        assert_eq!(profile.voice_version, 0);
        assert_eq!(profile.label(), "Raveena");
        assert!(profile.has_lexicon());
    }

    #[test]
    fn test_profile_reads_usages_and_service() {
        let json = r#"{
            "name": "sujato_pli",
            "locale": "pli",
            "langTrans": "pli",
            "localeIPA": "pli",
            "service": "human-tts",
            "usages": { "recite": { "rate": "-30%", "priority": 3 } }
        }"#;
        let profile: VoiceProfile = serde_json::from_str(json).unwrap();

        assert_eq!(profile.service, BackendKind::HumanTts);
        assert_eq!(profile.usage_priority("recite"), 3);
        assert_eq!(profile.usage_priority("navigate"), 0);
        assert_eq!(profile.usage_config("recite").unwrap().rate, "-30%");
        assert!(!profile.has_lexicon());
    }
}
