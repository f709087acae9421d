use super::error::DownloadError;
use crate::domain::synthesis::content_hash;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const MAX_DURATION_SECS: u64 = 8 * 60 * 60;

/// Languages spoken under another code
pub fn map_language(lang: &str) -> String {
    match lang {
        "ja" => "jpn".to_string(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioSuffix {
    #[serde(rename = ".mp3")]
    Mp3,
    #[serde(rename = ".ogg")]
    Ogg,
    #[serde(rename = ".opus")]
    Opus,
}

impl AudioSuffix {
    /// Accepts `mp3`, `.MP3`, `ogg`, `.opus` and so on
    pub fn parse(value: &str) -> Result<Self, DownloadError> {
        let lower = value.trim().to_lowercase();
        match lower.trim_start_matches('.') {
            "mp3" => Ok(Self::Mp3),
            "ogg" => Ok(Self::Ogg),
            "opus" => Ok(Self::Opus),
            _ => Err(DownloadError::UnsupportedFormat(value.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mp3 => ".mp3",
            Self::Ogg => ".ogg",
            Self::Opus => ".opus",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::Ogg => "audio/ogg",
            Self::Opus => "audio/opus",
        }
    }
}

impl std::fmt::Display for AudioSuffix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw build parameters as received from path and query
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadRequest {
    pub pattern: Option<String>,
    pub audio_suffix: Option<String>,
    pub vroot: Option<String>,
    pub vtrans: Option<String>,
    pub langs: Option<String>,
    pub lang: Option<String>,
    pub max_results: Option<String>,
    pub max_duration: Option<String>,
}

/// Fallbacks for parameters the caller omits
#[derive(Debug, Clone, Copy)]
pub struct DownloadDefaults {
    pub max_results: usize,
    pub max_duration_secs: u64,
}

/// Validated build parameters and their fingerprint
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadArgs {
    pub audio_suffix: AudioSuffix,
    pub vroot: String,
    pub vtrans: String,
    pub langs: Vec<String>,
    pub lang: String,
    pub pattern: String,
    pub max_results: usize,
    pub max_duration: u64,
    pub hash: String,
}

impl DownloadArgs {
    pub fn from_request(
        request: &DownloadRequest,
        defaults: DownloadDefaults,
    ) -> Result<Self, DownloadError> {
        let audio_suffix = AudioSuffix::parse(request.audio_suffix.as_deref().unwrap_or(".mp3"))?;

        let pattern = request
            .pattern
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| DownloadError::Invalid("Search pattern is required".to_string()))?;
        let pattern = urlencoding::decode(pattern)
            .map_err(|e| DownloadError::Invalid(format!("invalid pattern encoding: {}", e)))?
            .into_owned();

        let langs: Vec<String> = request
            .langs
            .as_deref()
            .unwrap_or("pli+en")
            .to_lowercase()
            .split('+')
            .filter(|l| !l.is_empty())
            .map(map_language)
            .collect();
        if langs.is_empty() {
            return Err(DownloadError::Invalid("Expected at least one language".to_string()));
        }

        let lang = map_language(&request.lang.as_deref().unwrap_or("en").to_lowercase());

        let max_results = match request.max_results.as_deref() {
            None => defaults.max_results,
            Some(value) => value
                .trim()
                .parse::<usize>()
                .map_err(|_| DownloadError::Invalid("Expected number for maxResults".to_string()))?,
        };

        let max_duration = request
            .max_duration
            .as_deref()
            .and_then(|value| value.trim().parse::<u64>().ok())
            .unwrap_or(defaults.max_duration_secs)
            .min(MAX_DURATION_SECS);

        let mut args = Self {
            audio_suffix,
            vroot: request.vroot.clone().unwrap_or_else(|| "Aditi".to_string()),
            vtrans: request.vtrans.clone().unwrap_or_else(|| "Amy".to_string()),
            langs,
            lang,
            pattern,
            max_results,
            max_duration,
            hash: String::new(),
        };
        args.hash = args.fingerprint();
        Ok(args)
    }

    fn fingerprint(&self) -> String {
        content_hash(&json!({
            "audioSuffix": self.audio_suffix.as_str(),
            "lang": self.lang,
            "langs": self.langs,
            "maxDuration": self.max_duration,
            "maxResults": self.max_results,
            "pattern": self.pattern,
            "vroot": self.vroot,
            "vtrans": self.vtrans,
        }))
    }

    /// Attachment name, e.g. `thig1.1-3_pli+en_Amy.mp3`
    pub fn filename(&self) -> String {
        let safe: String = self
            .pattern
            .chars()
            .map(|c| match c {
                ' ' | ',' | '\t' => '_',
                '/' => '-',
                other => other,
            })
            .collect();
        format!(
            "{}_{}_{}{}",
            urlencoding::encode(&safe),
            self.langs.join("+"),
            self.vtrans,
            self.audio_suffix
        )
    }
}
