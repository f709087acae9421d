use super::error::VoiceError;
use super::model::VoiceProfile;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Immutable set of voice profiles. Built once and shared by reference.
#[derive(Debug, Default)]
pub struct VoiceCatalog {
    voices: Vec<Arc<VoiceProfile>>,
}

impl VoiceCatalog {
    pub fn from_profiles(profiles: Vec<VoiceProfile>) -> Self {
        Self {
            voices: profiles.into_iter().map(Arc::new).collect(),
        }
    }

    /// Parse a JSON array of voice profiles
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, VoiceError> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path).await.map_err(|e| {
            VoiceError::Config(format!("cannot read voices {}: {}", path.display(), e))
        })?;
        let profiles: Vec<VoiceProfile> = serde_json::from_str(&json).map_err(|e| {
            VoiceError::Config(format!("invalid voices {}: {}", path.display(), e))
        })?;

        for profile in &profiles {
            tracing::info!(voice = %profile.name, locale = %profile.locale, "Loaded voice");
        }

        Ok(Self::from_profiles(profiles))
    }

    pub fn voices(&self) -> &[Arc<VoiceProfile>] {
        &self.voices
    }

    /// Case-insensitive name lookup. Numeric names select by voice index.
    pub fn by_name(&self, name: &str) -> Result<Arc<VoiceProfile>, VoiceError> {
        let found = match name.trim().parse::<u32>() {
            Ok(index) => self.voices.iter().find(|v| v.i_voice == Some(index)),
            Err(_) => {
                let lower = name.to_lowercase();
                self.voices.iter().find(|v| v.name.to_lowercase() == lower)
            }
        };
        found
            .cloned()
            .ok_or_else(|| VoiceError::NotFound(format!("no voice named {}", name)))
    }

    /// First voice, in catalog order, whose locale starts with the prefix
    pub fn by_locale_prefix(&self, locale: &str) -> Result<Arc<VoiceProfile>, VoiceError> {
        self.voices
            .iter()
            .find(|v| v.locale.starts_with(locale))
            .cloned()
            .ok_or_else(|| VoiceError::NotFound(format!("no voice for locale {}", locale)))
    }

    pub fn supported_languages(&self) -> BTreeSet<String> {
        let mut languages = BTreeSet::new();
        for voice in &self.voices {
            languages.insert(voice.lang_trans.clone());
            if voice.lang_trans == "ja" {
                languages.insert("jpn".to_string());
            }
        }
        languages
    }

    /// Voices in display order: English first, Pali last, then by index and name
    pub fn sorted(&self) -> Vec<Arc<VoiceProfile>> {
        let mut voices = self.voices.clone();
        voices.sort_by(|a, b| compare_voices(a, b));
        voices
    }
}

fn compare_voices(a: &VoiceProfile, b: &VoiceProfile) -> Ordering {
    if a.lang_trans == b.lang_trans {
        let by_index = match (a.i_voice, b.i_voice) {
            (Some(ia), Some(ib)) => ia.cmp(&ib),
            _ => Ordering::Equal,
        };
        return by_index.then_with(|| a.name.cmp(&b.name));
    }
    match (a.lang_trans.as_str(), b.lang_trans.as_str()) {
        ("pli", _) => Ordering::Greater,
        (_, "pli") => Ordering::Less,
        ("en", _) => Ordering::Less,
        (_, "en") => Ordering::Greater,
        (la, lb) => la.cmp(lb),
    }
}

/// Loads the catalog from disk at most once per process
pub struct CatalogLoader {
    path: PathBuf,
    catalog: OnceCell<Arc<VoiceCatalog>>,
}

impl CatalogLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            catalog: OnceCell::new(),
        }
    }

    pub async fn get(&self) -> Result<Arc<VoiceCatalog>, VoiceError> {
        self.catalog
            .get_or_try_init(|| async { VoiceCatalog::load(&self.path).await.map(Arc::new) })
            .await
            .cloned()
    }
}
