use super::catalog::VoiceCatalog;
use super::error::VoiceError;
use super::model::{BackendKind, UsageConfig, VoiceProfile};
use crate::domain::synthesis::{BackendFactory, SynthesisBackend, Voice};
use parking_lot::Mutex;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

pub const DEFAULT_LOCALE: &str = "en-IN";
const USAGE_KEYWORDS: [&str; 3] = ["navigate", "review", "recite"];

/// Structured voice constraints. Every given field must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceFilter {
    pub locale: Option<String>,
    pub name: Option<String>,
    pub usage: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceSelector {
    Default,
    Locale(String),
    Name(String),
    Usage(String),
    Filter(VoiceFilter),
}

impl VoiceSelector {
    /// Interpret caller text once: a usage keyword, else a locale prefix
    /// known to the catalog, else a voice name.
    pub fn parse(text: Option<&str>, catalog: &VoiceCatalog) -> Result<Self, VoiceError> {
        let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
            return Ok(Self::Default);
        };
        if USAGE_KEYWORDS.contains(&text) {
            return Ok(Self::Usage(text.to_string()));
        }
        if catalog.by_locale_prefix(text).is_ok() {
            return Ok(Self::Locale(text.to_string()));
        }
        if catalog.by_name(text).is_ok() {
            return Ok(Self::Name(text.to_string()));
        }
        Err(VoiceError::NotFound(format!("could not create voice:{}", text)))
    }

    pub fn filter(&self) -> VoiceFilter {
        match self {
            Self::Default => VoiceFilter {
                locale: Some(DEFAULT_LOCALE.to_string()),
                ..Default::default()
            },
            Self::Locale(locale) => VoiceFilter {
                locale: Some(locale.clone()),
                ..Default::default()
            },
            Self::Name(name) => VoiceFilter {
                name: Some(name.clone()),
                ..Default::default()
            },
            Self::Usage(usage) => VoiceFilter {
                usage: Some(usage.clone()),
                ..Default::default()
            },
            Self::Filter(filter) => filter.clone(),
        }
    }
}

/// Turns selectors into voices with their backends wired.
///
/// Voices are built once per profile so backend hit/miss counters are
/// shared by every caller.
pub struct VoiceResolver {
    catalog: Arc<VoiceCatalog>,
    factory: Arc<dyn BackendFactory>,
    voices: Mutex<HashMap<String, Arc<Voice>>>,
}

impl VoiceResolver {
    pub fn new(catalog: Arc<VoiceCatalog>, factory: Arc<dyn BackendFactory>) -> Self {
        Self {
            catalog,
            factory,
            voices: Mutex::new(HashMap::new()),
        }
    }

    pub fn catalog(&self) -> &Arc<VoiceCatalog> {
        &self.catalog
    }

    pub fn parse_selector(&self, text: Option<&str>) -> Result<VoiceSelector, VoiceError> {
        VoiceSelector::parse(text, &self.catalog)
    }

    /// Pick the profile for a selector: filter by every constraint, then
    /// highest usage priority first, then name.
    pub fn select_profile(&self, selector: &VoiceSelector) -> Result<Arc<VoiceProfile>, VoiceError> {
        if let VoiceSelector::Name(name) = selector {
            return self.catalog.by_name(name);
        }

        let filter = selector.filter();
        let mut candidates: Vec<&Arc<VoiceProfile>> = self
            .catalog
            .voices()
            .iter()
            .filter(|v| matches_filter(v, &filter))
            .collect();

        candidates.sort_by(|a, b| {
            let by_priority = match &filter.usage {
                Some(usage) => b.usage_priority(usage).cmp(&a.usage_priority(usage)),
                None => Ordering::Equal,
            };
            by_priority.then_with(|| a.name.cmp(&b.name))
        });

        candidates
            .first()
            .map(|v| Arc::clone(v))
            .ok_or_else(|| VoiceError::NotFound(format!("no pre-defined voice for {:?}", filter)))
    }

    pub fn create_voice(&self, selector: &VoiceSelector) -> Result<Arc<Voice>, VoiceError> {
        let profile = self.select_profile(selector)?;
        self.voice_for_profile(profile)
    }

    pub fn voice_of_name(&self, name: &str) -> Result<Arc<Voice>, VoiceError> {
        self.voice_for_profile(self.catalog.by_name(name)?)
    }

    fn voice_for_profile(&self, profile: Arc<VoiceProfile>) -> Result<Arc<Voice>, VoiceError> {
        if let Some(voice) = self.voices.lock().get(&profile.name) {
            return Ok(voice.clone());
        }

        if !profile.has_lexicon() {
            return Err(VoiceError::Config(format!(
                "expected IPA lexicon for pre-configured voice: {}",
                profile.name
            )));
        }

        let services = self.backends(&profile);
        let alt = match profile.service {
            BackendKind::HumanTts => Some(self.alt_backend(&profile)?),
            BackendKind::AwsPolly => None,
        };
        let voice = Voice::new(profile.clone(), services, alt)
            .map_err(|e| VoiceError::Config(e.to_string()))?;

        tracing::debug!(
            voice = %profile.name,
            service = %profile.service,
            usages = ?voice.usages(),
            "Voice created"
        );

        let mut voices = self.voices.lock();
        Ok(voices
            .entry(profile.name.clone())
            .or_insert_with(|| Arc::new(voice))
            .clone())
    }

    fn backends(&self, profile: &Arc<VoiceProfile>) -> BTreeMap<String, Arc<dyn SynthesisBackend>> {
        let mut services = BTreeMap::new();
        for (usage, config) in &profile.usages {
            services.insert(
                usage.clone(),
                self.factory.create_backend(profile.clone(), usage, config),
            );
        }
        if !services.contains_key(&profile.usage) {
            let config = UsageConfig::default();
            services.insert(
                profile.usage.clone(),
                self.factory.create_backend(profile.clone(), &profile.usage, &config),
            );
        }
        services
    }

    /// Machine backend that speaks whatever a human voice never recorded
    fn alt_backend(&self, profile: &VoiceProfile) -> Result<Arc<dyn SynthesisBackend>, VoiceError> {
        let alt_name = match (&profile.alt_tts, profile.lang_trans.as_str()) {
            (Some(name), _) => name.as_str(),
            (None, "pli") => "Aditi",
            (None, "en") => "Amy",
            (None, lang) => {
                return Err(VoiceError::Config(format!(
                    "{} has no altTts and no conventional {} fallback",
                    profile.name, lang
                )))
            }
        };

        let alt_profile = self.catalog.by_name(alt_name)?;
        if alt_profile.service == BackendKind::HumanTts {
            return Err(VoiceError::Config(format!(
                "{} altTts {} must be a machine voice",
                profile.name, alt_name
            )));
        }

        let alt_voice = self.voice_for_profile(alt_profile)?;
        alt_voice
            .service(Some("recite"))
            .or_else(|_| alt_voice.service(None))
            .cloned()
            .map_err(|e| VoiceError::Config(e.to_string()))
    }
}

fn matches_filter(voice: &VoiceProfile, filter: &VoiceFilter) -> bool {
    if let Some(locale) = &filter.locale {
        if !voice.locale.starts_with(locale.as_str()) {
            return false;
        }
    }
    if let Some(name) = &filter.name {
        if !voice.name.eq_ignore_ascii_case(name) {
            return false;
        }
    }
    if let Some(usage) = &filter.usage {
        if !voice.usages.contains_key(usage) {
            return false;
        }
    }
    true
}
