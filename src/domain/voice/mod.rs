pub mod catalog;
pub mod error;
pub mod model;
pub mod resolver;

pub use catalog::{CatalogLoader, VoiceCatalog};
pub use error::VoiceError;
pub use model::{BackendKind, UsageConfig, VoiceProfile, RATE_FAST, RATE_SLOW};
pub use resolver::{VoiceFilter, VoiceResolver, VoiceSelector, DEFAULT_LOCALE};
