use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub aws_region: String,
    pub environment: Environment,
    pub log_format: LogFormat,
    // Data locations
    pub voices_path: PathBuf,
    pub documents_path: PathBuf,
    pub recordings_path: PathBuf,
    pub sounds_path: PathBuf,
    // Audio tools
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    // Audio cache
    pub audio_memory_cache_enabled: bool,
    // Builds
    pub default_max_results: usize,
    pub default_max_duration_secs: u64,
    pub build_task_timeout_secs: u64,
    pub build_reaper_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let config = Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            aws_region: env::var("AWS_REGION").unwrap_or_else(|_| "us-west-1".to_string()),
            environment: match env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string())
                .as_str()
            {
                "production" => Environment::Production,
                _ => Environment::Development,
            },
            log_format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            voices_path: path_var("VOICES_PATH", "config/voices.json"),
            documents_path: path_var("DOCUMENTS_PATH", "local/suttas"),
            recordings_path: path_var("RECORDINGS_PATH", "local/recordings"),
            sounds_path: path_var("SOUNDS_PATH", "local/sounds"),
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            ffprobe_path: env::var("FFPROBE_PATH").unwrap_or_else(|_| "ffprobe".to_string()),
            audio_memory_cache_enabled: env::var("AUDIO_MEMORY_CACHE_ENABLED")
                .map(|s| s.to_lowercase() == "true")
                .unwrap_or(false),
            default_max_results: env::var("DEFAULT_MAX_RESULTS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()?,
            default_max_duration_secs: env::var("DEFAULT_MAX_DURATION_SECS")
                .unwrap_or_else(|_| "10800".to_string())
                .parse()?,
            build_task_timeout_secs: positive_secs(
                "BUILD_TASK_TIMEOUT_SECS",
                &env::var("BUILD_TASK_TIMEOUT_SECS").unwrap_or_else(|_| "1800".to_string()),
            )?,
            build_reaper_interval_secs: positive_secs(
                "BUILD_REAPER_INTERVAL_SECS",
                &env::var("BUILD_REAPER_INTERVAL_SECS").unwrap_or_else(|_| "60".to_string()),
            )?,
        };

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}

/// Whole seconds that must be at least one
fn positive_secs(key: &str, value: &str) -> Result<u64, Box<dyn std::error::Error>> {
    match value.trim().parse::<u64>()? {
        0 => Err(format!("{} must be greater than zero", key).into()),
        secs => Ok(secs),
    }
}

fn path_var(key: &str, default: &str) -> PathBuf {
    env::var(key)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}
