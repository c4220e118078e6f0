//! Application configuration

use crate::utils::error::VidmetaError;
use crate::utils::paths::default_database_url;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Deployment profile, selects the static engine settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentProfile {
    #[default]
    Development,
    Production,
    Testing,
}

impl std::str::FromStr for DeploymentProfile {
    type Err = VidmetaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "default" => Ok(DeploymentProfile::Development),
            "production" => Ok(DeploymentProfile::Production),
            "testing" => Ok(DeploymentProfile::Testing),
            other => Err(VidmetaError::Config(format!("unknown profile '{}'", other))),
        }
    }
}

/// Static extraction settings shared by every request of a deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    pub socket_timeout: Duration,
    pub retries: u32,
    pub fragment_retries: u32,
    pub concurrent_fragments: u32,
    pub user_agent: String,
    pub geo_bypass: bool,
    pub ignore_errors: bool,
    pub audio_format: String,
    pub subtitle_langs: Vec<String>,
    /// Hard limit for a whole engine invocation
    pub process_timeout: Duration,
}

impl EngineSettings {
    pub fn for_profile(profile: DeploymentProfile) -> Self {
        let base = Self {
            socket_timeout: Duration::from_secs(30),
            retries: 3,
            fragment_retries: 3,
            concurrent_fragments: 5,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            geo_bypass: true,
            ignore_errors: true,
            audio_format: "mp3".to_string(),
            subtitle_langs: vec!["ar".to_string(), "en".to_string()],
            process_timeout: Duration::from_secs(120),
        };

        match profile {
            DeploymentProfile::Production => Self {
                socket_timeout: Duration::from_secs(60),
                retries: 5,
                fragment_retries: 5,
                concurrent_fragments: 3,
                process_timeout: Duration::from_secs(180),
                ..base
            },
            DeploymentProfile::Development | DeploymentProfile::Testing => base,
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::for_profile(DeploymentProfile::default())
    }
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub profile: DeploymentProfile,

    /// sqlx connection string of the request log
    pub database_url: String,

    /// Playlists are truncated to this many entries
    pub max_playlist_size: usize,

    /// Cached results older than this are ignored; `None` keeps them forever
    pub cache_ttl_secs: Option<u64>,

    /// URLs of one batch request processed at the same time
    pub batch_concurrency: usize,

    pub log_level: String,

    /// Explicit yt-dlp binary, skips discovery
    pub ytdlp_path: Option<PathBuf>,

    pub subtitle_langs: Vec<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            profile: DeploymentProfile::default(),
            database_url: default_database_url(),
            max_playlist_size: 50,
            cache_ttl_secs: None,
            batch_concurrency: 4,
            log_level: "info".to_string(),
            ytdlp_path: None,
            subtitle_langs: vec!["ar".to_string(), "en".to_string()],
        }
    }
}

impl AppSettings {
    /// Defaults, then the optional JSON file, then `VIDMETA_*` environment overrides
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let mut settings = match config_file {
            Some(path) => {
                debug!("Loading settings from {}", path.display());
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file {}", path.display()))?;
                serde_json::from_str(&raw).context("Failed to parse config file")?
            }
            None => AppSettings::default(),
        };

        settings.apply_env(|key| std::env::var(key).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    /// Apply overrides from a variable lookup (the process environment in production)
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), VidmetaError> {
        if let Some(profile) = lookup("VIDMETA_PROFILE") {
            self.profile = profile.parse()?;
        }
        if let Some(url) = lookup("VIDMETA_DATABASE_URL") {
            self.database_url = url;
        }
        if let Some(level) = lookup("VIDMETA_LOG_LEVEL") {
            self.log_level = level;
        }
        if let Some(ttl) = lookup("VIDMETA_CACHE_TTL_SECS") {
            self.cache_ttl_secs = Some(parse_number(&ttl, "VIDMETA_CACHE_TTL_SECS")?);
        }
        if let Some(size) = lookup("VIDMETA_MAX_PLAYLIST_SIZE") {
            self.max_playlist_size = parse_number(&size, "VIDMETA_MAX_PLAYLIST_SIZE")?;
        }
        if let Some(path) = lookup("VIDMETA_YTDLP_PATH") {
            self.ytdlp_path = Some(PathBuf::from(path));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), VidmetaError> {
        if self.max_playlist_size == 0 {
            return Err(VidmetaError::Config(
                "max_playlist_size must be at least 1".to_string(),
            ));
        }
        if self.batch_concurrency == 0 {
            return Err(VidmetaError::Config(
                "batch_concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl_secs.map(Duration::from_secs)
    }

    /// Profile engine settings with the configured subtitle languages
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            subtitle_langs: self.subtitle_langs.clone(),
            ..EngineSettings::for_profile(self.profile)
        }
    }
}

fn parse_number<T: std::str::FromStr>(raw: &str, key: &str) -> Result<T, VidmetaError> {
    raw.trim()
        .parse()
        .map_err(|_| VidmetaError::Config(format!("{} must be a number, got '{}'", key, raw)))
}
