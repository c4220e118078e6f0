//! Maps a format token onto the options bundle handed to the engine

use crate::formats::token::{FormatCategory, FormatToken};
use crate::utils::config::EngineSettings;
use std::time::Duration;

/// Immutable configuration for a single engine invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionOptions {
    /// Engine format selector, e.g. `best[height<=720]`
    pub format: String,
    pub extract_audio: bool,
    pub audio_format: String,
    pub write_subtitles: bool,
    pub write_automatic_subtitles: bool,
    pub subtitle_langs: Vec<String>,
    pub socket_timeout: Duration,
    pub retries: u32,
    pub fragment_retries: u32,
    pub concurrent_fragments: u32,
    pub user_agent: String,
    pub geo_bypass: bool,
    pub ignore_errors: bool,
    pub process_timeout: Duration,
}

/// Pure function of (token, subtitle flag) and the deployment's engine settings
#[derive(Debug, Clone)]
pub struct FormatResolver {
    settings: EngineSettings,
}

impl FormatResolver {
    pub fn new(settings: EngineSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn resolve(&self, token: FormatToken, enable_subtitles: bool) -> ExtractionOptions {
        let settings = &self.settings;
        let mut audio_format = settings.audio_format.clone();

        let format = match (token.category(), token.max_height()) {
            (FormatCategory::Resolution, Some(height)) => format!("best[height<={}]", height),
            (FormatCategory::AudioCodec, _) => {
                audio_format = token.as_str().to_string();
                format!("bestaudio[ext={}]/bestaudio", token.as_str())
            }
            _ => token.as_str().to_string(),
        };

        ExtractionOptions {
            format,
            extract_audio: token.is_audio_only(),
            audio_format,
            write_subtitles: enable_subtitles,
            write_automatic_subtitles: enable_subtitles,
            subtitle_langs: settings.subtitle_langs.clone(),
            socket_timeout: settings.socket_timeout,
            retries: settings.retries,
            fragment_retries: settings.fragment_retries,
            concurrent_fragments: settings.concurrent_fragments,
            user_agent: settings.user_agent.clone(),
            geo_bypass: settings.geo_bypass,
            ignore_errors: settings.ignore_errors,
            process_timeout: settings.process_timeout,
        }
    }
}

impl Default for FormatResolver {
    fn default() -> Self {
        Self::new(EngineSettings::default())
    }
}
