//! Supported format tokens
//!
//! `FormatToken::ALL` is the only list of supported tokens in the crate.
//! Validation, resolution and the catalogue all read from it.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Caller-facing quality/container/codec preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum FormatToken {
    #[default]
    Best,
    Worst,
    BestVideo,
    WorstVideo,
    BestAudio,
    WorstAudio,
    P144,
    P240,
    P360,
    P480,
    P720,
    P1080,
    P1440,
    P2160,
    Mp4,
    Webm,
    Mkv,
    Flv,
    Avi,
    Mov,
    Mp3,
    Aac,
    Ogg,
    Wav,
    Flac,
    M4a,
}

/// Broad grouping used by the resolver and the catalogue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatCategory {
    Quality,
    Resolution,
    VideoContainer,
    AudioCodec,
}

impl FormatToken {
    /// Every supported token, in catalogue order.
    pub const ALL: [FormatToken; 26] = [
        FormatToken::Best,
        FormatToken::Worst,
        FormatToken::BestVideo,
        FormatToken::WorstVideo,
        FormatToken::BestAudio,
        FormatToken::WorstAudio,
        FormatToken::P144,
        FormatToken::P240,
        FormatToken::P360,
        FormatToken::P480,
        FormatToken::P720,
        FormatToken::P1080,
        FormatToken::P1440,
        FormatToken::P2160,
        FormatToken::Mp4,
        FormatToken::Webm,
        FormatToken::Mkv,
        FormatToken::Flv,
        FormatToken::Avi,
        FormatToken::Mov,
        FormatToken::Mp3,
        FormatToken::Aac,
        FormatToken::Ogg,
        FormatToken::Wav,
        FormatToken::Flac,
        FormatToken::M4a,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FormatToken::Best => "best",
            FormatToken::Worst => "worst",
            FormatToken::BestVideo => "bestvideo",
            FormatToken::WorstVideo => "worstvideo",
            FormatToken::BestAudio => "bestaudio",
            FormatToken::WorstAudio => "worstaudio",
            FormatToken::P144 => "144p",
            FormatToken::P240 => "240p",
            FormatToken::P360 => "360p",
            FormatToken::P480 => "480p",
            FormatToken::P720 => "720p",
            FormatToken::P1080 => "1080p",
            FormatToken::P1440 => "1440p",
            FormatToken::P2160 => "2160p",
            FormatToken::Mp4 => "mp4",
            FormatToken::Webm => "webm",
            FormatToken::Mkv => "mkv",
            FormatToken::Flv => "flv",
            FormatToken::Avi => "avi",
            FormatToken::Mov => "mov",
            FormatToken::Mp3 => "mp3",
            FormatToken::Aac => "aac",
            FormatToken::Ogg => "ogg",
            FormatToken::Wav => "wav",
            FormatToken::Flac => "flac",
            FormatToken::M4a => "m4a",
        }
    }

    pub fn category(&self) -> FormatCategory {
        match self {
            FormatToken::Best
            | FormatToken::Worst
            | FormatToken::BestVideo
            | FormatToken::WorstVideo
            | FormatToken::BestAudio
            | FormatToken::WorstAudio => FormatCategory::Quality,
            FormatToken::Mp4
            | FormatToken::Webm
            | FormatToken::Mkv
            | FormatToken::Flv
            | FormatToken::Avi
            | FormatToken::Mov => FormatCategory::VideoContainer,
            FormatToken::Mp3
            | FormatToken::Aac
            | FormatToken::Ogg
            | FormatToken::Wav
            | FormatToken::Flac
            | FormatToken::M4a => FormatCategory::AudioCodec,
            _ => FormatCategory::Resolution,
        }
    }

    /// Height cap for `<N>p` tokens
    pub fn max_height(&self) -> Option<u32> {
        match self {
            FormatToken::P144 => Some(144),
            FormatToken::P240 => Some(240),
            FormatToken::P360 => Some(360),
            FormatToken::P480 => Some(480),
            FormatToken::P720 => Some(720),
            FormatToken::P1080 => Some(1080),
            FormatToken::P1440 => Some(1440),
            FormatToken::P2160 => Some(2160),
            _ => None,
        }
    }

    /// True for tokens that should only ever select an audio stream
    pub fn is_audio_only(&self) -> bool {
        matches!(self, FormatToken::BestAudio | FormatToken::WorstAudio)
            || self.category() == FormatCategory::AudioCodec
    }

    /// Comma separated list used in validation messages
    pub fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(FormatToken::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for FormatToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a string is not one of the supported tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedFormat(pub String);

impl fmt::Display for UnsupportedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unsupported format '{}'. Supported formats: {}",
            self.0,
            FormatToken::supported_list()
        )
    }
}

impl std::error::Error for UnsupportedFormat {}

impl FromStr for FormatToken {
    type Err = UnsupportedFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|token| token.as_str() == s)
            .ok_or_else(|| UnsupportedFormat(s.to_string()))
    }
}

impl Serialize for FormatToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FormatToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_token_roundtrips_through_its_name() {
        for token in FormatToken::ALL {
            assert_eq!(token.as_str().parse::<FormatToken>(), Ok(token));
        }
    }

    #[test]
    fn test_unknown_token_is_rejected() {
        let err = "8k".parse::<FormatToken>().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("8k"));
        assert!(message.contains("best, worst"));
        assert!(message.contains("m4a"));
    }

    #[test]
    fn test_token_names_are_case_sensitive() {
        assert!("BEST".parse::<FormatToken>().is_err());
    }

    #[test]
    fn test_categories() {
        assert_eq!(FormatToken::P720.category(), FormatCategory::Resolution);
        assert_eq!(FormatToken::Webm.category(), FormatCategory::VideoContainer);
        assert_eq!(FormatToken::Flac.category(), FormatCategory::AudioCodec);
        assert!(FormatToken::WorstAudio.is_audio_only());
        assert!(!FormatToken::Mp4.is_audio_only());
        assert_eq!(FormatToken::P2160.max_height(), Some(2160));
        assert_eq!(FormatToken::Best.max_height(), None);
    }
}
