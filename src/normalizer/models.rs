//! Normalized data model shared by the cache, the views and the CLI

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One playable rendition of a video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatVariant {
    pub format_id: String,
    pub format_note: String,
    pub ext: String,
    pub resolution: String,
    pub fps: Option<f64>,
    pub vcodec: Option<String>,
    pub acodec: Option<String>,
    pub filesize: Option<u64>,
    pub filesize_approx: Option<u64>,
    /// Direct media URL; `None` means the rendition cannot be fetched
    pub url: Option<String>,
    pub tbr: Option<f64>, // Total bitrate
    pub vbr: Option<f64>, // Video bitrate
    pub abr: Option<f64>, // Audio bitrate
    pub protocol: String,
    pub filesize_formatted: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub id: String,
    pub url: Option<String>,
    pub width: Option<u64>,
    pub height: Option<u64>,
    pub resolution: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleTrack {
    pub url: Option<String>,
    pub ext: Option<String>,
    pub name: String,
}

pub type SubtitleTracks = BTreeMap<String, Vec<SubtitleTrack>>;

/// Human-authored tracks keyed by language, machine captions under `auto`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleMap {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto: Option<SubtitleTracks>,
    #[serde(flatten)]
    pub tracks: SubtitleTracks,
}

impl SubtitleMap {
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty() && self.auto.as_ref().map_or(true, |auto| auto.is_empty())
    }
}

/// Normalized single video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: String,
    pub title: String,
    pub uploader: String,
    pub uploader_id: Option<String>,
    pub uploader_url: Option<String>,
    pub upload_date: Option<String>,
    pub duration: Option<u64>,
    pub duration_formatted: String,
    pub view_count: Option<u64>,
    pub like_count: Option<u64>,
    pub dislike_count: Option<u64>,
    pub comment_count: Option<u64>,
    pub description: String,
    pub thumbnail: Option<String>,
    pub thumbnails: Vec<Thumbnail>,
    pub webpage_url: Option<String>,
    pub original_url: Option<String>,
    pub extractor: Option<String>,
    pub extractor_key: Option<String>,
    pub formats: Vec<FormatVariant>,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    pub age_limit: Option<u64>,
    pub availability: Option<String>,
    /// Only present when the extraction ran with subtitles enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitles: Option<SubtitleMap>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistRecord {
    pub id: String,
    pub title: String,
    pub uploader: String,
    pub uploader_id: Option<String>,
    pub uploader_url: Option<String>,
    pub description: String,
    pub webpage_url: Option<String>,
    /// Number of videos actually included
    pub total_videos: usize,
    pub videos: Vec<VideoRecord>,
}

/// Classified extraction failure kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Unavailable,
    GeoRestricted,
    Removed,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionFailure {
    pub kind: FailureKind,
    /// Normalized message for classified kinds, raw engine detail for `Unknown`
    pub message: String,
}

impl ExtractionFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Unknown, message)
    }
}

impl fmt::Display for ExtractionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

/// Outcome of one computation for a cache key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ExtractionResult {
    Video(VideoRecord),
    Playlist(PlaylistRecord),
    Failure(ExtractionFailure),
}

impl ExtractionResult {
    pub fn is_success(&self) -> bool {
        !matches!(self, ExtractionResult::Failure(_))
    }

    /// Number of videos carried by a successful result
    pub fn video_count(&self) -> usize {
        match self {
            ExtractionResult::Video(_) => 1,
            ExtractionResult::Playlist(playlist) => playlist.videos.len(),
            ExtractionResult::Failure(_) => 0,
        }
    }
}
