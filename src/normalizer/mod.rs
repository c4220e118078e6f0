//! Normalization of raw engine metadata into the stable data model

pub mod formatting;
pub mod models;
pub mod playlist;
pub mod video;

pub use formatting::{format_duration, format_filesize};
pub use models::{
    ExtractionFailure, ExtractionResult, FailureKind, FormatVariant, PlaylistRecord, SubtitleMap,
    SubtitleTrack, Thumbnail, VideoRecord,
};
pub use playlist::{is_playlist, process_playlist};
pub use video::{normalize_video, NormalizeError};

use serde_json::Value;

/// Dispatch a raw engine tree to the playlist or single-video normalizer
pub fn normalize(
    raw: &Value,
    include_subtitles: bool,
    max_playlist_size: usize,
) -> Result<ExtractionResult, NormalizeError> {
    if is_playlist(raw) {
        process_playlist(raw, include_subtitles, max_playlist_size).map(ExtractionResult::Playlist)
    } else {
        normalize_video(raw, include_subtitles).map(ExtractionResult::Video)
    }
}
