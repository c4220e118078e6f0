//! Playlist processing with a size cap and per-entry failure isolation

use crate::normalizer::models::PlaylistRecord;
use crate::normalizer::video::{normalize_video, Node, NormalizeError};
use crate::utils::error::VidmetaError;
use serde_json::Value;
use tracing::{error, warn};

/// True when the engine returned a playlist node rather than a single video
pub fn is_playlist(raw: &Value) -> bool {
    raw.as_object().is_some_and(|obj| obj.contains_key("entries"))
}

/// Build a `PlaylistRecord` from a raw playlist node.
///
/// Null placeholders are dropped, the remainder is capped to
/// `max_entries` (stable prefix), and entries that fail normalization are
/// logged and skipped.
pub fn process_playlist(
    raw: &Value,
    include_subtitles: bool,
    max_entries: usize,
) -> Result<PlaylistRecord, NormalizeError> {
    let info = Node::from_value(raw, "playlist")?;

    let mut entries: Vec<&Value> = info.list("entries").iter().filter(|e| !e.is_null()).collect();

    if entries.len() > max_entries {
        warn!(
            available = entries.len(),
            limit = max_entries,
            "Playlist limited to {} videos",
            max_entries
        );
        entries.truncate(max_entries);
    }

    let mut videos = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match normalize_video(entry, include_subtitles) {
            Ok(video) => videos.push(video),
            Err(e) => {
                let failure = VidmetaError::PartialEntry {
                    index,
                    reason: e.to_string(),
                };
                error!("Error extracting video info: {}", failure);
            }
        }
    }

    Ok(PlaylistRecord {
        id: info.str_or("id", "unknown"),
        title: info.str_or("title", "Unknown Playlist"),
        uploader: info.str_or("uploader", "Unknown"),
        uploader_id: info.str("uploader_id"),
        uploader_url: info.str("uploader_url"),
        description: info.str_or("description", ""),
        webpage_url: info.str("webpage_url"),
        total_videos: videos.len(),
        videos,
    })
}
