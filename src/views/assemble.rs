//! Projections over a completed extraction result
//!
//! Every assembler here is a pure function of an `ExtractionResult`. They
//! keep the video/playlist shape of their input and never reorder videos or
//! format variants.

use crate::normalizer::{
    ExtractionFailure, ExtractionResult, FormatVariant, PlaylistRecord, SubtitleMap, Thumbnail,
    VideoRecord,
};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// A view over either a single video or a playlist.
///
/// Serializes as `{"is_playlist": false, "video": ...}` or
/// `{"is_playlist": true, "playlist": ...}`.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection<V, P> {
    Video(V),
    Playlist(P),
}

impl<V, P> Projection<V, P> {
    pub fn is_playlist(&self) -> bool {
        matches!(self, Projection::Playlist(_))
    }
}

impl<V: Serialize, P: Serialize> Serialize for Projection<V, P> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        match self {
            Projection::Video(video) => {
                map.serialize_entry("is_playlist", &false)?;
                map.serialize_entry("video", video)?;
            }
            Projection::Playlist(playlist) => {
                map.serialize_entry("is_playlist", &true)?;
                map.serialize_entry("playlist", playlist)?;
            }
        }
        map.end()
    }
}

/// Playlist header shared by the reduced views
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaylistView<E> {
    pub title: String,
    pub total_videos: usize,
    pub videos: Vec<E>,
}

impl<E> PlaylistView<E> {
    fn from_record(playlist: &PlaylistRecord, entry: impl Fn(&VideoRecord) -> E) -> Self {
        Self {
            title: playlist.title.clone(),
            total_videos: playlist.total_videos,
            videos: playlist.videos.iter().map(entry).collect(),
        }
    }
}

/// A directly fetchable rendition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadLink {
    pub format_id: String,
    pub format_note: String,
    pub ext: String,
    pub url: String,
    pub filesize_formatted: String,
}

impl DownloadLink {
    /// `None` for variants without a resolved URL
    pub fn from_variant(variant: &FormatVariant) -> Option<Self> {
        let url = variant.url.as_ref()?;
        Some(Self {
            format_id: variant.format_id.clone(),
            format_note: variant.format_note.clone(),
            ext: variant.ext.clone(),
            url: url.clone(),
            filesize_formatted: variant.filesize_formatted.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoLinks {
    pub id: String,
    pub title: String,
    pub duration_formatted: String,
    pub formats: Vec<DownloadLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryLinks {
    pub id: String,
    pub title: String,
    pub formats: Vec<DownloadLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoSubtitles {
    pub id: String,
    pub title: String,
    pub subtitles: SubtitleMap,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoThumbnails {
    pub id: String,
    pub title: String,
    pub thumbnails: Vec<Thumbnail>,
}

pub type InfoView = Projection<VideoRecord, PlaylistRecord>;
pub type LinksView = Projection<VideoLinks, PlaylistView<EntryLinks>>;
pub type SubtitlesView = Projection<VideoSubtitles, PlaylistView<VideoSubtitles>>;
pub type ThumbnailsView = Projection<VideoThumbnails, PlaylistView<VideoThumbnails>>;

fn project<V, P>(
    result: &ExtractionResult,
    video: impl FnOnce(&VideoRecord) -> V,
    playlist: impl FnOnce(&PlaylistRecord) -> P,
) -> Result<Projection<V, P>, ExtractionFailure> {
    match result {
        ExtractionResult::Video(record) => Ok(Projection::Video(video(record))),
        ExtractionResult::Playlist(record) => Ok(Projection::Playlist(playlist(record))),
        ExtractionResult::Failure(failure) => Err(failure.clone()),
    }
}

fn links(formats: &[FormatVariant]) -> Vec<DownloadLink> {
    formats.iter().filter_map(DownloadLink::from_variant).collect()
}

/// The normalized record as-is
pub fn full_info(result: &ExtractionResult) -> Result<InfoView, ExtractionFailure> {
    project(result, VideoRecord::clone, PlaylistRecord::clone)
}

pub fn download_links(result: &ExtractionResult) -> Result<LinksView, ExtractionFailure> {
    project(
        result,
        |video| VideoLinks {
            id: video.id.clone(),
            title: video.title.clone(),
            duration_formatted: video.duration_formatted.clone(),
            formats: links(&video.formats),
        },
        |playlist| {
            PlaylistView::from_record(playlist, |video| EntryLinks {
                id: video.id.clone(),
                title: video.title.clone(),
                formats: links(&video.formats),
            })
        },
    )
}

fn video_subtitles(video: &VideoRecord) -> VideoSubtitles {
    VideoSubtitles {
        id: video.id.clone(),
        title: video.title.clone(),
        subtitles: video.subtitles.clone().unwrap_or_default(),
    }
}

/// Subtitle maps per video; empty unless extraction ran with subtitles on
pub fn subtitles(result: &ExtractionResult) -> Result<SubtitlesView, ExtractionFailure> {
    project(result, video_subtitles, |playlist| {
        PlaylistView::from_record(playlist, video_subtitles)
    })
}

fn video_thumbnails(video: &VideoRecord) -> VideoThumbnails {
    VideoThumbnails {
        id: video.id.clone(),
        title: video.title.clone(),
        thumbnails: video.thumbnails.clone(),
    }
}

pub fn thumbnails(result: &ExtractionResult) -> Result<ThumbnailsView, ExtractionFailure> {
    project(result, video_thumbnails, |playlist| {
        PlaylistView::from_record(playlist, video_thumbnails)
    })
}
