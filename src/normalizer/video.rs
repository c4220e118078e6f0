//! Raw video node -> `VideoRecord`
//!
//! Every field is optional in the engine output. Strings fall back to
//! placeholders, numbers to `None`, collections to empty.

use crate::normalizer::formatting::{format_duration, format_filesize};
use crate::normalizer::models::{
    FormatVariant, SubtitleMap, SubtitleTrack, SubtitleTracks, Thumbnail, VideoRecord,
};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("expected an object for {context}, found {found}")]
    NotAnObject {
        context: String,
        found: &'static str,
    },
}

/// Read-only view over a JSON object with lenient accessors
#[derive(Clone, Copy)]
pub(crate) struct Node<'a>(&'a Map<String, Value>);

impl<'a> Node<'a> {
    pub(crate) fn from_value(value: &'a Value, context: &str) -> Result<Self, NormalizeError> {
        value
            .as_object()
            .map(Node)
            .ok_or_else(|| NormalizeError::NotAnObject {
                context: context.to_string(),
                found: json_type(value),
            })
    }

    pub(crate) fn get(&self, key: &str) -> Option<&'a Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    pub(crate) fn str(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub(crate) fn str_or(&self, key: &str, default: &str) -> String {
        self.str(key).unwrap_or_else(|| default.to_string())
    }

    /// Non-negative integer; floats are truncated
    pub(crate) fn u64(&self, key: &str) -> Option<u64> {
        let n = match self.get(key)? {
            Value::Number(n) => n,
            _ => return None,
        };
        n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| f.trunc() as u64)
        })
    }

    pub(crate) fn f64(&self, key: &str) -> Option<f64> {
        self.get(key)?.as_f64()
    }

    pub(crate) fn list(&self, key: &str) -> &'a [Value] {
        self.get(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn strings(&self, key: &str) -> Vec<String> {
        self.list(key)
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect()
    }

    fn object(&self, key: &str) -> Option<&'a Map<String, Value>> {
        self.get(key)?.as_object()
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Normalize one video node. Fails only when the node (or one of its
/// nested descriptors) is not an object.
pub fn normalize_video(raw: &Value, include_subtitles: bool) -> Result<VideoRecord, NormalizeError> {
    let info = Node::from_value(raw, "video")?;
    let duration = info.u64("duration");

    Ok(VideoRecord {
        id: info.str_or("id", "unknown"),
        title: info.str_or("title", "Unknown Title"),
        uploader: info.str_or("uploader", "Unknown"),
        uploader_id: info.str("uploader_id"),
        uploader_url: info.str("uploader_url"),
        upload_date: info.str("upload_date"),
        duration,
        duration_formatted: format_duration(duration),
        view_count: info.u64("view_count"),
        like_count: info.u64("like_count"),
        dislike_count: info.u64("dislike_count"),
        comment_count: info.u64("comment_count"),
        description: info.str_or("description", ""),
        thumbnail: info.str("thumbnail"),
        thumbnails: extract_thumbnails(info)?,
        webpage_url: info.str("webpage_url"),
        original_url: info.str("original_url"),
        extractor: info.str("extractor"),
        extractor_key: info.str("extractor_key"),
        formats: extract_formats(info)?,
        tags: info.strings("tags"),
        categories: info.strings("categories"),
        age_limit: info.u64("age_limit"),
        availability: info.str("availability"),
        subtitles: if include_subtitles {
            Some(extract_subtitles(info)?)
        } else {
            None
        },
    })
}

/// All variants, including those without a URL
fn extract_formats(info: Node<'_>) -> Result<Vec<FormatVariant>, NormalizeError> {
    info.list("formats")
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            let fmt = Node::from_value(raw, &format!("formats[{}]", index))?;
            let filesize = fmt.u64("filesize");
            let filesize_approx = fmt.u64("filesize_approx");
            let format_note = fmt
                .str("format_note")
                .or_else(|| fmt.str("quality"))
                .unwrap_or_else(|| "unknown".to_string());

            Ok(FormatVariant {
                format_id: fmt.str_or("format_id", "unknown"),
                format_note,
                ext: fmt.str_or("ext", "unknown"),
                resolution: fmt.str_or("resolution", "unknown"),
                fps: fmt.f64("fps"),
                vcodec: fmt.str("vcodec"),
                acodec: fmt.str("acodec"),
                filesize,
                filesize_approx,
                url: fmt.str("url"),
                tbr: fmt.f64("tbr"),
                vbr: fmt.f64("vbr"),
                abr: fmt.f64("abr"),
                protocol: fmt.str_or("protocol", "unknown"),
                filesize_formatted: format_filesize(filesize.or(filesize_approx)),
            })
        })
        .collect()
}

fn extract_thumbnails(info: Node<'_>) -> Result<Vec<Thumbnail>, NormalizeError> {
    info.list("thumbnails")
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            let thumb = Node::from_value(raw, &format!("thumbnails[{}]", index))?;
            let width = thumb.u64("width");
            let height = thumb.u64("height");
            let dimension = |d: Option<u64>| d.map_or_else(|| "unknown".to_string(), |v| v.to_string());

            Ok(Thumbnail {
                id: thumb.str_or("id", "unknown"),
                url: thumb.str("url"),
                width,
                height,
                resolution: format!("{}x{}", dimension(width), dimension(height)),
            })
        })
        .collect()
}

fn extract_subtitles(info: Node<'_>) -> Result<SubtitleMap, NormalizeError> {
    let tracks = match info.object("subtitles") {
        Some(by_lang) => extract_tracks(by_lang, "subtitles", |lang| lang.to_string())?,
        None => SubtitleTracks::new(),
    };

    let auto = match info.object("automatic_captions") {
        Some(by_lang) => Some(extract_tracks(by_lang, "automatic_captions", |lang| {
            format!("auto-{}", lang)
        })?),
        None => None,
    };

    Ok(SubtitleMap { auto, tracks })
}

fn extract_tracks(
    by_lang: &Map<String, Value>,
    context: &str,
    default_name: impl Fn(&str) -> String,
) -> Result<SubtitleTracks, NormalizeError> {
    let mut tracks = SubtitleTracks::new();

    for (lang, entries) in by_lang {
        let entries = entries.as_array().map(Vec::as_slice).unwrap_or(&[]);
        let mut parsed = Vec::with_capacity(entries.len());

        for (index, raw) in entries.iter().enumerate() {
            let sub = Node::from_value(raw, &format!("{}.{}[{}]", context, lang, index))?;
            parsed.push(SubtitleTrack {
                url: sub.str("url"),
                ext: sub.str("ext"),
                name: sub.str("name").unwrap_or_else(|| default_name(lang)),
            });
        }

        tracks.insert(lang.clone(), parsed);
    }

    Ok(tracks)
}
