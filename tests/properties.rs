//! Property-based tests for normalization and playlist processing
//!
//! Invariants tested:
//! A - Playlist cap: min(non-null entries, cap) videos, total_videos equal to that count
//! B - Null skip: placeholders never count as videos
//! C - Idempotence: normalizing the same node twice gives the same record
//! D - Formatting: duration and size strings follow their fixed layouts

use proptest::prelude::*;
use serde_json::{json, Value};
use std::sync::Arc;
use vidmeta::cache::{CacheKey, CacheView, MemoryCacheStore, OutcomeSource, ResultCache};
use vidmeta::formats::FormatToken;
use vidmeta::normalizer::{
    format_duration, format_filesize, normalize, normalize_video, process_playlist,
    ExtractionFailure, ExtractionResult,
};

fn entry(index: usize) -> Value {
    json!({"id": format!("v{}", index), "title": format!("Video {}", index), "duration": index})
}

/// Playlist entries where `true` marks a null placeholder
fn entries(layout: &[bool]) -> Vec<Value> {
    layout
        .iter()
        .enumerate()
        .map(|(i, is_null)| if *is_null { Value::Null } else { entry(i) })
        .collect()
}

fn arb_video() -> impl Strategy<Value = Value> {
    (
        "[a-zA-Z0-9_-]{1,11}",
        proptest::option::of(".{0,40}"),
        proptest::option::of(0u64..200_000),
        proptest::option::of(0u64..10_000_000_000),
        proptest::collection::vec(proptest::option::of("https://cdn/[a-z]{1,8}"), 0..6),
    )
        .prop_map(|(id, title, duration, size, urls)| {
            let formats: Vec<Value> = urls
                .into_iter()
                .enumerate()
                .map(|(i, url)| json!({"format_id": i.to_string(), "url": url, "filesize": size}))
                .collect();
            json!({"id": id, "title": title, "duration": duration, "formats": formats})
        })
}

proptest! {
    #[test]
    fn prop_playlist_cap_and_null_skip(
        layout in proptest::collection::vec(any::<bool>(), 0..120),
        cap in 1usize..80,
    ) {
        let raw = json!({"id": "pl", "entries": entries(&layout)});
        let playlist = process_playlist(&raw, false, cap).unwrap();

        let non_null = layout.iter().filter(|is_null| !**is_null).count();
        prop_assert_eq!(playlist.videos.len(), non_null.min(cap));
        prop_assert_eq!(playlist.total_videos, playlist.videos.len());

        // Stable prefix of the non-null entries
        let expected: Vec<String> = layout
            .iter()
            .enumerate()
            .filter(|(_, is_null)| !**is_null)
            .take(cap)
            .map(|(i, _)| format!("v{}", i))
            .collect();
        let ids: Vec<String> = playlist.videos.iter().map(|v| v.id.clone()).collect();
        prop_assert_eq!(ids, expected);
    }

    #[test]
    fn prop_normalization_is_idempotent(raw in arb_video(), subtitles in any::<bool>()) {
        let first = normalize_video(&raw, subtitles).unwrap();
        let second = normalize_video(&raw, subtitles).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.formats.len(), raw["formats"].as_array().unwrap().len());
    }

    #[test]
    fn prop_duration_layout(seconds in 1u64..1_000_000) {
        let text = format_duration(Some(seconds));
        let parts: Vec<&str> = text.split(':').collect();
        if seconds >= 3600 {
            prop_assert_eq!(parts.len(), 3);
        } else {
            prop_assert_eq!(parts.len(), 2);
        }
        prop_assert!(parts.iter().skip(1).all(|p| p.len() == 2));
        let total = parts.iter().fold(0u64, |acc, p| acc * 60 + p.parse::<u64>().unwrap());
        prop_assert_eq!(total, seconds);
    }

    #[test]
    fn prop_filesize_has_one_decimal(bytes in 1u64..u64::MAX / 2) {
        let text = format_filesize(Some(bytes));
        let (number, unit) = text.split_once(' ').unwrap();
        prop_assert!(["B", "KB", "MB", "GB", "TB"].contains(&unit));
        prop_assert_eq!(number.split_once('.').map(|(_, frac)| frac.len()), Some(1));
    }

    #[test]
    fn prop_cached_result_matches_computed(raw in arb_video()) {
        tokio_test::block_on(async {
            let cache = ResultCache::new(Arc::new(MemoryCacheStore::new()), None);
            let key = CacheKey::new("https://example.com/v", CacheView::Format(FormatToken::Best));

            let computed = {
                let raw = raw.clone();
                cache
                    .get_or_compute(key.clone(), move || async move {
                        normalize(&raw, false, 50)
                            .unwrap_or_else(|e| ExtractionResult::Failure(ExtractionFailure::unknown(e.to_string())))
                    })
                    .await
                    .unwrap()
            };
            let cached = cache
                .get_or_compute(key, || async { ExtractionResult::Failure(ExtractionFailure::unknown("recomputed")) })
                .await
                .unwrap();

            assert_eq!(computed.source, OutcomeSource::Computed);
            assert_eq!(cached.source, OutcomeSource::Cached);
            assert_eq!(computed.result, cached.result);
        });
    }
}

#[test]
fn test_known_formatting_values() {
    assert_eq!(format_duration(None), "Unknown");
    assert_eq!(format_duration(Some(0)), "Unknown");
    assert_eq!(format_duration(Some(65)), "01:05");
    assert_eq!(format_duration(Some(3661)), "01:01:01");
    assert_eq!(format_filesize(Some(500)), "500.0 B");
    assert_eq!(format_filesize(Some(2048)), "2.0 KB");
    assert_eq!(format_filesize(None), "Unknown");
}
