//! Best-effort reclassification of engine error text
//!
//! yt-dlp only reports failures as free text. Everything that maps that
//! text onto `FailureKind` lives in this file.

use crate::extractor::traits::EngineError;
use crate::normalizer::{ExtractionFailure, FailureKind};

/// Checked in order; the first matching rule wins
const RULES: &[(FailureKind, &[&str], &str)] = &[
    (
        FailureKind::Unavailable,
        &["video is unavailable", "video unavailable"],
        "Video is unavailable",
    ),
    (
        FailureKind::GeoRestricted,
        &["geo-restricted", "geo restricted", "available in your country"],
        "Video is geo-restricted",
    ),
    (
        FailureKind::Removed,
        &["video has been removed", "has been removed"],
        "Video has been removed",
    ),
];

/// Map raw engine error text onto a failure kind and caller-facing message
pub fn classify_message(raw: &str) -> ExtractionFailure {
    let lowered = raw.to_lowercase();

    for (kind, needles, message) in RULES {
        if needles.iter().any(|needle| lowered.contains(needle)) {
            return ExtractionFailure::new(*kind, *message);
        }
    }

    ExtractionFailure::unknown(raw.trim())
}

pub fn classify_failure(err: &EngineError) -> ExtractionFailure {
    match err {
        EngineError::Extraction(text) => classify_message(text),
        other => ExtractionFailure::unknown(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_classification_is_case_insensitive() {
        let failure = classify_message("ERROR: [youtube] abc: Video Is Unavailable");
        assert_eq!(failure.kind, FailureKind::Unavailable);
        assert_eq!(failure.message, "Video is unavailable");
    }

    #[test]
    fn test_geo_restriction() {
        let failure = classify_message(
            "ERROR: The uploader has not made this video available in your country",
        );
        assert_eq!(failure.kind, FailureKind::GeoRestricted);
        assert_eq!(failure.message, "Video is geo-restricted");
    }

    #[test]
    fn test_removed() {
        let failure = classify_message("This video has been removed by the uploader");
        assert_eq!(failure.kind, FailureKind::Removed);
    }

    #[test]
    fn test_priority_order() {
        let failure = classify_message("video is unavailable: it has been removed (geo-restricted)");
        assert_eq!(failure.kind, FailureKind::Unavailable);

        let failure = classify_message("geo-restricted, or has been removed");
        assert_eq!(failure.kind, FailureKind::GeoRestricted);
    }

    #[test]
    fn test_unknown_keeps_raw_detail() {
        let failure = classify_message("  ERROR: Unsupported URL: https://example.com\n");
        assert_eq!(failure.kind, FailureKind::Unknown);
        assert_eq!(failure.message, "ERROR: Unsupported URL: https://example.com");
    }

    #[test]
    fn test_non_extraction_errors_are_unknown() {
        let failure = classify_failure(&EngineError::Timeout(Duration::from_secs(120)));
        assert_eq!(failure.kind, FailureKind::Unknown);
        assert!(failure.message.contains("timed out"));
    }
}
