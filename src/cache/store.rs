//! Cache keys, entries and the durable store boundary

use crate::formats::FormatToken;
use crate::normalizer::ExtractionResult;
use crate::utils::error::VidmetaError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;
use tokio::sync::RwLock;

/// Which computation a cached result belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheView {
    Format(FormatToken),
    Subtitles,
    Thumbnails,
}

impl CacheView {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheView::Format(token) => token.as_str(),
            CacheView::Subtitles => "subtitles",
            CacheView::Thumbnails => "thumbnails",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "subtitles" => Some(CacheView::Subtitles),
            "thumbnails" => Some(CacheView::Thumbnails),
            other => other.parse().ok().map(CacheView::Format),
        }
    }

    /// Format requested from the engine for this view
    pub fn format_token(&self) -> FormatToken {
        match self {
            CacheView::Format(token) => *token,
            CacheView::Subtitles | CacheView::Thumbnails => FormatToken::Best,
        }
    }

    pub fn include_subtitles(&self) -> bool {
        matches!(self, CacheView::Subtitles)
    }
}

impl fmt::Display for CacheView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// (normalized URL, view kind)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub url: String,
    pub view: CacheView,
}

impl CacheKey {
    pub fn new(url: &str, view: CacheView) -> Self {
        Self {
            url: url.trim().to_string(),
            view,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.url, self.view)
    }
}

/// One recorded computation. Never mutated once written.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub result: ExtractionResult,
    pub duration: Duration,
    pub created_at: DateTime<Utc>,
}

/// Durable append-only log of computations
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Oldest entry for `key`, ignoring entries created before `fresh_after`
    async fn lookup(
        &self,
        key: &CacheKey,
        fresh_after: Option<DateTime<Utc>>,
    ) -> Result<Option<CacheEntry>, VidmetaError>;

    /// Append an entry; existing entries for the same key are kept
    async fn store(&self, entry: &CacheEntry) -> Result<(), VidmetaError>;

    /// Delete entries created before `cutoff`, returning how many were removed
    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, VidmetaError>;

    async fn count(&self) -> Result<u64, VidmetaError>;
}

/// Process-local store, used by tests and when no database is configured
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: RwLock<Vec<CacheEntry>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn lookup(
        &self,
        key: &CacheKey,
        fresh_after: Option<DateTime<Utc>>,
    ) -> Result<Option<CacheEntry>, VidmetaError> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .find(|e| &e.key == key && fresh_after.map_or(true, |cutoff| e.created_at >= cutoff))
            .cloned())
    }

    async fn store(&self, entry: &CacheEntry) -> Result<(), VidmetaError> {
        self.entries.write().await.push(entry.clone());
        Ok(())
    }

    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, VidmetaError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|e| e.created_at >= cutoff);
        Ok((before - entries.len()) as u64)
    }

    async fn count(&self) -> Result<u64, VidmetaError> {
        Ok(self.entries.read().await.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::ExtractionFailure;

    fn entry(url: &str, view: CacheView, message: &str, created_at: DateTime<Utc>) -> CacheEntry {
        CacheEntry {
            key: CacheKey::new(url, view),
            result: ExtractionResult::Failure(ExtractionFailure::unknown(message)),
            duration: Duration::from_millis(10),
            created_at,
        }
    }

    #[test]
    fn test_view_names_roundtrip() {
        for view in [
            CacheView::Format(FormatToken::P720),
            CacheView::Subtitles,
            CacheView::Thumbnails,
        ] {
            assert_eq!(CacheView::parse(view.as_str()), Some(view));
        }
        assert_eq!(CacheView::parse("nope"), None);
        assert!(CacheView::Subtitles.include_subtitles());
        assert_eq!(CacheView::Thumbnails.format_token(), FormatToken::Best);
    }

    #[test]
    fn test_key_trims_url() {
        let key = CacheKey::new("  https://example.com/v  ", CacheView::Subtitles);
        assert_eq!(key.url, "https://example.com/v");
    }

    #[tokio::test]
    async fn test_memory_store_is_append_only_and_returns_first_match() {
        let store = MemoryCacheStore::new();
        let view = CacheView::Format(FormatToken::Best);
        let now = Utc::now();

        store.store(&entry("a", view, "first", now)).await.unwrap();
        store.store(&entry("a", view, "second", now)).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 2);
        let hit = store.lookup(&CacheKey::new("a", view), None).await.unwrap().unwrap();
        assert_eq!(hit.result, ExtractionResult::Failure(ExtractionFailure::unknown("first")));
        assert!(store
            .lookup(&CacheKey::new("a", CacheView::Thumbnails), None)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_memory_store_freshness_and_purge() {
        let store = MemoryCacheStore::new();
        let view = CacheView::Thumbnails;
        let now = Utc::now();
        let old = now - chrono::Duration::hours(2);

        store.store(&entry("a", view, "old", old)).await.unwrap();
        store.store(&entry("a", view, "new", now)).await.unwrap();

        let cutoff = now - chrono::Duration::hours(1);
        let hit = store.lookup(&CacheKey::new("a", view), Some(cutoff)).await.unwrap().unwrap();
        assert_eq!(hit.created_at, now);

        assert_eq!(store.purge_older_than(cutoff).await.unwrap(), 1);
        assert_eq!(store.count().await.unwrap(), 1);
    }
}
