//! Application initialization
//!
//! Everything the pipeline needs is built here once and handed to
//! `MetadataService`; nothing below this point reaches for globals.

use crate::cache::{CacheStore, ResultCache};
use crate::database::{initialize_database, SqliteCacheStore};
use crate::extractor::{EngineAdapter, Extractor, YtDlpExtractor};
use crate::formats::FormatResolver;
use crate::service::MetadataService;
use crate::utils::config::AppSettings;
use crate::utils::paths::ensure_database_dir;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

/// Build the service backed by SQLite and the yt-dlp binary
pub async fn build_service(settings: &AppSettings) -> Result<MetadataService> {
    let store = open_store(settings).await?;
    let engine = build_extractor(settings);
    Ok(assemble(settings, Arc::new(store), engine))
}

/// Open the request log, creating its directory on first use
pub async fn open_store(settings: &AppSettings) -> Result<SqliteCacheStore> {
    ensure_database_dir(&settings.database_url);

    let pool = initialize_database(&settings.database_url)
        .await
        .with_context(|| format!("Failed to open result store at {}", settings.database_url))?;
    info!("Result store ready at {}", settings.database_url);

    Ok(SqliteCacheStore::new(pool))
}

/// Build the service over caller-supplied collaborators
pub fn assemble(
    settings: &AppSettings,
    store: Arc<dyn CacheStore>,
    engine: Arc<dyn Extractor>,
) -> MetadataService {
    let cache = ResultCache::new(store, settings.cache_ttl());
    let resolver = FormatResolver::new(settings.engine_settings());

    MetadataService::new(cache, EngineAdapter::new(engine), resolver)
        .with_max_playlist_size(settings.max_playlist_size)
        .with_batch_concurrency(settings.batch_concurrency)
}

fn build_extractor(settings: &AppSettings) -> Arc<dyn Extractor> {
    if let Some(path) = &settings.ytdlp_path {
        return Arc::new(YtDlpExtractor::with_path(path));
    }

    match YtDlpExtractor::new() {
        Ok(extractor) => Arc::new(extractor),
        Err(e) => {
            // Keep running; every extraction will report the missing binary
            warn!("{}", e);
            Arc::new(YtDlpExtractor::with_path("yt-dlp"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCacheStore;
    use crate::views::RequestedView;
    use serde_json::json;

    #[tokio::test]
    async fn test_build_service_with_in_memory_database() {
        let settings = AppSettings {
            database_url: "sqlite::memory:".to_string(),
            ytdlp_path: Some("/nonexistent/yt-dlp".into()),
            ..AppSettings::default()
        };

        let service = build_service(&settings).await.unwrap();
        assert_eq!(service.cache().store().count().await.unwrap(), 0);

        // The missing binary surfaces as a per-URL failure, not a crash
        let response = service
            .handle(RequestedView::Info, &json!({"url": "https://example.com/v"}))
            .await;
        assert_eq!(response.status, 400);
        assert_eq!(service.cache().store().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_store_directory_is_created_on_open() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("data").join("vidmeta").join("requests.db");
        let settings = AppSettings {
            database_url: format!("sqlite://{}", db_path.display()),
            ..AppSettings::default()
        };

        let store = open_store(&settings).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
        assert!(db_path.exists());
    }

    /// Shell script that fails the way yt-dlp does under --ignore-errors
    #[cfg(unix)]
    fn unavailable_ytdlp(dir: &std::path::Path) -> std::path::PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("yt-dlp");
        std::fs::write(
            &path,
            "#!/bin/sh\necho null\necho 'ERROR: [youtube] abc: Video unavailable' >&2\nexit 1\n",
        )
        .unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unavailable_video_is_classified() {
        let temp_dir = tempfile::tempdir().unwrap();
        let engine = Arc::new(YtDlpExtractor::with_path(unavailable_ytdlp(temp_dir.path())));
        let service = assemble(
            &AppSettings::default(),
            Arc::new(MemoryCacheStore::new()),
            engine,
        );

        let response = service
            .handle(RequestedView::Info, &json!({"url": "https://youtu.be/abc"}))
            .await;

        assert_eq!(response.status, 400);
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"url": "https://youtu.be/abc", "success": false, "error": "Video is unavailable"})
        );
    }
}
