//! Request pipeline
//!
//! validate → (per URL) cache / single-flight → resolve → extract →
//! normalize → store → assemble view

use crate::cache::{CacheKey, CacheOutcome, CacheView, ResultCache};
use crate::extractor::EngineAdapter;
use crate::formats::{supported_formats, FormatCatalogue, FormatResolver, FormatToken};
use crate::normalizer::{normalize, ExtractionFailure, ExtractionResult};
use crate::utils::error::VidmetaError;
use crate::validator::{validate, ValidatedRequest};
use crate::views::{RequestedView, ServiceResponse, UrlResponse};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

pub const SERVICE_NAME: &str = "video_service";

/// Platforms advertised by the health endpoint
pub const SUPPORTED_EXTRACTORS: [&str; 7] = [
    "youtube",
    "vimeo",
    "dailymotion",
    "facebook",
    "instagram",
    "twitter",
    "tiktok",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub success: bool,
    pub service: &'static str,
    pub status: &'static str,
    pub supported_extractors: Vec<&'static str>,
}

/// Shared entry point for every request
#[derive(Clone)]
pub struct MetadataService {
    cache: ResultCache,
    adapter: EngineAdapter,
    resolver: Arc<FormatResolver>,
    max_playlist_size: usize,
    batch_concurrency: usize,
}

impl MetadataService {
    pub fn new(cache: ResultCache, adapter: EngineAdapter, resolver: FormatResolver) -> Self {
        Self {
            cache,
            adapter,
            resolver: Arc::new(resolver),
            max_playlist_size: 50,
            batch_concurrency: 4,
        }
    }

    pub fn with_max_playlist_size(mut self, max_playlist_size: usize) -> Self {
        self.max_playlist_size = max_playlist_size.max(1);
        self
    }

    pub fn with_batch_concurrency(mut self, batch_concurrency: usize) -> Self {
        self.batch_concurrency = batch_concurrency.max(1);
        self
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Validate a raw JSON request and answer it with the requested view
    pub async fn handle(&self, view: RequestedView, request: &Value) -> ServiceResponse {
        let request_id = Uuid::new_v4();
        let started = Instant::now();

        let validated = match validate(request) {
            Ok(validated) => validated,
            Err(e) => {
                debug!(%request_id, view = %view, "Rejected request: {}", e);
                return ServiceResponse::rejected(&e);
            }
        };

        let results = self.process(view, &validated).await;
        let response = ServiceResponse::from_results(results);

        let elapsed = started.elapsed();
        info!(
            %request_id,
            view = %view,
            urls = validated.urls.len(),
            status = response.status,
            duration_ms = elapsed.as_millis() as u64,
            "Request processed in {:.2} seconds",
            elapsed.as_secs_f64()
        );
        response
    }

    /// Answer every URL of an already validated request, in request order.
    ///
    /// Up to `batch_concurrency` URLs are in progress at once; `buffered`
    /// yields them back in input order regardless of completion order.
    pub async fn process(&self, view: RequestedView, request: &ValidatedRequest) -> Vec<UrlResponse> {
        let format = request.format;
        stream::iter(request.urls.iter().cloned())
            .map(|url| self.answer(view, format, url))
            .buffered(self.batch_concurrency)
            .collect()
            .await
    }

    async fn answer(&self, view: RequestedView, format: FormatToken, url: String) -> UrlResponse {
        match self.fetch(&url, view.cache_view(format)).await {
            Ok(outcome) => match view.assemble(&outcome.result) {
                Ok(projection) => UrlResponse::from_view(url, projection),
                Err(failure) => UrlResponse::from_failure(url, &failure),
            },
            Err(e) => {
                error!(url = %url, view = %view, "Error in {} request: {}", view, e);
                UrlResponse::from_error(url, &e)
            }
        }
    }

    /// Cached or freshly computed result for one URL and cache slot
    pub async fn fetch(&self, url: &str, view: CacheView) -> Result<CacheOutcome, VidmetaError> {
        let key = CacheKey::new(url, view);
        let adapter = self.adapter.clone();
        let resolver = self.resolver.clone();
        let max_playlist_size = self.max_playlist_size;
        let url = key.url.clone();

        self.cache
            .get_or_compute(key, move || async move {
                compute(&adapter, &resolver, &url, view, max_playlist_size).await
            })
            .await
    }

    pub fn supported_formats(&self) -> FormatCatalogue {
        supported_formats()
    }

    /// Healthy when the engine answers and the store can be read
    pub async fn health(&self) -> HealthReport {
        let engine_ok = self.adapter.health_check().await;
        let store_ok = match self.cache.store().count().await {
            Ok(_) => true,
            Err(e) => {
                warn!("Result store is unreachable: {}", e);
                false
            }
        };

        let healthy = engine_ok && store_ok;
        HealthReport {
            success: healthy,
            service: SERVICE_NAME,
            status: if healthy { "healthy" } else { "unhealthy" },
            supported_extractors: SUPPORTED_EXTRACTORS.to_vec(),
        }
    }
}

async fn compute(
    adapter: &EngineAdapter,
    resolver: &FormatResolver,
    url: &str,
    view: CacheView,
    max_playlist_size: usize,
) -> ExtractionResult {
    let started = Instant::now();
    let options = resolver.resolve(view.format_token(), view.include_subtitles());

    let result = match adapter.extract(url, &options).await {
        Ok(raw) => match normalize(&raw, view.include_subtitles(), max_playlist_size) {
            Ok(result) => result,
            Err(e) => {
                error!("Unexpected metadata from {}: {}", url, e);
                ExtractionResult::Failure(ExtractionFailure::unknown(e.to_string()))
            }
        },
        Err(failure) => ExtractionResult::Failure(failure),
    };

    let elapsed = started.elapsed();
    if result.is_success() {
        info!(
            url = %url,
            videos = result.video_count(),
            duration_ms = elapsed.as_millis() as u64,
            "Video extraction SUCCESS - URL: {} - Videos: {} - Duration: {:.2}s",
            url,
            result.video_count(),
            elapsed.as_secs_f64()
        );
    } else {
        error!(
            url = %url,
            duration_ms = elapsed.as_millis() as u64,
            "Video extraction FAILED - URL: {} - Duration: {:.2}s",
            url,
            elapsed.as_secs_f64()
        );
    }

    result
}
