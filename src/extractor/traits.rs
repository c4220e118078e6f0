use crate::formats::ExtractionOptions;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Failure surface of the external metadata engine
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine ran and reported an extraction error
    #[error("{0}")]
    Extraction(String),

    #[error("extraction timed out after {0:?}")]
    Timeout(Duration),

    #[error("failed to launch extractor: {0}")]
    Launch(#[from] std::io::Error),

    #[error("malformed extractor output: {0}")]
    Output(#[from] serde_json::Error),

    #[error("yt-dlp not found. Please install yt-dlp")]
    NotFound,
}

/// Core trait for metadata engines
///
/// This trait isolates the pipeline from the concrete extraction method
/// (yt-dlp subprocess, scripted fakes in tests, ...).
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Returns a unique identifier for this extractor (e.g. "ytdlp")
    fn id(&self) -> &'static str;

    /// Fetch the raw metadata tree for `url` without downloading media.
    ///
    /// Video nodes are flat objects; playlist nodes additionally carry an
    /// `entries` array whose items may be `null`.
    async fn extract(&self, url: &str, options: &ExtractionOptions) -> Result<Value, EngineError>;

    /// Checks that the engine can be invoked at all
    async fn health_check(&self) -> Result<(), EngineError> {
        Ok(())
    }
}
