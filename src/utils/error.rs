//! Error handling for vidmeta

use thiserror::Error;

/// Main error type for vidmeta
#[derive(Debug, Error)]
pub enum VidmetaError {
    #[error("yt-dlp not found. Please install yt-dlp")]
    YtDlpNotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Playlist entry {index} could not be normalized: {reason}")]
    PartialEntry { index: usize, reason: String },

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl VidmetaError {
    /// HTTP-style status code the surrounding service should answer with.
    ///
    /// Classified extraction failures are results rather than errors and
    /// always answer with 400 (see `UrlResponse::from_failure`).
    pub fn status_code(&self) -> u16 {
        match self {
            VidmetaError::Validation(_) => 400,
            _ => 500,
        }
    }
}
