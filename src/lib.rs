//! Vidmeta library
//!
//! Normalized, cached video metadata on top of yt-dlp.

pub mod app;
pub mod cache;
pub mod database;
pub mod extractor;
pub mod formats;
pub mod normalizer;
pub mod service;
pub mod utils;
pub mod validator;
pub mod views;

// Re-export main types for easier use
pub use cache::{CacheKey, CacheView, ResultCache};
pub use extractor::{EngineAdapter, Extractor, YtDlpExtractor};
pub use formats::{FormatResolver, FormatToken};
pub use normalizer::{ExtractionResult, PlaylistRecord, VideoRecord};
pub use service::MetadataService;
pub use utils::{AppSettings, VidmetaError};
pub use views::{RequestedView, ServiceResponse};
