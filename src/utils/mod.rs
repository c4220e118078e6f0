//! Utility modules for error handling, configuration and logging

pub mod config;
pub mod error;
pub mod logging;
pub mod paths;

// Re-export for convenience
pub use config::{AppSettings, DeploymentProfile, EngineSettings};
pub use error::VidmetaError;
pub use paths::{default_database_url, ensure_database_dir, get_data_dir, get_database_path};
