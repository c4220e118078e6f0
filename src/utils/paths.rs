//! Default on-disk locations
//!
//! The request log lives in the platform data directory so that the cache
//! survives restarts regardless of the working directory the process was
//! started from.

use std::path::PathBuf;
use tracing::{debug, warn};

/// Get the data directory for vidmeta.
///
/// Returns: `<platform data dir>/vidmeta/` (e.g. `~/.local/share/vidmeta` on Linux)
///
/// Only resolves the path; `ensure_database_dir` creates it when the store
/// is opened.
pub fn get_data_dir() -> PathBuf {
    dirs::data_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local").join("share")))
        .unwrap_or_else(std::env::temp_dir)
        .join("vidmeta")
}

/// Get the request log database path.
///
/// Returns: `<data dir>/vidmeta/requests.db`
pub fn get_database_path() -> PathBuf {
    get_data_dir().join("requests.db")
}

/// sqlx connection string for the default database path
pub fn default_database_url() -> String {
    format!("sqlite://{}", get_database_path().display())
}

/// Create the parent directory of a file-backed SQLite URL
pub fn ensure_database_dir(db_url: &str) {
    let Some(parent) = sqlite_file_path(db_url)
        .and_then(|path| path.parent().map(PathBuf::from))
        .filter(|parent| !parent.as_os_str().is_empty())
    else {
        return;
    };

    match std::fs::create_dir_all(&parent) {
        Ok(()) => debug!("Data directory: {:?}", parent),
        Err(e) => warn!("Failed to create data directory {:?}: {}", parent, e),
    }
}

/// File path of a `sqlite:` URL, `None` for in-memory databases
fn sqlite_file_path(db_url: &str) -> Option<PathBuf> {
    if db_url.contains(":memory:") {
        return None;
    }

    let rest = db_url
        .strip_prefix("sqlite://")
        .or_else(|| db_url.strip_prefix("sqlite:"))?;
    let path = rest.split_once('?').map_or(rest, |(path, _)| path);
    (!path.is_empty()).then(|| PathBuf::from(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_dir_is_not_relative() {
        let path = get_data_dir();
        assert!(path.is_absolute(), "Data dir must be absolute path");
        assert!(path.ends_with("vidmeta"));
    }

    #[test]
    fn test_database_url_points_at_requests_db() {
        let url = default_database_url();
        assert!(url.starts_with("sqlite://"));
        assert!(url.ends_with("requests.db"));
    }

    #[test]
    fn test_sqlite_file_path() {
        assert_eq!(
            sqlite_file_path("sqlite:///var/lib/vidmeta/requests.db?mode=rwc"),
            Some(PathBuf::from("/var/lib/vidmeta/requests.db"))
        );
        assert_eq!(sqlite_file_path("sqlite:requests.db"), Some(PathBuf::from("requests.db")));
        assert_eq!(sqlite_file_path("sqlite::memory:"), None);
        assert_eq!(sqlite_file_path("postgres://db/vidmeta"), None);
    }

    #[test]
    fn test_ensure_database_dir_creates_parents() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        assert!(!nested.exists());

        ensure_database_dir(&format!("sqlite://{}", nested.join("requests.db").display()));
        assert!(nested.is_dir());

        // No directory is involved for these
        ensure_database_dir("sqlite::memory:");
        ensure_database_dir("sqlite:requests.db");
    }
}
