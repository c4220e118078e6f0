//! Database module

pub mod operations;
pub mod schema;

// Re-export for convenience
pub use operations::{RequestLogRecord, SqliteCacheStore};
pub use schema::initialize_database;
