//! Database schema

use anyhow::{Context, Result};
use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePoolOptions, Pool, Sqlite};
use std::time::Duration;
use tracing::{debug, info};

/// Initialize the database
pub async fn initialize_database(db_url: &str) -> Result<Pool<Sqlite>> {
    let in_memory = db_url.contains(":memory:");

    // Create database if it doesn't exist
    if !in_memory && !Sqlite::database_exists(db_url).await? {
        debug!("Creating database at: {}", db_url);
        Sqlite::create_database(db_url)
            .await
            .with_context(|| format!("Failed to create database {}", db_url))?;
    }

    let pool = pool_options(in_memory)
        .connect(db_url)
        .await
        .with_context(|| format!("Failed to connect to {}", db_url))?;

    // Run migrations
    info!("Running database migrations");
    create_tables(&pool).await?;

    Ok(pool)
}

/// Every connection to an in-memory database is a separate database, so
/// that pool holds exactly one connection and never recycles it.
fn pool_options(in_memory: bool) -> SqlitePoolOptions {
    if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
    } else {
        SqlitePoolOptions::new().max_connections(10)
    }
}

/// Create database tables
async fn create_tables(pool: &Pool<Sqlite>) -> Result<()> {
    // Append-only: one row per computation, duplicates per key allowed
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS request_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            url TEXT NOT NULL,
            view_kind TEXT NOT NULL,
            result TEXT NOT NULL,
            duration REAL NOT NULL,
            created_at DATETIME NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_request_log_key ON request_log(url, view_kind)",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_request_log_created ON request_log(created_at)")
        .execute(pool)
        .await?;

    debug!("Database tables created successfully");
    Ok(())
}
