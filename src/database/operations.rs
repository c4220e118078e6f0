//! Request log operations

use crate::cache::{CacheEntry, CacheKey, CacheStore};
use crate::normalizer::ExtractionResult;
use crate::utils::error::VidmetaError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{Pool, Row, Sqlite};
use std::time::Duration;
use tracing::{debug, info};

/// SQLite-backed `CacheStore`
#[derive(Clone)]
pub struct SqliteCacheStore {
    pool: Pool<Sqlite>,
}

impl SqliteCacheStore {
    /// Create new store over an initialized pool
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// All rows recorded for a URL, oldest first
    pub async fn history(&self, url: &str) -> Result<Vec<RequestLogRecord>, VidmetaError> {
        let rows = sqlx::query(
            "SELECT id, url, view_kind, duration, created_at FROM request_log WHERE url = ? ORDER BY id",
        )
        .bind(url)
        .fetch_all(&self.pool)
        .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(RequestLogRecord {
                id: row.try_get("id")?,
                url: row.try_get("url")?,
                view_kind: row.try_get("view_kind")?,
                duration_secs: row.try_get("duration")?,
                created_at: row.try_get("created_at")?,
            });
        }

        Ok(records)
    }
}

/// Row summary without the serialized payload
#[derive(Debug, Clone, Serialize)]
pub struct RequestLogRecord {
    pub id: i64,
    pub url: String,
    pub view_kind: String,
    pub duration_secs: f64,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
impl CacheStore for SqliteCacheStore {
    async fn lookup(
        &self,
        key: &CacheKey,
        fresh_after: Option<DateTime<Utc>>,
    ) -> Result<Option<CacheEntry>, VidmetaError> {
        let row = match fresh_after {
            Some(cutoff) => {
                sqlx::query(
                    r#"
                    SELECT result, duration, created_at FROM request_log
                    WHERE url = ? AND view_kind = ? AND created_at >= ?
                    ORDER BY id LIMIT 1
                    "#,
                )
                .bind(&key.url)
                .bind(key.view.as_str())
                .bind(cutoff)
                .fetch_optional(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT result, duration, created_at FROM request_log
                    WHERE url = ? AND view_kind = ?
                    ORDER BY id LIMIT 1
                    "#,
                )
                .bind(&key.url)
                .bind(key.view.as_str())
                .fetch_optional(&self.pool)
                .await?
            }
        };

        let row = match row {
            Some(row) => row,
            None => return Ok(None),
        };

        let payload: String = row.try_get("result")?;
        let result: ExtractionResult = serde_json::from_str(&payload)?;
        let duration_secs: f64 = row.try_get("duration")?;

        Ok(Some(CacheEntry {
            key: key.clone(),
            result,
            duration: Duration::try_from_secs_f64(duration_secs).unwrap_or_default(),
            created_at: row.try_get("created_at")?,
        }))
    }

    async fn store(&self, entry: &CacheEntry) -> Result<(), VidmetaError> {
        let payload = serde_json::to_string(&entry.result)?;

        sqlx::query(
            r#"
            INSERT INTO request_log (url, view_kind, result, duration, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.key.url)
        .bind(entry.key.view.as_str())
        .bind(payload)
        .bind(entry.duration.as_secs_f64())
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;

        debug!("Saved request log entry for {}", entry.key);
        Ok(())
    }

    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, VidmetaError> {
        let done = sqlx::query("DELETE FROM request_log WHERE created_at < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        let removed = done.rows_affected();
        if removed > 0 {
            info!("Purged {} request log entries older than {}", removed, cutoff);
        }
        Ok(removed)
    }

    async fn count(&self) -> Result<u64, VidmetaError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM request_log")
            .fetch_one(&self.pool)
            .await?;
        let total: i64 = row.try_get("total")?;
        Ok(total.max(0) as u64)
    }
}

