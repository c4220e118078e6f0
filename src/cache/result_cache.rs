//! Result cache with at most one in-flight computation per key
//!
//! The lookup, the computation and the store for a key all run inside a
//! single spawned task. Callers that arrive while that task is running
//! await the same shared future instead of starting their own.

use crate::cache::store::{CacheEntry, CacheKey, CacheStore};
use crate::normalizer::ExtractionResult;
use crate::utils::error::VidmetaError;
use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

type FlightResult = Result<CacheOutcome, String>;
type Flight = Shared<BoxFuture<'static, FlightResult>>;
type FlightMap = Arc<Mutex<HashMap<CacheKey, Flight>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeSource {
    Cached,
    Computed,
}

/// What a caller gets back for a key
#[derive(Debug, Clone)]
pub struct CacheOutcome {
    pub result: Arc<ExtractionResult>,
    pub source: OutcomeSource,
    /// Time the computation took (the original one for cached results)
    pub duration: Duration,
}

/// Shared, process-wide cache handle
#[derive(Clone)]
pub struct ResultCache {
    store: Arc<dyn CacheStore>,
    ttl: Option<Duration>,
    in_flight: FlightMap,
}

impl ResultCache {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Option<Duration>) -> Self {
        Self {
            store,
            ttl,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    /// Number of keys currently being computed
    pub fn in_flight_count(&self) -> usize {
        lock(&self.in_flight).len()
    }

    /// Cached result for `key`, or the result of `compute` run at most once
    /// across all concurrent callers for the same key.
    pub async fn get_or_compute<F, Fut>(
        &self,
        key: CacheKey,
        compute: F,
    ) -> Result<CacheOutcome, VidmetaError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ExtractionResult> + Send + 'static,
    {
        let flight = {
            let mut in_flight = lock(&self.in_flight);
            match in_flight.get(&key) {
                Some(existing) => {
                    debug!("Joining in-flight computation for {}", key);
                    existing.clone()
                }
                None => {
                    let flight = self.start_flight(key.clone(), compute);
                    in_flight.insert(key, flight.clone());
                    flight
                }
            }
        };

        flight.await.map_err(VidmetaError::Internal)
    }

    /// Builds the flight future. Nothing runs until it is first polled,
    /// which happens only after it has been registered in the map.
    fn start_flight<F, Fut>(&self, key: CacheKey, compute: F) -> Flight
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ExtractionResult> + Send + 'static,
    {
        let store = self.store.clone();
        let ttl = self.ttl;
        let in_flight = self.in_flight.clone();

        async move {
            let task_key = key.clone();
            let handle = tokio::spawn(async move {
                let _guard = FlightGuard {
                    in_flight,
                    key: task_key.clone(),
                };

                if let Some(entry) = lookup_fresh(store.as_ref(), &task_key, ttl).await {
                    info!("Retrieved cached result for {}", task_key);
                    return CacheOutcome {
                        result: Arc::new(entry.result),
                        source: OutcomeSource::Cached,
                        duration: entry.duration,
                    };
                }

                let started = Instant::now();
                let result = compute().await;
                let entry = CacheEntry {
                    key: task_key,
                    result,
                    duration: started.elapsed(),
                    created_at: Utc::now(),
                };

                record_entry(store.as_ref(), &entry).await;
                info!(
                    duration_ms = entry.duration.as_millis() as u64,
                    "Processed new request for {}", entry.key
                );

                CacheOutcome {
                    result: Arc::new(entry.result),
                    source: OutcomeSource::Computed,
                    duration: entry.duration,
                }
            });

            handle.await.map_err(|e| {
                error!("Computation for {} did not complete: {}", key, e);
                format!("computation for {} did not complete", key.url)
            })
        }
        .boxed()
        .shared()
    }
}

/// Removes the flight when its task finishes, panics included
struct FlightGuard {
    in_flight: FlightMap,
    key: CacheKey,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        lock(&self.in_flight).remove(&self.key);
    }
}

fn lock(map: &FlightMap) -> MutexGuard<'_, HashMap<CacheKey, Flight>> {
    // The map stays consistent even if a holder panicked
    map.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn freshness_cutoff(ttl: Option<Duration>) -> Option<DateTime<Utc>> {
    let ttl = chrono::Duration::from_std(ttl?).ok()?;
    Utc::now().checked_sub_signed(ttl)
}

async fn lookup_fresh(
    store: &dyn CacheStore,
    key: &CacheKey,
    ttl: Option<Duration>,
) -> Option<CacheEntry> {
    match store.lookup(key, freshness_cutoff(ttl)).await {
        Ok(entry) => entry,
        Err(e) => {
            warn!("Cache lookup failed for {}, treating as miss: {}", key, e);
            None
        }
    }
}

async fn record_entry(store: &dyn CacheStore, entry: &CacheEntry) {
    if let Err(e) = store.store(entry).await {
        warn!("Serving result for {} without caching it: {}", entry.key, e);
    }
}
