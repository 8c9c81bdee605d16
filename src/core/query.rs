//! Keyed query cache with a freshness window and in-flight deduplication
//!
//! Every resource key owns one async slot. A caller holding the slot is the
//! only one fetching that key; callers queued behind it notice the completed
//! fetch through a counter and reuse its outcome instead of starting another
//! request, even when they asked for a forced refresh.

use crate::core::retry::with_retry;
use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// How long a successful result is served without refetching.
    pub stale_time: Duration,
    pub retries: usize,
    pub retry_delay: Duration,
}

struct Slot<V, E> {
    value: Option<Arc<V>>,
    fetched_at: Option<Instant>,
    last_error: Option<E>,
}

struct Entry<V, E> {
    completed: AtomicU64,
    slot: tokio::sync::Mutex<Slot<V, E>>,
}

pub struct QueryCache<V, E> {
    entries: Mutex<HashMap<String, Arc<Entry<V, E>>>>,
}

impl<V, E> QueryCache<V, E>
where
    V: Send + Sync,
    E: Clone + Display,
{
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn entry(&self, key: &str) -> Arc<Entry<V, E>> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(entries.entry(key.to_string()).or_insert_with(|| {
            Arc::new(Entry {
                completed: AtomicU64::new(0),
                slot: tokio::sync::Mutex::new(Slot {
                    value: None,
                    fetched_at: None,
                    last_error: None,
                }),
            })
        }))
    }

    /// Returns the cached value for `key`, fetching it when missing or stale.
    ///
    /// `force` skips the freshness check. Failed attempts are retried with
    /// backoff; a failure leaves the previous value in place.
    pub async fn fetch<F, Fut>(
        &self,
        key: &str,
        options: &QueryOptions,
        force: bool,
        fetcher: F,
    ) -> Result<Arc<V>, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let entry = self.entry(key);
        let seen = entry.completed.load(Ordering::Acquire);
        let mut slot = entry.slot.lock().await;

        if entry.completed.load(Ordering::Acquire) != seen {
            if let Some(err) = &slot.last_error {
                debug!(key, "Joined failed in-flight query");
                return Err(err.clone());
            }
            if let Some(value) = &slot.value {
                debug!(key, "Joined in-flight query");
                return Ok(Arc::clone(value));
            }
        }

        if !force {
            if let (Some(value), Some(fetched_at)) = (&slot.value, slot.fetched_at) {
                if fetched_at.elapsed() < options.stale_time {
                    debug!(key, "Query HIT");
                    return Ok(Arc::clone(value));
                }
            }
        }

        debug!(key, force, "Query MISS");
        let outcome = match with_retry(fetcher, options.retries, options.retry_delay).await {
            Ok(value) => {
                let value = Arc::new(value);
                slot.value = Some(Arc::clone(&value));
                slot.fetched_at = Some(Instant::now());
                slot.last_error = None;
                Ok(value)
            }
            Err(err) => {
                debug!(key, error = %err, "Query failed");
                slot.last_error = Some(err.clone());
                Err(err)
            }
        };
        entry.completed.fetch_add(1, Ordering::AcqRel);
        outcome
    }
}

impl<V, E> Default for QueryCache<V, E>
where
    V: Send + Sync,
    E: Clone + Display,
{
    fn default() -> Self {
        Self::new()
    }
}
