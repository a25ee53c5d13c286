//! Keyed TTL cache with per-key single-flight coalescing.
//!
//! A [`RequestCache`] sits in front of loader functions to avoid redundant
//! fetches for identical keys: a TTL-bounded result cache plus an in-flight
//! map guaranteeing at most one outstanding fetch per key at any instant.
//! Entries age out purely by TTL comparison at read time; there is no
//! background sweep, so stale entries linger until the next read for that
//! key overwrites them or [`reset`](RequestCache::reset) clears the cache.
//!
//! Instances are explicit and constructor-injected. There is no module-level
//! state anywhere; tests get a fresh cache per case or call `reset`.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use parking_lot::Mutex;
use tokio::time::Instant;

use crate::core::{AppResult, OrchestratorError};

/// Per-call options for [`RequestCache::get`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheOptions {
    ttl: Option<Duration>,
    skip_cache: bool,
}

impl CacheOptions {
    /// Defaults: instance TTL, cache reads enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the instance default TTL for this call.
    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Bypass the cached value and always fetch. Concurrent callers for the
    /// same key are still coalesced onto one fetch.
    #[must_use]
    pub const fn skip_cache(mut self) -> Self {
        self.skip_cache = true;
        self
    }
}

/// Counter snapshot for observability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads served from a valid entry.
    pub hits: u64,
    /// Reads that dispatched a fetch.
    pub misses: u64,
    /// Reads that joined an already in-flight fetch.
    pub coalesced: u64,
    /// Entries dropped because a fetch for their key failed.
    pub evictions: u64,
}

struct CacheEntry<T> {
    data: T,
    stored_at: Instant,
}

type InflightFuture<T> = Shared<BoxFuture<'static, Result<T, OrchestratorError>>>;

struct CacheInner<T> {
    default_ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry<T>>>,
    inflight: Mutex<HashMap<String, InflightFuture<T>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    coalesced: AtomicU64,
    evictions: AtomicU64,
}

/// TTL cache layered over caller-supplied fetchers, with request coalescing.
///
/// Cloning is cheap and shares the same store.
pub struct RequestCache<T> {
    inner: Arc<CacheInner<T>>,
}

impl<T> Clone for RequestCache<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> RequestCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create an empty cache with an instance-wide default TTL.
    #[must_use]
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                default_ttl,
                entries: Mutex::new(HashMap::new()),
                inflight: Mutex::new(HashMap::new()),
                hits: AtomicU64::new(0),
                misses: AtomicU64::new(0),
                coalesced: AtomicU64::new(0),
                evictions: AtomicU64::new(0),
            }),
        }
    }

    /// Read through the cache.
    ///
    /// 1. With `skip_cache` the stored value is never served.
    /// 2. A valid (non-expired) entry is returned without invoking `fetcher`.
    /// 3. An in-flight fetch for `key` is joined regardless of `skip_cache`;
    ///    a second concurrent fetch for an identical key never starts.
    /// 4. Otherwise `fetcher` runs: success stores the result with the
    ///    current instant; failure evicts any entry for `key` and every
    ///    joiner observes the same error.
    ///
    /// # Errors
    ///
    /// Only the fetcher's own failure propagates, as
    /// [`OrchestratorError::Fetch`].
    pub async fn get<F, Fut>(
        &self,
        key: &str,
        fetcher: F,
        options: CacheOptions,
    ) -> Result<T, OrchestratorError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<T>> + Send + 'static,
    {
        let ttl = options.ttl.unwrap_or(self.inner.default_ttl);
        if !options.skip_cache {
            let entries = self.inner.entries.lock();
            if let Some(entry) = entries.get(key) {
                if entry.stored_at.elapsed() < ttl {
                    self.inner.hits.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(key, "cache hit");
                    return Ok(entry.data.clone());
                }
            }
        }

        let run = {
            let mut inflight = self.inner.inflight.lock();
            if let Some(existing) = inflight.get(key) {
                self.inner.coalesced.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(key, "joined in-flight fetch");
                existing.clone()
            } else {
                self.inner.misses.fetch_add(1, Ordering::Relaxed);
                let inner = Arc::clone(&self.inner);
                let owned_key = key.to_string();
                let fut = fetcher();
                let run = async move {
                    match fut.await {
                        Ok(value) => {
                            inner.entries.lock().insert(
                                owned_key.clone(),
                                CacheEntry {
                                    data: value.clone(),
                                    stored_at: Instant::now(),
                                },
                            );
                            inner.inflight.lock().remove(&owned_key);
                            Ok(value)
                        }
                        Err(err) => {
                            // A failed fetch never leaves a stale value behind.
                            if inner.entries.lock().remove(&owned_key).is_some() {
                                inner.evictions.fetch_add(1, Ordering::Relaxed);
                            }
                            inner.inflight.lock().remove(&owned_key);
                            tracing::warn!(key = %owned_key, error = %err, "fetch failed");
                            Err(OrchestratorError::fetch(err))
                        }
                    }
                }
                .boxed()
                .shared();
                inflight.insert(key.to_string(), run.clone());
                run
            }
        };
        run.await
    }

    /// Drop one entry, e.g. after a mutation invalidates it.
    pub fn invalidate(&self, key: &str) {
        self.inner.entries.lock().remove(key);
    }

    /// Clear every entry and in-flight marker. Fetches already running still
    /// store their result on completion, same as the read-time-eviction rule.
    pub fn reset(&self) {
        self.inner.entries.lock().clear();
        self.inner.inflight.lock().clear();
    }

    /// Counter snapshot.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.inner.hits.load(Ordering::Relaxed),
            misses: self.inner.misses.load(Ordering::Relaxed),
            coalesced: self.inner.coalesced.load(Ordering::Relaxed),
            evictions: self.inner.evictions.load(Ordering::Relaxed),
        }
    }

    /// Stored-entry count, expired entries included until overwritten.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.entries.lock().len()
    }

    /// Whether no entries are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.entries.lock().is_empty()
    }
}
