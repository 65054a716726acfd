// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Coalescing read-through cache for upstream reads
//!
//! [`ReadCache`] fronts a read-only upstream query (typically a contract call)
//! and serves many concurrent callers from one value per key:
//!
//! - Fresh values are returned without touching upstream.
//! - Stale or empty keys are refreshed with exactly one upstream call, however
//!   many callers arrive while it runs. Late arrivals wait on the same fetch.
//! - When a refresh fails the last good value is served with `stale = true`.
//!   Only a key that has never held a value fails, with
//!   [`ReadCacheError::FetchFailed`].
//!
//! # Examples
//!
//! ```rust,ignore
//! use chaincache::{ReadCache, ReadKey};
//! use std::time::Duration;
//!
//! let cache = ReadCache::<u64>::new();
//! let key = ReadKey::new("fees:platform")?;
//!
//! let provider = provider.clone();
//! let read = cache
//!     .get(&key, Duration::from_secs(60), move || async move { fetch_fees(&provider).await })
//!     .await?;
//!
//! if read.stale {
//!     tracing::warn!(key = %key, "serving stale fees");
//! }
//! ```
//!
//! # Locking
//!
//! Each key owns its own lock; the key map is only locked to find a key's
//! slot. No lock is held across an `.await`. The upstream fetch runs as its own
//! tokio task, so it completes and updates the entry even if every caller
//! waiting on it is dropped.

use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::FutureExt;
use tracing::{debug, warn, Instrument};

use crate::config::{ReadCacheConfig, RefreshMode};
use crate::errors::{BoxError, ReadCacheError, UpstreamError};
use crate::key::ReadKey;
use crate::spans;

mod entry;
mod read;
mod stats;

pub use entry::EntryState;
pub use read::CachedRead;
pub use stats::CacheStats;

use entry::{Fetched, PendingFetch, Settled, Slot};
use stats::StatsRecorder;

type SlotHandle<V> = Arc<Mutex<Slot<V>>>;

/// Process-local cache of upstream reads, keyed by [`ReadKey`]
///
/// `ReadCache` is a cheap handle: clones share the same entries, so one
/// instance can be created at startup and handed to every route handler.
/// Entries live as long as the cache; nothing is evicted.
pub struct ReadCache<V> {
    inner: Arc<Inner<V>>,
}

struct Inner<V> {
    slots: Mutex<HashMap<ReadKey, SlotHandle<V>>>,
    config: ReadCacheConfig,
    stats: StatsRecorder,
}

impl<V> Clone for ReadCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> std::fmt::Debug for ReadCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadCache")
            .field("entries", &lock(&self.inner.slots).len())
            .field("config", &self.inner.config)
            .finish()
    }
}

impl<V> Default for ReadCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ReadCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Creates an empty cache with the default configuration
    pub fn new() -> Self {
        Self::with_config(ReadCacheConfig::default())
    }

    /// Creates an empty cache with the given configuration
    ///
    /// The cache uses the configuration's fetch timeout and refresh mode. TTLs
    /// are passed per call.
    pub fn with_config(config: ReadCacheConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                slots: Mutex::new(HashMap::new()),
                config,
                stats: StatsRecorder::default(),
            }),
        }
    }

    /// The configuration this cache was built with
    pub fn config(&self) -> &ReadCacheConfig {
        &self.inner.config
    }

    /// Reads `key`, fetching through `fetcher` when the cached value is older than `ttl`
    ///
    /// `fetcher` is only invoked when this call starts the refresh; callers
    /// that join a refresh already in flight drop theirs unused. It runs on the
    /// spawned fetch task, never under the entry lock, so it may itself read
    /// from the cache. A panic while building or polling its future is reported
    /// as [`UpstreamError::Panicked`].
    ///
    /// # Errors
    ///
    /// Returns [`ReadCacheError::FetchFailed`] when the upstream read fails and
    /// the key has never held a value. Every other upstream failure is reported
    /// through [`CachedRead::error`] alongside the stale value.
    pub async fn get<F, Fut, E>(
        &self,
        key: &ReadKey,
        ttl: Duration,
        fetcher: F,
    ) -> Result<CachedRead<V>, ReadCacheError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        let span = spans::read_cache_get(key, ttl);
        self.get_inner(key, ttl, fetcher).instrument(span).await
    }

    async fn get_inner<F, Fut, E>(
        &self,
        key: &ReadKey,
        ttl: Duration,
        fetcher: F,
    ) -> Result<CachedRead<V>, ReadCacheError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        let slot = self.slot(key);
        let background = self.inner.config.refresh_mode == RefreshMode::Background;

        let pending = {
            let mut guard = lock(&slot);

            if let Some(fetched) = guard.current.as_ref().filter(|f| f.is_fresh(ttl)) {
                self.inner.stats.hit();
                debug!(key = %key, "Cache hit");
                return Ok(CachedRead::hit(fetched.clone(), ttl));
            }

            let pending = match guard.in_flight.clone() {
                Some(pending) => {
                    if !background || guard.current.is_none() {
                        self.inner.stats.coalesced();
                        debug!(key = %key, "Joining in-flight upstream read");
                    }
                    pending
                }
                None => {
                    self.inner.stats.miss();
                    debug!(key = %key, has_value = guard.current.is_some(), "Cache miss, starting upstream read");
                    let pending = self.spawn_fetch(key, Arc::clone(&slot), fetcher);
                    guard.in_flight = Some(pending.clone());
                    pending
                }
            };

            if background {
                if let Some(previous) = guard.current.clone() {
                    self.inner.stats.stale_served();
                    debug!(key = %key, "Serving stale value while refreshing in background");
                    return Ok(CachedRead::stale(previous, ttl, guard.last_error.clone()));
                }
            }

            pending
        };

        match pending.await {
            Settled::Refreshed(fetched) => Ok(CachedRead::refreshed(fetched, ttl)),
            Settled::Failed {
                error,
                previous: Some(previous),
            } => {
                self.inner.stats.stale_served();
                warn!(key = %key, error = %error, "Upstream read failed, serving stale value");
                Ok(CachedRead::stale(previous, ttl, Some(error)))
            }
            Settled::Failed {
                error,
                previous: None,
            } => {
                self.inner.stats.fetch_failed();
                warn!(key = %key, error = %error, "Upstream read failed and no cached value exists");
                Err(ReadCacheError::FetchFailed {
                    key: key.clone(),
                    source: error,
                })
            }
        }
    }

    /// Returns the cached value for `key` without fetching
    ///
    /// `stale` is set when the value is at least `ttl` old.
    pub fn peek(&self, key: &ReadKey, ttl: Duration) -> Option<CachedRead<V>> {
        let slot = lock(&self.inner.slots).get(key).cloned()?;
        let guard = lock(&slot);
        let fetched = guard.current.clone()?;
        Some(if fetched.is_fresh(ttl) {
            CachedRead::hit(fetched, ttl)
        } else {
            CachedRead::stale(fetched, ttl, guard.last_error.clone())
        })
    }

    /// Returns the state of the entry for `key` under `ttl`
    pub fn state(&self, key: &ReadKey, ttl: Duration) -> EntryState {
        let slot = lock(&self.inner.slots).get(key).cloned();
        match slot {
            Some(slot) => lock(&slot).state(ttl),
            None => EntryState::Empty,
        }
    }

    /// Number of keys the cache has seen
    pub fn len(&self) -> usize {
        lock(&self.inner.slots).len()
    }

    /// Whether the cache has seen no keys
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the cache counters
    pub fn stats(&self) -> CacheStats {
        self.inner.stats.snapshot(self.len())
    }

    fn slot(&self, key: &ReadKey) -> SlotHandle<V> {
        let mut slots = lock(&self.inner.slots);
        Arc::clone(slots.entry(key.clone()).or_default())
    }

    /// Spawns the upstream read and returns the shared handle callers wait on
    ///
    /// Must be called with the slot lock held; the task takes the same lock to
    /// store its result, so it cannot settle before `in_flight` is set.
    fn spawn_fetch<F, Fut, E>(&self, key: &ReadKey, slot: SlotHandle<V>, fetcher: F) -> PendingFetch<V>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        let timeout = self.inner.config.fetch_timeout;
        let inner = Arc::clone(&self.inner);
        let task_key = key.clone();
        let task_slot = Arc::clone(&slot);
        let span = spans::upstream_fetch(key, timeout);

        let task = tokio::spawn(
            async move {
                let result = run_fetch(fetcher, timeout).await;
                settle(&task_slot, result, &inner.stats, &task_key)
            }
            .instrument(span),
        );

        let inner = Arc::clone(&self.inner);
        let key = key.clone();
        async move {
            match task.await {
                Ok(settled) => settled,
                Err(join_error) => {
                    let error = if join_error.is_panic() {
                        UpstreamError::panicked(join_error.into_panic())
                    } else {
                        UpstreamError::Cancelled
                    };
                    settle(&slot, Err(error), &inner.stats, &key)
                }
            }
        }
        .boxed()
        .shared()
    }
}

/// Runs one upstream read with the configured timeout, containing panics
///
/// The fetcher is called inside the guarded future, so a panic before it
/// returns its future is contained too.
async fn run_fetch<V, F, Fut, E>(fetcher: F, timeout: Option<Duration>) -> Result<V, UpstreamError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<V, E>>,
    E: Into<BoxError>,
{
    let guarded = AssertUnwindSafe(async move { fetcher().await }).catch_unwind();
    let outcome = match timeout {
        Some(limit) => match tokio::time::timeout(limit, guarded).await {
            Ok(outcome) => outcome,
            Err(_) => return Err(UpstreamError::TimedOut { timeout: limit }),
        },
        None => guarded.await,
    };

    match outcome {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(UpstreamError::unavailable(e)),
        Err(payload) => Err(UpstreamError::panicked(payload)),
    }
}

/// Stores the outcome of a fetch and clears the in-flight marker
fn settle<V: Clone>(
    slot: &Mutex<Slot<V>>,
    result: Result<V, UpstreamError>,
    stats: &StatsRecorder,
    key: &ReadKey,
) -> Settled<V> {
    let mut guard = lock(slot);
    guard.in_flight = None;

    match result {
        Ok(value) => {
            let fetched = Fetched::now(value);
            guard.current = Some(fetched.clone());
            guard.last_error = None;
            stats.refreshed();
            debug!(key = %key, "Upstream read succeeded");
            Settled::Refreshed(fetched)
        }
        Err(error) => {
            stats.upstream_failed();
            debug!(key = %key, error = %error, has_value = guard.current.is_some(), "Upstream read failed");
            guard.last_error = Some(error.clone());
            Settled::Failed {
                error,
                previous: guard.current.clone(),
            }
        }
    }
}

/// Locks a std mutex, recovering the data if a previous holder panicked
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
