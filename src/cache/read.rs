// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Values returned by cache reads, with freshness metadata

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use super::entry::Fetched;
use crate::errors::UpstreamError;

/// A value served by [`ReadCache::get`](super::ReadCache::get)
///
/// `cached` tells whether the value came from the cache rather than from an
/// upstream read made for this request. `stale` tells whether the value is
/// older than the TTL; it is only ever set together with `cached`.
#[derive(Debug, Clone)]
pub struct CachedRead<V> {
    /// The value
    pub value: V,
    /// Served from the cache rather than fetched for this call
    pub cached: bool,
    /// Older than the TTL (the refresh failed or is running in the background)
    pub stale: bool,
    /// When the value was fetched from upstream
    pub fetched_at: DateTime<Utc>,
    /// When the value stops being fresh (`fetched_at + ttl`)
    pub next_update: DateTime<Utc>,
    /// The upstream failure that caused a stale value to be served
    pub error: Option<UpstreamError>,
}

impl<V> CachedRead<V> {
    fn from_fetched(
        fetched: Fetched<V>,
        ttl: Duration,
        cached: bool,
        stale: bool,
        error: Option<UpstreamError>,
    ) -> Self {
        let next_update = TimeDelta::from_std(ttl)
            .ok()
            .and_then(|ttl| fetched.at_utc.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            value: fetched.value,
            cached,
            stale,
            fetched_at: fetched.at_utc,
            next_update,
            error,
        }
    }

    /// Fresh value served from the cache
    pub(crate) fn hit(fetched: Fetched<V>, ttl: Duration) -> Self {
        Self::from_fetched(fetched, ttl, true, false, None)
    }

    /// Value fetched from upstream for this call
    pub(crate) fn refreshed(fetched: Fetched<V>, ttl: Duration) -> Self {
        Self::from_fetched(fetched, ttl, false, false, None)
    }

    /// Last known good value served past its TTL
    pub(crate) fn stale(fetched: Fetched<V>, ttl: Duration, error: Option<UpstreamError>) -> Self {
        Self::from_fetched(fetched, ttl, true, true, error)
    }

    /// Transforms the value, keeping the metadata
    pub fn map<U>(self, f: impl FnOnce(V) -> U) -> CachedRead<U> {
        CachedRead {
            value: f(self.value),
            cached: self.cached,
            stale: self.stale,
            fetched_at: self.fetched_at,
            next_update: self.next_update,
            error: self.error,
        }
    }

    /// Fallible [`map`](Self::map)
    pub fn try_map<U, E>(self, f: impl FnOnce(V) -> Result<U, E>) -> Result<CachedRead<U>, E> {
        Ok(CachedRead {
            value: f(self.value)?,
            cached: self.cached,
            stale: self.stale,
            fetched_at: self.fetched_at,
            next_update: self.next_update,
            error: self.error,
        })
    }
}
