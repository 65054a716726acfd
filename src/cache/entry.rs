// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Per-key cache state

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, Shared};
use tokio::time::Instant;

use crate::errors::UpstreamError;

/// Observable state of a cache entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryState {
    /// No value was ever fetched for the key
    Empty,
    /// A value exists and is younger than the TTL
    Fresh,
    /// A value exists but is at least as old as the TTL
    Stale,
    /// An upstream fetch for the key is in flight
    Refreshing,
}

impl fmt::Display for EntryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntryState::Empty => "empty",
            EntryState::Fresh => "fresh",
            EntryState::Stale => "stale",
            EntryState::Refreshing => "refreshing",
        };
        f.write_str(name)
    }
}

/// A successfully fetched value with the time it was fetched
#[derive(Debug, Clone)]
pub(crate) struct Fetched<V> {
    pub(crate) value: V,
    /// Monotonic fetch time, drives freshness
    pub(crate) at: Instant,
    /// Wall-clock fetch time, reported to callers
    pub(crate) at_utc: DateTime<Utc>,
}

impl<V> Fetched<V> {
    pub(crate) fn now(value: V) -> Self {
        Self {
            value,
            at: Instant::now(),
            at_utc: Utc::now(),
        }
    }

    /// Fresh iff `now - fetched_at < ttl`
    pub(crate) fn is_fresh(&self, ttl: Duration) -> bool {
        self.at.elapsed() < ttl
    }
}

/// Result of one upstream fetch, delivered to every caller that waited on it
#[derive(Debug, Clone)]
pub(crate) enum Settled<V> {
    Refreshed(Fetched<V>),
    Failed {
        error: UpstreamError,
        /// The value the entry still holds, if any
        previous: Option<Fetched<V>>,
    },
}

/// In-flight marker: a shared handle on the single upstream fetch for a key
pub(crate) type PendingFetch<V> = Shared<BoxFuture<'static, Settled<V>>>;

/// State guarded by the per-key lock
pub(crate) struct Slot<V> {
    pub(crate) current: Option<Fetched<V>>,
    pub(crate) in_flight: Option<PendingFetch<V>>,
    pub(crate) last_error: Option<UpstreamError>,
}

impl<V> Default for Slot<V> {
    fn default() -> Self {
        Self {
            current: None,
            in_flight: None,
            last_error: None,
        }
    }
}

impl<V> Slot<V> {
    pub(crate) fn state(&self, ttl: Duration) -> EntryState {
        if self.in_flight.is_some() {
            return EntryState::Refreshing;
        }
        match &self.current {
            None => EntryState::Empty,
            Some(fetched) if fetched.is_fresh(ttl) => EntryState::Fresh,
            Some(_) => EntryState::Stale,
        }
    }
}
