// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Span creation helpers for chaincache operations.
//!
//! Telemetry is kept out of the business logic: each instrumented operation
//! has a span helper here, and the operation attaches it with
//! [`tracing::Instrument`] so the span stays correct across `.await` points.

use std::time::Duration;

use alloy_primitives::Address;
use tracing::Span;

use crate::key::ReadKey;

/// Create span for a single cache read.
///
/// Parent: caller (route handler) span
/// Children: upstream_fetch span when this read starts a refresh
#[inline]
pub(crate) fn read_cache_get(key: &ReadKey, ttl: Duration) -> Span {
    tracing::debug_span!(
        "chaincache.get",
        key = %key,
        ttl_ms = ttl.as_millis() as u64,
    )
}

/// Create span for the single upstream read of a refresh.
///
/// Parent: read_cache_get span of the read that started the refresh
/// Children: provider RPC spans
#[inline]
pub(crate) fn upstream_fetch(key: &ReadKey, timeout: Option<Duration>) -> Span {
    tracing::info_span!(
        "chaincache.upstream_fetch",
        key = %key,
        timeout_ms = timeout.map(|t| t.as_millis() as u64),
    )
}

/// Create span for a typed contract read.
///
/// Parent: caller span
/// Children: read_cache_get span
#[inline]
pub(crate) fn contract_call(address: Address, function: &'static str) -> Span {
    tracing::info_span!(
        "chaincache.contract_call",
        address = %address,
        function = function,
    )
}
