// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Default values and environment variable names

use std::time::Duration;

/// Default time-to-live for cached reads.
///
/// Matches the one minute `CACHE_DURATION` the API routes used for fee and
/// supply reads.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Default bound on a single upstream read.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Environment variable names read by [`ReadCacheConfig::from_env`](super::ReadCacheConfig::from_env)
pub mod env {
    /// Default TTL in whole seconds
    pub const TTL_SECS: &str = "CHAINCACHE_TTL_SECS";

    /// Fetch timeout in milliseconds, `0` disables the timeout
    pub const FETCH_TIMEOUT_MS: &str = "CHAINCACHE_FETCH_TIMEOUT_MS";

    /// `inline` or `background`
    pub const REFRESH_MODE: &str = "CHAINCACHE_REFRESH_MODE";

    /// Prefix of per-function TTL overrides in seconds, e.g. `CHAINCACHE_TTL_TOTALSUPPLY`
    pub const TTL_OVERRIDE_PREFIX: &str = "CHAINCACHE_TTL_";
}
