// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for the chaincache library.
//!
//! Each module owns a fine-grained error type, and [`ChainCacheError`] wraps
//! all of them for callers that don't need to tell the sources apart:
//!
//! - [`UpstreamError`] - A single upstream read failed. Recoverable: the cache
//!   serves the last good value and reports this error as metadata.
//! - [`ReadCacheError`] - Terminal failures of a cache read (no value to fall
//!   back on, or a malformed key)
//! - [`ContractReadError`] - Failures of typed contract reads
//! - [`ConfigError`] - Invalid configuration or RPC endpoint
//!
//! Staleness is never an error. A stale value comes back as `Ok` with
//! `stale = true` on the [`CachedRead`](crate::CachedRead).
//!
//! # Examples
//!
//! ```rust,ignore
//! use chaincache::{ReadCacheError, ReadKey};
//!
//! match cache.get(&key, ttl, fetch_supply).await {
//!     Ok(read) if read.stale => tracing::warn!(key = %key, "serving stale supply"),
//!     Ok(read) => println!("supply: {}", read.value),
//!     Err(ReadCacheError::FetchFailed { source, .. }) => eprintln!("no data yet: {source}"),
//!     Err(e) => eprintln!("rejected: {e}"),
//! }
//! ```

mod cache;
mod config;
mod contract;
mod upstream;

pub use cache::ReadCacheError;
pub use config::ConfigError;
pub use contract::ContractReadError;
pub use upstream::{BoxError, UpstreamError};

/// Unified error type for all chaincache operations.
///
/// All module-specific error types convert into `ChainCacheError` via `From`,
/// so `?` propagates them naturally.
#[derive(Debug, thiserror::Error)]
pub enum ChainCacheError {
    /// Error from a cache read.
    #[error("Read cache error: {0}")]
    Cache(#[from] ReadCacheError),

    /// Error from a typed contract read.
    #[error("Contract read error: {0}")]
    Contract(#[from] ContractReadError),

    /// Error from configuration loading or provider construction.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
