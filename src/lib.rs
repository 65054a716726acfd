// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Read-through caching for read-only blockchain calls.
//!
//! API routes that front smart-contract reads (token supply, fee schedules,
//! balances) share a single [`ReadCache`] instead of module-level
//! `cachedValue` / `lastUpdateTime` globals. The cache:
//!
//! - serves fresh values without touching the chain,
//! - refreshes stale values with exactly one upstream call per key, however
//!   many requests arrive meanwhile,
//! - keeps serving the last good value, flagged `stale`, while the upstream is
//!   failing,
//! - fails explicitly with [`ReadCacheError::FetchFailed`] when it has nothing
//!   to serve, instead of inventing a fallback value.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use chaincache::{
//!     http_provider, ContractReader, ErrorResponse, ReadCacheConfig, ReadResponse, TokenReads,
//! };
//!
//! let config = ReadCacheConfig::from_env()?;
//! let reader = ContractReader::new(http_provider(&rpc_url)?, config);
//! let token = TokenReads::new(reader, token_address);
//!
//! // In a route handler:
//! match token.total_supply().await {
//!     Ok(read) => (200, serde_json::to_string(&ReadResponse::from(read))?),
//!     Err(e) => (e.status_code(), serde_json::to_string(&ErrorResponse::from(&e))?),
//! }
//! ```

pub mod cache;
pub mod config;
pub mod contract;
pub mod errors;
pub mod key;
pub mod provider;
pub mod response;
mod spans;
pub mod token;

pub use cache::{CacheStats, CachedRead, EntryState, ReadCache};
pub use config::{ReadCacheConfig, ReadCacheConfigBuilder, RefreshMode};
pub use contract::ContractReader;
pub use errors::{
    BoxError, ChainCacheError, ConfigError, ContractReadError, ReadCacheError, UpstreamError,
};
pub use key::ReadKey;
pub use provider::{http_provider, HttpContractReader, HttpProvider};
pub use response::{ErrorResponse, ReadResponse};
pub use token::{FeeSchedule, TokenReads};
