// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! JSON bodies for API routes that serve cached reads
//!
//! Route handlers answer a successful read (fresh or stale) with a
//! [`ReadResponse`] and a 2xx status, and a failed read with an
//! [`ErrorResponse`] and the status from
//! [`ReadCacheError::status_code`](crate::ReadCacheError::status_code).
//!
//! ```json
//! { "result": "2100000000000000", "cached": true, "stale": true,
//!   "error": "Upstream read timed out after 10s",
//!   "lastUpdate": 1760745600000, "nextUpdate": 1760745660000 }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::CachedRead;
use crate::errors::{ContractReadError, ReadCacheError};

/// Body of a successful cached read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadResponse<T> {
    /// The value read
    pub result: T,
    /// Served from the cache rather than fetched for this request
    pub cached: bool,
    /// Past its TTL; omitted when false
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub stale: bool,
    /// Upstream failure behind a stale value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the value was fetched, Unix milliseconds
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_update: DateTime<Utc>,
    /// When the value stops being fresh, Unix milliseconds
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub next_update: DateTime<Utc>,
}

impl<T> From<CachedRead<T>> for ReadResponse<T> {
    fn from(read: CachedRead<T>) -> Self {
        Self {
            result: read.value,
            cached: read.cached,
            stale: read.stale,
            error: read.error.map(|e| e.to_string()),
            last_update: read.fetched_at,
            next_update: read.next_update,
        }
    }
}

/// Body of a failed read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable description
    pub error: String,
    /// Machine-readable code
    pub code: String,
}

impl From<&ReadCacheError> for ErrorResponse {
    fn from(err: &ReadCacheError) -> Self {
        Self {
            error: err.to_string(),
            code: err.code().to_string(),
        }
    }
}

impl From<&ContractReadError> for ErrorResponse {
    fn from(err: &ContractReadError) -> Self {
        match err {
            ContractReadError::Cache(e) => e.into(),
            ContractReadError::Decode { .. } => Self {
                error: err.to_string(),
                code: "decode_failed".to_string(),
            },
        }
    }
}
