// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for cache reads.

use super::UpstreamError;
use crate::key::ReadKey;

/// Terminal errors of a single cache read.
///
/// Route handlers translate these with [`ReadCacheError::status_code`]:
/// a malformed request is a client error, a failed fetch with no cached data
/// is a gateway error.
#[derive(Debug, thiserror::Error)]
pub enum ReadCacheError {
    /// The upstream read failed and the key has never held a value.
    ///
    /// This is the only case where a read fails because of the upstream. The
    /// cache never substitutes a default value here.
    #[error("No cached value for {key} and the upstream read failed: {source}")]
    FetchFailed {
        /// The key that was being read
        key: ReadKey,
        /// Why the upstream read failed
        #[source]
        source: UpstreamError,
    },

    /// The caller supplied a malformed key or call arguments.
    ///
    /// Raised before any fetch attempt.
    #[error("Invalid key or arguments: {reason}")]
    InvalidKeyOrArgs {
        /// Description of what was malformed
        reason: String,
    },
}

impl ReadCacheError {
    /// Create an `InvalidKeyOrArgs` error with a reason.
    pub fn invalid_key(reason: impl Into<String>) -> Self {
        ReadCacheError::InvalidKeyOrArgs {
            reason: reason.into(),
        }
    }

    /// HTTP status a route handler should answer with.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            ReadCacheError::FetchFailed { .. } => 502,
            ReadCacheError::InvalidKeyOrArgs { .. } => 400,
        }
    }

    /// Short machine-readable error code for response bodies.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            ReadCacheError::FetchFailed { .. } => "fetch_failed",
            ReadCacheError::InvalidKeyOrArgs { .. } => "invalid_key_or_args",
        }
    }
}
