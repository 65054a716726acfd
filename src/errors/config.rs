// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for configuration loading.

/// Errors raised while building a [`ReadCacheConfig`](crate::ReadCacheConfig)
/// or an RPC provider.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable held a value that could not be used.
    #[error("Invalid value {value:?} for {name}: {reason}")]
    InvalidValue {
        /// Variable name
        name: String,
        /// The raw value
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// The RPC URL could not be parsed.
    #[error("Invalid RPC URL {url:?}")]
    InvalidRpcUrl {
        /// The URL as given
        url: String,
        /// The parse error
        #[source]
        source: url::ParseError,
    },
}

impl ConfigError {
    /// Create an `InvalidValue` error.
    pub fn invalid_value(
        name: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ConfigError::InvalidValue {
            name: name.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}
