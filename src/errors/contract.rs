// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for typed contract reads.

use super::ReadCacheError;

/// Errors from [`ContractReader`](crate::ContractReader) reads.
#[derive(Debug, thiserror::Error)]
pub enum ContractReadError {
    /// The underlying cache read failed.
    #[error(transparent)]
    Cache(#[from] ReadCacheError),

    /// The cached return data could not be decoded as the requested call's return type.
    #[error("Failed to decode return data of {function}")]
    Decode {
        /// Solidity signature of the call
        function: &'static str,
        /// The ABI decoding error
        #[source]
        source: alloy_sol_types::Error,
    },
}

impl ContractReadError {
    /// Create a `Decode` error for a call signature.
    pub fn decode(function: &'static str, source: alloy_sol_types::Error) -> Self {
        ContractReadError::Decode { function, source }
    }

    /// HTTP status a route handler should answer with.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            ContractReadError::Cache(e) => e.status_code(),
            ContractReadError::Decode { .. } => 502,
        }
    }
}
