// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Upstream failure type shared by coalesced waiters.

use std::sync::Arc;
use std::time::Duration;

/// Boxed error accepted from fetchers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A single upstream read failed.
///
/// This error is `Clone` because one failed fetch is delivered to every caller
/// that was waiting on it. When the key already holds a value it is reported
/// alongside that stale value instead of being returned as an `Err`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UpstreamError {
    /// The fetcher returned an error (network failure, non-2xx, malformed response).
    #[error("Upstream unavailable: {source}")]
    Unavailable {
        /// The error returned by the fetcher
        #[source]
        source: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// The fetcher did not complete within the configured fetch timeout.
    #[error("Upstream read timed out after {timeout:?}")]
    TimedOut {
        /// The timeout that elapsed
        timeout: Duration,
    },

    /// The fetcher panicked. The panic is contained to the fetch task.
    #[error("Upstream read panicked: {message}")]
    Panicked {
        /// Panic payload, if it was a string
        message: String,
    },

    /// The fetch task was cancelled before completing (runtime shutdown).
    #[error("Upstream read was cancelled before completing")]
    Cancelled,
}

impl UpstreamError {
    /// Create an `Unavailable` error from anything a fetcher can fail with.
    pub fn unavailable(source: impl Into<BoxError>) -> Self {
        UpstreamError::Unavailable {
            source: Arc::from(source.into()),
        }
    }

    /// Create a `Panicked` error from a panic payload.
    pub(crate) fn panicked(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        UpstreamError::Panicked { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_keeps_source_message() {
        let err = UpstreamError::unavailable("connection refused");
        assert_eq!(err.to_string(), "Upstream unavailable: connection refused");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_panicked_extracts_str_and_string_payloads() {
        let err = UpstreamError::panicked(Box::new("boom"));
        assert!(matches!(err, UpstreamError::Panicked { ref message } if message == "boom"));

        let err = UpstreamError::panicked(Box::new(String::from("bang")));
        assert!(matches!(err, UpstreamError::Panicked { ref message } if message == "bang"));

        let err = UpstreamError::panicked(Box::new(42u8));
        assert!(
            matches!(err, UpstreamError::Panicked { ref message } if message == "non-string panic payload")
        );
    }

    #[test]
    fn test_clone_shares_source() {
        let err = UpstreamError::unavailable("rate limited");
        let cloned = err.clone();
        assert_eq!(err.to_string(), cloned.to_string());
    }
}
