// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Configuration for cached upstream reads
//!
//! Controls how long values stay fresh, how long an upstream read may take,
//! and whether stale values are refreshed inline or in the background.
//!
//! # Example: Using defaults
//!
//! ```rust
//! use chaincache::ReadCacheConfig;
//!
//! // 60s TTL, 10s fetch timeout, inline refresh
//! let config = ReadCacheConfig::default();
//! ```
//!
//! # Example: Custom configuration
//!
//! ```rust
//! use chaincache::{ReadCacheConfigBuilder, RefreshMode};
//! use std::time::Duration;
//!
//! let config = ReadCacheConfigBuilder::with_defaults()
//!     .default_ttl(Duration::from_secs(30))
//!     .ttl_override("decimals", Duration::from_secs(86_400))
//!     .refresh_mode(RefreshMode::Background)
//!     .build();
//!
//! assert_eq!(config.ttl_for("decimals"), Duration::from_secs(86_400));
//! assert_eq!(config.ttl_for("totalSupply"), Duration::from_secs(30));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::ConfigError;

pub mod constants;

use constants::{env, DEFAULT_FETCH_TIMEOUT, DEFAULT_TTL};

/// How a read of a stale entry is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshMode {
    /// The caller waits for the refresh and gets the new value, or the stale
    /// value if the refresh fails.
    #[default]
    Inline,
    /// The caller gets the stale value immediately while the refresh runs in
    /// the background. Empty entries still wait for their first fetch.
    Background,
}

impl fmt::Display for RefreshMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshMode::Inline => f.write_str("inline"),
            RefreshMode::Background => f.write_str("background"),
        }
    }
}

impl FromStr for RefreshMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inline" => Ok(RefreshMode::Inline),
            "background" => Ok(RefreshMode::Background),
            _ => Err(ConfigError::invalid_value(
                env::REFRESH_MODE,
                s,
                "expected `inline` or `background`",
            )),
        }
    }
}

/// Configuration for a [`ReadCache`](crate::ReadCache) and the readers built on it
///
/// Use [`ReadCacheConfigBuilder`] for a fluent API to construct instances.
#[derive(Debug, Clone)]
pub struct ReadCacheConfig {
    /// TTL used when no per-function override applies
    /// Default: 60 seconds
    pub default_ttl: Duration,

    /// Upper bound on a single upstream read
    /// Default: 10 seconds. `None` lets reads run unbounded.
    pub fetch_timeout: Option<Duration>,

    /// How stale entries are refreshed
    /// Default: [`RefreshMode::Inline`]
    pub refresh_mode: RefreshMode,

    /// Per-function TTL overrides, keyed by Solidity function name
    pub ttl_overrides: HashMap<String, Duration>,
}

impl Default for ReadCacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TTL,
            fetch_timeout: Some(DEFAULT_FETCH_TIMEOUT),
            refresh_mode: RefreshMode::Inline,
            ttl_overrides: HashMap::new(),
        }
    }
}

impl ReadCacheConfig {
    /// Load configuration from the process environment.
    ///
    /// Unset variables keep their defaults. See [`constants::env`] for the
    /// variable names.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a variable is set but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_lookup(|name| vars.get(name).cloned(), vars.keys().map(String::as_str))
    }

    /// Load configuration through a variable lookup function.
    ///
    /// `names` lists the variable names available, used to discover
    /// per-function TTL overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a variable is set but malformed.
    pub fn from_lookup<'a, F>(
        lookup: F,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(env::TTL_SECS) {
            config.default_ttl = Duration::from_secs(parse_u64(env::TTL_SECS, &raw)?);
        }

        if let Some(raw) = lookup(env::FETCH_TIMEOUT_MS) {
            config.fetch_timeout = match parse_u64(env::FETCH_TIMEOUT_MS, &raw)? {
                0 => None,
                ms => Some(Duration::from_millis(ms)),
            };
        }

        if let Some(raw) = lookup(env::REFRESH_MODE) {
            config.refresh_mode = raw.parse()?;
        }

        for name in names {
            let Some(function) = name.strip_prefix(env::TTL_OVERRIDE_PREFIX) else {
                continue;
            };
            // The prefix also matches CHAINCACHE_TTL_SECS itself
            if name == env::TTL_SECS || function.is_empty() {
                continue;
            }
            if let Some(raw) = lookup(name) {
                let secs = parse_u64(name, &raw)?;
                config
                    .ttl_overrides
                    .insert(function.to_ascii_lowercase(), Duration::from_secs(secs));
            }
        }

        tracing::debug!(
            default_ttl = ?config.default_ttl,
            fetch_timeout = ?config.fetch_timeout,
            refresh_mode = %config.refresh_mode,
            overrides = config.ttl_overrides.len(),
            "Loaded read cache configuration"
        );

        Ok(config)
    }

    /// Get the effective TTL for a contract function
    ///
    /// Returns the function-specific override if set, otherwise the default TTL.
    /// Function names match case-insensitively so environment overrides
    /// (which are upper case) apply to camelCase Solidity names.
    pub fn ttl_for(&self, function: &str) -> Duration {
        self.ttl_overrides
            .get(&function.to_ascii_lowercase())
            .copied()
            .unwrap_or(self.default_ttl)
    }

    /// Set a function-specific TTL
    pub fn set_ttl_override(&mut self, function: impl AsRef<str>, ttl: Duration) {
        self.ttl_overrides
            .insert(function.as_ref().to_ascii_lowercase(), ttl);
    }
}

fn parse_u64(name: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|e: std::num::ParseIntError| ConfigError::invalid_value(name, raw, e.to_string()))
}

/// Builder for [`ReadCacheConfig`]
///
/// # Example
///
/// ```rust
/// use chaincache::ReadCacheConfigBuilder;
/// use std::time::Duration;
///
/// let config = ReadCacheConfigBuilder::new()
///     .default_ttl(Duration::from_secs(15))
///     .no_fetch_timeout()
///     .build();
///
/// assert!(config.fetch_timeout.is_none());
/// ```
#[derive(Debug, Default)]
pub struct ReadCacheConfigBuilder {
    config: ReadCacheConfig,
}

impl ReadCacheConfigBuilder {
    /// Create a new builder starting from [`ReadCacheConfig::default`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration, e.g. one loaded from the environment
    pub fn from_config(config: ReadCacheConfig) -> Self {
        Self { config }
    }

    /// Start with the defaults. Alias of [`ReadCacheConfigBuilder::new`].
    pub fn with_defaults() -> Self {
        Self::new()
    }

    /// Set the default TTL
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.config.default_ttl = ttl;
        self
    }

    /// Bound every upstream read by `timeout`
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.config.fetch_timeout = Some(timeout);
        self
    }

    /// Let upstream reads run unbounded
    pub fn no_fetch_timeout(mut self) -> Self {
        self.config.fetch_timeout = None;
        self
    }

    /// Set the refresh mode
    pub fn refresh_mode(mut self, mode: RefreshMode) -> Self {
        self.config.refresh_mode = mode;
        self
    }

    /// Add a function-specific TTL
    pub fn ttl_override(mut self, function: impl AsRef<str>, ttl: Duration) -> Self {
        self.config.set_ttl_override(function, ttl);
        self
    }

    /// Build the final configuration
    pub fn build(self) -> ReadCacheConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> Result<ReadCacheConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ReadCacheConfig::from_lookup(|name| vars.get(name).cloned(), vars.keys().map(String::as_str))
    }

    #[test]
    fn test_default_config() {
        let config = ReadCacheConfig::default();
        assert_eq!(config.default_ttl, Duration::from_secs(60));
        assert_eq!(config.fetch_timeout, Some(Duration::from_secs(10)));
        assert_eq!(config.refresh_mode, RefreshMode::Inline);
        assert!(config.ttl_overrides.is_empty());
    }

    #[test]
    fn test_builder_overrides() {
        let config = ReadCacheConfigBuilder::new()
            .default_ttl(Duration::from_secs(5))
            .fetch_timeout(Duration::from_millis(750))
            .refresh_mode(RefreshMode::Background)
            .ttl_override("symbol", Duration::from_secs(3600))
            .build();

        assert_eq!(config.default_ttl, Duration::from_secs(5));
        assert_eq!(config.fetch_timeout, Some(Duration::from_millis(750)));
        assert_eq!(config.refresh_mode, RefreshMode::Background);
        assert_eq!(config.ttl_for("symbol"), Duration::from_secs(3600));
        assert_eq!(config.ttl_for("totalSupply"), Duration::from_secs(5));
    }

    #[test]
    fn test_ttl_override_is_case_insensitive() {
        let mut config = ReadCacheConfig::default();
        config.set_ttl_override("totalSupply", Duration::from_secs(120));
        assert_eq!(config.ttl_for("TOTALSUPPLY"), Duration::from_secs(120));
        assert_eq!(config.ttl_for("totalsupply"), Duration::from_secs(120));
    }

    #[test]
    fn test_from_lookup_empty_uses_defaults() {
        let config = lookup_from(&[]).unwrap();
        assert_eq!(config.default_ttl, DEFAULT_TTL);
        assert_eq!(config.fetch_timeout, Some(DEFAULT_FETCH_TIMEOUT));
    }

    #[test]
    fn test_from_lookup_reads_all_variables() {
        let config = lookup_from(&[
            ("CHAINCACHE_TTL_SECS", "30"),
            ("CHAINCACHE_FETCH_TIMEOUT_MS", "2500"),
            ("CHAINCACHE_REFRESH_MODE", "Background"),
            ("CHAINCACHE_TTL_DECIMALS", "86400"),
            ("UNRELATED", "x"),
        ])
        .unwrap();

        assert_eq!(config.default_ttl, Duration::from_secs(30));
        assert_eq!(config.fetch_timeout, Some(Duration::from_millis(2500)));
        assert_eq!(config.refresh_mode, RefreshMode::Background);
        assert_eq!(config.ttl_for("decimals"), Duration::from_secs(86400));
        assert_eq!(config.ttl_overrides.len(), 1);
    }

    #[test]
    fn test_from_lookup_zero_timeout_disables_it() {
        let config = lookup_from(&[("CHAINCACHE_FETCH_TIMEOUT_MS", "0")]).unwrap();
        assert!(config.fetch_timeout.is_none());
    }

    #[test]
    fn test_from_lookup_rejects_malformed_values() {
        let err = lookup_from(&[("CHAINCACHE_TTL_SECS", "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref name, .. } if name == "CHAINCACHE_TTL_SECS"));

        let err = lookup_from(&[("CHAINCACHE_REFRESH_MODE", "lazy")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let err = lookup_from(&[("CHAINCACHE_TTL_FEES", "-1")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref name, .. } if name == "CHAINCACHE_TTL_FEES"));
    }
}
