// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Cached read-only contract calls
//!
//! [`ContractReader`] puts a [`ReadCache`] in front of `eth_call`. Return data
//! is cached raw and decoded per read, so one reader serves every call type.
//! The fetcher decodes the return data before it is cached: a response that
//! does not decode counts as an upstream failure and never replaces a good
//! value.
//!
//! # Example
//!
//! ```rust,ignore
//! use chaincache::{ContractReader, ReadCacheConfig};
//! use alloy_sol_types::sol;
//!
//! sol! {
//!     function totalSupply() external view returns (uint256);
//! }
//!
//! let reader = ContractReader::new(provider, ReadCacheConfig::default());
//! let supply = reader.call(token, &totalSupplyCall {}).await?;
//! println!("supply={} cached={} stale={}", supply.value, supply.cached, supply.stale);
//! ```

use std::marker::PhantomData;
use std::time::Duration;

use alloy_network::{Network, TransactionBuilder};
use alloy_primitives::{Address, Bytes};
use alloy_provider::Provider;
use alloy_sol_types::SolCall;
use tracing::Instrument;

use crate::cache::{CachedRead, ReadCache};
use crate::config::ReadCacheConfig;
use crate::errors::{BoxError, ContractReadError, ReadCacheError};
use crate::key::ReadKey;
use crate::spans;

/// Cached `eth_call` reader over an alloy provider
///
/// Clones share the provider handle and the cache.
pub struct ContractReader<P, N> {
    provider: P,
    cache: ReadCache<Bytes>,
    _network: PhantomData<fn() -> N>,
}

impl<P: Clone, N> Clone for ContractReader<P, N> {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
            cache: self.cache.clone(),
            _network: PhantomData,
        }
    }
}

impl<P, N> std::fmt::Debug for ContractReader<P, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractReader")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl<P, N> ContractReader<P, N>
where
    N: Network,
    P: Provider<N> + Clone + 'static,
{
    /// Creates a reader with its own cache
    pub fn new(provider: P, config: ReadCacheConfig) -> Self {
        Self::with_cache(provider, ReadCache::with_config(config))
    }

    /// Creates a reader over an existing cache, e.g. one shared with other readers
    pub fn with_cache(provider: P, cache: ReadCache<Bytes>) -> Self {
        Self {
            provider,
            cache,
            _network: PhantomData,
        }
    }

    /// The cache behind this reader
    pub fn cache(&self) -> &ReadCache<Bytes> {
        &self.cache
    }

    /// Performs a cached `eth_call` with raw calldata
    ///
    /// `function` names the call in the cache key; calls with the same address,
    /// function and calldata share one entry.
    ///
    /// # Errors
    ///
    /// Returns [`ReadCacheError::InvalidKeyOrArgs`] if `function` is not a
    /// Solidity identifier, and [`ReadCacheError::FetchFailed`] if the call
    /// fails and nothing is cached for it.
    pub async fn call_raw(
        &self,
        address: Address,
        function: &str,
        calldata: Bytes,
        ttl: Duration,
    ) -> Result<CachedRead<Bytes>, ReadCacheError> {
        let key = ReadKey::contract_call(address, function, &calldata)?;
        let provider = self.provider.clone();
        self.cache
            .get(&key, ttl, move || async move {
                let tx = N::TransactionRequest::default()
                    .with_to(address)
                    .with_input(calldata);
                provider.call(tx).await
            })
            .await
    }

    /// Performs a cached, typed contract call
    ///
    /// The TTL is [`ReadCacheConfig::ttl_for`] the call's function name.
    ///
    /// # Errors
    ///
    /// Returns [`ContractReadError::Cache`] if the read failed with nothing
    /// cached, and [`ContractReadError::Decode`] if cached return data does not
    /// decode as `C::Return`.
    pub async fn call<C>(
        &self,
        address: Address,
        call: &C,
    ) -> Result<CachedRead<C::Return>, ContractReadError>
    where
        C: SolCall + 'static,
    {
        let function = function_name(C::SIGNATURE);
        let ttl = self.cache.config().ttl_for(function);
        let calldata = Bytes::from(call.abi_encode());
        let key = ReadKey::contract_call(address, function, &calldata)?;
        let provider = self.provider.clone();

        let read = self
            .cache
            .get(&key, ttl, move || async move {
                let tx = N::TransactionRequest::default()
                    .with_to(address)
                    .with_input(calldata);
                let data = provider.call(tx).await?;
                C::abi_decode_returns(&data)?;
                Ok::<_, BoxError>(data)
            })
            .instrument(spans::contract_call(address, C::SIGNATURE))
            .await?;

        read.try_map(|data| C::abi_decode_returns(&data))
            .map_err(|e| ContractReadError::decode(C::SIGNATURE, e))
    }
}

/// `totalSupply()` -> `totalSupply`
fn function_name(signature: &'static str) -> &'static str {
    signature.split('(').next().unwrap_or(signature)
}
