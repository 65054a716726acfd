// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Cached reads of the platform token
//!
//! These are the reads the token API routes serve: supply, metadata, holder
//! balances and the buy/sell fee schedule. Each goes through the shared
//! [`ContractReader`] cache with the TTL configured for its function name.

use alloy_network::Network;
use alloy_primitives::{Address, U256};
use alloy_provider::Provider;
use alloy_sol_types::sol;
use serde::{Deserialize, Serialize};

use crate::cache::CachedRead;
use crate::contract::ContractReader;
use crate::errors::ContractReadError;

sol! {
    /// Read-only surface of the platform token contract
    interface IPlatformToken {
        function totalSupply() external view returns (uint256);
        function decimals() external view returns (uint8);
        function symbol() external view returns (string);
        function balanceOf(address account) external view returns (uint256);
        function getFees() external view returns (uint256 buyFeeBps, uint256 sellFeeBps);
    }
}

/// Buy and sell fees charged by the token, in basis points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeSchedule {
    /// Fee on buys
    pub buy_fee_bps: U256,
    /// Fee on sells
    pub sell_fee_bps: U256,
}

/// Cached reads of one token contract
#[derive(Debug, Clone)]
pub struct TokenReads<P, N> {
    reader: ContractReader<P, N>,
    token: Address,
}

impl<P, N> TokenReads<P, N>
where
    N: Network,
    P: Provider<N> + Clone + 'static,
{
    /// Reads `token` through `reader`
    pub fn new(reader: ContractReader<P, N>, token: Address) -> Self {
        Self { reader, token }
    }

    /// The token contract address
    pub fn token(&self) -> Address {
        self.token
    }

    /// The underlying contract reader
    pub fn reader(&self) -> &ContractReader<P, N> {
        &self.reader
    }

    /// Total token supply, raw (not adjusted for decimals)
    pub async fn total_supply(&self) -> Result<CachedRead<U256>, ContractReadError> {
        self.reader
            .call(self.token, &IPlatformToken::totalSupplyCall {})
            .await
    }

    /// Token decimals
    pub async fn decimals(&self) -> Result<CachedRead<u8>, ContractReadError> {
        self.reader
            .call(self.token, &IPlatformToken::decimalsCall {})
            .await
    }

    /// Token symbol
    pub async fn symbol(&self) -> Result<CachedRead<String>, ContractReadError> {
        self.reader
            .call(self.token, &IPlatformToken::symbolCall {})
            .await
    }

    /// Balance of `holder`, raw
    pub async fn balance_of(&self, holder: Address) -> Result<CachedRead<U256>, ContractReadError> {
        self.reader
            .call(
                self.token,
                &IPlatformToken::balanceOfCall { account: holder },
            )
            .await
    }

    /// Current buy/sell fee schedule
    pub async fn fees(&self) -> Result<CachedRead<FeeSchedule>, ContractReadError> {
        let read = self
            .reader
            .call(self.token, &IPlatformToken::getFeesCall {})
            .await?;
        Ok(read.map(|fees| FeeSchedule {
            buy_fee_bps: fees.buyFeeBps,
            sell_fee_bps: fees.sellFeeBps,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReadCacheConfig;
    use crate::errors::ReadCacheError;
    use alloy_network::Ethereum;
    use alloy_primitives::{address, Bytes};
    use alloy_provider::{ProviderBuilder, RootProvider};
    use alloy_sol_types::SolValue;
    use alloy_transport::mock::Asserter;

    const TOKEN: Address = address!("00000000000000000000000000000000000b7c01");
    const HOLDER: Address = address!("00000000000000000000000000000000000a11ce");

    fn token_reads(asserter: &Asserter) -> TokenReads<RootProvider, Ethereum> {
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .connect_mocked_client(asserter.clone());
        TokenReads::new(ContractReader::new(provider, ReadCacheConfig::default()), TOKEN)
    }

    #[tokio::test]
    async fn test_fees_decode_into_schedule() {
        let asserter = Asserter::new();
        asserter.push_success(&Bytes::from(
            (U256::from(300u64), U256::from(500u64)).abi_encode_params(),
        ));
        let reads = token_reads(&asserter);

        let fees = reads.fees().await.unwrap();
        assert_eq!(
            fees.value,
            FeeSchedule {
                buy_fee_bps: U256::from(300u64),
                sell_fee_bps: U256::from(500u64),
            }
        );
        assert!(!fees.cached);
    }

    #[tokio::test]
    async fn test_balances_are_cached_per_holder() {
        let asserter = Asserter::new();
        asserter.push_success(&Bytes::from(U256::from(10u64).abi_encode()));
        asserter.push_success(&Bytes::from(U256::from(20u64).abi_encode()));
        let reads = token_reads(&asserter);

        let alice = reads.balance_of(HOLDER).await.unwrap();
        let other = reads.balance_of(Address::ZERO).await.unwrap();
        let alice_again = reads.balance_of(HOLDER).await.unwrap();

        assert_eq!(alice.value, U256::from(10u64));
        assert_eq!(other.value, U256::from(20u64));
        assert_eq!(alice_again.value, U256::from(10u64));
        assert!(alice_again.cached);
        assert_eq!(reads.reader.cache().len(), 2);
    }

    #[tokio::test]
    async fn test_symbol_and_decimals() {
        let asserter = Asserter::new();
        asserter.push_success(&Bytes::from(String::from("BTCL").abi_encode()));
        asserter.push_success(&Bytes::from(<alloy_sol_types::sol_data::Uint<8> as alloy_sol_types::SolType>::abi_encode(&18u8)));
        let reads = token_reads(&asserter);

        assert_eq!(reads.symbol().await.unwrap().value, "BTCL");
        assert_eq!(reads.decimals().await.unwrap().value, 18);
    }

    #[tokio::test]
    async fn test_supply_without_upstream_is_explicit_error() {
        let asserter = Asserter::new();
        asserter.push_failure_msg("execution reverted");
        let reads = token_reads(&asserter);

        let err = reads.total_supply().await.unwrap_err();
        assert!(matches!(
            err,
            ContractReadError::Cache(ReadCacheError::FetchFailed { .. })
        ));
    }
}
