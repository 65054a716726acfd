// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP provider construction

use alloy_network::AnyNetwork;
use alloy_provider::ProviderBuilder;
use alloy_rpc_client::ClientBuilder;

use crate::contract::ContractReader;
use crate::errors::ConfigError;

/// HTTP provider usable with any EVM chain
pub type HttpProvider = alloy_provider::RootProvider<AnyNetwork>;

/// Contract reader over an [`HttpProvider`]
pub type HttpContractReader = ContractReader<HttpProvider, AnyNetwork>;

/// Create an HTTP provider for `rpc_url`
///
/// Recommended fillers are disabled: the provider only issues reads, and a
/// `RootProvider` is what [`ContractReader`] needs.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidRpcUrl`] if the URL cannot be parsed.
pub fn http_provider(rpc_url: &str) -> Result<HttpProvider, ConfigError> {
    let url: url::Url = rpc_url
        .trim()
        .parse()
        .map_err(|source| ConfigError::InvalidRpcUrl {
            url: rpc_url.to_string(),
            source,
        })?;

    let client = ClientBuilder::default().http(url);

    Ok(ProviderBuilder::new()
        .disable_recommended_fillers()
        .network::<AnyNetwork>()
        .connect_client(client))
}
