// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Cache keys for upstream reads.
//!
//! A [`ReadKey`] names one cached query. Contract-call keys are canonical:
//! the same address, function and calldata always produce the same key, so
//! route handlers that build keys from query parameters share entries.

use std::fmt;
use std::sync::Arc;

use alloy_primitives::{hex, keccak256, Address};

use crate::errors::ReadCacheError;

/// Longest key accepted by [`ReadKey::new`], in bytes.
pub const MAX_KEY_LEN: usize = 256;

/// Number of leading keccak256 bytes of the calldata kept in contract-call keys.
const ARGS_DIGEST_BYTES: usize = 8;

/// Validated identifier of a cached query.
///
/// Cheap to clone; the key text is shared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReadKey(Arc<str>);

impl ReadKey {
    /// Creates a key from free-form text.
    ///
    /// # Errors
    ///
    /// Returns [`ReadCacheError::InvalidKeyOrArgs`] if the key is empty, longer
    /// than [`MAX_KEY_LEN`] bytes, or contains whitespace or control characters.
    pub fn new(key: impl AsRef<str>) -> Result<Self, ReadCacheError> {
        let key = key.as_ref();
        if key.is_empty() {
            return Err(ReadCacheError::invalid_key("key is empty"));
        }
        if key.len() > MAX_KEY_LEN {
            return Err(ReadCacheError::invalid_key(format!(
                "key is {} bytes, limit is {MAX_KEY_LEN}",
                key.len()
            )));
        }
        if let Some(c) = key.chars().find(|c| c.is_whitespace() || c.is_control()) {
            return Err(ReadCacheError::invalid_key(format!(
                "key contains disallowed character {c:?}"
            )));
        }
        Ok(Self(Arc::from(key)))
    }

    /// Creates the canonical key of a read-only contract call.
    ///
    /// The key is `<checksummed address>:<function>:<digest>` where `digest` is
    /// the hex of the first 8 bytes of `keccak256(calldata)`.
    ///
    /// # Errors
    ///
    /// Returns [`ReadCacheError::InvalidKeyOrArgs`] if `function` is not a
    /// Solidity identifier.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use alloy_primitives::address;
    /// use chaincache::ReadKey;
    ///
    /// let token = address!("0000000000000000000000000000000000000001");
    /// let a = ReadKey::contract_call(token, "totalSupply", &[0x18, 0x16, 0x0d, 0xdd]).unwrap();
    /// let b = ReadKey::contract_call(token, "totalSupply", &[0x18, 0x16, 0x0d, 0xdd]).unwrap();
    /// assert_eq!(a, b);
    /// assert!(a.as_str().starts_with("0x0000000000000000000000000000000000000001:totalSupply:"));
    /// ```
    pub fn contract_call(
        address: Address,
        function: &str,
        calldata: &[u8],
    ) -> Result<Self, ReadCacheError> {
        validate_function_name(function)?;
        let digest = keccak256(calldata);
        let key = format!(
            "{}:{function}:{}",
            address.to_checksum(None),
            hex::encode(&digest[..ARGS_DIGEST_BYTES])
        );
        Ok(Self(Arc::from(key)))
    }

    /// Builds a contract-call key from raw request parameters.
    ///
    /// `args_hex` is the ABI-encoded calldata, with or without a `0x` prefix.
    /// Returns the parsed address and calldata with the key so the caller can
    /// issue the call without parsing twice.
    ///
    /// # Errors
    ///
    /// Returns [`ReadCacheError::InvalidKeyOrArgs`] if the address, function
    /// name or hex arguments are malformed.
    pub fn parse_contract_call(
        address: &str,
        function: &str,
        args_hex: &str,
    ) -> Result<(Self, Address, Vec<u8>), ReadCacheError> {
        let parsed: Address = address.trim().parse().map_err(|e| {
            ReadCacheError::invalid_key(format!("contract address {address:?}: {e}"))
        })?;
        let calldata = hex::decode(args_hex.trim())
            .map_err(|e| ReadCacheError::invalid_key(format!("call arguments: {e}")))?;
        let key = Self::contract_call(parsed, function, &calldata)?;
        Ok((key, parsed, calldata))
    }

    /// Returns the key text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ReadKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for ReadKey {
    type Err = ReadCacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

fn validate_function_name(function: &str) -> Result<(), ReadCacheError> {
    let mut chars = function.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if valid_start && valid_rest {
        Ok(())
    } else {
        Err(ReadCacheError::invalid_key(format!(
            "function name {function:?} is not a Solidity identifier"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const TOKEN: Address = address!("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed");

    #[test]
    fn test_new_accepts_plain_keys() {
        let key = ReadKey::new("fees:platform").unwrap();
        assert_eq!(key.as_str(), "fees:platform");
        assert_eq!(key.to_string(), "fees:platform");
    }

    #[test]
    fn test_new_rejects_empty_and_whitespace() {
        assert!(matches!(
            ReadKey::new(""),
            Err(ReadCacheError::InvalidKeyOrArgs { .. })
        ));
        assert!(matches!(
            ReadKey::new("total supply"),
            Err(ReadCacheError::InvalidKeyOrArgs { .. })
        ));
        assert!(matches!(
            ReadKey::new("supply\n"),
            Err(ReadCacheError::InvalidKeyOrArgs { .. })
        ));
    }

    #[test]
    fn test_new_rejects_oversized_keys() {
        let long = "k".repeat(MAX_KEY_LEN + 1);
        assert!(ReadKey::new(&long).is_err());
        assert!(ReadKey::new(&long[..MAX_KEY_LEN]).is_ok());
    }

    #[test]
    fn test_contract_call_key_is_checksummed_and_stable() {
        let key = ReadKey::contract_call(TOKEN, "balanceOf", &[1, 2, 3]).unwrap();
        assert!(key
            .as_str()
            .starts_with("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed:balanceOf:"));
        let digest = key.as_str().rsplit(':').next().unwrap();
        assert_eq!(digest.len(), ARGS_DIGEST_BYTES * 2);
    }

    #[test]
    fn test_contract_call_key_differs_by_args() {
        let a = ReadKey::contract_call(TOKEN, "balanceOf", &[1]).unwrap();
        let b = ReadKey::contract_call(TOKEN, "balanceOf", &[2]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_contract_call_rejects_bad_function_names() {
        for bad in ["", "1supply", "total supply", "total-supply", "fn()"] {
            assert!(
                ReadKey::contract_call(TOKEN, bad, &[]).is_err(),
                "{bad:?} should be rejected"
            );
        }
        assert!(ReadKey::contract_call(TOKEN, "_fees$2", &[]).is_ok());
    }

    #[test]
    fn test_parse_contract_call_matches_typed_constructor() {
        let (key, address, calldata) = ReadKey::parse_contract_call(
            "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed",
            "totalSupply",
            "0x18160ddd",
        )
        .unwrap();
        assert_eq!(address, TOKEN);
        assert_eq!(calldata, vec![0x18, 0x16, 0x0d, 0xdd]);
        assert_eq!(
            key,
            ReadKey::contract_call(TOKEN, "totalSupply", &calldata).unwrap()
        );

        // Prefix is optional
        let (unprefixed, _, _) = ReadKey::parse_contract_call(
            "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed",
            "totalSupply",
            "18160ddd",
        )
        .unwrap();
        assert_eq!(unprefixed, key);
    }

    #[test]
    fn test_parse_contract_call_rejects_malformed_input() {
        let err = ReadKey::parse_contract_call("0x1234", "totalSupply", "").unwrap_err();
        assert!(matches!(err, ReadCacheError::InvalidKeyOrArgs { .. }));

        let err = ReadKey::parse_contract_call(
            "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed",
            "totalSupply",
            "0xzz",
        )
        .unwrap_err();
        assert!(matches!(err, ReadCacheError::InvalidKeyOrArgs { .. }));
        assert_eq!(err.status_code(), 400);
    }
}
