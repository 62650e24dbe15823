use std::fmt;

use crate::common::keccak256;
use crate::error::{AllowlistError, Result};

/// A validated 20-byte Ethereum account identifier.
///
/// Equality and hashing are over the raw bytes, so two inputs that differ
/// only in casing or surrounding whitespace are the same address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address([u8; 20]);

impl Address {
    /// Parses an Ethereum address from a hex string.
    ///
    /// Surrounding whitespace is trimmed and the `0x` prefix is optional.
    /// All-lowercase and all-uppercase bodies are accepted as-is; a body in
    /// mixed case must carry a valid EIP-55 checksum.
    ///
    /// # Errors
    /// Returns `InvalidAddress` if the input is not 40 hex characters or if a
    /// mixed-case body fails the checksum
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let cleaned = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        if cleaned.len() != 40 {
            return Err(AllowlistError::invalid_address(
                input,
                format!("expected 40 hex chars, got {}", cleaned.len()),
            ));
        }
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(cleaned, &mut bytes)
            .map_err(|e| AllowlistError::invalid_address(input, format!("invalid hex: {e}")))?;

        let has_lower = cleaned.bytes().any(|c| c.is_ascii_lowercase());
        let has_upper = cleaned.bytes().any(|c| c.is_ascii_uppercase());
        let address = Address(bytes);
        if has_lower && has_upper && address.checksum_body() != cleaned {
            return Err(AllowlistError::invalid_address(input, "bad EIP-55 checksum"));
        }
        Ok(address)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// EIP-55 mixed-case rendering, `0x`-prefixed.
    pub fn to_checksum(&self) -> String {
        format!("0x{}", self.checksum_body())
    }

    fn checksum_body(&self) -> String {
        let lower = hex::encode(self.0);
        let hash = keccak256(lower.as_bytes());
        lower
            .char_indices()
            .map(|(i, c)| {
                let nibble = if i % 2 == 0 {
                    hash[i / 2] >> 4
                } else {
                    hash[i / 2] & 0x0f
                };
                if c.is_ascii_alphabetic() && nibble >= 8 {
                    c.to_ascii_uppercase()
                } else {
                    c
                }
            })
            .collect()
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }
}

/// Canonical form: `0x` followed by 40 lowercase hex digits.
impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Trims, validates and lowercases an address string.
pub fn normalize_address(input: &str) -> Result<String> {
    Address::parse(input).map(|a| a.to_string())
}

/// Returns true if `input` would be accepted by [`Address::parse`].
pub fn is_valid_address(input: &str) -> bool {
    Address::parse(input).is_ok()
}
