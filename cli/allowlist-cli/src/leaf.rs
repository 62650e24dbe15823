use sha3::{Digest, Keccak256};

use crate::address::Address;
use crate::amount::TokenAmount;
use crate::common::Hash32;

/// How a recipient is turned into a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafEncoding {
    /// `keccak256(address)` over the 20 raw address bytes.
    Simple,
    /// `keccak256(abi.encodePacked(address, uint256 amount))`.
    Amount(TokenAmount),
}

/// Converts a validated address into a 32-byte Merkle leaf.
///
/// # Arguments
/// * `address` - Already-parsed address; casing is irrelevant at this point
/// * `encoding` - Whether the scaled amount is packed after the address
///
/// # Returns
/// 32-byte Merkle leaf
pub fn encode_leaf(address: &Address, encoding: &LeafEncoding) -> Hash32 {
    let mut hasher = Keccak256::new();
    hasher.update(address.as_bytes());
    if let LeafEncoding::Amount(amount) = encoding {
        hasher.update(amount.to_be_bytes());
    }
    hasher.finalize().into()
}
