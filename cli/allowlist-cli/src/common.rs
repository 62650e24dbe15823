use sha3::{Digest, Keccak256};
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::{AllowlistError, Result};

/// A 32-byte Keccak256 digest: leaves, interior nodes and roots.
pub type Hash32 = [u8; 32];

/// Computes the Keccak256 hash of arbitrary bytes.
pub fn keccak256(data: &[u8]) -> Hash32 {
    Keccak256::digest(data).into()
}

/// Combines two sibling hashes into their parent.
///
/// The pair is ordered by byte value before hashing, so the parent does not
/// depend on which child sat on the left. A Solidity verifier using
/// OpenZeppelin's `MerkleProof` applies the same rule.
///
/// # Arguments
/// * `a` - One child hash
/// * `b` - The other child hash
///
/// # Returns
/// `keccak256(min(a, b) || max(a, b))`
pub fn hash_pair(a: &Hash32, b: &Hash32) -> Hash32 {
    let (left, right) = if a <= b { (a, b) } else { (b, a) };
    let hash = Keccak256::new()
        .chain_update(left)
        .chain_update(right)
        .finalize();
    hash.into()
}

/// Renders bytes as a `0x`-prefixed lowercase hex string.
pub fn hex_encode(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parses a 32-byte hash from hex, with or without the `0x` prefix.
///
/// # Errors
/// Returns `InvalidHash` if the input is not exactly 64 hex characters
pub fn parse_hash32(input: &str) -> Result<Hash32> {
    let trimmed = input.trim();
    let cleaned = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let mut hash = [0u8; 32];
    hex::decode_to_slice(cleaned, &mut hash).map_err(|_| AllowlistError::InvalidHash {
        input: input.to_string(),
    })?;
    Ok(hash)
}

/// Writes `contents` to `path` through a sibling temp file and a rename, so
/// readers never observe a half-written file.
pub fn write_file_atomic(path: &Path, contents: &str) -> Result<()> {
    let temp_path = path.with_extension("tmp");
    let mut file = File::create(&temp_path)?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    file.sync_all()?;
    std::fs::rename(&temp_path, path)?;
    Ok(())
}
