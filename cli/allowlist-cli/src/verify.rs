use crate::address::Address;
use crate::amount::TokenAmount;
use crate::common::{hash_pair, Hash32};
use crate::error::{AllowlistError, Result};
use crate::leaf::{encode_leaf, LeafEncoding};

/// Folds a proof onto a leaf and returns the root it implies.
pub fn process_proof(leaf: Hash32, siblings: &[Hash32]) -> Hash32 {
    siblings
        .iter()
        .fold(leaf, |current, sibling| hash_pair(&current, sibling))
}

/// Returns true iff `siblings` lead from `leaf` to `root`.
pub fn verify_leaf(leaf: &Hash32, siblings: &[Hash32], root: &Hash32) -> bool {
    process_proof(*leaf, siblings) == *root
}

/// Upper bound on proof length for a tree of `leaf_count` leaves,
/// `ceil(log2(leaf_count))`.
pub fn max_proof_len(leaf_count: usize) -> usize {
    if leaf_count <= 1 {
        0
    } else {
        (usize::BITS - (leaf_count - 1).leading_zeros()) as usize
    }
}

/// Verifies that `address` (with `amount` in custom-distribution mode) is
/// committed to by `root`.
///
/// The address is trimmed and case-folded exactly as at build time. Pass
/// `amount: None` for trees built from simple address-only leaves.
///
/// # Returns
/// `Ok(false)` for a well-formed proof that does not reach `root`
///
/// # Errors
/// Returns `InvalidAddress` or `InvalidAmount` for malformed inputs only
pub fn verify(
    address: &str,
    amount: Option<&str>,
    siblings: &[Hash32],
    root: &Hash32,
) -> Result<bool> {
    let address = Address::parse(address)?;
    let encoding = match amount {
        Some(amount) => LeafEncoding::Amount(TokenAmount::parse(amount)?),
        None => LeafEncoding::Simple,
    };
    let leaf = encode_leaf(&address, &encoding);
    Ok(verify_leaf(&leaf, siblings, root))
}

/// Like [`verify`], but first rejects proofs longer than any tree of
/// `leaf_count` leaves can produce.
///
/// # Errors
/// Returns `ProofLengthMismatch` for an over-long proof, typically one
/// generated against a different, larger tree
pub fn verify_bounded(
    address: &str,
    amount: Option<&str>,
    siblings: &[Hash32],
    root: &Hash32,
    leaf_count: usize,
) -> Result<bool> {
    let expected = max_proof_len(leaf_count);
    if siblings.len() > expected {
        return Err(AllowlistError::ProofLengthMismatch {
            expected,
            actual: siblings.len(),
        });
    }
    verify(address, amount, siblings, root)
}
