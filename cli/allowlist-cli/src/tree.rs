use tracing::debug;

use crate::common::{hash_pair, hex_encode, parse_hash32, Hash32};
use crate::error::{AllowlistError, Result};
use crate::verify::process_proof;

/// Inclusion proof for one leaf: sibling hashes ordered bottom to top.
///
/// Sides are implicit. Parents are built with [`hash_pair`], so a verifier
/// never needs to know whether a sibling sat on the left or the right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proof {
    pub leaf_index: usize,
    pub siblings: Vec<Hash32>,
}

impl Proof {
    pub fn len(&self) -> usize {
        self.siblings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.siblings.is_empty()
    }

    pub fn to_hex(&self) -> Vec<String> {
        self.siblings.iter().map(hex_encode).collect()
    }
}

/// Parses a list of hex strings into sibling hashes.
pub fn parse_proof<S: AsRef<str>>(items: &[S]) -> Result<Vec<Hash32>> {
    items.iter().map(|s| parse_hash32(s.as_ref())).collect()
}

/// Binary Merkle tree over an ordered list of leaves.
///
/// `levels[0]` holds the leaves in input order and the last level holds the
/// root. An unpaired last node is promoted to the next level unchanged, so a
/// level of `n` nodes produces `ceil(n / 2)` parents.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    levels: Vec<Vec<Hash32>>,
}

impl MerkleTree {
    /// Builds the tree bottom-up.
    ///
    /// # Errors
    /// Returns `EmptyInput` if `leaves` is empty
    pub fn build(leaves: Vec<Hash32>) -> Result<Self> {
        if leaves.is_empty() {
            return Err(AllowlistError::EmptyInput);
        }

        let mut levels: Vec<Vec<Hash32>> = vec![leaves];
        while let Some(level) = levels.last().filter(|level| level.len() > 1) {
            let next_level: Vec<Hash32> = level
                .chunks(2)
                .map(|chunk| match chunk {
                    [left, right] => hash_pair(left, right),
                    [single] => *single,
                    _ => unreachable!("chunks(2) yields one or two nodes"),
                })
                .collect();
            levels.push(next_level);
        }

        debug!(
            leaves = levels[0].len(),
            height = levels.len() - 1,
            "built merkle tree"
        );
        Ok(MerkleTree { levels })
    }

    pub fn root(&self) -> Hash32 {
        // `build` guarantees at least one non-empty level.
        self.levels[self.levels.len() - 1][0]
    }

    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    pub fn leaves(&self) -> &[Hash32] {
        &self.levels[0]
    }

    /// Number of levels above the leaves, `ceil(log2(leaf_count))`.
    pub fn height(&self) -> usize {
        self.levels.len() - 1
    }

    /// Generates a Merkle proof for the leaf at `leaf_index`.
    ///
    /// Walks every level below the root and records the sibling next to the
    /// current path node. A promoted node has no sibling and contributes
    /// nothing at that level.
    ///
    /// # Errors
    /// Returns `IndexOutOfRange` if the index is past the last leaf
    pub fn proof(&self, leaf_index: usize) -> Result<Proof> {
        let leaf_count = self.leaf_count();
        if leaf_index >= leaf_count {
            return Err(AllowlistError::IndexOutOfRange {
                index: leaf_index,
                leaf_count,
            });
        }

        Ok(self.proof_unchecked(leaf_index))
    }

    /// Proofs for every leaf, in leaf order.
    pub fn proofs(&self) -> Vec<Proof> {
        (0..self.leaf_count())
            .map(|i| self.proof_unchecked(i))
            .collect()
    }

    // `leaf_index` must be below `leaf_count()`.
    fn proof_unchecked(&self, leaf_index: usize) -> Proof {
        let mut siblings = Vec::with_capacity(self.height());
        let mut current_index = leaf_index;
        for level in &self.levels[..self.levels.len() - 1] {
            let sibling_index = if current_index % 2 == 0 {
                current_index + 1
            } else {
                current_index - 1
            };
            if let Some(sibling) = level.get(sibling_index) {
                siblings.push(*sibling);
            }
            current_index /= 2;
        }

        Proof {
            leaf_index,
            siblings,
        }
    }

    /// Exact number of siblings the proof for `leaf_index` carries.
    pub fn expected_proof_len(&self, leaf_index: usize) -> usize {
        let mut len = 0;
        let mut current_index = leaf_index;
        for level in &self.levels[..self.levels.len() - 1] {
            if (current_index ^ 1) < level.len() {
                len += 1;
            }
            current_index /= 2;
        }
        len
    }

    /// Checks a proof for a specific leaf index of this tree.
    ///
    /// # Errors
    /// Returns `IndexOutOfRange` for an unknown index and
    /// `ProofLengthMismatch` when the proof was generated against a tree of
    /// a different shape
    pub fn verify_index(&self, leaf_index: usize, siblings: &[Hash32]) -> Result<bool> {
        let leaf_count = self.leaf_count();
        let leaf = *self
            .levels[0]
            .get(leaf_index)
            .ok_or(AllowlistError::IndexOutOfRange {
                index: leaf_index,
                leaf_count,
            })?;
        let expected = self.expected_proof_len(leaf_index);
        if siblings.len() != expected {
            return Err(AllowlistError::ProofLengthMismatch {
                expected,
                actual: siblings.len(),
            });
        }
        Ok(process_proof(leaf, siblings) == self.root())
    }

    /// Re-verifies every proof against the root.
    ///
    /// A failure here means the construction itself is broken, not the input.
    pub fn self_check(&self) -> Result<()> {
        let root = self.root();
        for (index, leaf) in self.leaves().iter().enumerate() {
            let proof = self.proof(index)?;
            if process_proof(*leaf, &proof.siblings) != root {
                return Err(AllowlistError::SelfCheckFailed { index });
            }
        }
        Ok(())
    }

    /// Consumes the tree, keeping only the root and one proof per leaf.
    pub fn into_root_and_proofs(self) -> (Hash32, Vec<Proof>) {
        let proofs = self.proofs();
        (self.root(), proofs)
    }
}

/// Builds a tree and returns its root plus one proof per leaf.
///
/// # Errors
/// Returns `EmptyInput` if `leaves` is empty
pub fn build(leaves: Vec<Hash32>) -> Result<(Hash32, Vec<Proof>)> {
    Ok(MerkleTree::build(leaves)?.into_root_and_proofs())
}
