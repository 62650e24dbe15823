pub mod address;
pub mod allowlist;
pub mod amount;
pub mod cache;
pub mod common;
pub mod error;
pub mod leaf;
pub mod tree;
pub mod verify;

pub use address::{is_valid_address, normalize_address, Address};
pub use allowlist::{
    build_allowlist, filter_valid, normalize_recipients, Allowlist, BuildOptions,
    DistributionMode, Eligibility, NormalizedRecipient, Recipient, RecipientWithProof,
};
pub use amount::{TokenAmount, TOKEN_DECIMALS};
pub use cache::{cache_key, TreeCache};
pub use common::{hash_pair, hex_encode, keccak256, parse_hash32, write_file_atomic, Hash32};
pub use error::{AllowlistError, Result};
pub use leaf::{encode_leaf, LeafEncoding};
pub use tree::{build, parse_proof, MerkleTree, Proof};
pub use verify::{max_proof_len, process_proof, verify, verify_bounded, verify_leaf};
