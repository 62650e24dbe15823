use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::address::{is_valid_address, Address};
use crate::amount::TokenAmount;
use crate::common::{hex_encode, parse_hash32, write_file_atomic, Hash32};
use crate::error::{AllowlistError, Result};
use crate::leaf::{encode_leaf, LeafEncoding};
use crate::tree::{parse_proof, MerkleTree};
use crate::verify::verify;

/// One row of the recipient list, as parsed from user input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
}

impl Recipient {
    pub fn new(address: impl Into<String>) -> Self {
        Recipient {
            address: address.into(),
            amount: None,
        }
    }

    pub fn with_amount(address: impl Into<String>, amount: impl Into<String>) -> Self {
        Recipient {
            address: address.into(),
            amount: Some(amount.into()),
        }
    }
}

/// Whether amounts are hashed into the leaves.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DistributionMode {
    /// Every recipient may claim the same amount; leaves hash the address only.
    #[default]
    Equal,
    /// Per-recipient amounts; rows without one fall back to `default_amount`.
    Custom { default_amount: String },
}

impl DistributionMode {
    pub fn custom() -> Self {
        DistributionMode::Custom {
            default_amount: "0".to_string(),
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, DistributionMode::Custom { .. })
    }

    /// The amount that ends up in the leaf, if any.
    pub fn effective_amount<'a>(&'a self, amount: Option<&'a str>) -> Option<&'a str> {
        match self {
            DistributionMode::Equal => None,
            DistributionMode::Custom { default_amount } => Some(
                amount
                    .filter(|a| !a.trim().is_empty())
                    .unwrap_or(default_amount.as_str()),
            ),
        }
    }

    fn leaf_encoding(&self, amount: Option<&str>) -> Result<LeafEncoding> {
        match self.effective_amount(amount) {
            Some(amount) => Ok(LeafEncoding::Amount(TokenAmount::parse(amount)?)),
            None => Ok(LeafEncoding::Simple),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub mode: DistributionMode,
    /// Re-verify every emitted proof against the root before returning.
    pub self_check: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            mode: DistributionMode::Equal,
            self_check: true,
        }
    }
}

/// A recipient after validation: canonical address, effective amount and leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecipient {
    pub address: Address,
    pub amount: Option<String>,
    pub leaf: Hash32,
}

/// Validates and hashes every recipient, preserving input order.
///
/// # Errors
/// Returns `InvalidAddress` or `InvalidAmount` naming the first bad row
pub fn normalize_recipients(
    recipients: &[Recipient],
    mode: &DistributionMode,
) -> Result<Vec<NormalizedRecipient>> {
    recipients
        .iter()
        .enumerate()
        .map(|(i, recipient)| {
            let address = Address::parse(&recipient.address).map_err(|e| at_row(e, i))?;
            let encoding = mode
                .leaf_encoding(recipient.amount.as_deref())
                .map_err(|e| at_row(e, i))?;
            let amount = match mode {
                DistributionMode::Equal => recipient.amount.clone(),
                DistributionMode::Custom { .. } => mode
                    .effective_amount(recipient.amount.as_deref())
                    .map(|a| a.trim().to_string()),
            };
            Ok(NormalizedRecipient {
                address,
                amount,
                leaf: encode_leaf(&address, &encoding),
            })
        })
        .collect()
}

fn at_row(err: AllowlistError, index: usize) -> AllowlistError {
    match err {
        AllowlistError::InvalidAddress { input, reason } => AllowlistError::InvalidAddress {
            input,
            reason: format!("row {}: {}", index + 1, reason),
        },
        AllowlistError::InvalidAmount { input, reason } => AllowlistError::InvalidAmount {
            input,
            reason: format!("row {}: {}", index + 1, reason),
        },
        other => other,
    }
}

/// Drops rows whose address is missing or invalid, logging each one.
pub fn filter_valid(recipients: Vec<Recipient>) -> Vec<Recipient> {
    recipients
        .into_iter()
        .filter(|recipient| {
            let valid = is_valid_address(&recipient.address);
            if !valid {
                warn!(address = %recipient.address.trim(), "invalid address skipped");
            }
            valid
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientWithProof {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    pub leaf_index: usize,
    pub proof: Vec<String>,
}

/// The published result of a build: root, proofs and the recipients behind
/// them. This is the JSON document handed to a claim UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allowlist {
    pub root: String,
    pub mode: DistributionMode,
    pub leaf_count: usize,
    pub height: usize,
    pub proofs: BTreeMap<String, Vec<String>>,
    pub recipients: Vec<RecipientWithProof>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eligibility {
    pub eligible: bool,
    pub proof: Option<Vec<String>>,
}

/// Builds the allowlist for an ordered recipient list.
///
/// # Errors
/// Returns `EmptyInput` for an empty list, `InvalidAddress`/`InvalidAmount`
/// for a bad row and `SelfCheckFailed` if an emitted proof does not verify
pub fn build_allowlist(recipients: &[Recipient], options: &BuildOptions) -> Result<Allowlist> {
    let normalized = normalize_recipients(recipients, &options.mode)?;
    build_from_normalized(&normalized, options)
}

pub(crate) fn build_from_normalized(
    normalized: &[NormalizedRecipient],
    options: &BuildOptions,
) -> Result<Allowlist> {
    let tree = MerkleTree::build(normalized.iter().map(|r| r.leaf).collect())?;
    if options.self_check {
        tree.self_check()?;
    }

    let mut first_index: HashMap<Hash32, usize> = HashMap::with_capacity(normalized.len());
    for (i, leaf) in tree.leaves().iter().enumerate() {
        first_index.entry(*leaf).or_insert(i);
    }

    let mut proofs = BTreeMap::new();
    let mut with_proofs = Vec::with_capacity(normalized.len());
    for (i, recipient) in normalized.iter().enumerate() {
        let leaf_index = first_index.get(&recipient.leaf).copied().unwrap_or(i);
        let proof = tree.proof(leaf_index)?.to_hex();
        let address = recipient.address.to_string();
        debug!(
            index = i,
            address = %address,
            leaf = %hex_encode(recipient.leaf),
            "encoded leaf"
        );
        if proofs.insert(address.clone(), proof.clone()).is_some() {
            warn!(address = %address, "duplicate address; keeping the later entry");
        }
        with_proofs.push(RecipientWithProof {
            address,
            amount: recipient.amount.clone(),
            leaf_index,
            proof,
        });
    }

    let root = hex_encode(tree.root());
    info!(
        root = %root,
        leaves = tree.leaf_count(),
        height = tree.height(),
        "built allowlist"
    );
    Ok(Allowlist {
        root,
        mode: options.mode.clone(),
        leaf_count: tree.leaf_count(),
        height: tree.height(),
        proofs,
        recipients: with_proofs,
    })
}

impl Allowlist {
    pub fn root_hash(&self) -> Result<Hash32> {
        parse_hash32(&self.root)
    }

    /// Looks a recipient up by address, in any casing.
    pub fn get(&self, address: &str) -> Result<Option<&RecipientWithProof>> {
        let normalized = Address::parse(address)?.to_string();
        Ok(self.recipients.iter().find(|r| r.address == normalized))
    }

    /// Checks whether `address` may claim, re-verifying its stored proof.
    ///
    /// # Errors
    /// Returns `InvalidAddress` for a malformed address and `InvalidHash` if
    /// the stored root or proof is not valid hex
    pub fn eligibility(&self, address: &str) -> Result<Eligibility> {
        let Some(recipient) = self.get(address)? else {
            return Ok(Eligibility {
                eligible: false,
                proof: None,
            });
        };
        let amount = if self.mode.is_custom() {
            recipient.amount.as_deref()
        } else {
            None
        };
        let siblings = parse_proof(&recipient.proof)?;
        let eligible = verify(address, amount, &siblings, &self.root_hash()?)?;
        Ok(Eligibility {
            eligible,
            proof: eligible.then(|| recipient.proof.clone()),
        })
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn write_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        write_file_atomic(path, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
    const B: &str = "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359";
    const C: &str = "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB";

    fn custom(default_amount: &str) -> BuildOptions {
        BuildOptions {
            mode: DistributionMode::Custom {
                default_amount: default_amount.to_string(),
            },
            self_check: true,
        }
    }

    #[test]
    fn test_build_equal_distribution() {
        let recipients = vec![Recipient::new(A), Recipient::new(B), Recipient::new(C)];
        let allowlist = build_allowlist(&recipients, &BuildOptions::default()).unwrap();
        assert_eq!(allowlist.leaf_count, 3);
        assert_eq!(allowlist.height, 2);
        assert!(allowlist.root.starts_with("0x"));
        assert_eq!(allowlist.root.len(), 66);
        assert!(allowlist.proofs.contains_key(&A.to_lowercase()));
        for address in [A, B, C] {
            assert!(allowlist.eligibility(address).unwrap().eligible);
        }
    }

    #[test]
    fn test_build_empty_fails() {
        assert!(matches!(
            build_allowlist(&[], &BuildOptions::default()),
            Err(AllowlistError::EmptyInput)
        ));
    }

    #[test]
    fn test_build_reports_bad_row() {
        let recipients = vec![Recipient::new(A), Recipient::new("0xnotanaddress")];
        let err = build_allowlist(&recipients, &BuildOptions::default()).unwrap_err();
        match err {
            AllowlistError::InvalidAddress { reason, .. } => assert!(reason.starts_with("row 2")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_custom_mode_uses_default_amount() {
        let recipients = vec![Recipient::with_amount(A, "10"), Recipient::new(B)];
        let allowlist = build_allowlist(&recipients, &custom("5")).unwrap();
        assert_eq!(allowlist.recipients[0].amount.as_deref(), Some("10"));
        assert_eq!(allowlist.recipients[1].amount.as_deref(), Some("5"));

        let root = allowlist.root_hash().unwrap();
        let proof_b = parse_proof(&allowlist.recipients[1].proof).unwrap();
        assert!(verify(B, Some("5"), &proof_b, &root).unwrap());
        assert!(!verify(B, Some("10"), &proof_b, &root).unwrap());
        assert!(!verify(B, None, &proof_b, &root).unwrap());
    }

    #[test]
    fn test_custom_mode_rejects_bad_amount() {
        let recipients = vec![Recipient::with_amount(A, "ten")];
        assert!(matches!(
            build_allowlist(&recipients, &custom("0")),
            Err(AllowlistError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_equal_mode_ignores_amounts_in_leaves() {
        let with = vec![Recipient::with_amount(A, "10"), Recipient::new(B)];
        let without = vec![Recipient::new(A), Recipient::new(B)];
        let options = BuildOptions::default();
        assert_eq!(
            build_allowlist(&with, &options).unwrap().root,
            build_allowlist(&without, &options).unwrap().root
        );
    }

    #[test]
    fn test_mixed_casing_builds_same_root() {
        let options = BuildOptions::default();
        let a = build_allowlist(&[Recipient::new(A), Recipient::new(B)], &options).unwrap();
        let b = build_allowlist(
            &[
                Recipient::new(format!(" {} ", A.to_lowercase())),
                Recipient::new(B.to_lowercase()),
            ],
            &options,
        )
        .unwrap();
        assert_eq!(a.root, b.root);
        assert_eq!(a.proofs, b.proofs);
    }

    #[test]
    fn test_duplicate_address_shares_first_proof() {
        let recipients = vec![Recipient::new(A), Recipient::new(B), Recipient::new(A)];
        let allowlist = build_allowlist(&recipients, &BuildOptions::default()).unwrap();
        assert_eq!(allowlist.recipients[2].leaf_index, 0);
        assert_eq!(allowlist.recipients[2].proof, allowlist.recipients[0].proof);
        assert_eq!(allowlist.proofs.len(), 2);
    }

    #[test]
    fn test_eligibility_for_unknown_address() {
        let allowlist =
            build_allowlist(&[Recipient::new(A), Recipient::new(B)], &BuildOptions::default())
                .unwrap();
        let result = allowlist.eligibility(C).unwrap();
        assert!(!result.eligible);
        assert!(result.proof.is_none());
        assert!(allowlist.eligibility("0x12").is_err());
    }

    #[test]
    fn test_filter_valid_skips_bad_rows() {
        let rows = vec![
            Recipient::new(A),
            Recipient::new(""),
            Recipient::new("0x1234"),
            Recipient::new("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAeD"),
            Recipient::new(B),
        ];
        let valid = filter_valid(rows);
        assert_eq!(valid, vec![Recipient::new(A), Recipient::new(B)]);
    }

    #[test]
    fn test_json_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("allowlist.json");
        let allowlist = build_allowlist(
            &[Recipient::with_amount(A, "1.5"), Recipient::new(B)],
            &custom("1"),
        )
        .unwrap();
        allowlist.write_json_file(&path).unwrap();
        let loaded = Allowlist::from_json_file(&path).unwrap();
        assert_eq!(loaded, allowlist);
        assert!(loaded.eligibility(A).unwrap().eligible);
    }
}
