use proptest::prelude::*;
use std::collections::BTreeSet;

use allowlist_cli::{
    build_allowlist, hex_encode, parse_hash32, parse_proof, verify, Address, BuildOptions,
    DistributionMode, Recipient,
};

fn addresses(max: usize) -> impl Strategy<Value = Vec<[u8; 20]>> {
    prop::collection::btree_set(any::<[u8; 20]>(), 1..max)
        .prop_map(|set: BTreeSet<[u8; 20]>| set.into_iter().collect())
        .prop_shuffle()
}

fn recipients(raw: &[[u8; 20]]) -> Vec<Recipient> {
    raw.iter()
        .map(|bytes| Recipient::new(Address::from(*bytes).to_string()))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn every_member_verifies(raw in addresses(40)) {
        let allowlist = build_allowlist(&recipients(&raw), &BuildOptions::default()).unwrap();
        let root = allowlist.root_hash().unwrap();
        for member in &allowlist.recipients {
            let siblings = parse_proof(&member.proof).unwrap();
            prop_assert!(siblings.len() <= allowlist.height);
            prop_assert!(verify(&member.address, None, &siblings, &root).unwrap());
        }
    }

    #[test]
    fn build_is_deterministic(raw in addresses(30)) {
        let input = recipients(&raw);
        let first = build_allowlist(&input, &BuildOptions::default()).unwrap();
        let second = build_allowlist(&input, &BuildOptions::default()).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn permuted_input_verifies_against_its_own_root(raw in addresses(30)) {
        let input = recipients(&raw);
        let mut reversed = input.clone();
        reversed.reverse();
        let allowlist = build_allowlist(&reversed, &BuildOptions::default()).unwrap();
        let root = allowlist.root_hash().unwrap();
        for member in &allowlist.recipients {
            let siblings = parse_proof(&member.proof).unwrap();
            prop_assert!(verify(&member.address, None, &siblings, &root).unwrap());
        }
    }

    #[test]
    fn tampered_proof_fails(raw in addresses(30), pick in any::<prop::sample::Index>(), bit in 0usize..256) {
        prop_assume!(raw.len() >= 2);
        let allowlist = build_allowlist(&recipients(&raw), &BuildOptions::default()).unwrap();
        let root = allowlist.root_hash().unwrap();
        let member = &allowlist.recipients[pick.index(raw.len())];
        let mut siblings = parse_proof(&member.proof).unwrap();
        let step = bit % siblings.len();
        siblings[step][bit / 8] ^= 1 << (bit % 8);
        prop_assert!(!verify(&member.address, None, &siblings, &root).unwrap());
    }

    #[test]
    fn tampered_address_fails(raw in addresses(30), pick in any::<prop::sample::Index>(), bit in 0usize..160) {
        let allowlist = build_allowlist(&recipients(&raw), &BuildOptions::default()).unwrap();
        let root = allowlist.root_hash().unwrap();
        let index = pick.index(raw.len());
        let siblings = parse_proof(&allowlist.recipients[index].proof).unwrap();
        let mut flipped = raw[index];
        flipped[bit / 8] ^= 1 << (bit % 8);
        let flipped = Address::from(flipped).to_string();
        prop_assert!(!verify(&flipped, None, &siblings, &root).unwrap());
    }

    #[test]
    fn non_member_fails_with_any_proof(raw in addresses(30), outsider in any::<[u8; 20]>()) {
        prop_assume!(!raw.contains(&outsider));
        let allowlist = build_allowlist(&recipients(&raw), &BuildOptions::default()).unwrap();
        let root = allowlist.root_hash().unwrap();
        let outsider = Address::from(outsider).to_string();
        for member in &allowlist.recipients {
            let siblings = parse_proof(&member.proof).unwrap();
            prop_assert!(!verify(&outsider, None, &siblings, &root).unwrap());
        }
    }

    #[test]
    fn tampered_amount_fails(raw in addresses(20), amounts in prop::collection::vec(0u64..1_000_000, 20), delta in 1u64..1000) {
        let input: Vec<Recipient> = raw
            .iter()
            .zip(&amounts)
            .map(|(bytes, amount)| Recipient::with_amount(Address::from(*bytes).to_string(), amount.to_string()))
            .collect();
        let options = BuildOptions { mode: DistributionMode::custom(), self_check: true };
        let allowlist = build_allowlist(&input, &options).unwrap();
        let root = parse_hash32(&allowlist.root).unwrap();
        for (member, amount) in allowlist.recipients.iter().zip(&amounts) {
            let siblings = parse_proof(&member.proof).unwrap();
            let right = amount.to_string();
            let wrong = (amount + delta).to_string();
            prop_assert!(verify(&member.address, Some(right.as_str()), &siblings, &root).unwrap());
            prop_assert!(!verify(&member.address, Some(wrong.as_str()), &siblings, &root).unwrap());
        }
        prop_assert_eq!(allowlist.root, hex_encode(root));
    }
}
