use sha3::{Digest, Keccak256};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::allowlist::{
    build_from_normalized, normalize_recipients, Allowlist, BuildOptions, DistributionMode,
    NormalizedRecipient, Recipient,
};
use crate::common::Hash32;
use crate::error::Result;

/// Content key for a normalized recipient list under a distribution mode.
///
/// Two inputs that normalize to the same ordered leaves under the same mode
/// share a key. Each record is length-prefixed so that no two distinct lists
/// serialize to the same byte stream.
pub fn cache_key(recipients: &[NormalizedRecipient], mode: &DistributionMode) -> Hash32 {
    let mut hasher = Keccak256::new();
    match mode {
        DistributionMode::Equal => hasher.update([0u8]),
        DistributionMode::Custom { default_amount } => {
            hasher.update([1u8]);
            update_prefixed(&mut hasher, default_amount.as_bytes());
        }
    }
    hasher.update((recipients.len() as u64).to_be_bytes());
    for recipient in recipients {
        hasher.update(recipient.address.as_bytes());
        hasher.update(recipient.leaf);
        update_prefixed(
            &mut hasher,
            recipient.amount.as_deref().unwrap_or_default().as_bytes(),
        );
    }
    hasher.finalize().into()
}

fn update_prefixed(hasher: &mut Keccak256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_be_bytes());
    hasher.update(bytes);
}

/// Caller-owned cache of built allowlists.
///
/// Each entry is an independent, immutable build result; nothing is shared
/// between caches.
#[derive(Debug, Default)]
pub struct TreeCache {
    entries: HashMap<Hash32, Arc<Allowlist>>,
    hits: u64,
    misses: u64,
}

impl TreeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached allowlist for this input, building it on a miss.
    ///
    /// `options.self_check` is not part of the key.
    pub fn get_or_build(
        &mut self,
        recipients: &[Recipient],
        options: &BuildOptions,
    ) -> Result<Arc<Allowlist>> {
        let normalized = normalize_recipients(recipients, &options.mode)?;
        let key = cache_key(&normalized, &options.mode);
        if let Some(allowlist) = self.entries.get(&key) {
            self.hits += 1;
            debug!(root = %allowlist.root, "allowlist cache hit");
            return Ok(Arc::clone(allowlist));
        }

        self.misses += 1;
        let allowlist = Arc::new(build_from_normalized(&normalized, options)?);
        self.entries.insert(key, Arc::clone(&allowlist));
        Ok(allowlist)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}
