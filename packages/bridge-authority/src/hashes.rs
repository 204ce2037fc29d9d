//! Registry of consumed origin-chain transactions
//!
//! Entries are `keccak256(abi.encode(txHash, txNonce))` and are never removed.

use std::collections::BTreeSet;

use alloy::primitives::B256;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AuthorityError;
use crate::hash::{bytes32_to_hex, origin_tx_digest};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashRegistry {
    used_hashes: BTreeSet<B256>,
}

impl HashRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the origin transaction was already consumed
    pub fn contains(&self, tx_hash: B256, tx_nonce: u64) -> bool {
        self.used_hashes
            .contains(&origin_tx_digest(tx_hash, tx_nonce))
    }

    /// Fail if the origin transaction was already consumed; returns its digest
    pub fn ensure_unused(&self, tx_hash: B256, tx_nonce: u64) -> Result<B256, AuthorityError> {
        let digest = origin_tx_digest(tx_hash, tx_nonce);
        if self.used_hashes.contains(&digest) {
            return Err(AuthorityError::HashAlreadyUsed { digest });
        }
        Ok(digest)
    }

    /// Mark the origin transaction consumed, rejecting a second attempt
    pub fn check_and_consume(&mut self, tx_hash: B256, tx_nonce: u64) -> Result<B256, AuthorityError> {
        let digest = self.ensure_unused(tx_hash, tx_nonce)?;
        self.used_hashes.insert(digest);
        debug!(
            tx_hash = %bytes32_to_hex(&tx_hash),
            tx_nonce,
            digest = %bytes32_to_hex(&digest),
            "Origin transaction consumed"
        );
        Ok(digest)
    }

    pub fn len(&self) -> usize {
        self.used_hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used_hashes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_and_consume_rejects_replay() {
        let mut registry = HashRegistry::new();
        let tx = B256::repeat_byte(0xaa);

        assert!(!registry.contains(tx, 7));
        let digest = registry.check_and_consume(tx, 7).unwrap();
        assert!(registry.contains(tx, 7));

        assert_eq!(
            registry.check_and_consume(tx, 7),
            Err(AuthorityError::HashAlreadyUsed { digest })
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_same_hash_different_nonce_is_distinct() {
        let mut registry = HashRegistry::new();
        let tx = B256::repeat_byte(0xaa);

        registry.check_and_consume(tx, 1).unwrap();
        registry.check_and_consume(tx, 2).unwrap();
        assert!(!registry.contains(tx, 3));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_ensure_unused_does_not_consume() {
        let registry = HashRegistry::new();
        registry.ensure_unused(B256::ZERO, 0).unwrap();
        assert!(registry.is_empty());
    }
}
