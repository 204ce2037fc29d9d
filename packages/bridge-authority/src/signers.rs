//! Signer set and threshold authorization
//!
//! The signer set owns the roster, the threshold, the signers-mode flag, the owner
//! and the per-domain nonces. Every protected operation goes through
//! [`SignerSet::authorize`]:
//!
//! - signers mode off: the caller must be the owner, nonces are untouched
//! - signers mode on: the domain nonce is consumed first, then the signatures are
//!   checked against the pre-image bound to that nonce
//!
//! A rejected signature check therefore still burns the nonce; any retry needs
//! signatures over the next nonce.
//!
//! # Duplicate detection
//! Signatures are deduplicated with a 256-bit bitmap keyed on the most-significant
//! byte of the recovered address. Two members sharing that byte would be
//! indistinguishable, so the roster never admits such a pair.

use std::collections::BTreeMap;

use alloy::primitives::{b256, Address, Bytes, PrimitiveSignature as Signature, B256, U256};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::domain::AuthDomain;
use crate::error::AuthorityError;
use crate::hash::{bytes32_to_hex, eth_signed_message_hash, signing_preimage};
use crate::state::ContractEnv;

/// secp256k1n / 2, upper bound for `s` in a canonical signature
const SECP256K1N_HALF: B256 =
    b256!("7fffffffffffffffffffffffffffffff5d576e7357a4501ddfe92f46681b20a0");

/// How an operation was authorized
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authorization {
    /// Direct owner call (signers mode off)
    Owner,
    /// Threshold signatures over the pre-image bound to `nonce`
    Signatures { nonce: u64, signers: Vec<Address> },
    /// Direct call by the delegated pause manager
    PauseManager,
}

/// Signer roster, threshold, mode flag and nonce domains
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerSet {
    owner: Address,
    signers: Vec<Address>,
    threshold: u64,
    signers_mode: bool,
    nonces: BTreeMap<B256, u64>,
    initialized: bool,
}

/// Bitmap key of a signer: its most-significant address byte
pub fn signer_prefix(signer: &Address) -> u8 {
    signer.as_slice()[0]
}

/// Bitmap bit of a signer: `1 << (uint160(signer) >> 152)`
pub fn signer_bit(signer: &Address) -> U256 {
    U256::from(1u8) << (signer_prefix(signer) as usize)
}

impl SignerSet {
    /// Empty, uninitialized signer set owned by `owner`
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            ..Self::default()
        }
    }

    /// One-time initialization of roster, threshold and mode
    ///
    /// The threshold is not validated here; it is only checked by `set_threshold`.
    pub fn init_signers(
        &mut self,
        signers: &[Address],
        threshold: u64,
        signers_mode: bool,
    ) -> Result<(), AuthorityError> {
        if self.initialized {
            return Err(AuthorityError::AlreadyInitialized);
        }

        let added = self.validate_new_signers(signers)?;
        self.signers.extend(added);
        self.threshold = threshold;
        self.signers_mode = signers_mode;
        self.initialized = true;

        info!(
            signer_count = self.signers.len(),
            threshold,
            signers_mode,
            "Signer set initialized"
        );
        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Current roster in insertion order
    pub fn get_signers(&self) -> &[Address] {
        &self.signers
    }

    pub fn is_signer(&self, address: &Address) -> bool {
        self.signers.contains(address)
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    pub fn signers_mode(&self) -> bool {
        self.signers_mode
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Next nonce for a domain key
    pub fn nonce(&self, domain_key: &B256) -> u64 {
        self.nonces.get(domain_key).copied().unwrap_or(0)
    }

    /// Pre-image the next authorization of `domain` must be signed over
    pub fn signing_digest(&self, env: &ContractEnv, domain: &AuthDomain) -> B256 {
        let key = domain.key();
        signing_preimage(key, self.nonce(&key), env)
    }

    // ========================================================================
    // Authorization
    // ========================================================================

    /// Authorize a protected operation (owner-or-signatures gate)
    pub fn authorize(
        &mut self,
        env: &ContractEnv,
        caller: Address,
        domain: &AuthDomain,
        signatures: &[Bytes],
    ) -> Result<Authorization, AuthorityError> {
        if !self.signers_mode {
            return self.ensure_owner(caller).map(|_| Authorization::Owner);
        }

        let key = domain.key();
        let nonce = self.consume_nonce(key);
        let preimage = signing_preimage(key, nonce, env);

        debug!(
            operation = domain.name(),
            domain_key = %bytes32_to_hex(&key),
            nonce,
            preimage = %bytes32_to_hex(&preimage),
            "Checking signatures"
        );

        match self.check_signatures(preimage, signatures) {
            Ok(signers) => Ok(Authorization::Signatures { nonce, signers }),
            Err(e) => {
                warn!(
                    operation = domain.name(),
                    nonce,
                    error = %e,
                    "Signature authorization rejected, nonce consumed"
                );
                Err(e)
            }
        }
    }

    /// Verify that `signatures` carry threshold authority over `digest`
    ///
    /// Returns the recovered signers in submission order. No ordering of the
    /// signatures is required.
    pub fn check_signatures(
        &self,
        digest: B256,
        signatures: &[Bytes],
    ) -> Result<Vec<Address>, AuthorityError> {
        if (signatures.len() as u64) < self.threshold {
            return Err(AuthorityError::InsufficientSignatures {
                got: signatures.len(),
                required: self.threshold,
            });
        }

        let message_hash = eth_signed_message_hash(&digest);
        let mut bitmap = U256::ZERO;
        let mut recovered = Vec::with_capacity(signatures.len());

        for (index, raw) in signatures.iter().enumerate() {
            let signer = recover_signer(&message_hash, raw)
                .map_err(|reason| AuthorityError::InvalidSignature { index, reason })?;

            if !self.is_signer(&signer) {
                return Err(AuthorityError::UnknownSigner { signer });
            }

            let bit = signer_bit(&signer);
            if bitmap & bit != U256::ZERO {
                return Err(AuthorityError::DuplicateSigner {
                    signer,
                    prefix: signer_prefix(&signer),
                });
            }
            bitmap |= bit;
            recovered.push(signer);
        }

        Ok(recovered)
    }

    /// Single-authority check used while signers mode is off
    pub fn ensure_owner(&self, caller: Address) -> Result<(), AuthorityError> {
        if caller != self.owner {
            return Err(AuthorityError::Unauthorized { caller });
        }
        Ok(())
    }

    fn consume_nonce(&mut self, key: B256) -> u64 {
        let counter = self.nonces.entry(key).or_insert(0);
        let nonce = *counter;
        *counter += 1;
        nonce
    }

    // ========================================================================
    // Gated Mutations
    // ========================================================================

    /// Add signers; members already present are skipped
    ///
    /// Returns the addresses that were actually added.
    pub fn add_signers(
        &mut self,
        env: &ContractEnv,
        caller: Address,
        signers: &[Address],
        signatures: &[Bytes],
    ) -> Result<Vec<Address>, AuthorityError> {
        let added = self.validate_new_signers(signers)?;
        self.authorize(
            env,
            caller,
            &AuthDomain::AddSigners {
                signers: signers.to_vec(),
            },
            signatures,
        )?;

        self.signers.extend(added.iter().copied());
        info!(added = ?added, signer_count = self.signers.len(), "Signers added");
        Ok(added)
    }

    /// Remove signers; absent addresses are skipped
    ///
    /// No floor check against the threshold is made: removing below the threshold
    /// locks signature-gated operations until signers are re-added or the threshold
    /// is lowered.
    pub fn remove_signers(
        &mut self,
        env: &ContractEnv,
        caller: Address,
        signers: &[Address],
        signatures: &[Bytes],
    ) -> Result<Vec<Address>, AuthorityError> {
        self.authorize(
            env,
            caller,
            &AuthDomain::RemoveSigners {
                signers: signers.to_vec(),
            },
            signatures,
        )?;

        let removed: Vec<Address> = self
            .signers
            .iter()
            .copied()
            .filter(|s| signers.contains(s))
            .collect();
        self.signers.retain(|s| !signers.contains(s));

        if self.signers.len() < self.threshold as usize {
            warn!(
                signer_count = self.signers.len(),
                threshold = self.threshold,
                "Signer count below threshold"
            );
        }
        info!(removed = ?removed, signer_count = self.signers.len(), "Signers removed");
        Ok(removed)
    }

    /// Change the threshold; zero is rejected, no upper bound is enforced
    pub fn set_threshold(
        &mut self,
        env: &ContractEnv,
        caller: Address,
        threshold: u64,
        signatures: &[Bytes],
    ) -> Result<u64, AuthorityError> {
        if threshold == 0 {
            return Err(AuthorityError::ZeroThreshold);
        }
        self.authorize(
            env,
            caller,
            &AuthDomain::SetThreshold { threshold },
            signatures,
        )?;

        let previous = self.threshold;
        self.threshold = threshold;
        info!(previous, threshold, "Threshold changed");
        Ok(previous)
    }

    /// Set the signers-mode flag
    pub fn toggle_mode(
        &mut self,
        env: &ContractEnv,
        caller: Address,
        signers_mode: bool,
        signatures: &[Bytes],
    ) -> Result<(), AuthorityError> {
        self.authorize(
            env,
            caller,
            &AuthDomain::ToggleMode { mode: signers_mode },
            signatures,
        )?;

        self.signers_mode = signers_mode;
        info!(signers_mode, "Signers mode toggled");
        Ok(())
    }

    /// Hand the single-authority role to `new_owner`
    pub fn transfer_ownership(
        &mut self,
        env: &ContractEnv,
        caller: Address,
        new_owner: Address,
        signatures: &[Bytes],
    ) -> Result<Address, AuthorityError> {
        if new_owner.is_zero() {
            return Err(AuthorityError::ZeroAddress { field: "new_owner" });
        }
        self.authorize(
            env,
            caller,
            &AuthDomain::TransferOwnership { new_owner },
            signatures,
        )?;

        let previous = self.owner;
        self.owner = new_owner;
        info!(previous = %previous, new_owner = %new_owner, "Ownership transferred");
        Ok(previous)
    }

    /// Check candidates against the zero address and prefix invariants
    ///
    /// Returns the candidates that are not yet members, deduplicated, in order.
    fn validate_new_signers(&self, candidates: &[Address]) -> Result<Vec<Address>, AuthorityError> {
        let mut added: Vec<Address> = Vec::new();

        for candidate in candidates {
            if candidate.is_zero() {
                return Err(AuthorityError::ZeroAddress { field: "signer" });
            }
            if self.is_signer(candidate) || added.contains(candidate) {
                continue;
            }

            let prefix = signer_prefix(candidate);
            if let Some(existing) = self
                .signers
                .iter()
                .chain(added.iter())
                .find(|s| signer_prefix(s) == prefix)
            {
                return Err(AuthorityError::SignerPrefixCollision {
                    signer: *candidate,
                    existing: *existing,
                    prefix,
                });
            }
            added.push(*candidate);
        }

        Ok(added)
    }
}

/// Recover the signer of an EIP-191 message hash from a 65-byte `r || s || v` signature
///
/// Signatures with `s` in the upper half of the curve order are rejected.
pub fn recover_signer(message_hash: &B256, raw: &[u8]) -> Result<Address, String> {
    let signature = Signature::try_from(raw).map_err(|e| e.to_string())?;
    if signature.s() > U256::from_be_bytes(SECP256K1N_HALF.0) {
        return Err("signature s value is not canonical".to_string());
    }
    signature
        .recover_address_from_prehash(message_hash)
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        colliding_signers, distinct_signers, sign_all, test_env, TestSigner,
    };

    fn owner() -> Address {
        Address::repeat_byte(0xee)
    }

    fn signer_set(signers: &[TestSigner], threshold: u64, mode: bool) -> SignerSet {
        let mut set = SignerSet::new(owner());
        let addrs: Vec<Address> = signers.iter().map(|s| s.address()).collect();
        set.init_signers(&addrs, threshold, mode).unwrap();
        set
    }

    #[test]
    fn test_signer_bit_uses_top_byte() {
        let mut bytes = [0u8; 20];
        bytes[0] = 0x05;
        bytes[19] = 0xff;
        let addr = Address::from(bytes);
        assert_eq!(signer_prefix(&addr), 0x05);
        assert_eq!(signer_bit(&addr), U256::from(32u64));
    }

    #[test]
    fn test_init_signers_is_one_time() {
        let signers = distinct_signers(2);
        let mut set = signer_set(&signers, 1, true);
        assert_eq!(
            set.init_signers(&[], 1, false),
            Err(AuthorityError::AlreadyInitialized)
        );
    }

    #[test]
    fn test_init_signers_rejects_zero_address() {
        let mut set = SignerSet::new(owner());
        assert_eq!(
            set.init_signers(&[Address::ZERO], 1, false),
            Err(AuthorityError::ZeroAddress { field: "signer" })
        );
        assert!(!set.is_initialized());
    }

    #[test]
    fn test_init_signers_accepts_zero_threshold() {
        let mut set = SignerSet::new(owner());
        set.init_signers(&[], 0, false).unwrap();
        assert_eq!(set.threshold(), 0);
    }

    #[test]
    fn test_check_signatures_accepts_threshold_in_any_order() {
        let signers = distinct_signers(3);
        let set = signer_set(&signers, 2, true);
        let digest = B256::repeat_byte(0x01);

        let sigs = sign_all(&[&signers[2], &signers[0]], digest);
        let recovered = set.check_signatures(digest, &sigs).unwrap();
        assert_eq!(recovered, vec![signers[2].address(), signers[0].address()]);

        let sigs = sign_all(&[&signers[0], &signers[1], &signers[2]], digest);
        assert_eq!(set.check_signatures(digest, &sigs).unwrap().len(), 3);
    }

    #[test]
    fn test_check_signatures_rejects_below_threshold() {
        let signers = distinct_signers(3);
        let set = signer_set(&signers, 2, true);
        let digest = B256::repeat_byte(0x01);

        let sigs = sign_all(&[&signers[0]], digest);
        assert_eq!(
            set.check_signatures(digest, &sigs),
            Err(AuthorityError::InsufficientSignatures {
                got: 1,
                required: 2
            })
        );
    }

    #[test]
    fn test_check_signatures_rejects_duplicate_signer() {
        let signers = distinct_signers(2);
        let set = signer_set(&signers, 2, true);
        let digest = B256::repeat_byte(0x02);

        let sigs = sign_all(&[&signers[0], &signers[0]], digest);
        assert_eq!(
            set.check_signatures(digest, &sigs),
            Err(AuthorityError::DuplicateSigner {
                signer: signers[0].address(),
                prefix: signer_prefix(&signers[0].address()),
            })
        );
    }

    #[test]
    fn test_check_signatures_rejects_unknown_signer() {
        let signers = distinct_signers(3);
        let set = signer_set(&signers[..2], 1, true);
        let digest = B256::repeat_byte(0x03);

        let sigs = sign_all(&[&signers[2]], digest);
        assert_eq!(
            set.check_signatures(digest, &sigs),
            Err(AuthorityError::UnknownSigner {
                signer: signers[2].address()
            })
        );
    }

    #[test]
    fn test_check_signatures_wrong_digest_recovers_stranger() {
        let signers = distinct_signers(1);
        let set = signer_set(&signers, 1, true);

        let sigs = sign_all(&[&signers[0]], B256::repeat_byte(0x04));
        let err = set
            .check_signatures(B256::repeat_byte(0x05), &sigs)
            .unwrap_err();
        assert!(matches!(err, AuthorityError::UnknownSigner { .. }));
    }

    #[test]
    fn test_check_signatures_rejects_malformed_bytes() {
        let signers = distinct_signers(1);
        let set = signer_set(&signers, 1, true);

        let err = set
            .check_signatures(B256::ZERO, &[Bytes::from(vec![0u8; 10])])
            .unwrap_err();
        assert!(matches!(err, AuthorityError::InvalidSignature { index: 0, .. }));
    }

    #[test]
    fn test_check_signatures_rejects_high_s() {
        let signers = distinct_signers(1);
        let set = signer_set(&signers, 1, true);
        let digest = B256::repeat_byte(0x06);

        let sig = signers[0].signature(digest);
        // Flip to the malleable twin: s' = n - s, parity inverted
        let n = U256::from_be_bytes(
            b256!("fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141").0,
        );
        let mut raw = [0u8; 65];
        raw[..32].copy_from_slice(&sig.r().to_be_bytes::<32>());
        raw[32..64].copy_from_slice(&(n - sig.s()).to_be_bytes::<32>());
        raw[64] = if sig.v() { 27 } else { 28 };

        let err = set
            .check_signatures(digest, &[Bytes::from(raw.to_vec())])
            .unwrap_err();
        assert!(matches!(err, AuthorityError::InvalidSignature { .. }));
    }

    #[test]
    fn test_authorize_owner_mode_does_not_touch_nonce() {
        let signers = distinct_signers(1);
        let mut set = signer_set(&signers, 1, false);
        let env = test_env();
        let domain = AuthDomain::Pause;

        assert_eq!(
            set.authorize(&env, owner(), &domain, &[]),
            Ok(Authorization::Owner)
        );
        assert_eq!(
            set.authorize(&env, signers[0].address(), &domain, &[]),
            Err(AuthorityError::Unauthorized {
                caller: signers[0].address()
            })
        );
        assert_eq!(set.nonce(&domain.key()), 0);
    }

    #[test]
    fn test_authorize_burns_nonce_on_failure() {
        let signers = distinct_signers(2);
        let mut set = signer_set(&signers, 2, true);
        let env = test_env();
        let domain = AuthDomain::Unpause;

        // Signatures prepared for nonce 0
        let stale = sign_all(&signers.iter().collect::<Vec<_>>(), set.signing_digest(&env, &domain));

        // A failed attempt consumes nonce 0
        let err = set
            .authorize(&env, owner(), &domain, &stale[..1])
            .unwrap_err();
        assert!(matches!(err, AuthorityError::InsufficientSignatures { .. }));
        assert_eq!(set.nonce(&domain.key()), 1);

        // The previously valid set is now bound to a stale nonce
        let err = set.authorize(&env, owner(), &domain, &stale).unwrap_err();
        assert!(matches!(err, AuthorityError::UnknownSigner { .. }));
        assert_eq!(set.nonce(&domain.key()), 2);

        // Fresh signatures over the current nonce succeed
        let fresh = sign_all(&signers.iter().collect::<Vec<_>>(), set.signing_digest(&env, &domain));
        let auth = set.authorize(&env, owner(), &domain, &fresh).unwrap();
        assert_eq!(
            auth,
            Authorization::Signatures {
                nonce: 2,
                signers: signers.iter().map(|s| s.address()).collect()
            }
        );
        assert_eq!(set.nonce(&domain.key()), 3);
    }

    #[test]
    fn test_nonce_domains_are_independent() {
        let signers = distinct_signers(1);
        let mut set = signer_set(&signers, 1, true);
        let env = test_env();

        let pause = AuthDomain::Pause;
        let sigs = sign_all(&[&signers[0]], set.signing_digest(&env, &pause));
        set.authorize(&env, Address::ZERO, &pause, &sigs).unwrap();

        assert_eq!(set.nonce(&pause.key()), 1);
        assert_eq!(set.nonce(&AuthDomain::Unpause.key()), 0);
        assert_eq!(
            set.nonce(&AuthDomain::SetThreshold { threshold: 1 }.key()),
            0
        );
    }

    #[test]
    fn test_add_signers_is_idempotent() {
        let signers = distinct_signers(2);
        let mut set = signer_set(&signers[..1], 1, false);
        let env = test_env();

        let added = set
            .add_signers(
                &env,
                owner(),
                &[signers[0].address(), signers[1].address(), signers[1].address()],
                &[],
            )
            .unwrap();
        assert_eq!(added, vec![signers[1].address()]);
        assert_eq!(
            set.get_signers(),
            &[signers[0].address(), signers[1].address()]
        );
    }

    #[test]
    fn test_add_signers_rejects_prefix_collision() {
        let (first, second) = colliding_signers();
        assert_eq!(signer_prefix(&first.address()), signer_prefix(&second.address()));
        assert_ne!(first.address(), second.address());

        let mut set = signer_set(std::slice::from_ref(&first), 1, false);
        let err = set
            .add_signers(&test_env(), owner(), &[second.address()], &[])
            .unwrap_err();
        assert_eq!(
            err,
            AuthorityError::SignerPrefixCollision {
                signer: second.address(),
                existing: first.address(),
                prefix: signer_prefix(&first.address()),
            }
        );
        assert_eq!(set.get_signers(), &[first.address()]);
    }

    #[test]
    fn test_add_signers_rejects_collision_within_batch() {
        let (first, second) = colliding_signers();
        let mut set = SignerSet::new(owner());
        let err = set
            .init_signers(&[first.address(), second.address()], 1, false)
            .unwrap_err();
        assert!(matches!(err, AuthorityError::SignerPrefixCollision { .. }));
    }

    #[test]
    fn test_add_signers_validates_before_consuming_nonce() {
        let signers = distinct_signers(1);
        let mut set = signer_set(&signers, 1, true);
        let env = test_env();
        let domain = AuthDomain::AddSigners {
            signers: vec![Address::ZERO],
        };

        let err = set
            .add_signers(&env, owner(), &[Address::ZERO], &[])
            .unwrap_err();
        assert_eq!(err, AuthorityError::ZeroAddress { field: "signer" });
        assert_eq!(set.nonce(&domain.key()), 0);
    }

    #[test]
    fn test_remove_signers_below_threshold_locks_out() {
        let signers = distinct_signers(2);
        let mut set = signer_set(&signers, 2, false);
        let env = test_env();

        let removed = set
            .remove_signers(
                &env,
                owner(),
                &[signers[1].address(), Address::repeat_byte(0x99)],
                &[],
            )
            .unwrap();
        assert_eq!(removed, vec![signers[1].address()]);
        assert_eq!(set.threshold(), 2);

        // Only one signer remains, so a two-signature check can never pass
        let digest = B256::repeat_byte(0x07);
        let sigs = sign_all(&[&signers[0]], digest);
        assert!(matches!(
            set.check_signatures(digest, &sigs),
            Err(AuthorityError::InsufficientSignatures { .. })
        ));
    }

    #[test]
    fn test_set_threshold_rejects_zero_and_allows_above_roster() {
        let signers = distinct_signers(1);
        let mut set = signer_set(&signers, 1, false);
        let env = test_env();

        assert_eq!(
            set.set_threshold(&env, owner(), 0, &[]),
            Err(AuthorityError::ZeroThreshold)
        );
        assert_eq!(set.set_threshold(&env, owner(), 5, &[]), Ok(1));
        assert_eq!(set.threshold(), 5);
    }

    #[test]
    fn test_toggle_mode_and_transfer_ownership() {
        let signers = distinct_signers(1);
        let mut set = signer_set(&signers, 1, false);
        let env = test_env();
        let new_owner = Address::repeat_byte(0xdd);

        set.transfer_ownership(&env, owner(), new_owner, &[]).unwrap();
        assert_eq!(set.owner(), new_owner);
        assert!(set.toggle_mode(&env, owner(), true, &[]).is_err());

        set.toggle_mode(&env, new_owner, true, &[]).unwrap();
        assert!(set.signers_mode());
        assert_eq!(
            set.transfer_ownership(&env, new_owner, Address::ZERO, &[]),
            Err(AuthorityError::ZeroAddress { field: "new_owner" })
        );
    }
}
