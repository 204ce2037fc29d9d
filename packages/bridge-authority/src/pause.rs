//! Pause control
//!
//! With a pause manager set, only that address may pause or unpause and no
//! signatures are involved. With the pause manager at the zero address, pausing
//! falls back to the owner-or-signatures gate. Reassigning the pause manager always
//! goes through the owner-or-signatures gate, so a pause manager cannot reassign
//! itself.

use alloy::primitives::{Address, Bytes};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::AuthDomain;
use crate::error::AuthorityError;
use crate::signers::{Authorization, SignerSet};
use crate::state::ContractEnv;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseControl {
    paused: bool,
    pause_manager: Address,
}

impl PauseControl {
    pub fn new(pause_manager: Address) -> Self {
        Self {
            paused: false,
            pause_manager,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Delegated pause manager, zero when pausing falls back to owner/signers
    pub fn pause_manager(&self) -> Address {
        self.pause_manager
    }

    /// Guard for asset operations
    pub fn ensure_not_paused(&self) -> Result<(), AuthorityError> {
        if self.paused {
            return Err(AuthorityError::BridgePaused);
        }
        Ok(())
    }

    /// Running → Paused
    pub fn pause(
        &mut self,
        signers: &mut SignerSet,
        env: &ContractEnv,
        caller: Address,
        signatures: &[Bytes],
    ) -> Result<Authorization, AuthorityError> {
        if self.paused {
            return Err(AuthorityError::AlreadyPaused);
        }
        let auth = self.authorize_toggle(signers, env, caller, &AuthDomain::Pause, signatures)?;
        self.paused = true;
        info!(caller = %caller, "Bridge paused");
        Ok(auth)
    }

    /// Paused → Running
    pub fn unpause(
        &mut self,
        signers: &mut SignerSet,
        env: &ContractEnv,
        caller: Address,
        signatures: &[Bytes],
    ) -> Result<Authorization, AuthorityError> {
        if !self.paused {
            return Err(AuthorityError::NotPaused);
        }
        let auth = self.authorize_toggle(signers, env, caller, &AuthDomain::Unpause, signatures)?;
        self.paused = false;
        info!(caller = %caller, "Bridge unpaused");
        Ok(auth)
    }

    /// Reassign the pause manager through the maintainer gate; returns the previous one
    pub fn set_pause_manager(
        &mut self,
        signers: &mut SignerSet,
        env: &ContractEnv,
        caller: Address,
        new_manager: Address,
        signatures: &[Bytes],
    ) -> Result<Address, AuthorityError> {
        signers.authorize(
            env,
            caller,
            &AuthDomain::SetPauseManager {
                manager: new_manager,
            },
            signatures,
        )?;

        let previous = self.pause_manager;
        self.pause_manager = new_manager;
        info!(previous = %previous, pause_manager = %new_manager, "Pause manager changed");
        Ok(previous)
    }

    fn authorize_toggle(
        &self,
        signers: &mut SignerSet,
        env: &ContractEnv,
        caller: Address,
        domain: &AuthDomain,
        signatures: &[Bytes],
    ) -> Result<Authorization, AuthorityError> {
        if self.pause_manager.is_zero() {
            return signers.authorize(env, caller, domain, signatures);
        }
        if caller != self.pause_manager {
            return Err(AuthorityError::UnauthorizedPauseManager { caller });
        }
        Ok(Authorization::PauseManager)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{distinct_signers, sign_all, test_env};

    const OWNER: Address = Address::new([0x0a; 20]);
    const MANAGER: Address = Address::new([0x0c; 20]);

    fn owner_mode() -> SignerSet {
        let mut set = SignerSet::new(OWNER);
        set.init_signers(&[], 1, false).unwrap();
        set
    }

    #[test]
    fn test_owner_pauses_without_manager() {
        let mut signers = owner_mode();
        let mut pause = PauseControl::default();
        let env = test_env();

        assert_eq!(
            pause.pause(&mut signers, &env, OWNER, &[]),
            Ok(Authorization::Owner)
        );
        assert!(pause.is_paused());
        assert_eq!(pause.ensure_not_paused(), Err(AuthorityError::BridgePaused));
        assert_eq!(
            pause.pause(&mut signers, &env, OWNER, &[]),
            Err(AuthorityError::AlreadyPaused)
        );

        pause.unpause(&mut signers, &env, OWNER, &[]).unwrap();
        assert!(!pause.is_paused());
        assert_eq!(
            pause.unpause(&mut signers, &env, OWNER, &[]),
            Err(AuthorityError::NotPaused)
        );
    }

    #[test]
    fn test_manager_has_exclusive_pause_authority() {
        let mut signers = owner_mode();
        let mut pause = PauseControl::new(MANAGER);
        let env = test_env();

        assert_eq!(
            pause.pause(&mut signers, &env, OWNER, &[]),
            Err(AuthorityError::UnauthorizedPauseManager { caller: OWNER })
        );
        assert_eq!(
            pause.pause(&mut signers, &env, MANAGER, &[]),
            Ok(Authorization::PauseManager)
        );
        assert_eq!(
            pause.unpause(&mut signers, &env, MANAGER, &[]),
            Ok(Authorization::PauseManager)
        );
    }

    #[test]
    fn test_manager_bypasses_signatures_and_nonces() {
        let roster = distinct_signers(1);
        let mut signers = SignerSet::new(OWNER);
        signers
            .init_signers(&[roster[0].address()], 1, true)
            .unwrap();
        let mut pause = PauseControl::new(MANAGER);
        let env = test_env();

        pause.pause(&mut signers, &env, MANAGER, &[]).unwrap();
        assert_eq!(signers.nonce(&AuthDomain::Pause.key()), 0);
    }

    #[test]
    fn test_manager_cannot_reassign_itself() {
        let mut signers = owner_mode();
        let mut pause = PauseControl::new(MANAGER);
        let env = test_env();

        assert_eq!(
            pause.set_pause_manager(&mut signers, &env, MANAGER, Address::ZERO, &[]),
            Err(AuthorityError::Unauthorized { caller: MANAGER })
        );
        assert_eq!(
            pause.set_pause_manager(&mut signers, &env, OWNER, Address::ZERO, &[]),
            Ok(MANAGER)
        );
        assert!(pause.pause_manager().is_zero());

        // Authority is back with the owner
        pause.pause(&mut signers, &env, OWNER, &[]).unwrap();
    }

    #[test]
    fn test_signers_pause_without_manager() {
        let roster = distinct_signers(2);
        let mut signers = SignerSet::new(OWNER);
        signers
            .init_signers(&[roster[0].address(), roster[1].address()], 2, true)
            .unwrap();
        let mut pause = PauseControl::default();
        let env = test_env();

        let sigs = sign_all(
            &[&roster[1], &roster[0]],
            signers.signing_digest(&env, &AuthDomain::Pause),
        );
        let auth = pause.pause(&mut signers, &env, Address::ZERO, &sigs).unwrap();
        assert!(matches!(auth, Authorization::Signatures { nonce: 0, .. }));
        assert!(pause.is_paused());
    }
}
