//! Signature-gated implementation upgrades
//!
//! The bare `upgrade_to` path is disabled; every upgrade goes through the
//! owner-or-signatures gate with the upgrade domain. Upgrades that need to
//! initialize new state carry an [`InitPayload`] that runs in the same call.

use alloy::primitives::{Address, Bytes};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::AuthDomain;
use crate::error::AuthorityError;
use crate::signers::{Authorization, SignerSet};
use crate::state::ContractEnv;

/// Initializer executed against the new implementation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitPayload {
    /// Install a delegated manager for `asset` at `version`
    InitHandover {
        asset: Address,
        manager: Address,
        version: u64,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeGate {
    implementation: Address,
}

impl UpgradeGate {
    pub fn new(implementation: Address) -> Self {
        Self { implementation }
    }

    /// Current implementation reference
    pub fn implementation(&self) -> Address {
        self.implementation
    }

    /// The plain single-step upgrade path; always rejected
    pub fn upgrade_to(&self, _implementation: Address) -> Result<(), AuthorityError> {
        Err(AuthorityError::UpgradeDisabled)
    }

    /// Owner-or-signatures check for upgrading to `implementation`
    pub fn authorize_upgrade(
        &self,
        signers: &mut SignerSet,
        env: &ContractEnv,
        caller: Address,
        implementation: Address,
        signatures: &[Bytes],
    ) -> Result<Authorization, AuthorityError> {
        if implementation.is_zero() {
            return Err(AuthorityError::ZeroAddress {
                field: "implementation",
            });
        }
        signers.authorize(
            env,
            caller,
            &AuthDomain::Upgrade { implementation },
            signatures,
        )
    }

    /// Authorize then swap the implementation; returns the previous one
    pub fn upgrade_with_signatures(
        &mut self,
        signers: &mut SignerSet,
        env: &ContractEnv,
        caller: Address,
        implementation: Address,
        signatures: &[Bytes],
    ) -> Result<Address, AuthorityError> {
        self.authorize_upgrade(signers, env, caller, implementation, signatures)?;
        Ok(self.swap(implementation))
    }

    /// Replace the implementation reference without authorization
    ///
    /// Callers must have passed [`UpgradeGate::authorize_upgrade`] in the same call,
    /// or be restoring the previous reference after a failed initializer.
    pub(crate) fn swap(&mut self, implementation: Address) -> Address {
        let previous = self.implementation;
        self.implementation = implementation;
        info!(previous = %previous, implementation = %implementation, "Implementation upgraded");
        previous
    }
}
