//! Versioned manager handover
//!
//! An upgrade can install a delegated manager for one custodied asset. The manager
//! may perform a single privileged action: draining the whole tracked balance of
//! that asset (e.g. burning locked USDC when the issuer takes over the bridged
//! supply). Each installation must carry a strictly greater version than the last,
//! so an old initializer can never be replayed.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AuthorityError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerHandover {
    asset: Address,
    manager: Address,
    version: u64,
}

impl ManagerHandover {
    pub fn asset(&self) -> Address {
        self.asset
    }

    pub fn manager(&self) -> Address {
        self.manager
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Install `manager` for `asset`; only reachable from an upgrade init payload
    pub(crate) fn init_handover(
        &mut self,
        asset: Address,
        manager: Address,
        version: u64,
    ) -> Result<(), AuthorityError> {
        if version <= self.version {
            return Err(AuthorityError::StaleHandoverVersion {
                requested: version,
                current: self.version,
            });
        }
        if manager.is_zero() {
            return Err(AuthorityError::ZeroAddress { field: "manager" });
        }
        if asset.is_zero() {
            return Err(AuthorityError::ZeroAddress { field: "asset" });
        }

        self.asset = asset;
        self.manager = manager;
        self.version = version;
        info!(asset = %asset, manager = %manager, version, "Manager handover initialized");
        Ok(())
    }

    /// Guard for the privileged action
    pub fn ensure_manager(&self, caller: Address) -> Result<(), AuthorityError> {
        if self.manager.is_zero() || caller != self.manager {
            return Err(AuthorityError::UnauthorizedManager { caller });
        }
        Ok(())
    }
}
