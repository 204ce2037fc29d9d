//! Nonce domains for protected operations
//!
//! A domain binds a signature to one operation kind and its parameters. Its key is
//! `keccak256(abi.encode(keccak256(name), params...))` and each key owns an
//! independent nonce counter in the signer set.

use alloy::primitives::{Address, B256};
use serde::{Deserialize, Serialize};

use crate::hash::{address_list_hash, operation_tag, AbiWords};

/// A protected operation together with the parameters its signatures bind to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthDomain {
    SetThreshold { threshold: u64 },
    AddSigners { signers: Vec<Address> },
    RemoveSigners { signers: Vec<Address> },
    ToggleMode { mode: bool },
    TransferOwnership { new_owner: Address },
    Pause,
    Unpause,
    SetPauseManager { manager: Address },
    AddHash { tx_hash: B256, tx_nonce: u64 },
    Upgrade { implementation: Address },
}

impl AuthDomain {
    /// Operation name hashed into the tag
    pub fn name(&self) -> &'static str {
        match self {
            AuthDomain::SetThreshold { .. } => "setThreshold",
            AuthDomain::AddSigners { .. } => "addSigners",
            AuthDomain::RemoveSigners { .. } => "removeSigners",
            AuthDomain::ToggleMode { .. } => "toggleMode",
            AuthDomain::TransferOwnership { .. } => "transferOwnership",
            AuthDomain::Pause => "pause",
            AuthDomain::Unpause => "unpause",
            AuthDomain::SetPauseManager { .. } => "setPauseManager",
            AuthDomain::AddHash { .. } => "addHash",
            AuthDomain::Upgrade { .. } => "upgradeToAndCall",
        }
    }

    /// `keccak256(name)`
    pub fn tag(&self) -> B256 {
        operation_tag(self.name())
    }

    /// Nonce domain key
    pub fn key(&self) -> B256 {
        let words = AbiWords::new().bytes32(self.tag());
        let words = match self {
            AuthDomain::SetThreshold { threshold } => words.uint64(*threshold),
            AuthDomain::AddSigners { signers } | AuthDomain::RemoveSigners { signers } => {
                words.bytes32(address_list_hash(signers))
            }
            AuthDomain::ToggleMode { mode } => words.boolean(*mode),
            AuthDomain::TransferOwnership { new_owner } => words.address(*new_owner),
            AuthDomain::Pause | AuthDomain::Unpause => words,
            AuthDomain::SetPauseManager { manager } => words.address(*manager),
            AuthDomain::AddHash { tx_hash, tx_nonce } => words.bytes32(*tx_hash).uint64(*tx_nonce),
            AuthDomain::Upgrade { implementation } => words.address(*implementation),
        };
        words.hash()
    }
}
