//! Execution context and constants for the bridge authority
//!
//! Component state lives with each component (`signers`, `hashes`, `pause`,
//! `upgrade`, `handover`, `assets`); this module holds what every call shares.

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

// ============================================================================
// Constants
// ============================================================================

/// Contract name recorded in snapshots
pub const CONTRACT_NAME: &str = "crates.io:cl8y-bridge-authority";

/// Contract version recorded in snapshots
pub const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Execution Context
// ============================================================================

/// Identity of the bridge instance; bound into every signed digest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContractEnv {
    /// Address of the bridge contract (`address(this)`)
    pub address: Address,
    /// Chain the bridge is deployed on (`block.chainid`)
    pub chain_id: u64,
}

/// Caller information for a single invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageInfo {
    /// Direct caller (`msg.sender`)
    pub sender: Address,
    /// Native value attached to the call (`msg.value`)
    pub value: U256,
}

impl MessageInfo {
    /// Call without attached value
    pub fn new(sender: Address) -> Self {
        Self {
            sender,
            value: U256::ZERO,
        }
    }

    /// Call carrying native value
    pub fn with_value(sender: Address, value: U256) -> Self {
        Self { sender, value }
    }
}
