//! CL8Y Bridge Authority - Authorization and Replay Protection for the Custodial Bridge
//!
//! The engine that guards every value transfer and upgrade of the bridge:
//!
//! - **Signer Set** - Owner mode or threshold signatures from registered signers,
//!   with per-operation nonce domains bound to the bridge address and chain id
//! - **Hash Registry** - Consumed origin-chain transactions, never reusable
//! - **Pause Control** - Delegated pause manager or owner/signers fallback
//! - **Upgrade Gate** - Signature-gated upgrades with an optional initializer
//! - **Manager Handover** - Versioned post-upgrade manager for one asset
//! - **Asset Handlers** - Custody ledger and withdrawal digests for native,
//!   ERC20, ERC721 and ERC1155 assets
//!
//! # Authorization Flow
//! 1. Offline signers query the signing digest of an operation at its current nonce
//! 2. Each signs `eip191(digest)`
//! 3. The call consumes the nonce, then verifies threshold signatures
//!
//! A rejected signature check still consumes the nonce.
//!
//! ## Feature Flags
//!
//! - `testing` - Deterministic local signers and a bridge harness

pub mod assets;
pub mod config;
pub mod contract;
pub mod domain;
pub mod error;
pub mod events;
mod execute;
pub mod handover;
pub mod hash;
pub mod hashes;
pub mod msg;
pub mod pause;
mod query;
pub mod signers;
pub mod snapshot;
pub mod state;
pub mod upgrade;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use crate::contract::{execute, instantiate, query, Bridge};
pub use crate::domain::AuthDomain;
pub use crate::error::{AuthorityError, ErrorKind};
pub use crate::events::{Event, Response};
pub use crate::hash::{bytes32_to_hex, hex_to_bytes32, keccak256};
pub use crate::signers::{recover_signer, Authorization, SignerSet};
pub use crate::state::{ContractEnv, MessageInfo};
