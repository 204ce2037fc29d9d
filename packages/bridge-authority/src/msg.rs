//! Message types for the bridge authority
//!
//! Instantiation, execution and query messages plus the query responses. Every
//! protected message carries the signatures its nonce domain requires; they may be
//! omitted while signers mode is off.

use alloy::primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

use crate::assets::{Deposit, Withdrawal};
use crate::domain::AuthDomain;
use crate::upgrade::InitPayload;

// ============================================================================
// Instantiate
// ============================================================================

/// Instantiate message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstantiateMsg {
    /// Single authority used while signers mode is off
    pub owner: Address,
    /// Initial signer roster
    pub signers: Vec<Address>,
    /// Signatures required in signers mode (not validated against the roster size)
    pub threshold: u64,
    /// Start in signers mode
    pub signers_mode: bool,
    /// Delegated pause authority, none to fall back to owner/signers
    #[serde(default)]
    pub pause_manager: Option<Address>,
    /// Initial implementation reference
    pub implementation: Address,
}

// ============================================================================
// Execute Messages
// ============================================================================

/// Execute messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecuteMsg {
    // ========================================================================
    // Signer Set (owner-or-signers)
    // ========================================================================
    SetThreshold {
        threshold: u64,
        #[serde(default)]
        signatures: Vec<Bytes>,
    },
    AddSigners {
        signers: Vec<Address>,
        #[serde(default)]
        signatures: Vec<Bytes>,
    },
    RemoveSigners {
        signers: Vec<Address>,
        #[serde(default)]
        signatures: Vec<Bytes>,
    },
    ToggleMode {
        signers_mode: bool,
        #[serde(default)]
        signatures: Vec<Bytes>,
    },
    TransferOwnership {
        new_owner: Address,
        #[serde(default)]
        signatures: Vec<Bytes>,
    },

    // ========================================================================
    // Pause Control
    // ========================================================================
    /// Pause asset operations
    ///
    /// Authorization: pause manager if set (signatures ignored), else owner-or-signers
    Pause {
        #[serde(default)]
        signatures: Vec<Bytes>,
    },
    Unpause {
        #[serde(default)]
        signatures: Vec<Bytes>,
    },
    /// Reassign the pause manager; zero hands pausing back to owner/signers
    SetPauseManager {
        manager: Address,
        #[serde(default)]
        signatures: Vec<Bytes>,
    },

    // ========================================================================
    // Replay Protection
    // ========================================================================
    /// Mark an origin transaction consumed without releasing funds
    AddHash {
        tx_hash: B256,
        tx_nonce: u64,
        #[serde(default)]
        signatures: Vec<Bytes>,
    },

    // ========================================================================
    // Deposits (not paused)
    // ========================================================================
    /// Lock the attached native value for `to` on the destination chain
    DepositNative { to: Address },
    DepositErc20 {
        token: Address,
        to: Address,
        amount: U256,
    },
    DepositErc721 {
        token: Address,
        to: Address,
        token_id: U256,
    },
    DepositErc1155 {
        token: Address,
        to: Address,
        id: U256,
        amount: U256,
    },

    // ========================================================================
    // Withdrawals (not paused, unused hash, threshold signatures)
    // ========================================================================
    WithdrawNative {
        to: Address,
        amount: U256,
        tx_hash: B256,
        tx_nonce: u64,
        signatures: Vec<Bytes>,
    },
    WithdrawErc20 {
        token: Address,
        to: Address,
        amount: U256,
        tx_hash: B256,
        tx_nonce: u64,
        signatures: Vec<Bytes>,
    },
    WithdrawErc721 {
        token: Address,
        to: Address,
        token_id: U256,
        tx_hash: B256,
        tx_nonce: u64,
        signatures: Vec<Bytes>,
    },
    WithdrawErc1155 {
        token: Address,
        to: Address,
        id: U256,
        amount: U256,
        tx_hash: B256,
        tx_nonce: u64,
        signatures: Vec<Bytes>,
    },

    // ========================================================================
    // Upgrades
    // ========================================================================
    /// Bare upgrade path; always rejected
    UpgradeTo { implementation: Address },
    UpgradeWithSignatures {
        implementation: Address,
        #[serde(default)]
        signatures: Vec<Bytes>,
    },
    /// Upgrade and run `payload` against the new state in the same call
    UpgradeWithSignaturesAndCall {
        implementation: Address,
        #[serde(default)]
        signatures: Vec<Bytes>,
        payload: InitPayload,
    },

    // ========================================================================
    // Manager Handover
    // ========================================================================
    /// Drain the tracked balance of the handover asset (manager only)
    PerformPrivilegedAction {},
}

impl ExecuteMsg {
    /// Nonce domain the message's signatures bind to, if it is nonce-gated
    ///
    /// Withdrawals are signed over their own digest and the bare upgrade path takes
    /// no authorization, so both return `None`, as do deposits.
    pub fn auth_domain(&self) -> Option<AuthDomain> {
        let domain = match self {
            ExecuteMsg::SetThreshold { threshold, .. } => AuthDomain::SetThreshold {
                threshold: *threshold,
            },
            ExecuteMsg::AddSigners { signers, .. } => AuthDomain::AddSigners {
                signers: signers.clone(),
            },
            ExecuteMsg::RemoveSigners { signers, .. } => AuthDomain::RemoveSigners {
                signers: signers.clone(),
            },
            ExecuteMsg::ToggleMode { signers_mode, .. } => AuthDomain::ToggleMode {
                mode: *signers_mode,
            },
            ExecuteMsg::TransferOwnership { new_owner, .. } => AuthDomain::TransferOwnership {
                new_owner: *new_owner,
            },
            ExecuteMsg::Pause { .. } => AuthDomain::Pause,
            ExecuteMsg::Unpause { .. } => AuthDomain::Unpause,
            ExecuteMsg::SetPauseManager { manager, .. } => AuthDomain::SetPauseManager {
                manager: *manager,
            },
            ExecuteMsg::AddHash {
                tx_hash, tx_nonce, ..
            } => AuthDomain::AddHash {
                tx_hash: *tx_hash,
                tx_nonce: *tx_nonce,
            },
            ExecuteMsg::UpgradeWithSignatures { implementation, .. }
            | ExecuteMsg::UpgradeWithSignaturesAndCall { implementation, .. } => {
                AuthDomain::Upgrade {
                    implementation: *implementation,
                }
            }
            _ => return None,
        };
        Some(domain)
    }

    /// The withdrawal and origin transaction this message releases, if any
    pub fn withdrawal(&self) -> Option<(Withdrawal, B256, u64)> {
        match self {
            ExecuteMsg::WithdrawNative {
                to,
                amount,
                tx_hash,
                tx_nonce,
                ..
            } => Some((
                Withdrawal::Native {
                    to: *to,
                    amount: *amount,
                },
                *tx_hash,
                *tx_nonce,
            )),
            ExecuteMsg::WithdrawErc20 {
                token,
                to,
                amount,
                tx_hash,
                tx_nonce,
                ..
            } => Some((
                Withdrawal::Erc20 {
                    token: *token,
                    to: *to,
                    amount: *amount,
                },
                *tx_hash,
                *tx_nonce,
            )),
            ExecuteMsg::WithdrawErc721 {
                token,
                to,
                token_id,
                tx_hash,
                tx_nonce,
                ..
            } => Some((
                Withdrawal::Erc721 {
                    token: *token,
                    to: *to,
                    token_id: *token_id,
                },
                *tx_hash,
                *tx_nonce,
            )),
            ExecuteMsg::WithdrawErc1155 {
                token,
                to,
                id,
                amount,
                tx_hash,
                tx_nonce,
                ..
            } => Some((
                Withdrawal::Erc1155 {
                    token: *token,
                    to: *to,
                    id: *id,
                    amount: *amount,
                },
                *tx_hash,
                *tx_nonce,
            )),
            _ => None,
        }
    }

    /// Deposit carried by this message; native value comes from the call itself
    pub fn deposit(&self, value: U256) -> Option<(Deposit, Address)> {
        match self {
            ExecuteMsg::DepositNative { to } => Some((Deposit::Native { amount: value }, *to)),
            ExecuteMsg::DepositErc20 { token, to, amount } => Some((
                Deposit::Erc20 {
                    token: *token,
                    amount: *amount,
                },
                *to,
            )),
            ExecuteMsg::DepositErc721 {
                token,
                to,
                token_id,
            } => Some((
                Deposit::Erc721 {
                    token: *token,
                    token_id: *token_id,
                },
                *to,
            )),
            ExecuteMsg::DepositErc1155 {
                token,
                to,
                id,
                amount,
            } => Some((
                Deposit::Erc1155 {
                    token: *token,
                    id: *id,
                    amount: *amount,
                },
                *to,
            )),
            _ => None,
        }
    }
}

// ============================================================================
// Query Messages
// ============================================================================

/// Query messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMsg {
    /// Owner, threshold, mode, pause state and implementation
    Config {},
    /// Current signer roster
    Signers {},
    IsSigner { address: Address },
    /// Next nonce of a domain
    Nonce { domain: AuthDomain },
    /// Pre-image signers must sign for `domain` at its current nonce
    SigningDigest { domain: AuthDomain },
    /// Digest signers must sign to release `withdrawal`
    WithdrawalDigest {
        withdrawal: Withdrawal,
        tx_hash: B256,
        tx_nonce: u64,
    },
    IsHashUsed { tx_hash: B256, tx_nonce: u64 },
    Handover {},
    /// Tracked custody of one asset
    Custody { asset: AssetQuery },
    ContractInfo {},
}

/// Asset selector for custody queries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetQuery {
    Native {},
    Erc20 { token: Address },
    Erc721 { token: Address, token_id: U256 },
    Erc1155 { token: Address, id: U256 },
}

// ============================================================================
// Query Responses
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigResponse {
    pub owner: Address,
    pub threshold: u64,
    pub signers_mode: bool,
    pub signer_count: u32,
    pub paused: bool,
    pub pause_manager: Address,
    pub implementation: Address,
    pub chain_id: u64,
    pub contract_address: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignersResponse {
    pub signers: Vec<Address>,
    pub threshold: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IsSignerResponse {
    pub is_signer: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonceResponse {
    pub domain_key: B256,
    pub nonce: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningDigestResponse {
    pub domain_key: B256,
    pub nonce: u64,
    /// `keccak256(abi.encode(domainKey, nonce, self, chainId))`
    pub digest: B256,
    /// EIP-191 message hash actually recovered against
    pub eth_signed_hash: B256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalDigestResponse {
    pub digest: B256,
    pub eth_signed_hash: B256,
    pub hash_used: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IsHashUsedResponse {
    pub used: bool,
    /// `keccak256(abi.encode(txHash, txNonce))`
    pub digest: B256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoverResponse {
    pub asset: Address,
    pub manager: Address,
    pub version: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustodyResponse {
    /// Locked amount; 1 or 0 for an ERC721 token id
    pub amount: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractInfoResponse {
    pub contract: String,
    pub version: String,
}
