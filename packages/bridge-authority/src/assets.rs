//! Asset custody and withdrawal digests
//!
//! Deposits lock assets in the bridge's custody ledger; withdrawals release them
//! after threshold signatures over a canonical digest. The digest binds the asset
//! parameters, the origin transaction and the bridge identity:
//!
//! ```solidity
//! keccak256(abi.encode(tag, [token], to, [id], [amount], txHash, txNonce, address(this), block.chainid))
//! ```
//!
//! with `tag = keccak256("withdrawNative" | "withdrawERC20" | "withdrawERC721" | "withdrawERC1155")`.

use std::collections::{BTreeMap, BTreeSet};

use alloy::primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use crate::error::AuthorityError;
use crate::hash::{operation_tag, AbiWords};
use crate::state::ContractEnv;

/// Asset kinds held by the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Native,
    Erc20,
    Erc721,
    Erc1155,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Native => "native",
            AssetKind::Erc20 => "erc20",
            AssetKind::Erc721 => "erc721",
            AssetKind::Erc1155 => "erc1155",
        }
    }
}

/// A single-asset withdrawal request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Withdrawal {
    Native {
        to: Address,
        amount: U256,
    },
    Erc20 {
        token: Address,
        to: Address,
        amount: U256,
    },
    Erc721 {
        token: Address,
        to: Address,
        token_id: U256,
    },
    Erc1155 {
        token: Address,
        to: Address,
        id: U256,
        amount: U256,
    },
}

impl Withdrawal {
    pub fn kind(&self) -> AssetKind {
        match self {
            Withdrawal::Native { .. } => AssetKind::Native,
            Withdrawal::Erc20 { .. } => AssetKind::Erc20,
            Withdrawal::Erc721 { .. } => AssetKind::Erc721,
            Withdrawal::Erc1155 { .. } => AssetKind::Erc1155,
        }
    }

    pub fn recipient(&self) -> Address {
        match self {
            Withdrawal::Native { to, .. }
            | Withdrawal::Erc20 { to, .. }
            | Withdrawal::Erc721 { to, .. }
            | Withdrawal::Erc1155 { to, .. } => *to,
        }
    }

    fn tag(&self) -> B256 {
        operation_tag(match self {
            Withdrawal::Native { .. } => "withdrawNative",
            Withdrawal::Erc20 { .. } => "withdrawERC20",
            Withdrawal::Erc721 { .. } => "withdrawERC721",
            Withdrawal::Erc1155 { .. } => "withdrawERC1155",
        })
    }

    /// Canonical digest the signers sign for this withdrawal
    pub fn digest(&self, tx_hash: B256, tx_nonce: u64, env: &ContractEnv) -> B256 {
        let words = AbiWords::new().bytes32(self.tag());
        let words = match self {
            Withdrawal::Native { to, amount } => words.address(*to).uint(*amount),
            Withdrawal::Erc20 { token, to, amount } => {
                words.address(*token).address(*to).uint(*amount)
            }
            Withdrawal::Erc721 {
                token,
                to,
                token_id,
            } => words.address(*token).address(*to).uint(*token_id),
            Withdrawal::Erc1155 {
                token,
                to,
                id,
                amount,
            } => words
                .address(*token)
                .address(*to)
                .uint(*id)
                .uint(*amount),
        };
        words
            .bytes32(tx_hash)
            .uint64(tx_nonce)
            .address(env.address)
            .uint64(env.chain_id)
            .hash()
    }

    /// Static input checks
    pub fn validate(&self) -> Result<(), AuthorityError> {
        if self.recipient().is_zero() {
            return Err(AuthorityError::ZeroAddress { field: "recipient" });
        }
        match self {
            Withdrawal::Native { amount, .. }
            | Withdrawal::Erc20 { amount, .. }
            | Withdrawal::Erc1155 { amount, .. }
                if amount.is_zero() =>
            {
                Err(AuthorityError::InvalidAmount {
                    reason: "Amount must be greater than zero".to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}

/// A single-asset deposit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Deposit {
    Native {
        amount: U256,
    },
    Erc20 {
        token: Address,
        amount: U256,
    },
    Erc721 {
        token: Address,
        token_id: U256,
    },
    Erc1155 {
        token: Address,
        id: U256,
        amount: U256,
    },
}

impl Deposit {
    pub fn kind(&self) -> AssetKind {
        match self {
            Deposit::Native { .. } => AssetKind::Native,
            Deposit::Erc20 { .. } => AssetKind::Erc20,
            Deposit::Erc721 { .. } => AssetKind::Erc721,
            Deposit::Erc1155 { .. } => AssetKind::Erc1155,
        }
    }
}

/// Balances held by the bridge, per asset kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Custody {
    native: U256,
    erc20: BTreeMap<Address, U256>,
    erc721: BTreeMap<Address, BTreeSet<U256>>,
    erc1155: BTreeMap<Address, BTreeMap<U256, U256>>,
}

impl Custody {
    pub fn native_balance(&self) -> U256 {
        self.native
    }

    pub fn erc20_balance(&self, token: &Address) -> U256 {
        self.erc20.get(token).copied().unwrap_or_default()
    }

    pub fn holds_erc721(&self, token: &Address, token_id: &U256) -> bool {
        self.erc721
            .get(token)
            .map(|ids| ids.contains(token_id))
            .unwrap_or(false)
    }

    pub fn erc1155_balance(&self, token: &Address, id: &U256) -> U256 {
        self.erc1155
            .get(token)
            .and_then(|ids| ids.get(id))
            .copied()
            .unwrap_or_default()
    }

    /// Lock a deposit; the ledger is unchanged on error
    pub fn lock(&mut self, deposit: &Deposit) -> Result<(), AuthorityError> {
        match deposit {
            Deposit::Native { amount } => {
                ensure_positive(amount)?;
                self.native = checked_add(self.native, *amount)?;
            }
            Deposit::Erc20 { token, amount } => {
                ensure_token(token)?;
                ensure_positive(amount)?;
                let balance = checked_add(self.erc20_balance(token), *amount)?;
                self.erc20.insert(*token, balance);
            }
            Deposit::Erc721 { token, token_id } => {
                ensure_token(token)?;
                if self.holds_erc721(token, token_id) {
                    return Err(AuthorityError::TokenAlreadyInCustody {
                        token: *token,
                        token_id: *token_id,
                    });
                }
                self.erc721.entry(*token).or_default().insert(*token_id);
            }
            Deposit::Erc1155 { token, id, amount } => {
                ensure_token(token)?;
                ensure_positive(amount)?;
                let balance = checked_add(self.erc1155_balance(token, id), *amount)?;
                self.erc1155.entry(*token).or_default().insert(*id, balance);
            }
        }
        Ok(())
    }

    /// Fail unless the withdrawal can be released in full
    pub fn ensure_releasable(&self, withdrawal: &Withdrawal) -> Result<(), AuthorityError> {
        match withdrawal {
            Withdrawal::Native { amount, .. } => {
                ensure_available("native".to_string(), self.native, *amount)
            }
            Withdrawal::Erc20 { token, amount, .. } => {
                ensure_available(token.to_string(), self.erc20_balance(token), *amount)
            }
            Withdrawal::Erc721 {
                token, token_id, ..
            } => {
                if !self.holds_erc721(token, token_id) {
                    return Err(AuthorityError::TokenNotInCustody {
                        token: *token,
                        token_id: *token_id,
                    });
                }
                Ok(())
            }
            Withdrawal::Erc1155 {
                token, id, amount, ..
            } => ensure_available(
                format!("{}#{}", token, id),
                self.erc1155_balance(token, id),
                *amount,
            ),
        }
    }

    /// Release a withdrawal; the ledger is unchanged on error
    pub fn release(&mut self, withdrawal: &Withdrawal) -> Result<(), AuthorityError> {
        self.ensure_releasable(withdrawal)?;
        match withdrawal {
            Withdrawal::Native { amount, .. } => {
                self.native -= *amount;
            }
            Withdrawal::Erc20 { token, amount, .. } => {
                let balance = self.erc20_balance(token) - *amount;
                self.erc20.insert(*token, balance);
            }
            Withdrawal::Erc721 {
                token, token_id, ..
            } => {
                if let Some(ids) = self.erc721.get_mut(token) {
                    ids.remove(token_id);
                    if ids.is_empty() {
                        self.erc721.remove(token);
                    }
                }
            }
            Withdrawal::Erc1155 {
                token, id, amount, ..
            } => {
                let balance = self.erc1155_balance(token, id) - *amount;
                self.erc1155.entry(*token).or_default().insert(*id, balance);
            }
        }
        Ok(())
    }

    /// Remove the entire ERC20 balance of `token`; returns the drained amount
    pub fn drain_erc20(&mut self, token: &Address) -> U256 {
        self.erc20.remove(token).unwrap_or_default()
    }
}

fn ensure_positive(amount: &U256) -> Result<(), AuthorityError> {
    if amount.is_zero() {
        return Err(AuthorityError::InvalidAmount {
            reason: "Amount must be greater than zero".to_string(),
        });
    }
    Ok(())
}

fn ensure_token(token: &Address) -> Result<(), AuthorityError> {
    if token.is_zero() {
        return Err(AuthorityError::ZeroAddress { field: "token" });
    }
    Ok(())
}

fn ensure_available(asset: String, available: U256, requested: U256) -> Result<(), AuthorityError> {
    if available < requested {
        return Err(AuthorityError::InsufficientCustody {
            asset,
            available,
            requested,
        });
    }
    Ok(())
}

fn checked_add(balance: U256, amount: U256) -> Result<U256, AuthorityError> {
    balance
        .checked_add(amount)
        .ok_or_else(|| AuthorityError::InvalidAmount {
            reason: "Custody balance overflow".to_string(),
        })
}
