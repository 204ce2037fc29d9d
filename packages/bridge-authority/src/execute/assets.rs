//! Deposit and withdrawal handlers.
//!
//! Both are blocked while the bridge is paused. A withdrawal is released only
//! when:
//! 1. its origin transaction is unused
//! 2. threshold signatures over its digest verify
//! 3. custody covers it
//!
//! Withdrawals are signed over their own digest, never a nonce domain, so a
//! rejected withdrawal leaves no state behind.

use alloy::primitives::{Address, Bytes, B256, U256};
use tracing::{info, warn};

use crate::assets::{Deposit, Withdrawal};
use crate::contract::Bridge;
use crate::error::AuthorityError;
use crate::events::{Event, Response};
use crate::hash::bytes32_to_hex;
use crate::state::MessageInfo;

// ============================================================================
// Deposits
// ============================================================================

/// Lock an asset in custody for `to` on the destination chain.
pub fn execute_deposit(
    bridge: &mut Bridge,
    info: MessageInfo,
    deposit: Deposit,
    to: Address,
) -> Result<Response, AuthorityError> {
    bridge.pause.ensure_not_paused()?;
    if to.is_zero() {
        return Err(AuthorityError::ZeroAddress { field: "recipient" });
    }
    bridge.custody.lock(&deposit)?;

    let (token, id, amount) = match &deposit {
        Deposit::Native { amount } => (None, None, *amount),
        Deposit::Erc20 { token, amount } => (Some(*token), None, *amount),
        Deposit::Erc721 { token, token_id } => (Some(*token), Some(*token_id), U256::from(1u8)),
        Deposit::Erc1155 { token, id, amount } => (Some(*token), Some(*id), *amount),
    };
    let kind = deposit.kind();

    info!(
        kind = kind.as_str(),
        from = %info.sender,
        to = %to,
        amount = %amount,
        "Deposit locked"
    );

    Ok(Response::new()
        .add_attribute("method", format!("deposit_{}", kind.as_str()))
        .add_attribute("from", info.sender)
        .add_attribute("to", to)
        .add_attribute("amount", amount)
        .add_event(Event::Deposited {
            kind,
            from: info.sender,
            to,
            token,
            id,
            amount,
        }))
}

// ============================================================================
// Withdrawals
// ============================================================================

/// Release an asset authorized by threshold signatures over its digest.
pub fn execute_withdraw(
    bridge: &mut Bridge,
    withdrawal: Withdrawal,
    tx_hash: B256,
    tx_nonce: u64,
    signatures: &[Bytes],
) -> Result<Response, AuthorityError> {
    bridge.pause.ensure_not_paused()?;
    withdrawal.validate()?;
    bridge.hashes.ensure_unused(tx_hash, tx_nonce)?;

    let digest = withdrawal.digest(tx_hash, tx_nonce, &bridge.env);
    let signers = bridge
        .signers
        .check_signatures(digest, signatures)
        .map_err(|e| {
            warn!(
                tx_hash = %bytes32_to_hex(&tx_hash),
                tx_nonce,
                error = %e,
                "Withdrawal signatures rejected"
            );
            e
        })?;
    bridge.custody.ensure_releasable(&withdrawal)?;

    bridge.hashes.check_and_consume(tx_hash, tx_nonce)?;
    bridge.custody.release(&withdrawal)?;

    let (token, id, amount) = match &withdrawal {
        Withdrawal::Native { amount, .. } => (None, None, *amount),
        Withdrawal::Erc20 { token, amount, .. } => (Some(*token), None, *amount),
        Withdrawal::Erc721 {
            token, token_id, ..
        } => (Some(*token), Some(*token_id), U256::from(1u8)),
        Withdrawal::Erc1155 {
            token, id, amount, ..
        } => (Some(*token), Some(*id), *amount),
    };
    let kind = withdrawal.kind();
    let to = withdrawal.recipient();

    info!(
        kind = kind.as_str(),
        to = %to,
        amount = %amount,
        tx_hash = %bytes32_to_hex(&tx_hash),
        tx_nonce,
        signature_count = signers.len(),
        "Withdrawal released"
    );

    Ok(Response::new()
        .add_attribute("method", format!("withdraw_{}", kind.as_str()))
        .add_attribute("to", to)
        .add_attribute("amount", amount)
        .add_attribute("tx_hash", bytes32_to_hex(&tx_hash))
        .add_attribute("tx_nonce", tx_nonce)
        .add_attribute("digest", bytes32_to_hex(&digest))
        .add_event(Event::Withdrawn {
            kind,
            to,
            token,
            id,
            amount,
            tx_hash,
            tx_nonce,
        }))
}
