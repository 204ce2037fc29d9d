//! Pause control and administrative hash cancellation handlers.

use alloy::primitives::{Address, Bytes, B256};
use tracing::info;

use super::with_authorization;
use crate::contract::Bridge;
use crate::domain::AuthDomain;
use crate::error::AuthorityError;
use crate::events::{Event, Response};
use crate::hash::bytes32_to_hex;
use crate::state::MessageInfo;

// ============================================================================
// Pause/Unpause
// ============================================================================

/// Pause asset operations.
pub fn execute_pause(
    bridge: &mut Bridge,
    info: MessageInfo,
    signatures: Vec<Bytes>,
) -> Result<Response, AuthorityError> {
    let auth = bridge
        .pause
        .pause(&mut bridge.signers, &bridge.env, info.sender, &signatures)?;

    Ok(with_authorization(
        Response::new().add_attribute("method", "pause"),
        &auth,
    )
    .add_event(Event::Paused { by: info.sender }))
}

/// Resume asset operations.
pub fn execute_unpause(
    bridge: &mut Bridge,
    info: MessageInfo,
    signatures: Vec<Bytes>,
) -> Result<Response, AuthorityError> {
    let auth = bridge
        .pause
        .unpause(&mut bridge.signers, &bridge.env, info.sender, &signatures)?;

    Ok(with_authorization(
        Response::new().add_attribute("method", "unpause"),
        &auth,
    )
    .add_event(Event::Unpaused { by: info.sender }))
}

/// Reassign the pause manager.
pub fn execute_set_pause_manager(
    bridge: &mut Bridge,
    info: MessageInfo,
    manager: Address,
    signatures: Vec<Bytes>,
) -> Result<Response, AuthorityError> {
    let previous = bridge.pause.set_pause_manager(
        &mut bridge.signers,
        &bridge.env,
        info.sender,
        manager,
        &signatures,
    )?;

    Ok(Response::new()
        .add_attribute("method", "set_pause_manager")
        .add_attribute("pause_manager", manager)
        .add_event(Event::PauseManagerChanged {
            previous,
            pause_manager: manager,
        }))
}

// ============================================================================
// Hash Cancellation
// ============================================================================

/// Mark an origin transaction consumed without releasing funds.
///
/// A hash that is already consumed is rejected before any nonce is spent.
pub fn execute_add_hash(
    bridge: &mut Bridge,
    info: MessageInfo,
    tx_hash: B256,
    tx_nonce: u64,
    signatures: Vec<Bytes>,
) -> Result<Response, AuthorityError> {
    bridge.hashes.ensure_unused(tx_hash, tx_nonce)?;

    let auth = bridge.signers.authorize(
        &bridge.env,
        info.sender,
        &AuthDomain::AddHash { tx_hash, tx_nonce },
        &signatures,
    )?;
    let digest = bridge.hashes.check_and_consume(tx_hash, tx_nonce)?;

    info!(
        tx_hash = %bytes32_to_hex(&tx_hash),
        tx_nonce,
        "Origin transaction cancelled"
    );

    Ok(with_authorization(
        Response::new()
            .add_attribute("method", "add_hash")
            .add_attribute("tx_hash", bytes32_to_hex(&tx_hash))
            .add_attribute("tx_nonce", tx_nonce),
        &auth,
    )
    .add_event(Event::HashAdded {
        tx_hash,
        tx_nonce,
        digest,
    }))
}
