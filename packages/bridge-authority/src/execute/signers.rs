//! Signer set handlers.
//!
//! Every operation here goes through the owner-or-signers gate with its own
//! nonce domain.

use alloy::primitives::{Address, Bytes};

use crate::contract::Bridge;
use crate::error::AuthorityError;
use crate::events::{Event, Response};
use crate::state::MessageInfo;

/// Change the signature threshold.
pub fn execute_set_threshold(
    bridge: &mut Bridge,
    info: MessageInfo,
    threshold: u64,
    signatures: Vec<Bytes>,
) -> Result<Response, AuthorityError> {
    let previous = bridge
        .signers
        .set_threshold(&bridge.env, info.sender, threshold, &signatures)?;

    Ok(Response::new()
        .add_attribute("method", "set_threshold")
        .add_attribute("threshold", threshold)
        .add_event(Event::ThresholdChanged {
            previous,
            threshold,
        }))
}

/// Add signers; existing members are skipped.
pub fn execute_add_signers(
    bridge: &mut Bridge,
    info: MessageInfo,
    signers: Vec<Address>,
    signatures: Vec<Bytes>,
) -> Result<Response, AuthorityError> {
    let added = bridge
        .signers
        .add_signers(&bridge.env, info.sender, &signers, &signatures)?;

    Ok(Response::new()
        .add_attribute("method", "add_signers")
        .add_attribute("added_count", added.len())
        .add_attribute("signer_count", bridge.signers.get_signers().len())
        .add_event(Event::SignersAdded { signers: added }))
}

/// Remove signers; absent addresses are skipped.
pub fn execute_remove_signers(
    bridge: &mut Bridge,
    info: MessageInfo,
    signers: Vec<Address>,
    signatures: Vec<Bytes>,
) -> Result<Response, AuthorityError> {
    let removed = bridge
        .signers
        .remove_signers(&bridge.env, info.sender, &signers, &signatures)?;

    Ok(Response::new()
        .add_attribute("method", "remove_signers")
        .add_attribute("removed_count", removed.len())
        .add_attribute("signer_count", bridge.signers.get_signers().len())
        .add_event(Event::SignersRemoved { signers: removed }))
}

/// Switch between owner mode and signers mode.
pub fn execute_toggle_mode(
    bridge: &mut Bridge,
    info: MessageInfo,
    signers_mode: bool,
    signatures: Vec<Bytes>,
) -> Result<Response, AuthorityError> {
    bridge
        .signers
        .toggle_mode(&bridge.env, info.sender, signers_mode, &signatures)?;

    Ok(Response::new()
        .add_attribute("method", "toggle_mode")
        .add_attribute("signers_mode", signers_mode)
        .add_event(Event::ModeToggled { signers_mode }))
}

/// Hand the owner role to `new_owner`.
pub fn execute_transfer_ownership(
    bridge: &mut Bridge,
    info: MessageInfo,
    new_owner: Address,
    signatures: Vec<Bytes>,
) -> Result<Response, AuthorityError> {
    let previous = bridge
        .signers
        .transfer_ownership(&bridge.env, info.sender, new_owner, &signatures)?;

    Ok(Response::new()
        .add_attribute("method", "transfer_ownership")
        .add_attribute("new_owner", new_owner)
        .add_event(Event::OwnershipTransferred {
            previous,
            new_owner,
        }))
}
