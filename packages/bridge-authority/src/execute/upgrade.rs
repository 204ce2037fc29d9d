//! Upgrade handlers and the post-upgrade manager action.

use alloy::primitives::{Address, Bytes};
use tracing::{info, warn};

use super::with_authorization;
use crate::contract::Bridge;
use crate::error::AuthorityError;
use crate::events::{Event, Response};
use crate::state::MessageInfo;
use crate::upgrade::InitPayload;

// ============================================================================
// Upgrades
// ============================================================================

/// Bare upgrade path; always rejected.
pub fn execute_upgrade_to(
    bridge: &mut Bridge,
    implementation: Address,
) -> Result<Response, AuthorityError> {
    bridge.upgrade.upgrade_to(implementation)?;
    Ok(Response::new().add_attribute("method", "upgrade_to"))
}

/// Authorized upgrade without initializer.
pub fn execute_upgrade_with_signatures(
    bridge: &mut Bridge,
    info: MessageInfo,
    implementation: Address,
    signatures: Vec<Bytes>,
) -> Result<Response, AuthorityError> {
    let previous = bridge.upgrade.upgrade_with_signatures(
        &mut bridge.signers,
        &bridge.env,
        info.sender,
        implementation,
        &signatures,
    )?;

    Ok(Response::new()
        .add_attribute("method", "upgrade_with_signatures")
        .add_attribute("implementation", implementation)
        .add_event(Event::Upgraded {
            previous,
            implementation,
        }))
}

/// Authorized upgrade followed by `payload` against the new state.
///
/// A failing payload restores the previous implementation; the upgrade nonce
/// stays consumed.
pub fn execute_upgrade_with_signatures_and_call(
    bridge: &mut Bridge,
    info: MessageInfo,
    implementation: Address,
    signatures: Vec<Bytes>,
    payload: InitPayload,
) -> Result<Response, AuthorityError> {
    let auth = bridge.upgrade.authorize_upgrade(
        &mut bridge.signers,
        &bridge.env,
        info.sender,
        implementation,
        &signatures,
    )?;
    let previous = bridge.upgrade.swap(implementation);

    let event = match run_init_payload(bridge, &payload) {
        Ok(event) => event,
        Err(e) => {
            warn!(
                implementation = %implementation,
                error = %e,
                "Init payload failed, upgrade rolled back"
            );
            bridge.upgrade.swap(previous);
            return Err(e);
        }
    };

    Ok(with_authorization(
        Response::new()
            .add_attribute("method", "upgrade_with_signatures_and_call")
            .add_attribute("implementation", implementation),
        &auth,
    )
    .add_event(Event::Upgraded {
        previous,
        implementation,
    })
    .add_event(event))
}

fn run_init_payload(bridge: &mut Bridge, payload: &InitPayload) -> Result<Event, AuthorityError> {
    match *payload {
        InitPayload::InitHandover {
            asset,
            manager,
            version,
        } => {
            bridge.handover.init_handover(asset, manager, version)?;
            Ok(Event::HandoverInitialized {
                asset,
                manager,
                version,
            })
        }
    }
}

// ============================================================================
// Manager Handover
// ============================================================================

/// Drain the tracked custody balance of the handover asset.
pub fn execute_perform_privileged_action(
    bridge: &mut Bridge,
    info: MessageInfo,
) -> Result<Response, AuthorityError> {
    bridge.handover.ensure_manager(info.sender)?;

    let asset = bridge.handover.asset();
    let amount = bridge.custody.drain_erc20(&asset);
    info!(manager = %info.sender, asset = %asset, amount = %amount, "Handover balance drained");

    Ok(Response::new()
        .add_attribute("method", "perform_privileged_action")
        .add_attribute("asset", asset)
        .add_attribute("amount", amount)
        .add_event(Event::ManagerActionPerformed {
            manager: info.sender,
            asset,
            amount,
        }))
}
