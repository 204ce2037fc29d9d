//! CL8Y Bridge Authority - Entry Points
//!
//! The bridge state is a single owned aggregate. Execution is modularized into:
//! - `execute/` - Execute message handlers
//! - `query` - Query message handlers

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::assets::Custody;
use crate::error::AuthorityError;
use crate::events::{Event, Response};
use crate::execute::{
    execute_add_hash, execute_add_signers, execute_deposit, execute_pause,
    execute_perform_privileged_action, execute_remove_signers, execute_set_pause_manager,
    execute_set_threshold, execute_toggle_mode, execute_transfer_ownership, execute_unpause,
    execute_upgrade_to, execute_upgrade_with_signatures, execute_upgrade_with_signatures_and_call,
    execute_withdraw,
};
use crate::handover::ManagerHandover;
use crate::hashes::HashRegistry;
use crate::msg::{ExecuteMsg, InstantiateMsg, QueryMsg};
use crate::pause::PauseControl;
use crate::query::{
    query_config, query_contract_info, query_custody, query_handover, query_is_hash_used,
    query_is_signer, query_nonce, query_signers, query_signing_digest, query_withdrawal_digest,
};
use crate::signers::SignerSet;
use crate::state::{ContractEnv, MessageInfo};
use crate::upgrade::UpgradeGate;

// ============================================================================
// State
// ============================================================================

/// Complete bridge state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bridge {
    pub(crate) env: ContractEnv,
    pub(crate) signers: SignerSet,
    pub(crate) hashes: HashRegistry,
    pub(crate) pause: PauseControl,
    pub(crate) upgrade: UpgradeGate,
    pub(crate) handover: ManagerHandover,
    pub(crate) custody: Custody,
}

impl Bridge {
    pub fn env(&self) -> &ContractEnv {
        &self.env
    }

    pub fn signers(&self) -> &SignerSet {
        &self.signers
    }

    pub fn hashes(&self) -> &HashRegistry {
        &self.hashes
    }

    pub fn pause(&self) -> &PauseControl {
        &self.pause
    }

    pub fn upgrade(&self) -> &UpgradeGate {
        &self.upgrade
    }

    pub fn handover(&self) -> &ManagerHandover {
        &self.handover
    }

    pub fn custody(&self) -> &Custody {
        &self.custody
    }
}

// ============================================================================
// Instantiate
// ============================================================================

pub fn instantiate(
    env: ContractEnv,
    msg: InstantiateMsg,
) -> Result<(Bridge, Response), AuthorityError> {
    if msg.owner.is_zero() {
        return Err(AuthorityError::ZeroAddress { field: "owner" });
    }
    if env.address.is_zero() {
        return Err(AuthorityError::ZeroAddress {
            field: "contract_address",
        });
    }

    let mut signers = SignerSet::new(msg.owner);
    signers.init_signers(&msg.signers, msg.threshold, msg.signers_mode)?;

    let pause_manager = msg.pause_manager.unwrap_or_default();
    let bridge = Bridge {
        env,
        signers,
        hashes: HashRegistry::new(),
        pause: PauseControl::new(pause_manager),
        upgrade: UpgradeGate::new(msg.implementation),
        handover: ManagerHandover::default(),
        custody: Custody::default(),
    };

    info!(
        owner = %msg.owner,
        chain_id = env.chain_id,
        contract = %env.address,
        "Bridge authority instantiated"
    );

    let response = Response::new()
        .add_attribute("method", "instantiate")
        .add_attribute("owner", msg.owner)
        .add_attribute("signer_count", bridge.signers.get_signers().len())
        .add_attribute("threshold", msg.threshold)
        .add_attribute("signers_mode", msg.signers_mode)
        .add_attribute("pause_manager", pause_manager)
        .add_event(Event::Initialized {
            owner: msg.owner,
            threshold: msg.threshold,
            signers_mode: msg.signers_mode,
            signers: bridge.signers.get_signers().to_vec(),
        });

    Ok((bridge, response))
}

// ============================================================================
// Execute
// ============================================================================

pub fn execute(
    bridge: &mut Bridge,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, AuthorityError> {
    match msg {
        // Signer set
        ExecuteMsg::SetThreshold {
            threshold,
            signatures,
        } => execute_set_threshold(bridge, info, threshold, signatures),
        ExecuteMsg::AddSigners {
            signers,
            signatures,
        } => execute_add_signers(bridge, info, signers, signatures),
        ExecuteMsg::RemoveSigners {
            signers,
            signatures,
        } => execute_remove_signers(bridge, info, signers, signatures),
        ExecuteMsg::ToggleMode {
            signers_mode,
            signatures,
        } => execute_toggle_mode(bridge, info, signers_mode, signatures),
        ExecuteMsg::TransferOwnership {
            new_owner,
            signatures,
        } => execute_transfer_ownership(bridge, info, new_owner, signatures),

        // Pause control
        ExecuteMsg::Pause { signatures } => execute_pause(bridge, info, signatures),
        ExecuteMsg::Unpause { signatures } => execute_unpause(bridge, info, signatures),
        ExecuteMsg::SetPauseManager {
            manager,
            signatures,
        } => execute_set_pause_manager(bridge, info, manager, signatures),

        // Replay protection
        ExecuteMsg::AddHash {
            tx_hash,
            tx_nonce,
            signatures,
        } => execute_add_hash(bridge, info, tx_hash, tx_nonce, signatures),

        // Deposits
        ExecuteMsg::DepositNative { .. }
        | ExecuteMsg::DepositErc20 { .. }
        | ExecuteMsg::DepositErc721 { .. }
        | ExecuteMsg::DepositErc1155 { .. } => match msg.deposit(info.value) {
            Some((deposit, to)) => execute_deposit(bridge, info, deposit, to),
            None => Ok(Response::new()),
        },

        // Withdrawals
        ExecuteMsg::WithdrawNative { ref signatures, .. }
        | ExecuteMsg::WithdrawErc20 { ref signatures, .. }
        | ExecuteMsg::WithdrawErc721 { ref signatures, .. }
        | ExecuteMsg::WithdrawErc1155 { ref signatures, .. } => match msg.withdrawal() {
            Some((withdrawal, tx_hash, tx_nonce)) => {
                execute_withdraw(bridge, withdrawal, tx_hash, tx_nonce, signatures)
            }
            None => Ok(Response::new()),
        },

        // Upgrades
        ExecuteMsg::UpgradeTo { implementation } => execute_upgrade_to(bridge, implementation),
        ExecuteMsg::UpgradeWithSignatures {
            implementation,
            signatures,
        } => execute_upgrade_with_signatures(bridge, info, implementation, signatures),
        ExecuteMsg::UpgradeWithSignaturesAndCall {
            implementation,
            signatures,
            payload,
        } => execute_upgrade_with_signatures_and_call(
            bridge,
            info,
            implementation,
            signatures,
            payload,
        ),

        // Manager handover
        ExecuteMsg::PerformPrivilegedAction {} => execute_perform_privileged_action(bridge, info),
    }
}

// ============================================================================
// Query
// ============================================================================

pub fn query(bridge: &Bridge, msg: QueryMsg) -> serde_json::Result<Value> {
    match msg {
        QueryMsg::Config {} => serde_json::to_value(query_config(bridge)),
        QueryMsg::Signers {} => serde_json::to_value(query_signers(bridge)),
        QueryMsg::IsSigner { address } => serde_json::to_value(query_is_signer(bridge, address)),
        QueryMsg::Nonce { domain } => serde_json::to_value(query_nonce(bridge, &domain)),
        QueryMsg::SigningDigest { domain } => {
            serde_json::to_value(query_signing_digest(bridge, &domain))
        }
        QueryMsg::WithdrawalDigest {
            withdrawal,
            tx_hash,
            tx_nonce,
        } => serde_json::to_value(query_withdrawal_digest(
            bridge,
            &withdrawal,
            tx_hash,
            tx_nonce,
        )),
        QueryMsg::IsHashUsed { tx_hash, tx_nonce } => {
            serde_json::to_value(query_is_hash_used(bridge, tx_hash, tx_nonce))
        }
        QueryMsg::Handover {} => serde_json::to_value(query_handover(bridge)),
        QueryMsg::Custody { asset } => serde_json::to_value(query_custody(bridge, &asset)),
        QueryMsg::ContractInfo {} => serde_json::to_value(query_contract_info()),
    }
}
