//! Query handlers for the bridge authority.
//!
//! Queries are pure reads of the bridge state.

use alloy::primitives::{Address, B256, U256};

use crate::assets::Withdrawal;
use crate::contract::Bridge;
use crate::domain::AuthDomain;
use crate::hash::{eth_signed_message_hash, origin_tx_digest};
use crate::msg::{
    AssetQuery, ConfigResponse, ContractInfoResponse, CustodyResponse, HandoverResponse,
    IsHashUsedResponse, IsSignerResponse, NonceResponse, SignersResponse, SigningDigestResponse,
    WithdrawalDigestResponse,
};
use crate::state::{CONTRACT_NAME, CONTRACT_VERSION};

// ============================================================================
// Core Queries
// ============================================================================

/// Query bridge configuration.
pub fn query_config(bridge: &Bridge) -> ConfigResponse {
    let signers = bridge.signers();
    ConfigResponse {
        owner: signers.owner(),
        threshold: signers.threshold(),
        signers_mode: signers.signers_mode(),
        signer_count: signers.get_signers().len() as u32,
        paused: bridge.pause().is_paused(),
        pause_manager: bridge.pause().pause_manager(),
        implementation: bridge.upgrade().implementation(),
        chain_id: bridge.env().chain_id,
        contract_address: bridge.env().address,
    }
}

pub fn query_contract_info() -> ContractInfoResponse {
    ContractInfoResponse {
        contract: CONTRACT_NAME.to_string(),
        version: CONTRACT_VERSION.to_string(),
    }
}

// ============================================================================
// Signer Queries
// ============================================================================

pub fn query_signers(bridge: &Bridge) -> SignersResponse {
    SignersResponse {
        signers: bridge.signers().get_signers().to_vec(),
        threshold: bridge.signers().threshold(),
    }
}

pub fn query_is_signer(bridge: &Bridge, address: Address) -> IsSignerResponse {
    IsSignerResponse {
        is_signer: bridge.signers().is_signer(&address),
    }
}

/// Next nonce of a domain.
pub fn query_nonce(bridge: &Bridge, domain: &AuthDomain) -> NonceResponse {
    let domain_key = domain.key();
    NonceResponse {
        domain_key,
        nonce: bridge.signers().nonce(&domain_key),
    }
}

/// Pre-image offline signers must sign for `domain` right now.
pub fn query_signing_digest(bridge: &Bridge, domain: &AuthDomain) -> SigningDigestResponse {
    let domain_key = domain.key();
    let digest = bridge.signers().signing_digest(bridge.env(), domain);
    SigningDigestResponse {
        domain_key,
        nonce: bridge.signers().nonce(&domain_key),
        digest,
        eth_signed_hash: eth_signed_message_hash(&digest),
    }
}

// ============================================================================
// Replay Protection Queries
// ============================================================================

pub fn query_withdrawal_digest(
    bridge: &Bridge,
    withdrawal: &Withdrawal,
    tx_hash: B256,
    tx_nonce: u64,
) -> WithdrawalDigestResponse {
    let digest = withdrawal.digest(tx_hash, tx_nonce, bridge.env());
    WithdrawalDigestResponse {
        digest,
        eth_signed_hash: eth_signed_message_hash(&digest),
        hash_used: bridge.hashes().contains(tx_hash, tx_nonce),
    }
}

pub fn query_is_hash_used(bridge: &Bridge, tx_hash: B256, tx_nonce: u64) -> IsHashUsedResponse {
    IsHashUsedResponse {
        used: bridge.hashes().contains(tx_hash, tx_nonce),
        digest: origin_tx_digest(tx_hash, tx_nonce),
    }
}

// ============================================================================
// Handover & Custody Queries
// ============================================================================

pub fn query_handover(bridge: &Bridge) -> HandoverResponse {
    let handover = bridge.handover();
    HandoverResponse {
        asset: handover.asset(),
        manager: handover.manager(),
        version: handover.version(),
    }
}

pub fn query_custody(bridge: &Bridge, asset: &AssetQuery) -> CustodyResponse {
    let custody = bridge.custody();
    let amount = match asset {
        AssetQuery::Native {} => custody.native_balance(),
        AssetQuery::Erc20 { token } => custody.erc20_balance(token),
        AssetQuery::Erc721 { token, token_id } => {
            if custody.holds_erc721(token, token_id) {
                U256::from(1u8)
            } else {
                U256::ZERO
            }
        }
        AssetQuery::Erc1155 { token, id } => custody.erc1155_balance(token, id),
    };
    CustodyResponse { amount }
}
