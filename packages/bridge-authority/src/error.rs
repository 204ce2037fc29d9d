//! Error types for the bridge authority engine
//!
//! Every failure maps onto one of three categories (see [`ErrorKind`]). Errors are
//! always surfaced to the caller and never retried internally; after any failure the
//! caller must re-sign against the current nonce.

use alloy::primitives::{Address, B256, U256};
use thiserror::Error;

/// Failure category of an [`AuthorityError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad input or state precondition (zero address, used hash, stale version, ...)
    PreconditionViolation,
    /// Missing, invalid or insufficient authority
    AuthorizationFailure,
    /// The bridge is in a state that forbids the operation (paused, disabled path)
    OperationalStateViolation,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthorityError {
    // ========================================================================
    // Precondition Violations
    // ========================================================================

    #[error("Signers already initialized")]
    AlreadyInitialized,

    #[error("Zero address is not allowed for {field}")]
    ZeroAddress { field: &'static str },

    #[error("Threshold must be greater than zero")]
    ZeroThreshold,

    #[error("Signer {signer} shares prefix byte 0x{prefix:02x} with signer {existing}")]
    SignerPrefixCollision {
        signer: Address,
        existing: Address,
        prefix: u8,
    },

    #[error("Origin transaction already processed: {digest}")]
    HashAlreadyUsed { digest: B256 },

    #[error("Handover version {requested} must be greater than current version {current}")]
    StaleHandoverVersion { requested: u64, current: u64 },

    #[error("Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    #[error("Insufficient custody for {asset}: available {available}, requested {requested}")]
    InsufficientCustody {
        asset: String,
        available: U256,
        requested: U256,
    },

    #[error("Token {token_id} of {token} is not held in custody")]
    TokenNotInCustody { token: Address, token_id: U256 },

    #[error("Token {token_id} of {token} is already held in custody")]
    TokenAlreadyInCustody { token: Address, token_id: U256 },

    // ========================================================================
    // Authorization Failures
    // ========================================================================

    #[error("Unauthorized: only owner can perform this action (caller {caller})")]
    Unauthorized { caller: Address },

    #[error("Unauthorized: only pause manager can perform this action (caller {caller})")]
    UnauthorizedPauseManager { caller: Address },

    #[error("Unauthorized: only handover manager can perform this action (caller {caller})")]
    UnauthorizedManager { caller: Address },

    #[error("Insufficient signatures: got {got}, need {required}")]
    InsufficientSignatures { got: usize, required: u64 },

    #[error("Invalid signature at index {index}: {reason}")]
    InvalidSignature { index: usize, reason: String },

    #[error("Recovered signer {signer} is not registered")]
    UnknownSigner { signer: Address },

    #[error("Duplicate signer {signer} (prefix byte 0x{prefix:02x} already used)")]
    DuplicateSigner { signer: Address, prefix: u8 },

    // ========================================================================
    // Operational State Violations
    // ========================================================================

    #[error("Bridge is paused")]
    BridgePaused,

    #[error("Bridge is already paused")]
    AlreadyPaused,

    #[error("Bridge is not paused")]
    NotPaused,

    #[error("Direct upgrades are disabled: use upgrade_with_signatures")]
    UpgradeDisabled,
}

impl AuthorityError {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthorityError::AlreadyInitialized
            | AuthorityError::ZeroAddress { .. }
            | AuthorityError::ZeroThreshold
            | AuthorityError::SignerPrefixCollision { .. }
            | AuthorityError::HashAlreadyUsed { .. }
            | AuthorityError::StaleHandoverVersion { .. }
            | AuthorityError::InvalidAmount { .. }
            | AuthorityError::InsufficientCustody { .. }
            | AuthorityError::TokenNotInCustody { .. }
            | AuthorityError::TokenAlreadyInCustody { .. } => ErrorKind::PreconditionViolation,

            AuthorityError::Unauthorized { .. }
            | AuthorityError::UnauthorizedPauseManager { .. }
            | AuthorityError::UnauthorizedManager { .. }
            | AuthorityError::InsufficientSignatures { .. }
            | AuthorityError::InvalidSignature { .. }
            | AuthorityError::UnknownSigner { .. }
            | AuthorityError::DuplicateSigner { .. } => ErrorKind::AuthorizationFailure,

            AuthorityError::BridgePaused
            | AuthorityError::AlreadyPaused
            | AuthorityError::NotPaused
            | AuthorityError::UpgradeDisabled => ErrorKind::OperationalStateViolation,
        }
    }
}
