//! Hash computation for authorization digests
//!
//! Every digest produced here must match the Solidity contracts bit for bit so that
//! signatures collected off-chain verify on every implementation.
//!
//! # Encoding
//! All encodings follow `abi.encode` for static types: each field occupies one
//! 32-byte word, integers are big-endian and left-padded, addresses are left-padded
//! to 32 bytes.
//!
//! # Signed pre-image (128 bytes)
//! - Bytes 0-31:   domain key (bytes32)
//! - Bytes 32-63:  nonce (uint256)
//! - Bytes 64-95:  contract address (address)
//! - Bytes 96-127: chain id (uint256)
//!
//! Signers sign the EIP-191 form of the pre-image:
//! `keccak256("\x19Ethereum Signed Message:\n32" || preimage)`.

use alloy::primitives::{eip191_hash_message, Address, B256, U256};
use tiny_keccak::{Hasher, Keccak};

use crate::state::ContractEnv;

/// Compute keccak256 hash of arbitrary data
pub fn keccak256(data: &[u8]) -> B256 {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    B256::from(output)
}

/// Word-aligned `abi.encode` builder for static Solidity types
#[derive(Debug, Clone, Default)]
pub struct AbiWords {
    data: Vec<u8>,
}

impl AbiWords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a `bytes32` word
    pub fn bytes32(mut self, value: B256) -> Self {
        self.data.extend_from_slice(value.as_slice());
        self
    }

    /// Append an `address` (20 bytes go into bytes 12-31 of the word)
    pub fn address(mut self, value: Address) -> Self {
        let mut word = [0u8; 32];
        word[12..].copy_from_slice(value.as_slice());
        self.data.extend_from_slice(&word);
        self
    }

    /// Append a `uint256`
    pub fn uint(mut self, value: U256) -> Self {
        self.data.extend_from_slice(&value.to_be_bytes::<32>());
        self
    }

    /// Append a `uint64` widened to `uint256` (8 bytes go into bytes 24-31)
    pub fn uint64(mut self, value: u64) -> Self {
        let mut word = [0u8; 32];
        word[24..].copy_from_slice(&value.to_be_bytes());
        self.data.extend_from_slice(&word);
        self
    }

    /// Append a `bool` (0 or 1 in the last byte)
    pub fn boolean(mut self, value: bool) -> Self {
        let mut word = [0u8; 32];
        word[31] = value as u8;
        self.data.extend_from_slice(&word);
        self
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// keccak256 of the encoded words
    pub fn hash(&self) -> B256 {
        keccak256(&self.data)
    }
}

/// Tag identifying an operation kind: `keccak256(name)`
pub fn operation_tag(name: &str) -> B256 {
    keccak256(name.as_bytes())
}

/// Hash of an address list, matching `keccak256(abi.encodePacked(address[]))`
///
/// `abi.encodePacked` pads array elements to full words, so each address is
/// left-padded to 32 bytes.
pub fn address_list_hash(addresses: &[Address]) -> B256 {
    addresses
        .iter()
        .fold(AbiWords::new(), |words, addr| words.address(*addr))
        .hash()
}

/// The pre-image signers sign for a nonce-bound operation
///
/// Matches `keccak256(abi.encode(domainKey, nonce, address(this), block.chainid))`.
pub fn signing_preimage(domain_key: B256, nonce: u64, env: &ContractEnv) -> B256 {
    AbiWords::new()
        .bytes32(domain_key)
        .uint64(nonce)
        .address(env.address)
        .uint64(env.chain_id)
        .hash()
}

/// EIP-191 personal message hash of a 32-byte digest (`toEthSignedMessageHash`)
pub fn eth_signed_message_hash(digest: &B256) -> B256 {
    eip191_hash_message(digest.as_slice())
}

/// Digest identifying an origin-chain transaction: `keccak256(abi.encode(txHash, txNonce))`
pub fn origin_tx_digest(tx_hash: B256, tx_nonce: u64) -> B256 {
    AbiWords::new().bytes32(tx_hash).uint64(tx_nonce).hash()
}

/// Convert a 32-byte hash to a 0x-prefixed hex string (for logging)
pub fn bytes32_to_hex(bytes: &B256) -> String {
    format!("0x{}", hex::encode(bytes.as_slice()))
}

/// Parse hex string (with or without 0x prefix) to a 32-byte hash
pub fn hex_to_bytes32(value: &str) -> Result<B256, String> {
    let value = value.strip_prefix("0x").unwrap_or(value);
    let bytes = hex::decode(value).map_err(|e| format!("Invalid hex: {}", e))?;
    if bytes.len() != 32 {
        return Err(format!("Expected 32 bytes, got {}", bytes.len()));
    }
    Ok(B256::from_slice(&bytes))
}
