//! Execution results: key/value attributes plus typed events

use alloy::primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use crate::assets::AssetKind;

/// Typed event emitted by a successful execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Initialized {
        owner: Address,
        threshold: u64,
        signers_mode: bool,
        signers: Vec<Address>,
    },
    SignersAdded {
        signers: Vec<Address>,
    },
    SignersRemoved {
        signers: Vec<Address>,
    },
    ThresholdChanged {
        previous: u64,
        threshold: u64,
    },
    ModeToggled {
        signers_mode: bool,
    },
    OwnershipTransferred {
        previous: Address,
        new_owner: Address,
    },
    Paused {
        by: Address,
    },
    Unpaused {
        by: Address,
    },
    PauseManagerChanged {
        previous: Address,
        pause_manager: Address,
    },
    HashAdded {
        tx_hash: B256,
        tx_nonce: u64,
        digest: B256,
    },
    Deposited {
        kind: AssetKind,
        from: Address,
        to: Address,
        token: Option<Address>,
        id: Option<U256>,
        amount: U256,
    },
    Withdrawn {
        kind: AssetKind,
        to: Address,
        token: Option<Address>,
        id: Option<U256>,
        amount: U256,
        tx_hash: B256,
        tx_nonce: u64,
    },
    Upgraded {
        previous: Address,
        implementation: Address,
    },
    HandoverInitialized {
        asset: Address,
        manager: Address,
        version: u64,
    },
    ManagerActionPerformed {
        manager: Address,
        asset: Address,
        amount: U256,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub attributes: Vec<Attribute>,
    pub events: Vec<Event>,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_attribute(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.attributes.push(Attribute {
            key: key.into(),
            value: value.to_string(),
        });
        self
    }

    pub fn add_event(mut self, event: Event) -> Self {
        self.events.push(event);
        self
    }

    /// First attribute value stored under `key`
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.key == key)
            .map(|a| a.value.as_str())
    }

    /// Value of the `method` attribute every handler sets
    pub fn method(&self) -> Option<&str> {
        self.attribute("method")
    }
}
