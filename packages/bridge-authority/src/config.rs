//! Authority CLI configuration
//!
//! Loaded from the environment (and `.env` if present). Private keys are never
//! part of the configuration.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use alloy::primitives::Address;
use eyre::{eyre, Result, WrapErr};

use crate::msg::InstantiateMsg;
use crate::state::ContractEnv;

/// Default snapshot location
pub const DEFAULT_STATE_FILE: &str = "authority-state.json";

/// Authority configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Chain the bridge is deployed on
    pub chain_id: u64,
    /// Bridge contract address bound into every digest
    pub contract_address: Address,
    /// Owner used while signers mode is off
    pub owner: Address,
    /// Initial signer roster
    pub signers: Vec<Address>,
    /// Required signatures in signers mode
    pub threshold: u64,
    /// Start in signers mode
    pub signers_mode: bool,
    /// Delegated pause authority
    pub pause_manager: Option<Address>,
    /// Initial implementation reference
    pub implementation: Address,
    /// Snapshot location
    pub state_file: PathBuf,
}

impl Config {
    /// Load configuration from environment
    pub fn load() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded .env from {:?}", path);
        }

        let config = Self {
            chain_id: env::var("AUTHORITY_CHAIN_ID")
                .map_err(|_| eyre!("AUTHORITY_CHAIN_ID required"))?
                .trim()
                .parse()
                .map_err(|_| eyre!("Invalid AUTHORITY_CHAIN_ID"))?,
            contract_address: required_address("AUTHORITY_CONTRACT_ADDRESS")?,
            owner: required_address("AUTHORITY_OWNER")?,
            signers: parse_address_list(&env::var("AUTHORITY_SIGNERS").unwrap_or_default())
                .wrap_err("Invalid AUTHORITY_SIGNERS")?,
            threshold: env::var("AUTHORITY_THRESHOLD")
                .ok()
                .map(|v| v.trim().parse())
                .transpose()
                .map_err(|_| eyre!("Invalid AUTHORITY_THRESHOLD"))?
                .unwrap_or(1),
            signers_mode: env::var("AUTHORITY_SIGNERS_MODE")
                .ok()
                .map(|v| parse_bool(&v))
                .transpose()
                .wrap_err("Invalid AUTHORITY_SIGNERS_MODE")?
                .unwrap_or(false),
            pause_manager: optional_address("AUTHORITY_PAUSE_MANAGER")?,
            implementation: optional_address("AUTHORITY_IMPLEMENTATION")?.unwrap_or_default(),
            state_file: env::var("AUTHORITY_STATE_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_STATE_FILE)),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.chain_id == 0 {
            return Err(eyre!("chain_id must be greater than zero"));
        }
        if self.contract_address.is_zero() {
            return Err(eyre!("contract_address cannot be the zero address"));
        }
        if self.owner.is_zero() {
            return Err(eyre!("owner cannot be the zero address"));
        }
        if self.signers.iter().any(|s| s.is_zero()) {
            return Err(eyre!("signers cannot contain the zero address"));
        }
        if self.signers_mode && self.threshold == 0 {
            return Err(eyre!("threshold must be greater than zero in signers mode"));
        }
        if self.signers_mode && self.threshold > self.signers.len() as u64 {
            tracing::warn!(
                threshold = self.threshold,
                signer_count = self.signers.len(),
                "Threshold exceeds signer count, signature-gated operations are locked"
            );
        }
        Ok(())
    }

    pub fn contract_env(&self) -> ContractEnv {
        ContractEnv {
            address: self.contract_address,
            chain_id: self.chain_id,
        }
    }

    pub fn to_instantiate_msg(&self) -> InstantiateMsg {
        InstantiateMsg {
            owner: self.owner,
            signers: self.signers.clone(),
            threshold: self.threshold,
            signers_mode: self.signers_mode,
            pause_manager: self.pause_manager,
            implementation: self.implementation,
        }
    }
}

fn required_address(key: &str) -> Result<Address> {
    let value = env::var(key).map_err(|_| eyre!("{} required", key))?;
    Address::from_str(value.trim()).map_err(|e| eyre!("Invalid {}: {}", key, e))
}

fn optional_address(key: &str) -> Result<Option<Address>> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Address::from_str(value.trim())
            .map(Some)
            .map_err(|e| eyre!("Invalid {}: {}", key, e)),
        _ => Ok(None),
    }
}

/// Parse a comma separated list of addresses, ignoring empty entries
pub fn parse_address_list(value: &str) -> Result<Vec<Address>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| Address::from_str(s).map_err(|e| eyre!("invalid address {}: {}", s, e)))
        .collect()
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        other => Err(eyre!("expected a boolean, got {}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const OWNER: &str = "0x0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a";
    const CONTRACT: &str = "0xb1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1";
    const SIGNER_A: &str = "0x1111111111111111111111111111111111111111";
    const SIGNER_B: &str = "0x2222222222222222222222222222222222222222";

    const KEYS: &[&str] = &[
        "AUTHORITY_CHAIN_ID",
        "AUTHORITY_CONTRACT_ADDRESS",
        "AUTHORITY_OWNER",
        "AUTHORITY_SIGNERS",
        "AUTHORITY_THRESHOLD",
        "AUTHORITY_SIGNERS_MODE",
        "AUTHORITY_PAUSE_MANAGER",
        "AUTHORITY_IMPLEMENTATION",
        "AUTHORITY_STATE_FILE",
    ];

    fn clear_env() {
        for key in KEYS {
            env::remove_var(key);
        }
    }

    fn set_required() {
        env::set_var("AUTHORITY_CHAIN_ID", "31337");
        env::set_var("AUTHORITY_CONTRACT_ADDRESS", CONTRACT);
        env::set_var("AUTHORITY_OWNER", OWNER);
    }

    #[test]
    #[serial]
    fn test_load_defaults() {
        clear_env();
        set_required();

        let config = Config::load().unwrap();
        assert_eq!(config.chain_id, 31337);
        assert_eq!(config.owner, Address::repeat_byte(0x0a));
        assert!(config.signers.is_empty());
        assert_eq!(config.threshold, 1);
        assert!(!config.signers_mode);
        assert_eq!(config.pause_manager, None);
        assert!(config.implementation.is_zero());
        assert_eq!(config.state_file, PathBuf::from(DEFAULT_STATE_FILE));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_load_full() {
        clear_env();
        set_required();
        env::set_var("AUTHORITY_SIGNERS", format!("{}, {}", SIGNER_A, SIGNER_B));
        env::set_var("AUTHORITY_THRESHOLD", "2");
        env::set_var("AUTHORITY_SIGNERS_MODE", "true");
        env::set_var("AUTHORITY_PAUSE_MANAGER", SIGNER_A);
        env::set_var("AUTHORITY_STATE_FILE", "/tmp/authority.json");

        let config = Config::load().unwrap();
        assert_eq!(
            config.signers,
            vec![Address::repeat_byte(0x11), Address::repeat_byte(0x22)]
        );
        assert_eq!(config.threshold, 2);
        assert!(config.signers_mode);
        assert_eq!(config.pause_manager, Some(Address::repeat_byte(0x11)));

        let msg = config.to_instantiate_msg();
        assert_eq!(msg.signers.len(), 2);
        assert_eq!(config.contract_env().address, Address::repeat_byte(0xb1));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_missing_required() {
        clear_env();
        env::set_var("AUTHORITY_CHAIN_ID", "1");
        assert!(Config::load().is_err());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_rejects_bad_values() {
        clear_env();
        set_required();
        env::set_var("AUTHORITY_SIGNERS_MODE", "maybe");
        assert!(Config::load().is_err());

        env::set_var("AUTHORITY_SIGNERS_MODE", "true");
        env::set_var("AUTHORITY_THRESHOLD", "0");
        assert!(Config::load().is_err());

        env::set_var("AUTHORITY_THRESHOLD", "1");
        env::set_var("AUTHORITY_CHAIN_ID", "0");
        assert!(Config::load().is_err());
        clear_env();
    }

    #[test]
    fn test_parse_address_list() {
        assert!(parse_address_list("").unwrap().is_empty());
        assert_eq!(parse_address_list(&format!("{},", SIGNER_A)).unwrap().len(), 1);
        assert!(parse_address_list("0x1234").is_err());
    }
}
