//! CL8Y Bridge Authority CLI
//!
//! Offline companion for bridge signers: computes the digests they sign, signs
//! them, and simulates protected calls against a local state snapshot.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use alloy::primitives::{Address, B256, U256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Result, WrapErr};
use serde::de::DeserializeOwned;

use bridge_authority::config::Config;
use bridge_authority::hash::{eth_signed_message_hash, signing_preimage};
use bridge_authority::msg::{ExecuteMsg, QueryMsg};
use bridge_authority::{
    bytes32_to_hex, execute, hex_to_bytes32, instantiate, query, snapshot, Bridge, MessageInfo,
};

#[derive(Parser)]
#[command(name = "cl8y-authority")]
#[command(about = "Signer tooling and simulator for the CL8Y bridge authority", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Snapshot file (overrides AUTHORITY_STATE_FILE)
    #[arg(short, long, global = true)]
    state: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a fresh state snapshot from the configuration
    Init {
        /// Overwrite an existing snapshot
        #[arg(long)]
        force: bool,
    },

    /// Show roster, threshold, mode, pause state, implementation and handover
    Status,

    /// Print the digest signers must sign for a protected execute message
    Digest {
        /// JSON file holding an ExecuteMsg
        #[arg(short, long)]
        msg: PathBuf,
    },

    /// EIP-191 sign a digest with AUTHORITY_SIGNER_KEY
    Sign {
        /// 32-byte digest as hex
        #[arg(short, long)]
        digest: String,
    },

    /// Apply an execute message and persist the new state
    Execute {
        /// Caller address
        #[arg(long)]
        sender: String,

        /// JSON file holding an ExecuteMsg
        #[arg(short, long)]
        msg: PathBuf,

        /// Attached native value (wei)
        #[arg(long, default_value = "0")]
        value: String,
    },

    /// Run a query message and print the JSON result
    Query {
        /// JSON file holding a QueryMsg
        #[arg(short, long)]
        msg: PathBuf,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    init_logging();

    let cli = Cli::parse();

    // Signing needs no bridge configuration
    if let Commands::Sign { digest } = &cli.command {
        return sign_digest(digest);
    }

    let config = Config::load()?;
    let state_file = cli.state.clone().unwrap_or_else(|| config.state_file.clone());
    tracing::debug!(
        chain_id = config.chain_id,
        contract = %config.contract_address,
        state_file = %state_file.display(),
        "Configuration loaded"
    );

    match cli.command {
        Commands::Init { force } => {
            if state_file.exists() && !force {
                return Err(eyre!(
                    "{} already exists (use --force to overwrite)",
                    state_file.display()
                ));
            }
            let (bridge, response) =
                instantiate(config.contract_env(), config.to_instantiate_msg())
                    .wrap_err("Instantiation rejected")?;
            snapshot::save(&state_file, &bridge)?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }

        Commands::Status => {
            let bridge = snapshot::load(&state_file)?;
            print_status(&bridge);
        }

        Commands::Digest { msg } => {
            let bridge = snapshot::load(&state_file)?;
            let msg: ExecuteMsg = read_json(&msg)?;
            print_digest(&bridge, &msg)?;
        }

        Commands::Execute { sender, msg, value } => {
            let mut bridge = snapshot::load(&state_file)?;
            let sender = Address::from_str(sender.trim())
                .map_err(|e| eyre!("Invalid sender address: {}", e))?;
            let value: U256 = value
                .trim()
                .parse()
                .map_err(|e| eyre!("Invalid value: {}", e))?;
            let msg: ExecuteMsg = read_json(&msg)?;

            match execute(&mut bridge, MessageInfo::with_value(sender, value), msg) {
                Ok(response) => {
                    snapshot::save(&state_file, &bridge)?;
                    println!("{}", serde_json::to_string_pretty(&response)?);
                }
                Err(e) => {
                    // A rejected signature check still burns its nonce
                    snapshot::save(&state_file, &bridge)?;
                    return Err(eyre!("Execution rejected ({:?}): {}", e.kind(), e));
                }
            }
        }

        Commands::Query { msg } => {
            let bridge = snapshot::load(&state_file)?;
            let msg: QueryMsg = read_json(&msg)?;
            let result = query(&bridge, msg)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Commands::Sign { .. } => {}
    }

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bridge_authority=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).wrap_err_with(|| format!("Failed to parse {}", path.display()))
}

fn print_status(bridge: &Bridge) {
    let signers = bridge.signers();
    println!("Contract:        {}", bridge.env().address);
    println!("Chain ID:        {}", bridge.env().chain_id);
    println!("Owner:           {}", signers.owner());
    println!(
        "Mode:            {}",
        if signers.signers_mode() {
            "signers"
        } else {
            "owner"
        }
    );
    println!(
        "Threshold:       {} of {}",
        signers.threshold(),
        signers.get_signers().len()
    );
    for signer in signers.get_signers() {
        println!("  - {}", signer);
    }
    println!("Paused:          {}", bridge.pause().is_paused());
    println!("Pause manager:   {}", bridge.pause().pause_manager());
    println!("Implementation:  {}", bridge.upgrade().implementation());
    println!("Consumed hashes: {}", bridge.hashes().len());

    let handover = bridge.handover();
    if handover.version() > 0 {
        println!(
            "Handover:        v{} manager {} asset {}",
            handover.version(),
            handover.manager(),
            handover.asset()
        );
    }
}

fn print_digest(bridge: &Bridge, msg: &ExecuteMsg) -> Result<()> {
    if let Some((withdrawal, tx_hash, tx_nonce)) = msg.withdrawal() {
        let digest = withdrawal.digest(tx_hash, tx_nonce, bridge.env());
        println!("Withdrawal:      {}", withdrawal.kind().as_str());
        println!("Hash used:       {}", bridge.hashes().contains(tx_hash, tx_nonce));
        println!("Digest:          {}", bytes32_to_hex(&digest));
        println!(
            "EIP-191 hash:    {}",
            bytes32_to_hex(&eth_signed_message_hash(&digest))
        );
        return Ok(());
    }

    let domain = msg
        .auth_domain()
        .ok_or_else(|| eyre!("Message is not signature-gated"))?;
    let key = domain.key();
    let nonce = bridge.signers().nonce(&key);
    let digest = signing_preimage(key, nonce, bridge.env());

    println!("Operation:       {}", domain.name());
    println!("Domain key:      {}", bytes32_to_hex(&key));
    println!("Nonce:           {}", nonce);
    println!("Digest:          {}", bytes32_to_hex(&digest));
    println!(
        "EIP-191 hash:    {}",
        bytes32_to_hex(&eth_signed_message_hash(&digest))
    );
    Ok(())
}

fn sign_digest(digest: &str) -> Result<()> {
    let digest: B256 = hex_to_bytes32(digest).map_err(|e| eyre!("Invalid digest: {}", e))?;
    dotenvy::dotenv().ok();
    let key = std::env::var("AUTHORITY_SIGNER_KEY")
        .map_err(|_| eyre!("AUTHORITY_SIGNER_KEY required"))?;
    let signer = PrivateKeySigner::from_str(key.trim())
        .map_err(|_| eyre!("AUTHORITY_SIGNER_KEY is not a valid private key"))?;

    let signature = signer
        .sign_message_sync(digest.as_slice())
        .map_err(|e| eyre!("Signing failed: {}", e))?;

    tracing::info!(signer = %signer.address(), "Digest signed");
    println!("Signer:          {}", signer.address());
    println!("Signature:       0x{}", hex::encode(signature.as_bytes()));
    Ok(())
}
