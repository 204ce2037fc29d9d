//! Test helpers: deterministic local signers and a ready-made bridge harness
//!
//! Enabled for the crate's own tests and behind the `testing` feature for
//! integration tests and downstream simulators.

use alloy::primitives::{Address, Bytes, PrimitiveSignature, B256, U256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;

use crate::contract::{execute, instantiate, Bridge};
use crate::domain::AuthDomain;
use crate::error::AuthorityError;
use crate::events::Response;
use crate::msg::{ExecuteMsg, InstantiateMsg};
use crate::signers::signer_prefix;
use crate::state::{ContractEnv, MessageInfo};

/// Chain id used by [`test_env`]
pub const TEST_CHAIN_ID: u64 = 31337;

/// Fixed contract identity for tests
pub fn test_env() -> ContractEnv {
    ContractEnv {
        address: Address::repeat_byte(0xb1),
        chain_id: TEST_CHAIN_ID,
    }
}

/// A local key that signs EIP-191 digests like an offline bridge signer
#[derive(Debug, Clone)]
pub struct TestSigner {
    signer: PrivateKeySigner,
}

impl TestSigner {
    /// Signer for the private key scalar `seed` (must be non-zero)
    pub fn from_seed(seed: u64) -> Self {
        let key = B256::from(U256::from(seed).to_be_bytes::<32>());
        let signer = PrivateKeySigner::from_bytes(&key).expect("seed is a valid scalar");
        Self { signer }
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Raw signature over `eip191(digest)`
    pub fn signature(&self, digest: B256) -> PrimitiveSignature {
        self.signer
            .sign_message_sync(digest.as_slice())
            .expect("local signing does not fail")
    }

    /// 65-byte `r || s || v` signature over `eip191(digest)`
    pub fn sign(&self, digest: B256) -> Bytes {
        Bytes::from(self.signature(digest).as_bytes().to_vec())
    }
}

/// `n` signers whose addresses have pairwise distinct most-significant bytes
pub fn distinct_signers(n: usize) -> Vec<TestSigner> {
    assert!(n <= 256, "at most 256 distinct prefixes exist");
    let mut seen = [false; 256];
    let mut signers = Vec::with_capacity(n);
    let mut seed = 1u64;

    while signers.len() < n {
        let signer = TestSigner::from_seed(seed);
        let prefix = signer_prefix(&signer.address()) as usize;
        if !seen[prefix] {
            seen[prefix] = true;
            signers.push(signer);
        }
        seed += 1;
    }
    signers
}

/// Two different signers sharing the same most-significant address byte
pub fn colliding_signers() -> (TestSigner, TestSigner) {
    let mut by_prefix: Vec<Option<TestSigner>> = vec![None; 256];
    let mut seed = 1u64;

    loop {
        let signer = TestSigner::from_seed(seed);
        let prefix = signer_prefix(&signer.address()) as usize;
        match by_prefix[prefix].take() {
            Some(first) => return (first, signer),
            None => by_prefix[prefix] = Some(signer),
        }
        seed += 1;
    }
}

/// Sign `digest` with every signer, in order
pub fn sign_all(signers: &[&TestSigner], digest: B256) -> Vec<Bytes> {
    signers.iter().map(|s| s.sign(digest)).collect()
}

/// A bridge instance with an owner and a roster of local signers
pub struct Harness {
    pub bridge: Bridge,
    pub owner: Address,
    pub signers: Vec<TestSigner>,
}

impl Harness {
    /// Bridge with `signer_count` signers, `threshold` and the given mode
    pub fn new(signer_count: usize, threshold: u64, signers_mode: bool) -> Self {
        let owner = Address::repeat_byte(0x0a);
        let signers = distinct_signers(signer_count);
        let (bridge, _) = instantiate(
            test_env(),
            InstantiateMsg {
                owner,
                signers: signers.iter().map(|s| s.address()).collect(),
                threshold,
                signers_mode,
                pause_manager: None,
                implementation: Address::repeat_byte(0x11),
            },
        )
        .expect("harness instantiation");

        Self {
            bridge,
            owner,
            signers,
        }
    }

    /// Signatures of the first `count` signers over the current pre-image of `domain`
    pub fn sign_domain(&self, domain: &AuthDomain, count: usize) -> Vec<Bytes> {
        let digest = self.bridge.signers().signing_digest(self.bridge.env(), domain);
        let signers: Vec<&TestSigner> = self.signers.iter().take(count).collect();
        sign_all(&signers, digest)
    }

    /// Signatures of the first `count` signers over an arbitrary digest
    pub fn sign_digest(&self, digest: B256, count: usize) -> Vec<Bytes> {
        let signers: Vec<&TestSigner> = self.signers.iter().take(count).collect();
        sign_all(&signers, digest)
    }

    /// Execute a message as `sender`
    pub fn execute(&mut self, sender: Address, msg: ExecuteMsg) -> Result<Response, AuthorityError> {
        execute(&mut self.bridge, MessageInfo::new(sender), msg)
    }

    /// Execute a message as `sender` with attached native value
    pub fn execute_with_value(
        &mut self,
        sender: Address,
        value: U256,
        msg: ExecuteMsg,
    ) -> Result<Response, AuthorityError> {
        execute(&mut self.bridge, MessageInfo::with_value(sender, value), msg)
    }
}
