//! Shared fakes for integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{address, Address, Bytes, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;

use contract_deployer::config::DeployerConfig;
use contract_deployer::prompt::{PasswordPrompt, PasswordReply};
use contract_deployer::rpc::{LedgerRpc, RpcError, RpcResult, SignedTransaction, TxReceipt};
use contract_deployer::settings::{AccountSettings, MemorySettingsStore};
use contract_deployer::Workflow;

/// Anvil's first account.
pub const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const TEST_ADDRESS: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

/// TEST_PRIVATE_KEY encrypted under "secret".
pub const TEST_ENCODED_SECRET: &str = concat!(
    "1784606feaa9a42af4e09896b98d4271cc1ae543ca554ac6801d4691e7b3081b",
    "13c24202f1e9cda8877e314866de6d45f91b19d387940ee99bcdda531cda2be5",
    "bc1a50966c9e6486bc4ebf880b51611a2a97fcb8e7a6976e9b81a9e3e8ca0e3c",
);

pub const DEPLOYED_ADDRESS: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");

pub const ONE_GWEI: u128 = 1_000_000_000;

/// Settings holding the test account.
pub fn unlocked_settings() -> AccountSettings {
    AccountSettings {
        address: Some(TEST_ADDRESS),
        encrypted_key: Some(TEST_ENCODED_SECRET.to_string()),
        ..Default::default()
    }
}

/// What the scripted node answers.
#[derive(Debug, Clone)]
pub struct Script {
    pub chain_id: u64,
    pub estimate: RpcResult<u64>,
    pub gas_price: RpcResult<u128>,
    /// Pending nonce before any send through this fake.
    pub base_nonce: u64,
    pub nonce_error: Option<RpcError>,
    pub send_error: Option<RpcError>,
    /// Time the node takes to accept a transaction.
    pub send_delay: Duration,
    pub receipt: RpcResult<()>,
    pub reverted: bool,
    pub contract_address: Option<Address>,
    pub call_result: RpcResult<Bytes>,
    pub balance: U256,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            chain_id: 31337,
            estimate: Ok(21000),
            gas_price: Ok(ONE_GWEI),
            base_nonce: 0,
            nonce_error: None,
            send_error: None,
            send_delay: Duration::ZERO,
            receipt: Ok(()),
            reverted: false,
            contract_address: None,
            call_result: Ok(Bytes::new()),
            balance: U256::ZERO,
        }
    }
}

/// In-process ledger node with scripted answers and a call log.
///
/// The pending nonce counts transactions accepted so far, like a node's
/// pending view.
#[derive(Debug, Default)]
pub struct ScriptedRpc {
    script: Mutex<Script>,
    calls: Mutex<Vec<&'static str>>,
    sent: Mutex<Vec<SignedTransaction>>,
}

impl ScriptedRpc {
    pub fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script),
            ..Default::default()
        })
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<SignedTransaction> {
        self.sent.lock().unwrap().clone()
    }

    fn log(&self, method: &'static str) -> Script {
        self.calls.lock().unwrap().push(method);
        self.script.lock().unwrap().clone()
    }
}

#[async_trait]
impl LedgerRpc for ScriptedRpc {
    async fn chain_id(&self) -> RpcResult<u64> {
        Ok(self.log("eth_chainId").chain_id)
    }

    async fn estimate_gas(&self, _tx: &TransactionRequest) -> RpcResult<u64> {
        self.log("eth_estimateGas").estimate
    }

    async fn gas_price(&self) -> RpcResult<u128> {
        self.log("eth_gasPrice").gas_price
    }

    async fn pending_nonce(&self, _address: Address) -> RpcResult<u64> {
        let script = self.log("eth_getTransactionCount");
        tokio::task::yield_now().await;
        match script.nonce_error {
            Some(e) => Err(e),
            None => Ok(script.base_nonce + self.sent.lock().unwrap().len() as u64),
        }
    }

    async fn send_raw(&self, tx: &SignedTransaction) -> RpcResult<TxHash> {
        let script = self.log("eth_sendRawTransaction");
        if !script.send_delay.is_zero() {
            tokio::time::sleep(script.send_delay).await;
        }
        if let Some(e) = script.send_error {
            return Err(e);
        }
        self.sent.lock().unwrap().push(tx.clone());
        Ok(tx.hash)
    }

    async fn wait_for_receipt(&self, hash: TxHash) -> RpcResult<TxReceipt> {
        let script = self.log("eth_getTransactionReceipt");
        script.receipt?;
        Ok(TxReceipt {
            transaction_hash: hash,
            block_number: Some(1),
            gas_used: 21000,
            contract_address: script.contract_address,
            success: !script.reverted,
        })
    }

    async fn call(&self, _tx: &TransactionRequest) -> RpcResult<Bytes> {
        self.log("eth_call").call_result
    }

    async fn balance(&self, _address: Address) -> RpcResult<U256> {
        Ok(self.log("eth_getBalance").balance)
    }
}

/// Password prompt that answers from a queue and counts how often it asked.
#[derive(Debug, Default)]
pub struct CountingPrompt {
    replies: Mutex<VecDeque<PasswordReply>>,
    new_prompts: AtomicUsize,
    existing_prompts: AtomicUsize,
}

impl CountingPrompt {
    /// Answers `passwords` in order, then cancels.
    pub fn answering(passwords: &[&str]) -> Arc<Self> {
        let replies = passwords
            .iter()
            .map(|p| PasswordReply::from_input(p.to_string()))
            .collect();
        Arc::new(Self {
            replies: Mutex::new(replies),
            ..Default::default()
        })
    }

    pub fn cancelling() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn new_prompts(&self) -> usize {
        self.new_prompts.load(Ordering::SeqCst)
    }

    pub fn existing_prompts(&self) -> usize {
        self.existing_prompts.load(Ordering::SeqCst)
    }

    fn next(&self) -> PasswordReply {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(PasswordReply::Cancelled)
    }
}

#[async_trait]
impl PasswordPrompt for CountingPrompt {
    async fn prompt_new(&self) -> std::io::Result<PasswordReply> {
        self.new_prompts.fetch_add(1, Ordering::SeqCst);
        Ok(self.next())
    }

    async fn prompt_existing(&self) -> std::io::Result<PasswordReply> {
        self.existing_prompts.fetch_add(1, Ordering::SeqCst);
        Ok(self.next())
    }
}

pub const STORAGE_ABI: &str = r#"[
    {"type":"constructor","inputs":[{"name":"initial","type":"uint256"}],"stateMutability":"nonpayable"},
    {"type":"function","name":"get","inputs":[],"outputs":[{"name":"","type":"uint256"}],"stateMutability":"view"},
    {"type":"function","name":"greeting","inputs":[],"outputs":[{"name":"","type":"bytes"}],"stateMutability":"view"},
    {"type":"function","name":"set","inputs":[{"name":"value","type":"uint256"}],"outputs":[],"stateMutability":"nonpayable"}
]"#;

/// Write a `Storage` artifact into `build_dir`.
pub fn write_storage_artifact(build_dir: &Path) {
    let json = serde_json::json!({
        "contractName": "Storage",
        "abi": STORAGE_ABI,
        "bytecode": "0x6080604052",
    });
    std::fs::write(build_dir.join("Storage.json"), json.to_string()).unwrap();
}

/// Workflow over the given fakes with `build_dir` as the artifact directory.
pub fn workflow(
    rpc: Arc<ScriptedRpc>,
    store: MemorySettingsStore,
    prompt: Arc<CountingPrompt>,
    build_dir: &Path,
) -> Workflow {
    let mut config = DeployerConfig::default();
    config.workspace.build_dir = build_dir.to_string_lossy().into_owned();
    Workflow::new(&config, rpc, Arc::new(store), prompt)
}
