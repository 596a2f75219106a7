//! RPC data types and error definitions.

use alloy::primitives::{Address, Bytes, TxHash};
use thiserror::Error;

/// Errors that can occur talking to the ledger node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    /// The node answered with a JSON-RPC error (e.g. execution reverted).
    #[error("{0}")]
    Node(String),

    /// Every configured endpoint failed at the transport level.
    #[error("All RPC providers failed: {0}")]
    Unreachable(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// No receipt appeared within the configured window.
    #[error("No receipt after {0} seconds")]
    ReceiptTimeout(u64),

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    /// Invalid endpoint configuration.
    #[error("Invalid RPC URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Result type for RPC operations.
pub type RpcResult<T> = Result<T, RpcError>;

/// A transaction signed locally and ready for `eth_sendRawTransaction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    /// EIP-2718 encoded envelope.
    pub raw: Bytes,
    pub hash: TxHash,
    pub from: Address,
    pub nonce: u64,
    pub gas_limit: u64,
    pub gas_price: u128,
}

/// The parts of a mined receipt the tool reports on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub transaction_hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    /// Set for contract creations.
    pub contract_address: Option<Address>,
    /// False when execution reverted.
    pub success: bool,
}

impl From<alloy::rpc::types::TransactionReceipt> for TxReceipt {
    fn from(receipt: alloy::rpc::types::TransactionReceipt) -> Self {
        Self {
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
            contract_address: receipt.contract_address,
            success: receipt.status(),
        }
    }
}
