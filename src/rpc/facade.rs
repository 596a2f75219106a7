//! The ledger operations the pipeline and dispatcher depend on.

use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;

use crate::rpc::types::{RpcResult, SignedTransaction, TxReceipt};

/// Ledger node operations.
///
/// Implemented by [`RpcClient`](crate::rpc::RpcClient) for real nodes and by
/// scripted fakes in tests.
#[async_trait]
pub trait LedgerRpc: Send + Sync {
    /// Chain ID used for EIP-155 signing.
    async fn chain_id(&self) -> RpcResult<u64>;

    /// Gas the node expects `tx` to consume. Fails if `tx` would revert.
    async fn estimate_gas(&self, tx: &TransactionRequest) -> RpcResult<u64>;

    /// Current gas price in wei.
    async fn gas_price(&self) -> RpcResult<u128>;

    /// Next nonce for `address`, counting transactions in the pending pool.
    async fn pending_nonce(&self, address: Address) -> RpcResult<u64>;

    /// Submit a signed transaction. Returns once the node accepts it.
    async fn send_raw(&self, tx: &SignedTransaction) -> RpcResult<TxHash>;

    /// Wait until `hash` is included and return its receipt.
    async fn wait_for_receipt(&self, hash: TxHash) -> RpcResult<TxReceipt>;

    /// Evaluate `tx` without creating a transaction (`eth_call`).
    async fn call(&self, tx: &TransactionRequest) -> RpcResult<Bytes>;

    /// Native token balance of `address` in wei.
    async fn balance(&self, address: Address) -> RpcResult<U256>;
}
