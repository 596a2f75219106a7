//! Ledger RPC client with timeout and failover.
//!
//! # Responsibilities
//! - Connect to the JSON-RPC endpoint and its failovers
//! - Bound every request with the configured timeout
//! - Distinguish node-level errors (returned as-is) from transport failures
//!   (next provider)
//! - Settle raw sends a node already holds against the local hash
//! - Poll for receipts until inclusion or timeout

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::transports::TransportResult;
use async_trait::async_trait;
use tokio::sync::OnceCell;
use tokio::time::{interval, timeout};

use crate::config::{NetworkConfig, PipelineConfig};
use crate::observability::metrics;
use crate::rpc::facade::LedgerRpc;
use crate::rpc::types::{RpcError, RpcResult, SignedTransaction, TxReceipt};

type SharedProvider = Arc<dyn Provider + Send + Sync>;

/// Outcome of one pass over the providers.
struct Attempt<T> {
    result: RpcResult<T>,
    /// Some provider timed out before the final answer.
    timed_out: bool,
}

/// Node replies meaning the transaction is already in its pool.
const ALREADY_KNOWN: &[&str] = &["already known", "known transaction", "already imported"];

/// Resolve a raw send against the locally computed hash.
///
/// A node that already holds the transaction accepted it. After a timeout,
/// "nonce too low" means the timed-out node took the nonce, so the outcome
/// is left to receipt polling.
fn settle_send(
    result: RpcResult<TxHash>,
    local_hash: TxHash,
    timed_out: bool,
) -> RpcResult<TxHash> {
    match result {
        Err(RpcError::Node(message)) => {
            let lower = message.to_lowercase();
            let known = ALREADY_KNOWN.iter().any(|m| lower.contains(m));
            if known || (timed_out && lower.contains("nonce too low")) {
                tracing::warn!(tx_hash = %local_hash, reply = %message, "Send reply treated as accepted");
                Ok(local_hash)
            } else {
                Err(RpcError::Node(message))
            }
        }
        other => other,
    }
}

/// Alloy-backed [`LedgerRpc`] with failover support.
#[derive(Clone)]
pub struct RpcClient {
    /// Primary provider first, then failovers.
    providers: Vec<SharedProvider>,
    config: NetworkConfig,
    timeout_duration: Duration,
    receipt_timeout: Duration,
    receipt_poll_interval: Duration,
    chain_id: Arc<OnceCell<u64>>,
}

impl RpcClient {
    /// Build providers for the primary and failover URLs.
    ///
    /// When a chain ID is configured it is checked against the node, but a
    /// mismatch or an unreachable node only logs a warning.
    pub async fn connect(network: &NetworkConfig, pipeline: &PipelineConfig) -> RpcResult<Self> {
        let primary_url: url::Url = network.rpc_url.parse().map_err(|e: url::ParseError| {
            RpcError::InvalidUrl {
                url: network.rpc_url.clone(),
                reason: e.to_string(),
            }
        })?;

        let mut providers: Vec<SharedProvider> =
            vec![Arc::new(ProviderBuilder::new().connect_http(primary_url))];

        for url_str in &network.failover_urls {
            match url_str.parse::<url::Url>() {
                Ok(url) => providers.push(Arc::new(ProviderBuilder::new().connect_http(url))),
                Err(_) => tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL"),
            }
        }

        let client = Self {
            providers,
            config: network.clone(),
            timeout_duration: Duration::from_secs(network.rpc_timeout_secs),
            receipt_timeout: Duration::from_secs(pipeline.receipt_timeout_secs),
            receipt_poll_interval: Duration::from_millis(pipeline.receipt_poll_interval_ms),
            chain_id: Arc::new(OnceCell::new()),
        };

        if network.chain_id.is_some() {
            match client.verify_chain_id().await {
                Ok(()) => tracing::info!(
                    rpc_url = %network.rpc_url,
                    chain_id = network.chain_id,
                    "RPC client initialized"
                ),
                Err(e) => tracing::warn!(
                    error = %e,
                    "RPC client initialized but chain verification failed"
                ),
            }
        }

        Ok(client)
    }

    /// Verify the node's chain ID matches configuration.
    pub async fn verify_chain_id(&self) -> RpcResult<()> {
        let Some(expected) = self.config.chain_id else {
            return Ok(());
        };
        let actual = self.node_chain_id().await?;
        if actual != expected {
            return Err(RpcError::ChainMismatch { expected, actual });
        }
        Ok(())
    }

    async fn node_chain_id(&self) -> RpcResult<u64> {
        self.with_failover("eth_chainId", |p| async move { p.get_chain_id().await })
            .await
    }

    /// Run `op` against each provider in turn.
    ///
    /// A JSON-RPC error response ends the loop: the node understood the
    /// request and another endpoint would answer the same.
    async fn with_failover<T, F, Fut>(&self, method: &'static str, op: F) -> RpcResult<T>
    where
        F: Fn(SharedProvider) -> Fut + Send,
        Fut: Future<Output = TransportResult<T>> + Send,
        T: Send,
    {
        self.attempt_providers(method, op).await.result
    }

    /// Failover loop that also reports whether any provider timed out.
    ///
    /// A timed-out request may still have reached its node.
    async fn attempt_providers<T, F, Fut>(&self, method: &'static str, op: F) -> Attempt<T>
    where
        F: Fn(SharedProvider) -> Fut + Send,
        Fut: Future<Output = TransportResult<T>> + Send,
        T: Send,
    {
        let start = Instant::now();
        let mut last_error = String::from("no providers configured");
        let mut timed_out = false;

        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, op(Arc::clone(provider))).await {
                Ok(Ok(result)) => {
                    metrics::record_rpc(method, start);
                    return Attempt {
                        result: Ok(result),
                        timed_out,
                    };
                }
                Ok(Err(e)) => {
                    if let Some(payload) = e.as_error_resp() {
                        metrics::record_rpc(method, start);
                        return Attempt {
                            result: Err(RpcError::Node(payload.message.to_string())),
                            timed_out,
                        };
                    }
                    tracing::warn!(provider_idx = i, method, error = %e, "RPC error, trying next provider");
                    last_error = e.to_string();
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, method, "RPC timeout, trying next provider");
                    last_error = RpcError::Timeout(self.config.rpc_timeout_secs).to_string();
                    timed_out = true;
                }
            }
        }

        Attempt {
            result: Err(RpcError::Unreachable(last_error)),
            timed_out,
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }
}

#[async_trait]
impl LedgerRpc for RpcClient {
    async fn chain_id(&self) -> RpcResult<u64> {
        if let Some(id) = self.config.chain_id {
            return Ok(id);
        }
        self.chain_id
            .get_or_try_init(|| self.node_chain_id())
            .await
            .copied()
    }

    async fn estimate_gas(&self, tx: &TransactionRequest) -> RpcResult<u64> {
        self.with_failover("eth_estimateGas", |p| {
            let tx = tx.clone();
            async move { p.estimate_gas(tx).await }
        })
        .await
    }

    async fn gas_price(&self) -> RpcResult<u128> {
        self.with_failover("eth_gasPrice", |p| async move { p.get_gas_price().await })
            .await
    }

    async fn pending_nonce(&self, address: Address) -> RpcResult<u64> {
        self.with_failover("eth_getTransactionCount", |p| async move {
            p.get_transaction_count(address).pending().await
        })
        .await
    }

    async fn send_raw(&self, tx: &SignedTransaction) -> RpcResult<TxHash> {
        let Attempt { result, timed_out } = self
            .attempt_providers("eth_sendRawTransaction", |p| {
                let raw = tx.raw.clone();
                async move {
                    p.send_raw_transaction(&raw)
                        .await
                        .map(|pending| *pending.tx_hash())
                }
            })
            .await;
        settle_send(result, tx.hash, timed_out)
    }

    async fn wait_for_receipt(&self, hash: TxHash) -> RpcResult<TxReceipt> {
        let result = timeout(self.receipt_timeout, async {
            let mut ticker = interval(self.receipt_poll_interval);

            loop {
                ticker.tick().await;

                let polled = self
                    .with_failover("eth_getTransactionReceipt", |p| async move {
                        p.get_transaction_receipt(hash).await
                    })
                    .await;

                match polled {
                    Ok(Some(receipt)) => return TxReceipt::from(receipt),
                    Ok(None) => tracing::debug!(tx_hash = %hash, "Transaction pending"),
                    Err(e) => tracing::warn!(tx_hash = %hash, error = %e, "Receipt poll failed"),
                }
            }
        })
        .await;

        result.map_err(|_| RpcError::ReceiptTimeout(self.receipt_timeout.as_secs()))
    }

    async fn call(&self, tx: &TransactionRequest) -> RpcResult<Bytes> {
        self.with_failover("eth_call", |p| {
            let tx = tx.clone();
            async move { p.call(tx).await }
        })
        .await
    }

    async fn balance(&self, address: Address) -> RpcResult<U256> {
        self.with_failover("eth_getBalance", |p| async move {
            p.get_balance(address).await
        })
        .await
    }
}

impl std::fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("providers", &self.providers.len())
            .field("chain_id", &self.config.chain_id)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}
