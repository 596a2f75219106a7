//! Local transaction signing.

use alloy::consensus::TxEnvelope;
use alloy::eips::eip2718::Encodable2718;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::Bytes;
use alloy::rpc::types::TransactionRequest;

use crate::pipeline::types::{PipelineError, PipelineResult};
use crate::rpc::SignedTransaction;
use crate::vault::PlaintextKey;

/// Gas and sequencing fields chosen by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxParams {
    pub chain_id: u64,
    pub nonce: u64,
    pub gas_limit: u64,
    pub gas_price: u128,
}

/// Sign `request` as a legacy (EIP-155) transaction.
pub async fn sign(
    key: &PlaintextKey,
    request: TransactionRequest,
    params: TxParams,
) -> PipelineResult<SignedTransaction> {
    let signer = key
        .signer()
        .map_err(|e| PipelineError::Signing(e.to_string()))?;
    let from = signer.address();
    let wallet = EthereumWallet::from(signer);

    let envelope: TxEnvelope = request
        .with_from(from)
        .with_chain_id(params.chain_id)
        .with_nonce(params.nonce)
        .with_gas_limit(params.gas_limit)
        .with_gas_price(params.gas_price)
        .build(&wallet)
        .await
        .map_err(|e| PipelineError::Signing(e.to_string()))?;

    Ok(SignedTransaction {
        raw: Bytes::from(envelope.encoded_2718()),
        hash: *envelope.tx_hash(),
        from,
        nonce: params.nonce,
        gas_limit: params.gas_limit,
        gas_price: params.gas_price,
    })
}
