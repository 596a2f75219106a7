//! Pipeline stages, progress events and error definitions.

use std::fmt;

use alloy::primitives::{Address, Bytes, TxHash};
use thiserror::Error;

use crate::contract::CallOutput;
use crate::rpc::{RpcError, TxReceipt};

/// Stages a submission passes through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Estimating,
    Pricing,
    NonceLookup,
    Signing,
    Sending,
    Mining,
    /// Read-only evaluation; never combined with the others.
    Calling,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Estimating => "estimating",
            Stage::Pricing => "pricing",
            Stage::NonceLookup => "nonce_lookup",
            Stage::Signing => "signing",
            Stage::Sending => "sending",
            Stage::Mining => "mining",
            Stage::Calling => "calling",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a submission or read call. Every message names its stage.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("Gas estimation failed: {0}")]
    EstimationFailed(RpcError),

    #[error("Gas price lookup failed: {0}")]
    PricingFailed(RpcError),

    #[error("Nonce lookup failed: {0}")]
    NonceLookupFailed(RpcError),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Transaction rejected: {0}")]
    SendRejected(RpcError),

    #[error("Transaction reverted: {tx_hash} (gas used {gas_used})")]
    TransactionReverted { tx_hash: TxHash, gas_used: u64 },

    #[error("Receipt unavailable: {0}")]
    ReceiptUnavailable(RpcError),

    #[error("Call failed: {0}")]
    CallFailed(String),

    /// The producing task ended without a result.
    #[error("Aborted before completion")]
    Aborted,
}

impl PipelineError {
    /// The stage that failed. `Aborted` reports `None`.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::EstimationFailed(_) => Some(Stage::Estimating),
            PipelineError::PricingFailed(_) => Some(Stage::Pricing),
            PipelineError::NonceLookupFailed(_) => Some(Stage::NonceLookup),
            PipelineError::Signing(_) => Some(Stage::Signing),
            PipelineError::SendRejected(_) => Some(Stage::Sending),
            PipelineError::TransactionReverted { .. } | PipelineError::ReceiptUnavailable(_) => {
                Some(Stage::Mining)
            }
            PipelineError::CallFailed(_) => Some(Stage::Calling),
            PipelineError::Aborted => None,
        }
    }
}

/// Result type for pipeline stages.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// One step of progress for a single invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Estimated(u64),
    Priced(u128),
    NonceAssigned(u64),
    /// The node accepted the transaction.
    Hashed(TxHash),
    Mined(TxReceipt),
    /// Read-only result.
    Call(CallOutput),
    Failed(PipelineError),
}

impl ProgressEvent {
    /// Terminal events close the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProgressEvent::Mined(_) | ProgressEvent::Call(_) | ProgressEvent::Failed(_)
        )
    }
}

/// What a write submission does on chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Contract creation with the given creation code.
    Deploy { code: Bytes },
    /// Method invocation on a deployed contract.
    Invoke { to: Address, data: Bytes },
}

impl Payload {
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Deploy { .. } => "deploy",
            Payload::Invoke { .. } => "invoke",
        }
    }
}

/// A state-changing request for the transaction pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub from: Address,
    pub payload: Payload,
}
