//! Transaction submission pipeline.
//!
//! # Stages
//! ```text
//! ESTIMATING → PRICING → NONCE_LOOKUP → SIGNING → SENDING → MINING
//!      │           │           │            │          │         │
//!      └───────────┴───────────┴─── Failed ─┴──────────┘   Mined | Failed
//! ```
//! Each stage runs only after the previous one succeeded. The first failure
//! ends the submission with a single `Failed` event; nothing is retried.

use std::sync::Arc;

use alloy::network::TransactionBuilder;
use alloy::rpc::types::TransactionRequest;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::observability::metrics;
use crate::pipeline::nonce::NonceLanes;
use crate::pipeline::progress::{self, ProgressEmitter, ProgressStream};
use crate::pipeline::signer::{self, TxParams};
use crate::pipeline::types::{
    Payload, PipelineError, PipelineResult, ProgressEvent, Stage, Submission,
};
use crate::rpc::{LedgerRpc, TxReceipt};
use crate::vault::PlaintextKey;

/// `round(estimate * multiplier)`.
pub fn gas_limit(estimate: u64, multiplier: f64) -> u64 {
    (estimate as f64 * multiplier).round() as u64
}

/// Runs write submissions against a ledger node.
#[derive(Clone)]
pub struct TransactionPipeline {
    rpc: Arc<dyn LedgerRpc>,
    lanes: NonceLanes,
    gas_multiplier: f64,
}

impl TransactionPipeline {
    pub fn new(rpc: Arc<dyn LedgerRpc>, config: &PipelineConfig) -> Self {
        Self {
            rpc,
            lanes: NonceLanes::new(),
            gas_multiplier: config.gas_multiplier,
        }
    }

    /// Start `submission` in the background and return its progress.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, submission: Submission, key: PlaintextKey) -> ProgressStream {
        let (emitter, stream) = progress::channel();
        let span = tracing::info_span!(
            "submit",
            invocation = %Uuid::new_v4(),
            kind = submission.payload.kind(),
            from = %submission.from,
        );

        let pipeline = self.clone();
        tokio::spawn(
            async move { pipeline.run(submission, key, emitter).await }.instrument(span),
        );

        stream
    }

    async fn run(&self, submission: Submission, key: PlaintextKey, mut emitter: ProgressEmitter) {
        let kind = submission.payload.kind();

        match self.execute(&submission, &key, &mut emitter).await {
            Ok(receipt) => {
                tracing::info!(
                    tx_hash = %receipt.transaction_hash,
                    gas_used = receipt.gas_used,
                    contract_address = ?receipt.contract_address,
                    "Transaction mined"
                );
                metrics::record_outcome(kind, "mined");
                emitter.emit(ProgressEvent::Mined(receipt));
            }
            Err(e) => {
                tracing::warn!(
                    stage = e.stage().map(|s| s.as_str()),
                    error = %e,
                    "Submission failed"
                );
                metrics::record_outcome(kind, "failed");
                emitter.emit(ProgressEvent::Failed(e));
            }
        }
    }

    async fn execute(
        &self,
        submission: &Submission,
        key: &PlaintextKey,
        emitter: &mut ProgressEmitter,
    ) -> PipelineResult<TxReceipt> {
        check_sender(submission, key)?;
        let request = build_request(submission);

        enter(Stage::Estimating);
        let estimate = self
            .rpc
            .estimate_gas(&request)
            .await
            .map_err(PipelineError::EstimationFailed)?;
        emitter.emit(ProgressEvent::Estimated(estimate));

        enter(Stage::Pricing);
        let gas_price = self
            .rpc
            .gas_price()
            .await
            .map_err(PipelineError::PricingFailed)?;
        emitter.emit(ProgressEvent::Priced(gas_price));

        let lane = self.lanes.acquire(submission.from).await;

        enter(Stage::NonceLookup);
        let nonce = self
            .rpc
            .pending_nonce(submission.from)
            .await
            .map_err(PipelineError::NonceLookupFailed)?;
        emitter.emit(ProgressEvent::NonceAssigned(nonce));

        enter(Stage::Signing);
        let chain_id = self
            .rpc
            .chain_id()
            .await
            .map_err(|e| PipelineError::Signing(format!("chain id unavailable: {e}")))?;
        let params = TxParams {
            chain_id,
            nonce,
            gas_limit: gas_limit(estimate, self.gas_multiplier),
            gas_price,
        };
        let signed = signer::sign(key, request, params).await?;

        enter(Stage::Sending);
        let tx_hash = self
            .rpc
            .send_raw(&signed)
            .await
            .map_err(PipelineError::SendRejected)?;
        drop(lane);

        tracing::info!(
            %tx_hash,
            nonce,
            gas_limit = params.gas_limit,
            gas_price,
            "Transaction accepted"
        );
        emitter.emit(ProgressEvent::Hashed(tx_hash));

        enter(Stage::Mining);
        let receipt = self
            .rpc
            .wait_for_receipt(tx_hash)
            .await
            .map_err(PipelineError::ReceiptUnavailable)?;

        if !receipt.success {
            return Err(PipelineError::TransactionReverted {
                tx_hash,
                gas_used: receipt.gas_used,
            });
        }

        Ok(receipt)
    }
}

impl std::fmt::Debug for TransactionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionPipeline")
            .field("gas_multiplier", &self.gas_multiplier)
            .field("senders", &self.lanes.len())
            .finish()
    }
}

fn enter(stage: Stage) {
    tracing::debug!(stage = stage.as_str(), "Entering stage");
    metrics::record_stage(stage.as_str());
}

/// The nonce lane and lookup use `submission.from`; the key must own it.
fn check_sender(submission: &Submission, key: &PlaintextKey) -> PipelineResult<()> {
    let owner = key
        .signer()
        .map_err(|e| PipelineError::Signing(e.to_string()))?
        .address();
    if owner != submission.from {
        return Err(PipelineError::Signing(format!(
            "key belongs to {owner}, not sender {}",
            submission.from
        )));
    }
    Ok(())
}

fn build_request(submission: &Submission) -> TransactionRequest {
    let request = TransactionRequest::default().with_from(submission.from);
    match &submission.payload {
        Payload::Deploy { code } => request.with_deploy_code(code.clone()),
        Payload::Invoke { to, data } => request.with_to(*to).with_input(data.clone()),
    }
}
