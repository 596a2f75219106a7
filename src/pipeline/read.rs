//! Read-only method calls.
//!
//! No gas, price or nonce stages: the call is encoded, evaluated with
//! `eth_call` and decoded. Every failure, including argument encoding,
//! arrives as the stream's `Failed` event.

use std::sync::Arc;

use alloy::dyn_abi::{DynSolValue, JsonAbiExt};
use alloy::json_abi::Function;
use alloy::network::TransactionBuilder;
use alloy::primitives::Address;
use alloy::rpc::types::TransactionRequest;
use tracing::Instrument;
use uuid::Uuid;

use crate::contract::CallOutput;
use crate::observability::metrics;
use crate::pipeline::progress::{self, ProgressStream};
use crate::pipeline::types::{PipelineError, PipelineResult, ProgressEvent, Stage};
use crate::rpc::LedgerRpc;

/// A `pure`/`view` method call on a deployed contract.
#[derive(Debug, Clone)]
pub struct ReadCall {
    /// Caller address for `msg.sender`, when an account exists.
    pub from: Option<Address>,
    pub to: Address,
    pub function: Function,
    pub args: Vec<DynSolValue>,
}

#[derive(Clone)]
pub struct ReadDispatcher {
    rpc: Arc<dyn LedgerRpc>,
}

impl ReadDispatcher {
    pub fn new(rpc: Arc<dyn LedgerRpc>) -> Self {
        Self { rpc }
    }

    /// Evaluate `call` in the background. The stream yields exactly one
    /// event: `Call` or `Failed`.
    pub fn call(&self, call: ReadCall) -> ProgressStream {
        let (mut emitter, stream) = progress::channel();
        let span = tracing::info_span!(
            "call",
            invocation = %Uuid::new_v4(),
            method = %call.function.name,
            to = %call.to,
        );

        let rpc = Arc::clone(&self.rpc);
        tokio::spawn(
            async move {
                metrics::record_stage(Stage::Calling.as_str());
                match execute(rpc.as_ref(), &call).await {
                    Ok(output) => {
                        tracing::info!("Call succeeded");
                        metrics::record_outcome("call", "ok");
                        emitter.emit(ProgressEvent::Call(output));
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Call failed");
                        metrics::record_outcome("call", "failed");
                        emitter.emit(ProgressEvent::Failed(e));
                    }
                }
            }
            .instrument(span),
        );

        stream
    }
}

impl std::fmt::Debug for ReadDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadDispatcher").finish_non_exhaustive()
    }
}

async fn execute(rpc: &dyn LedgerRpc, call: &ReadCall) -> PipelineResult<CallOutput> {
    let data = call
        .function
        .abi_encode_input(&call.args)
        .map_err(|e| PipelineError::CallFailed(format!("Error encoding arguments: {e}")))?;

    let mut request = TransactionRequest::default()
        .with_to(call.to)
        .with_input(data);
    if let Some(from) = call.from {
        request = request.with_from(from);
    }

    let raw = rpc
        .call(&request)
        .await
        .map_err(|e| PipelineError::CallFailed(e.to_string()))?;

    CallOutput::decode(&call.function, raw).map_err(PipelineError::CallFailed)
}
