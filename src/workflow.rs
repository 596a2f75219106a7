//! Commands: account, balance, deploy and method calls.
//!
//! Validation (artifact lookup, parameter count, deployed address) runs
//! before any password prompt or network request. Once a command is
//! dispatched its outcome arrives on the returned [`ProgressStream`].

use std::path::PathBuf;
use std::sync::Arc;

use alloy::dyn_abi::JsonAbiExt;
use alloy::primitives::{Address, U256};
use thiserror::Error;

use crate::config::DeployerConfig;
use crate::contract::{args, is_read_only, ArtifactError, ContractArtifact, ContractKey};
use crate::pipeline::progress::{self, ProgressStream};
use crate::pipeline::{
    Payload, ProgressEvent, ReadCall, ReadDispatcher, Submission, TransactionPipeline,
};
use crate::prompt::PasswordPrompt;
use crate::rpc::{LedgerRpc, RpcError};
use crate::settings::{SettingsError, SettingsGateway, SettingsStore};
use crate::vault::{CredentialError, Credentials};

/// Errors returned before a command is dispatched.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Contract(#[from] ArtifactError),

    #[error("You need to deploy contract first: {0}")]
    ContractNotDeployed(String),

    #[error(transparent)]
    Credentials(#[from] CredentialError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),
}

/// Result type for commands.
pub type CommandResult<T> = Result<T, CommandError>;

/// Which contract to deploy and with what constructor parameters.
#[derive(Debug, Clone)]
pub struct DeployRequest {
    /// Path or file name of the Solidity source.
    pub source: String,
    pub contract: String,
    /// Comma-separated JSON values.
    pub args: Option<String>,
}

/// A method call on a previously deployed contract.
#[derive(Debug, Clone)]
pub struct MethodCall {
    pub source: String,
    pub contract: String,
    pub method: String,
    pub args: Option<String>,
}

/// Ties settings, credentials, the pipeline and the read dispatcher together.
#[derive(Clone)]
pub struct Workflow {
    gateway: SettingsGateway,
    credentials: Credentials,
    pipeline: TransactionPipeline,
    reads: ReadDispatcher,
    rpc: Arc<dyn LedgerRpc>,
    build_dir: PathBuf,
}

impl Workflow {
    pub fn new(
        config: &DeployerConfig,
        rpc: Arc<dyn LedgerRpc>,
        store: Arc<dyn SettingsStore>,
        prompt: Arc<dyn PasswordPrompt>,
    ) -> Self {
        Self {
            gateway: SettingsGateway::new(store),
            credentials: Credentials::new(prompt, config.vault.max_unlock_attempts),
            pipeline: TransactionPipeline::new(Arc::clone(&rpc), &config.pipeline),
            reads: ReadDispatcher::new(Arc::clone(&rpc)),
            rpc,
            build_dir: PathBuf::from(&config.workspace.build_dir),
        }
    }

    pub fn gateway(&self) -> &SettingsGateway {
        &self.gateway
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Address of the workspace account, unlocking or creating it.
    pub async fn account(&self) -> CommandResult<Address> {
        let (address, _) = self.credentials.signing_key(&self.gateway).await?;
        Ok(address)
    }

    /// Balance of the workspace account in wei.
    ///
    /// An existing account is used without unlocking it.
    pub async fn balance(&self) -> CommandResult<(Address, U256)> {
        let settings = self.gateway.load().await?;
        let address = match settings.account() {
            Some((address, _)) => address,
            None => self.account().await?,
        };
        let balance = self.rpc.balance(address).await?;
        Ok((address, balance))
    }

    /// Deploy a compiled contract.
    ///
    /// When the deployment is mined its address is recorded under the
    /// contract key before the `Mined` event is delivered.
    pub async fn deploy(&self, request: &DeployRequest) -> CommandResult<ProgressStream> {
        let artifact = ContractArtifact::load(&self.build_dir, &request.contract)?;
        let ctor_args = artifact.constructor_args(request.args.as_deref())?;
        let code = artifact.deploy_code(&ctor_args)?;
        let contract_key = ContractKey::new(&request.source, request.contract.clone());

        let (from, key) = self.credentials.signing_key(&self.gateway).await?;
        tracing::info!(contract = %contract_key, %from, "Deploying contract");

        let stream = self.pipeline.submit(
            Submission {
                from,
                payload: Payload::Deploy { code },
            },
            key,
        );

        Ok(self.record_deployment(contract_key, stream))
    }

    /// Call a method on a deployed contract.
    ///
    /// `pure`/`view` methods are evaluated without a transaction and without
    /// unlocking the account.
    pub async fn call_method(&self, call: &MethodCall) -> CommandResult<ProgressStream> {
        let artifact = ContractArtifact::load(&self.build_dir, &call.contract)?;
        let raw_args = args::split_params(call.args.as_deref())?;
        let function = artifact.function(&call.method, raw_args.len())?;

        let contract_key = ContractKey::new(&call.source, call.contract.clone());
        let settings = self.gateway.load().await?;
        let to = settings
            .contract(&contract_key.to_string())
            .ok_or_else(|| CommandError::ContractNotDeployed(contract_key.to_string()))?;

        let values = args::prepare_values(&function.inputs, raw_args)?;

        if is_read_only(function) {
            tracing::info!(contract = %contract_key, method = %function.name, "Calling read-only method");
            return Ok(self.reads.call(ReadCall {
                from: settings.account().map(|(address, _)| address),
                to,
                function: function.clone(),
                args: values,
            }));
        }

        let data = function
            .abi_encode_input(&values)
            .map_err(|e| ArtifactError::InvalidArgument(e.to_string()))?;

        let (from, key) = self.credentials.signing_key(&self.gateway).await?;
        tracing::info!(contract = %contract_key, method = %function.name, %from, "Invoking method");

        Ok(self.pipeline.submit(
            Submission {
                from,
                payload: Payload::Invoke {
                    to,
                    data: data.into(),
                },
            },
            key,
        ))
    }

    fn record_deployment(
        &self,
        contract_key: ContractKey,
        mut inner: ProgressStream,
    ) -> ProgressStream {
        let (mut emitter, outer) = progress::channel();
        let gateway = self.gateway.clone();

        tokio::spawn(async move {
            while let Some(event) = inner.next_event().await {
                if let ProgressEvent::Mined(receipt) = &event {
                    if let Some(address) = receipt.contract_address {
                        let name = contract_key.to_string();
                        if let Err(e) = gateway.record_contract(&name, address).await {
                            tracing::error!(contract = %name, error = %e, "Failed to record contract address");
                        }
                    }
                }
                emitter.emit(event);
            }
        });

        outer
    }
}

impl std::fmt::Debug for Workflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workflow")
            .field("build_dir", &self.build_dir)
            .field("credentials", &self.credentials)
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}
