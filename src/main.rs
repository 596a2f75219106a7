//! contract-deployer
//!
//! Deploys compiled contracts to an Ethereum-compatible ledger and calls
//! their methods.
//!
//! # Architecture Overview
//!
//! ```text
//!     CLI command
//!         │
//!         ▼
//!   ┌───────────┐    ┌──────────────┐    ┌───────────────────┐
//!   │ workflow  │───▶│  settings    │───▶│ credentials/vault │◀── password prompt
//!   └─────┬─────┘    │  gateway     │    └───────────────────┘
//!         │          └──────────────┘
//!         ├──────────────▶ pipeline (estimate → price → nonce → send → receipt)
//!         └──────────────▶ read dispatcher (eth_call)
//!                               │
//!                               ▼
//!                         rpc client ──▶ ledger node(s)
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use alloy::primitives::utils::format_ether;
use clap::{Parser, Subcommand};

use contract_deployer::config::load_or_default;
use contract_deployer::observability::{logging, metrics};
use contract_deployer::prompt::TerminalPrompt;
use contract_deployer::rpc::RpcClient;
use contract_deployer::settings::JsonFileSettingsStore;
use contract_deployer::{DeployRequest, MethodCall, ProgressEvent, ProgressStream, Workflow};

#[derive(Parser)]
#[command(name = "contract-deployer")]
#[command(about = "Deploy smart contracts and call their methods", long_about = None)]
struct Cli {
    /// Configuration file. Defaults apply when it does not exist.
    #[arg(short, long, default_value = "deployer.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the workspace account, creating it on first use
    Account,
    /// Show the account balance
    Balance,
    /// Deploy a compiled contract
    Deploy {
        /// Solidity source file the contract lives in
        source: String,
        /// Contract name (defaults to the source file stem)
        #[arg(long)]
        contract: Option<String>,
        /// Constructor parameters as comma-separated JSON values
        #[arg(short, long)]
        args: Option<String>,
    },
    /// Call a method on a deployed contract
    Call {
        source: String,
        method: String,
        #[arg(long)]
        contract: Option<String>,
        /// Method parameters as comma-separated JSON values
        #[arg(short, long)]
        args: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            println!("FAIL: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Returns whether the command's final event was a success.
async fn run(cli: Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let config = load_or_default(&cli.config)?;
    logging::init_logging(&config.observability.log_level);

    tracing::info!(
        rpc_url = %config.network.rpc_url,
        settings_path = %config.workspace.settings_path,
        build_dir = %config.workspace.build_dir,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let rpc = Arc::new(RpcClient::connect(&config.network, &config.pipeline).await?);
    let store = Arc::new(JsonFileSettingsStore::new(&config.workspace.settings_path));
    let workflow = Workflow::new(&config, rpc, store, Arc::new(TerminalPrompt));

    match cli.command {
        Commands::Account => {
            let address = workflow.account().await?;
            println!("Account: {address}");
            Ok(true)
        }
        Commands::Balance => {
            let (address, balance) = workflow.balance().await?;
            println!("Balance of {address} is {} ETH", format_ether(balance));
            Ok(true)
        }
        Commands::Deploy {
            source,
            contract,
            args,
        } => {
            let contract = contract.unwrap_or_else(|| file_stem(&source));
            let stream = workflow
                .deploy(&DeployRequest {
                    source,
                    contract,
                    args,
                })
                .await?;
            Ok(report(stream, true).await)
        }
        Commands::Call {
            source,
            method,
            contract,
            args,
        } => {
            let contract = contract.unwrap_or_else(|| file_stem(&source));
            let stream = workflow
                .call_method(&MethodCall {
                    source,
                    contract,
                    method,
                    args,
                })
                .await?;
            Ok(report(stream, false).await)
        }
    }
}

fn file_stem(source: &str) -> String {
    Path::new(source)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.to_string())
}

/// Print progress until the terminal event.
async fn report(mut stream: ProgressStream, deploying: bool) -> bool {
    let mut succeeded = false;

    while let Some(event) = stream.next_event().await {
        match event {
            ProgressEvent::Estimated(gas) => println!("Estimated gas: {gas}"),
            ProgressEvent::Priced(price) => println!("Gas price: {price} wei"),
            ProgressEvent::NonceAssigned(nonce) => println!("Nonce: {nonce}"),
            ProgressEvent::Hashed(hash) => {
                println!("TX HASH: {hash}");
                println!("Wait until will be mined ...");
            }
            ProgressEvent::Mined(receipt) => {
                match receipt.contract_address {
                    Some(address) if deploying => {
                        println!("SUCCESS: Contract address: {address}")
                    }
                    _ => println!("SUCCESS: Gas used: {}", receipt.gas_used),
                }
                succeeded = true;
            }
            ProgressEvent::Call(output) => {
                println!("CALL RESULT: {output}");
                if let Some(text) = &output.text {
                    println!("RESULT AS STRING: {text}");
                }
                succeeded = true;
            }
            ProgressEvent::Failed(e) => println!("FAIL: {e}"),
        }
    }

    succeeded
}
