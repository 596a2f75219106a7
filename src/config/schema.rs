//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.

use serde::{Deserialize, Serialize};

/// Root configuration for the deployer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DeployerConfig {
    /// Upstream ledger node.
    pub network: NetworkConfig,

    /// Transaction submission tuning.
    pub pipeline: PipelineConfig,

    /// Password handling.
    pub vault: VaultConfig,

    /// Workspace file locations.
    pub workspace: WorkspaceConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Ledger node connection.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs, tried in order.
    pub failover_urls: Vec<String>,

    /// Chain ID for transaction signing. Queried from the node when unset.
    pub chain_id: Option<u64>,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            failover_urls: Vec::new(),
            chain_id: None,
            rpc_timeout_secs: 10,
        }
    }
}

/// Transaction pipeline settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Gas limit = round(estimate * multiplier). Must exceed 1.0.
    pub gas_multiplier: f64,

    /// How long to wait for a receipt after the node accepts a transaction.
    pub receipt_timeout_secs: u64,

    /// Receipt polling interval in milliseconds.
    pub receipt_poll_interval_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            gas_multiplier: 1.01,
            receipt_timeout_secs: 600,
            receipt_poll_interval_ms: 2000,
        }
    }
}

/// Vault settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Wrong-password prompts before an operation gives up.
    pub max_unlock_attempts: u32,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            max_unlock_attempts: 3,
        }
    }
}

/// Workspace locations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Account and contract settings file.
    pub settings_path: String,

    /// Directory holding compiled contract JSON artifacts.
    pub build_dir: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            settings_path: ".deployer/settings.json".to_string(),
            build_dir: "build".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
