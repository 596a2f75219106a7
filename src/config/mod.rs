//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! deployer.toml
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → DeployerConfig (validated, immutable)
//!     → handed to the RPC client, pipeline, credentials and workspace paths
//! ```
//!
//! # Design Decisions
//! - All fields have defaults so an absent file is a valid configuration
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::{
    DeployerConfig, NetworkConfig, ObservabilityConfig, PipelineConfig, VaultConfig,
    WorkspaceConfig,
};
