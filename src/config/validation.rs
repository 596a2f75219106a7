//! Configuration validation.
//!
//! Serde handles syntax; this checks values. Every violation is reported,
//! not just the first.

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::DeployerConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check value ranges and formats.
pub fn validate_config(config: &DeployerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = config.network.rpc_url.parse::<url::Url>() {
        errors.push(ValidationError::new("network.rpc_url", e.to_string()));
    }
    for failover in &config.network.failover_urls {
        if failover.parse::<url::Url>().is_err() {
            errors.push(ValidationError::new(
                "network.failover_urls",
                format!("invalid URL '{failover}'"),
            ));
        }
    }
    if config.network.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("network.rpc_timeout_secs", "must be > 0"));
    }

    let multiplier = config.pipeline.gas_multiplier;
    if !multiplier.is_finite() || multiplier <= 1.0 {
        errors.push(ValidationError::new(
            "pipeline.gas_multiplier",
            format!("must be a finite number > 1.0, got {multiplier}"),
        ));
    }
    if config.pipeline.receipt_timeout_secs == 0 {
        errors.push(ValidationError::new("pipeline.receipt_timeout_secs", "must be > 0"));
    }
    if config.pipeline.receipt_poll_interval_ms == 0 {
        errors.push(ValidationError::new(
            "pipeline.receipt_poll_interval_ms",
            "must be > 0",
        ));
    }

    if config.vault.max_unlock_attempts == 0 {
        errors.push(ValidationError::new("vault.max_unlock_attempts", "must be >= 1"));
    }

    if config.workspace.settings_path.is_empty() {
        errors.push(ValidationError::new("workspace.settings_path", "must not be empty"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("invalid socket address '{}'", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
