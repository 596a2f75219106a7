//! Metrics collection and exposition.
//!
//! # Metrics
//! - `deployer_pipeline_stage_total` (counter): stages entered, by stage
//! - `deployer_pipeline_outcome_total` (counter): terminal events, by kind and outcome
//! - `deployer_unlock_total` (counter): unlock attempts, by outcome
//! - `deployer_rpc_duration_seconds` (histogram): RPC latency, by method
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_stage(stage: &'static str) {
    counter!("deployer_pipeline_stage_total", "stage" => stage).increment(1);
}

pub fn record_outcome(kind: &'static str, outcome: &'static str) {
    counter!("deployer_pipeline_outcome_total", "kind" => kind, "outcome" => outcome)
        .increment(1);
}

pub fn record_unlock(outcome: &'static str) {
    counter!("deployer_unlock_total", "outcome" => outcome).increment(1);
}

pub fn record_rpc(method: &'static str, start: Instant) {
    histogram!("deployer_rpc_duration_seconds", "method" => method)
        .record(start.elapsed().as_secs_f64());
}
