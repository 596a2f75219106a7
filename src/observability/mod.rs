//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! vault, pipeline, read dispatcher, rpc client produce:
//!     → logging.rs (structured log events, invocation-id spans)
//!     → metrics.rs (counters, histograms)
//! ```
//!
//! # Design Decisions
//! - Secrets never reach a log field
//! - Metrics are no-ops unless the exporter is enabled

pub mod logging;
pub mod metrics;
