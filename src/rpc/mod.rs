//! Ledger RPC subsystem.
//!
//! # Data Flow
//! ```text
//! NetworkConfig (RPC URL, failovers, timeout)
//!     → client.rs (alloy providers, failover, receipt polling)
//!     → facade.rs (LedgerRpc trait consumed by pipeline and dispatcher)
//! ```

pub mod client;
pub mod facade;
pub mod types;

pub use client::RpcClient;
pub use facade::LedgerRpc;
pub use types::{RpcError, RpcResult, SignedTransaction, TxReceipt};
