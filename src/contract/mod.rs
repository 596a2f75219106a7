//! Contract artifacts, parameters and results.
//!
//! # Data Flow
//! ```text
//! <build_dir>/<Name>.json
//!     → artifact.rs (ABI + bytecode, constructor/method lookup)
//!     → args.rs (typed parameters from user input)
//!     → pipeline / read dispatcher
//!     → output.rs (decoded call results)
//! ```

pub mod args;
pub mod artifact;
pub mod output;
pub mod types;

use alloy::json_abi::{Function, StateMutability};

pub use artifact::ContractArtifact;
pub use output::CallOutput;
pub use types::{ArtifactError, ArtifactResult, ContractKey};

/// `pure` and `view` methods are evaluated with `eth_call`; everything else
/// goes through the transaction pipeline.
pub fn is_read_only(function: &Function) -> bool {
    matches!(
        function.state_mutability,
        StateMutability::Pure | StateMutability::View
    )
}
