//! Transaction submission and read dispatch.
//!
//! # Data Flow
//! ```text
//! Submission (deploy | invoke) + PlaintextKey
//!     → submit.rs (estimate, price, nonce lane, sign, send, receipt)
//!     → progress.rs (ordered ProgressStream, one terminal event)
//!
//! ReadCall (pure | view)
//!     → read.rs (encode, eth_call, decode)
//!     → progress.rs (single Call or Failed)
//! ```

pub mod nonce;
pub mod progress;
pub mod read;
pub mod signer;
pub mod submit;
pub mod types;

pub use nonce::NonceLanes;
pub use progress::{ProgressEmitter, ProgressStream};
pub use read::{ReadCall, ReadDispatcher};
pub use submit::{gas_limit, TransactionPipeline};
pub use types::{Payload, PipelineError, PipelineResult, ProgressEvent, Stage, Submission};
