//! Smart-contract deployment and invocation toolkit.

pub mod config;
pub mod contract;
pub mod observability;
pub mod pipeline;
pub mod prompt;
pub mod rpc;
pub mod settings;
pub mod vault;
pub mod workflow;

pub use config::schema::DeployerConfig;
pub use pipeline::{ProgressEvent, ProgressStream};
pub use workflow::{CommandError, DeployRequest, MethodCall, Workflow};
