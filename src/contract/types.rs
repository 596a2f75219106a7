//! Contract artifact types and error definitions.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading artifacts or preparing call data.
///
/// All of these are detected before any network interaction.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// No compiled artifact exists for the contract.
    #[error("You need to compile the contract first: no artifact for {0}")]
    ContractNotCompiled(String),

    #[error("Failed to read artifact {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed artifact {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    /// The artifact is an interface or abstract contract.
    #[error("Contract {0} has no bytecode to deploy")]
    MissingBytecode(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Wrong number of parameters: expected {expected}, got {got}")]
    ArgumentCountMismatch { expected: usize, got: usize },

    /// A parameter could not be parsed or converted to its ABI type.
    #[error("Error encoding arguments: {0}")]
    InvalidArgument(String),
}

/// Result type for artifact operations.
pub type ArtifactResult<T> = Result<T, ArtifactError>;

/// Settings key for a deployed contract: `"<source file name>:<ContractName>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContractKey {
    source_file: String,
    contract: String,
}

impl ContractKey {
    /// Only the file name of `source` is kept, so the key does not depend on
    /// the working directory.
    pub fn new(source: &str, contract: impl Into<String>) -> Self {
        let source_file = std::path::Path::new(source)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| source.to_string());
        Self {
            source_file,
            contract: contract.into(),
        }
    }

    pub fn contract(&self) -> &str {
        &self.contract
    }
}

impl fmt::Display for ContractKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source_file, self.contract)
    }
}
