//! Compiled contract artifacts.
//!
//! Artifacts are the JSON files the compiler writes into the build
//! directory. The `abi` field is either an embedded JSON string or an array;
//! `bytecode` is hex with or without `0x`.

use std::path::{Path, PathBuf};

use alloy::dyn_abi::{DynSolValue, JsonAbiExt};
use alloy::json_abi::{Function, JsonAbi};
use alloy::primitives::Bytes;
use serde::Deserialize;

use crate::contract::args;
use crate::contract::types::{ArtifactError, ArtifactResult};

#[derive(Deserialize)]
struct RawArtifact {
    abi: serde_json::Value,
    #[serde(default)]
    bytecode: String,
}

/// ABI and creation bytecode of one compiled contract.
#[derive(Debug, Clone)]
pub struct ContractArtifact {
    name: String,
    abi: JsonAbi,
    bytecode: Bytes,
}

impl ContractArtifact {
    /// Candidate artifact paths, in lookup order.
    pub fn candidate_paths(build_dir: &Path, name: &str) -> [PathBuf; 2] {
        let file = format!("{name}.json");
        [build_dir.join(&file), build_dir.join("contracts").join(&file)]
    }

    /// Load the artifact for `name` from `build_dir`.
    pub fn load(build_dir: &Path, name: &str) -> ArtifactResult<Self> {
        let path = Self::candidate_paths(build_dir, name)
            .into_iter()
            .find(|p| p.is_file())
            .ok_or_else(|| ArtifactError::ContractNotCompiled(name.to_string()))?;

        let content = std::fs::read_to_string(&path).map_err(|source| ArtifactError::Read {
            path: path.clone(),
            source,
        })?;

        let artifact = Self::from_json(name, &content).map_err(|reason| ArtifactError::Malformed {
            path: path.clone(),
            reason,
        })?;

        tracing::debug!(contract = name, path = %path.display(), "Loaded contract artifact");
        Ok(artifact)
    }

    fn from_json(name: &str, content: &str) -> Result<Self, String> {
        let raw: RawArtifact = serde_json::from_str(content).map_err(|e| e.to_string())?;

        let abi: JsonAbi = match raw.abi {
            serde_json::Value::String(embedded) => serde_json::from_str(&embedded),
            other => serde_json::from_value(other),
        }
        .map_err(|e| format!("invalid abi: {e}"))?;

        let code = raw.bytecode.trim();
        let bytecode = hex::decode(code.strip_prefix("0x").unwrap_or(code))
            .map_err(|e| format!("invalid bytecode: {e}"))?;

        Ok(Self {
            name: name.to_string(),
            abi,
            bytecode: Bytes::from(bytecode),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    /// Parse constructor parameters from user input.
    ///
    /// A contract without a declared constructor takes no parameters.
    pub fn constructor_args(&self, input: Option<&str>) -> ArtifactResult<Vec<DynSolValue>> {
        let raw = args::split_params(input)?;
        let inputs = self
            .abi
            .constructor
            .as_ref()
            .map(|c| c.inputs.as_slice())
            .unwrap_or_default();
        args::prepare_values(inputs, raw)
    }

    /// Creation code: bytecode followed by the encoded constructor arguments.
    pub fn deploy_code(&self, args: &[DynSolValue]) -> ArtifactResult<Bytes> {
        if self.bytecode.is_empty() {
            return Err(ArtifactError::MissingBytecode(self.name.clone()));
        }

        let encoded = match &self.abi.constructor {
            Some(constructor) => constructor
                .abi_encode_input(args)
                .map_err(|e| ArtifactError::InvalidArgument(e.to_string()))?,
            None if args.is_empty() => Vec::new(),
            None => {
                return Err(ArtifactError::ArgumentCountMismatch {
                    expected: 0,
                    got: args.len(),
                })
            }
        };

        let mut code = self.bytecode.to_vec();
        code.extend_from_slice(&encoded);
        Ok(code.into())
    }

    /// Resolve `name` to a function taking `arg_count` parameters.
    ///
    /// Overloads are told apart by parameter count only.
    pub fn function(&self, name: &str, arg_count: usize) -> ArtifactResult<&Function> {
        let overloads = self
            .abi
            .function(name)
            .filter(|fs| !fs.is_empty())
            .ok_or_else(|| ArtifactError::MethodNotFound(name.to_string()))?;

        overloads
            .iter()
            .find(|f| f.inputs.len() == arg_count)
            .ok_or(ArtifactError::ArgumentCountMismatch {
                expected: overloads[0].inputs.len(),
                got: arg_count,
            })
    }
}
