//! Decoded results of read-only calls.

use std::fmt;

use alloy::dyn_abi::{DynSolValue, FunctionExt};
use alloy::json_abi::Function;
use alloy::primitives::Bytes;

/// Result of a read-only method call.
#[derive(Debug, Clone, PartialEq)]
pub struct CallOutput {
    /// Raw return data.
    pub raw: Bytes,
    /// Return values decoded against the method's outputs.
    pub values: Vec<DynSolValue>,
    /// UTF-8 reading of a single `bytes`/`bytesN` output, when valid.
    pub text: Option<String>,
}

impl CallOutput {
    /// Decode `raw` against `function`'s declared outputs.
    pub fn decode(function: &Function, raw: Bytes) -> Result<Self, String> {
        let values = function
            .abi_decode_output(&raw)
            .map_err(|e| format!("Failed to decode result of {}: {e}", function.name))?;

        let text = match values.as_slice() {
            [DynSolValue::Bytes(bytes)] => String::from_utf8(bytes.clone()).ok(),
            [DynSolValue::FixedBytes(word, size)] => {
                let used = &word[..*size];
                let end = used.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
                String::from_utf8(used[..end].to_vec()).ok()
            }
            _ => None,
        };

        Ok(Self { raw, values, text })
    }
}

impl fmt::Display for CallOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.values.as_slice() {
            [] => write!(f, "{}", self.raw),
            [single] => f.write_str(&render(single)),
            many => f.write_str(&render_list(many)),
        }
    }
}

/// Human-readable form of a decoded value.
pub fn render(value: &DynSolValue) -> String {
    match value {
        DynSolValue::Bool(b) => b.to_string(),
        DynSolValue::Int(i, _) => i.to_string(),
        DynSolValue::Uint(u, _) => u.to_string(),
        DynSolValue::FixedBytes(word, size) => format!("0x{}", hex::encode(&word[..*size])),
        DynSolValue::Address(address) => address.to_checksum(None),
        DynSolValue::Bytes(bytes) => format!("0x{}", hex::encode(bytes)),
        DynSolValue::String(s) => format!("{s:?}"),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) => render_list(items),
        DynSolValue::Tuple(items) => format!("({})", join(items)),
        other => format!("{other:?}"),
    }
}

fn render_list(items: &[DynSolValue]) -> String {
    format!("[{}]", join(items))
}

fn join(items: &[DynSolValue]) -> String {
    items.iter().map(render).collect::<Vec<_>>().join(", ")
}
