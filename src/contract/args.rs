//! Parameter parsing for human-typed argument strings.
//!
//! Input is a comma-separated list of JSON values, e.g. `"0xabc…", 42, [1, 2]`.
//! Strings given for `bytes`/`bytesN` parameters are taken as UTF-8 text.
//! Bare numbers must fit in 64 bits; larger amounts are passed quoted.

use alloy::dyn_abi::{DynSolType, DynSolValue, Specifier};
use alloy::json_abi::Param;
use alloy::primitives::B256;
use serde_json::Value;

use crate::contract::types::{ArtifactError, ArtifactResult};

/// Split raw input into JSON values without looking at parameter types.
///
/// `None` and blank input mean no parameters.
pub fn split_params(input: Option<&str>) -> ArtifactResult<Vec<Value>> {
    let Some(input) = input.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(Vec::new());
    };

    serde_json::from_str(&format!("[{input}]"))
        .map_err(|e| ArtifactError::InvalidArgument(e.to_string()))
}

/// Check the count and convert each value to its declared ABI type.
pub fn prepare_values(params: &[Param], values: Vec<Value>) -> ArtifactResult<Vec<DynSolValue>> {
    if values.len() != params.len() {
        return Err(ArtifactError::ArgumentCountMismatch {
            expected: params.len(),
            got: values.len(),
        });
    }

    params
        .iter()
        .zip(values)
        .map(|(param, value)| {
            let ty: DynSolType = param
                .resolve()
                .map_err(|e| ArtifactError::InvalidArgument(format!("{}: {e}", param.name)))?;
            convert(&ty, &value).map_err(|reason| {
                ArtifactError::InvalidArgument(format!("{} ({}): {reason}", param.name, param.ty))
            })
        })
        .collect()
}

fn convert(ty: &DynSolType, value: &Value) -> Result<DynSolValue, String> {
    match (ty, value) {
        (DynSolType::Bytes, Value::String(s)) => Ok(DynSolValue::Bytes(s.as_bytes().to_vec())),
        (DynSolType::FixedBytes(size), Value::String(s)) => {
            if s.len() > *size {
                return Err(format!("{} bytes do not fit in bytes{size}", s.len()));
            }
            Ok(DynSolValue::FixedBytes(B256::right_padding_from(s.as_bytes()), *size))
        }
        (DynSolType::Array(inner), Value::Array(items)) => items
            .iter()
            .map(|item| convert(inner, item))
            .collect::<Result<_, _>>()
            .map(DynSolValue::Array),
        (DynSolType::FixedArray(inner, len), Value::Array(items)) => {
            if items.len() != *len {
                return Err(format!("expected {len} elements, got {}", items.len()));
            }
            items
                .iter()
                .map(|item| convert(inner, item))
                .collect::<Result<_, _>>()
                .map(DynSolValue::FixedArray)
        }
        (DynSolType::Tuple(types), Value::Array(items)) => {
            if items.len() != types.len() {
                return Err(format!("expected {} fields, got {}", types.len(), items.len()));
            }
            types
                .iter()
                .zip(items)
                .map(|(t, item)| convert(t, item))
                .collect::<Result<_, _>>()
                .map(DynSolValue::Tuple)
        }
        (_, Value::String(s)) => ty.coerce_str(s).map_err(|e| e.to_string()),
        (_, Value::Number(n)) => {
            if !(n.is_u64() || n.is_i64()) {
                return Err(format!("{n} is not an exact integer; pass large values as a string"));
            }
            ty.coerce_str(&n.to_string()).map_err(|e| e.to_string())
        }
        (_, Value::Bool(b)) => ty.coerce_str(&b.to_string()).map_err(|e| e.to_string()),
        (_, other) => Err(format!("unsupported value {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, U256};

    fn param(name: &str, ty: &str) -> Param {
        serde_json::from_value(serde_json::json!({
            "name": name,
            "type": ty,
            "internalType": ty,
        }))
        .unwrap()
    }

    #[test]
    fn test_blank_input_is_no_params() {
        assert!(split_params(None).unwrap().is_empty());
        assert!(split_params(Some("   ")).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_json() {
        let err = split_params(Some("1, two")).unwrap_err();
        assert!(matches!(err, ArtifactError::InvalidArgument(_)));
    }

    #[test]
    fn test_count_mismatch() {
        let values = split_params(Some("1, 2")).unwrap();
        let err = prepare_values(&[param("a", "uint256")], values).unwrap_err();
        assert!(matches!(
            err,
            ArtifactError::ArgumentCountMismatch {
                expected: 1,
                got: 2
            }
        ));
    }

    #[test]
    fn test_scalar_types() {
        let params = [
            param("to", "address"),
            param("amount", "uint256"),
            param("flag", "bool"),
            param("label", "string"),
        ];
        let values = split_params(Some(
            r#""0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266", "1000", true, "hello""#,
        ))
        .unwrap();

        let prepared = prepare_values(&params, values).unwrap();
        assert_eq!(
            prepared,
            vec![
                DynSolValue::Address(address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")),
                DynSolValue::Uint(U256::from(1000), 256),
                DynSolValue::Bool(true),
                DynSolValue::String("hello".into()),
            ]
        );
    }

    #[test]
    fn test_bytes_are_utf8_text() {
        let params = [param("data", "bytes"), param("tag", "bytes4")];
        let values = split_params(Some(r#""hi", "ab""#)).unwrap();

        let prepared = prepare_values(&params, values).unwrap();
        assert_eq!(prepared[0], DynSolValue::Bytes(b"hi".to_vec()));
        match &prepared[1] {
            DynSolValue::FixedBytes(word, 4) => assert_eq!(&word[..4], b"ab\0\0"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_array_param() {
        let values = split_params(Some("[1, 2, 3]")).unwrap();
        let prepared = prepare_values(&[param("xs", "uint8[]")], values).unwrap();
        assert_eq!(
            prepared[0],
            DynSolValue::Array(vec![
                DynSolValue::Uint(U256::from(1), 8),
                DynSolValue::Uint(U256::from(2), 8),
                DynSolValue::Uint(U256::from(3), 8),
            ])
        );
    }

    #[test]
    fn test_large_integer_must_be_quoted() {
        let values = split_params(Some("123456789012345678901234")).unwrap();
        let err = prepare_values(&[param("amount", "uint256")], values).unwrap_err();
        assert!(matches!(err, ArtifactError::InvalidArgument(_)));
        assert!(err.to_string().contains("amount"));

        let values = split_params(Some(r#""123456789012345678901234""#)).unwrap();
        let prepared = prepare_values(&[param("amount", "uint256")], values).unwrap();
        assert_eq!(
            prepared[0],
            DynSolValue::Uint(
                U256::from_str_radix("123456789012345678901234", 10).unwrap(),
                256
            )
        );
    }

    #[test]
    fn test_u64_max_as_number() {
        let values = split_params(Some("18446744073709551615")).unwrap();
        let prepared = prepare_values(&[param("amount", "uint256")], values).unwrap();
        assert_eq!(prepared[0], DynSolValue::Uint(U256::from(u64::MAX), 256));
    }

    #[test]
    fn test_fraction_rejected() {
        let values = split_params(Some("1.5")).unwrap();
        let err = prepare_values(&[param("amount", "uint256")], values).unwrap_err();
        assert!(matches!(err, ArtifactError::InvalidArgument(_)));
    }

    #[test]
    fn test_bad_value_names_param() {
        let values = split_params(Some(r#""not-a-number""#)).unwrap();
        let err = prepare_values(&[param("amount", "uint256")], values).unwrap_err();
        assert!(err.to_string().contains("amount"));
    }
}
