//! Contract invocation arguments
//!
//! A closed set of argument kinds. The script builder matches on them
//! exhaustively; anything it cannot push is rejected before a single byte
//! is emitted.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigInt;
use serde_json::{json, Value};

use super::ScriptError;
use crate::core::types::{UInt160, UInt256};

/// An argument passed to a contract method
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractParam {
    Hash160(UInt160),
    Hash256(UInt256),
    ByteArray(Vec<u8>),
    Integer(BigInt),
    String(String),
    Boolean(bool),
    Array(Vec<ContractParam>),
    /// Has no push encoding; only meaningful as a declared return type
    Void,
}

impl ContractParam {
    /// Node-side type name
    pub fn type_name(&self) -> &'static str {
        match self {
            ContractParam::Hash160(_) => "Hash160",
            ContractParam::Hash256(_) => "Hash256",
            ContractParam::ByteArray(_) => "ByteArray",
            ContractParam::Integer(_) => "Integer",
            ContractParam::String(_) => "String",
            ContractParam::Boolean(_) => "Boolean",
            ContractParam::Array(_) => "Array",
            ContractParam::Void => "Void",
        }
    }

    /// Check that this argument, and every nested one, can be pushed
    pub fn validate(&self) -> Result<(), ScriptError> {
        match self {
            ContractParam::Void => Err(ScriptError::UnsupportedArgumentType(
                self.type_name().to_string(),
            )),
            ContractParam::Array(items) => items.iter().try_for_each(ContractParam::validate),
            _ => Ok(()),
        }
    }

    /// The `{ "type": ..., "value": ... }` object the node's `invoke` expects
    pub fn to_rpc_json(&self) -> Value {
        let value = match self {
            ContractParam::Hash160(hash) => json!(hash.to_display_hex()),
            ContractParam::Hash256(hash) => json!(hash.to_display_hex()),
            ContractParam::ByteArray(bytes) => json!(hex::encode(bytes)),
            ContractParam::Integer(n) => json!(n.to_string()),
            ContractParam::String(s) => json!(s),
            ContractParam::Boolean(b) => json!(b),
            ContractParam::Array(items) => {
                Value::Array(items.iter().map(ContractParam::to_rpc_json).collect())
            }
            ContractParam::Void => Value::Null,
        };
        json!({ "type": self.type_name(), "value": value })
    }
}

/// Parses `type:value`, for example `hash160:0x...`, `integer:-5`,
/// `string:transfer`, `bytearray:0a0b`, `boolean:true`.
impl FromStr for ContractParam {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, value) = s.split_once(':').ok_or_else(|| {
            ScriptError::InvalidArgument(format!("expected type:value, got {:?}", s))
        })?;
        let bad_value =
            |reason: String| ScriptError::InvalidArgument(format!("{}: {}", kind, reason));

        match kind.to_ascii_lowercase().as_str() {
            "hash160" => UInt160::from_display_hex(value)
                .map(ContractParam::Hash160)
                .map_err(|e| bad_value(e.to_string())),
            "hash256" => UInt256::from_display_hex(value)
                .map(ContractParam::Hash256)
                .map_err(|e| bad_value(e.to_string())),
            "bytearray" | "bytes" => hex::decode(value.strip_prefix("0x").unwrap_or(value))
                .map(ContractParam::ByteArray)
                .map_err(|e| bad_value(e.to_string())),
            "integer" | "int" => BigInt::from_str(value)
                .map(ContractParam::Integer)
                .map_err(|e| bad_value(e.to_string())),
            "string" | "str" => Ok(ContractParam::String(value.to_string())),
            "boolean" | "bool" => match value {
                "true" | "1" => Ok(ContractParam::Boolean(true)),
                "false" | "0" => Ok(ContractParam::Boolean(false)),
                other => Err(bad_value(format!("not a boolean: {:?}", other))),
            },
            _ => Err(ScriptError::UnsupportedArgumentType(kind.to_string())),
        }
    }
}

impl fmt::Display for ContractParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractParam::Hash160(hash) => write!(f, "hash160:{}", hash),
            ContractParam::Hash256(hash) => write!(f, "hash256:{}", hash),
            ContractParam::ByteArray(bytes) => write!(f, "bytearray:{}", hex::encode(bytes)),
            ContractParam::Integer(n) => write!(f, "integer:{}", n),
            ContractParam::String(s) => write!(f, "string:{}", s),
            ContractParam::Boolean(b) => write!(f, "boolean:{}", b),
            ContractParam::Array(items) => {
                write!(f, "array:[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            ContractParam::Void => write!(f, "void"),
        }
    }
}

impl From<UInt160> for ContractParam {
    fn from(value: UInt160) -> Self {
        ContractParam::Hash160(value)
    }
}

impl From<UInt256> for ContractParam {
    fn from(value: UInt256) -> Self {
        ContractParam::Hash256(value)
    }
}

impl From<Vec<u8>> for ContractParam {
    fn from(value: Vec<u8>) -> Self {
        ContractParam::ByteArray(value)
    }
}

impl From<i64> for ContractParam {
    fn from(value: i64) -> Self {
        ContractParam::Integer(BigInt::from(value))
    }
}

impl From<BigInt> for ContractParam {
    fn from(value: BigInt) -> Self {
        ContractParam::Integer(value)
    }
}

impl From<&str> for ContractParam {
    fn from(value: &str) -> Self {
        ContractParam::String(value.to_string())
    }
}

impl From<String> for ContractParam {
    fn from(value: String) -> Self {
        ContractParam::String(value)
    }
}

impl From<bool> for ContractParam {
    fn from(value: bool) -> Self {
        ContractParam::Boolean(value)
    }
}

impl From<Vec<ContractParam>> for ContractParam {
    fn from(value: Vec<ContractParam>) -> Self {
        ContractParam::Array(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_typed_values() {
        assert_eq!(
            "integer:-5".parse::<ContractParam>().unwrap(),
            ContractParam::Integer(BigInt::from(-5))
        );
        assert_eq!(
            "string:transfer".parse::<ContractParam>().unwrap(),
            ContractParam::from("transfer")
        );
        assert_eq!(
            "bytearray:0a0b".parse::<ContractParam>().unwrap(),
            ContractParam::ByteArray(vec![0x0a, 0x0b])
        );
        assert_eq!(
            "bool:true".parse::<ContractParam>().unwrap(),
            ContractParam::Boolean(true)
        );
        assert!(matches!(
            "hash160:0x66390a342e73b750424b4c41c2108cdb40153aa1".parse::<ContractParam>(),
            Ok(ContractParam::Hash160(_))
        ));
    }

    #[test]
    fn test_string_keeps_colons() {
        assert_eq!(
            "string:a:b".parse::<ContractParam>().unwrap(),
            ContractParam::from("a:b")
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "void:".parse::<ContractParam>(),
            Err(ScriptError::UnsupportedArgumentType("void".into()))
        );
        assert!(matches!(
            "map:{}".parse::<ContractParam>(),
            Err(ScriptError::UnsupportedArgumentType(_))
        ));
        assert!(matches!(
            "integer:ten".parse::<ContractParam>(),
            Err(ScriptError::InvalidArgument(_))
        ));
        assert!(matches!(
            "noseparator".parse::<ContractParam>(),
            Err(ScriptError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_validate_nested_void() {
        let ok = ContractParam::Array(vec![1i64.into(), vec![ContractParam::from(true)].into()]);
        assert!(ok.validate().is_ok());

        let bad = ContractParam::Array(vec![1i64.into(), vec![ContractParam::Void].into()]);
        assert_eq!(
            bad.validate(),
            Err(ScriptError::UnsupportedArgumentType("Void".into()))
        );
    }

    #[test]
    fn test_rpc_json() {
        let param = ContractParam::Array(vec![
            ContractParam::from("name"),
            ContractParam::ByteArray(vec![0xde, 0xad]),
            ContractParam::from(42i64),
        ]);
        assert_eq!(
            param.to_rpc_json(),
            json!({
                "type": "Array",
                "value": [
                    { "type": "String", "value": "name" },
                    { "type": "ByteArray", "value": "dead" },
                    { "type": "Integer", "value": "42" }
                ]
            })
        );
    }
}
