//! Contract scripts
//!
//! Builds the bytecode that invokes deployed contracts and authorizes
//! transactions. Scripts are assembled and inspected here but never
//! executed.
//!
//! # Example
//!
//! ```rust
//! use neo_sdk::contract::{build_call_method_script, ContractParam};
//! use neo_sdk::core::UInt160;
//!
//! let token: UInt160 = "ecc6b20d3ccac1ee9ef109af5a7cdb85706b1df9".parse().unwrap();
//! let script = build_call_method_script(&token, "name", &[], false).unwrap();
//! assert_eq!(script[0], 0x00); // empty argument array
//!
//! let bad = build_call_method_script(&token, "name", &[ContractParam::Void], false);
//! assert!(bad.is_err());
//! ```

pub mod builder;
pub mod disasm;
pub mod opcodes;
pub mod params;

use thiserror::Error;

use crate::crypto::KeyError;

pub use builder::{
    build_basic_verify_script, build_basic_witness_script, build_call_method_script,
    ScriptBuilder,
};
pub use disasm::disassemble;
pub use opcodes::{OpCode, Operand};
pub use params::ContractParam;

/// Errors raised while building scripts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    #[error("Unsupported argument type: {0}")]
    UnsupportedArgumentType(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Key(#[from] KeyError),
}
