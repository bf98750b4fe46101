//! Node JSON-RPC boundary
//!
//! Everything the SDK needs from a running node: chain height, blocks,
//! transactions, balances, unspent outputs, script simulation and relay of
//! signed transactions. Results come back as plain data for the core.

pub mod client;
pub mod types;

use thiserror::Error;

use crate::codec::CodecError;

pub use client::RpcClient;
pub use types::{Balance, InvokeResult, StackItem};

/// RPC errors
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("No result for {0}")]
    NoResult(String),
    #[error("Node error {code}: {message}")]
    Node { code: i64, message: String },
    #[error("VM did not halt: {0}")]
    VmFault(String),
    #[error("Missing or malformed field: {0}")]
    InvalidField(String),
    #[error(transparent)]
    Codec(#[from] CodecError),
}
