//! NEO SDK: client-side building blocks for the NEO 2.x blockchain
//!
//! This crate provides everything a wallet or dApp backend needs short of a
//! node:
//! - SHA-256, double SHA-256 and RIPEMD-160 hashing
//! - Base58Check and VarInt codecs
//! - P-256 key pairs, WIF import/export, compressed public key recovery
//! - Addresses derived from verification scripts
//! - Contract invocation scripts and single-signature witnesses
//! - UTXO transfer and invocation transactions with canonical bytes and txid
//! - An async JSON-RPC client and a polling block follower
//!
//! # Example
//!
//! ```rust
//! use neo_sdk::core::{TransactionBuilder, NEO_ASSET_ID};
//! use neo_sdk::crypto::KeyPair;
//!
//! // Create a key pair and its single-signature address
//! let keypair = KeyPair::generate();
//! let address = keypair.basic_address();
//!
//! // Send 1 NEO to ourselves from a previous output
//! let mut builder = TransactionBuilder::contract();
//! builder
//!     .append_input_by_hash(&"ab".repeat(32), 0)
//!     .unwrap()
//!     .append_output(&address, NEO_ASSET_ID, 100_000_000)
//!     .unwrap();
//!
//! let tx = builder.sign_with(&[keypair]).unwrap();
//! println!("txid {} raw {}", tx.txid(), tx.raw_transaction_hex());
//! ```

pub mod cli;
pub mod codec;
pub mod config;
pub mod contract;
pub mod core;
pub mod crypto;
pub mod network;
pub mod rpc;

// Re-export commonly used types
pub use config::SdkConfig;
pub use contract::{ContractParam, OpCode, ScriptBuilder, ScriptError};
pub use core::{
    Address, Transaction, TransactionBuilder, TransactionError, UInt160, UInt256, Utxo, Witness,
    ASSET_VALUE_BASE, GAS_ASSET_ID, NEO_ASSET_ID,
};
pub use crypto::{KeyError, KeyPair};
pub use network::{BlockFollower, BlockSource};
pub use rpc::{RpcClient, RpcError};
