//! Core NEO data model
//!
//! This module contains the fundamental building blocks:
//! - Fixed-size hashes with wire and display byte orders
//! - Addresses (versioned, checksummed script hashes)
//! - Well-known assets and fixed-point amounts
//! - Witnesses
//! - Transactions (two-phase builder, canonical bytes, txid)

pub mod address;
pub mod asset;
pub mod transaction;
pub mod types;
pub mod witness;

pub use address::{Address, AddressError};
pub use asset::{
    asset_id, asset_symbol, format_fixed8, parse_fixed8, resolve_asset, ASSET_VALUE_BASE,
    GAS_ASSET_ID, NEO_ASSET_ID,
};
pub use transaction::{
    AttributeUsage, Transaction, TransactionAttribute, TransactionBuilder, TransactionError,
    TransactionType, TxInput, TxOutput, Utxo, MAX_ATTRIBUTE_DATA,
};
pub use types::{UInt160, UInt256};
pub use witness::Witness;
