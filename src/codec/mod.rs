//! Wire and text codecs
//!
//! This module provides:
//! - Base58 with the 4-byte double SHA-256 checksum (addresses, WIF)
//! - The canonical variable-length integer used for lengths and counts

pub mod base58;
pub mod varint;

use thiserror::Error;

pub use base58::{decode, decode_with_checksum, encode, encode_with_checksum};
pub use varint::VarInt;

/// Errors raised while decoding wire or text encodings
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Checksum mismatch")]
    ChecksumMismatch,
    #[error("Invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),
}
