//! Base58 and Base58Check
//!
//! Plain Base58 uses the Bitcoin alphabet, which leaves out `0`, `O`, `I`
//! and `l`. Each leading zero byte becomes one leading `1`. The checked
//! form appends `hash256(payload)[0..4]` before encoding.

use super::CodecError;
use crate::crypto::hash::checksum;

const CHECKSUM_LEN: usize = 4;

/// Encode bytes as Base58
pub fn encode(data: &[u8]) -> String {
    bs58::encode(data).into_string()
}

/// Decode a Base58 string
pub fn decode(text: &str) -> Result<Vec<u8>, CodecError> {
    bs58::decode(text).into_vec().map_err(|e| match e {
        bs58::decode::Error::InvalidCharacter { character, index } => CodecError::InvalidEncoding(
            format!("invalid base58 character {:?} at {}", character, index),
        ),
        other => CodecError::InvalidEncoding(other.to_string()),
    })
}

/// Append the checksum and encode.
///
/// Returns the Base58 string together with the checksummed bytes
/// (`payload || checksum`), which callers keep as the raw form.
pub fn encode_with_checksum(payload: &[u8]) -> (String, Vec<u8>) {
    let mut raw = Vec::with_capacity(payload.len() + CHECKSUM_LEN);
    raw.extend_from_slice(payload);
    raw.extend_from_slice(&checksum(payload));
    (encode(&raw), raw)
}

/// Decode and verify the trailing checksum, returning the payload
pub fn decode_with_checksum(text: &str) -> Result<Vec<u8>, CodecError> {
    let mut raw = decode(text)?;
    if raw.len() < CHECKSUM_LEN {
        return Err(CodecError::ChecksumMismatch);
    }

    let split = raw.len() - CHECKSUM_LEN;
    if checksum(&raw[..split]) != raw[split..] {
        return Err(CodecError::ChecksumMismatch);
    }

    raw.truncate(split);
    Ok(raw)
}
