//! Hashing utilities for NEO
//!
//! Provides the SHA-256 based hashes that bind keys, addresses and
//! transactions together:
//! - `sha256` for signing digests
//! - `hash256` (double SHA-256) for checksums and transaction ids
//! - `hash160` (RIPEMD-160 of SHA-256) for script hashes

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Computes SHA-256 hash of the input data
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Computes double SHA-256 hash (SHA-256 of SHA-256)
/// Used for Base58 checksums and transaction ids
pub fn hash256(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// Computes RIPEMD-160 of the SHA-256 hash of the input
/// Used to turn an authorization script into its script hash
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let mut ripemd = Ripemd160::new();
    ripemd.update(sha256(data));
    ripemd.finalize().into()
}

/// Computes SHA-256 hash and returns it as a hex string
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// Computes double SHA-256 hash and returns it as a hex string
pub fn hash256_hex(data: &[u8]) -> String {
    hex::encode(hash256(data))
}

/// First four bytes of `hash256(payload)`
pub fn checksum(payload: &[u8]) -> [u8; 4] {
    let hash = hash256(payload);
    [hash[0], hash[1], hash[2], hash[3]]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_hash256_empty() {
        assert_eq!(
            hash256_hex(b""),
            "5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456"
        );
    }

    #[test]
    fn test_hash160_empty() {
        assert_eq!(
            hex::encode(hash160(b"")),
            "b472a266d0bd89c13706a4132ccfb16f7c3b9fcb"
        );
    }

    #[test]
    fn test_checksum_is_hash256_prefix() {
        let data = b"hello world";
        assert_eq!(checksum(data), hash256(data)[..4]);
    }
}
