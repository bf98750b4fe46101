//! Cryptographic utilities for NEO
//!
//! This module provides:
//! - SHA-256, double SHA-256 and RIPEMD-160 hashing
//! - ECDSA key management (secp256r1)

pub mod hash;
pub mod keys;

pub use hash::{checksum, hash160, hash256, hash256_hex, sha256, sha256_hex};
pub use keys::{decode_compressed_pubkey, encode_compressed_pubkey, Curve, KeyError, KeyPair};
