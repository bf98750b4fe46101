//! ECDSA key management on NIST P-256
//!
//! Provides key pair generation, WIF import/export, compressed public key
//! encoding and recovery, and signing/verification over secp256r1.
//! Signatures are 64 bytes `r || s`, each a zero-padded big-endian integer.
//! Nonces are derived deterministically (RFC 6979).

use std::fmt;

use num_bigint::BigUint;
use p256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use p256::ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use thiserror::Error;

use crate::codec::{self, CodecError};

/// WIF version prefix
const WIF_PREFIX: u8 = 0x80;
/// WIF trailing marker for a compressed public key
const WIF_COMPRESSED: u8 = 0x01;
const WIF_PAYLOAD_LEN: usize = 34;

pub const PRIVATE_KEY_LEN: usize = 32;
pub const COMPRESSED_PUBKEY_LEN: usize = 33;
pub const SIGNATURE_LEN: usize = 64;

/// Field prime of P-256
const P256_P: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
];

/// Curve coefficient `b` of P-256 (`a` is -3)
const P256_B: [u8; 32] = [
    0x5a, 0xc6, 0x35, 0xd8, 0xaa, 0x3a, 0x93, 0xe7, 0xb3, 0xeb, 0xbd, 0x55, 0x76, 0x98, 0x86, 0xbc,
    0x65, 0x1d, 0x06, 0xb0, 0xcc, 0x53, 0xb0, 0xf6, 0x3b, 0xce, 0x3c, 0x3e, 0x27, 0xd2, 0x60, 0x4b,
];

/// Errors that can occur during key operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),
    #[error("Curve error: {0}")]
    CurveError(String),
    #[error("Signature must be 64 bytes, got {0}")]
    SignatureLengthInvalid(usize),
    #[error("Key pair has no private key")]
    MissingPrivateKey,
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Supported elliptic curves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Curve {
    /// NIST P-256, also known as prime256v1
    Secp256r1,
}

impl Curve {
    pub fn name(&self) -> &'static str {
        match self {
            Curve::Secp256r1 => "secp256r1",
        }
    }
}

/// A key pair: curve, optional private scalar and public point.
///
/// A pair without a private scalar is public-only and can verify but
/// not sign.
#[derive(Clone)]
pub struct KeyPair {
    curve: Curve,
    secret: Option<SigningKey>,
    public: VerifyingKey,
}

impl KeyPair {
    /// Generate a new random key pair
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut OsRng);
        Self::from_signing_key(signing_key)
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let public = *signing_key.verifying_key();
        Self {
            curve: Curve::Secp256r1,
            secret: Some(signing_key),
            public,
        }
    }

    /// Create a key pair from a 32-byte big-endian private scalar
    pub fn from_private_key(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != PRIVATE_KEY_LEN {
            return Err(KeyError::InvalidEncoding(format!(
                "private key must be {} bytes, got {}",
                PRIVATE_KEY_LEN,
                bytes.len()
            )));
        }
        if bytes.iter().all(|b| *b == 0) {
            return Err(KeyError::InvalidEncoding("private key is zero".into()));
        }

        let signing_key = SigningKey::from_slice(bytes)
            .map_err(|_| KeyError::InvalidEncoding("private key out of range".into()))?;
        Ok(Self::from_signing_key(signing_key))
    }

    /// Create a key pair from a hex-encoded private key
    pub fn from_private_key_hex(hex_key: &str) -> Result<Self, KeyError> {
        let bytes =
            hex::decode(hex_key).map_err(|e| KeyError::InvalidEncoding(format!("hex: {}", e)))?;
        Self::from_private_key(&bytes)
    }

    /// Create a public-only key pair from a compressed (33-byte) or
    /// uncompressed (65-byte) SEC1 public key
    pub fn from_public_key(bytes: &[u8]) -> Result<Self, KeyError> {
        let public = if bytes.len() == COMPRESSED_PUBKEY_LEN {
            decode_compressed_pubkey(bytes)?
        } else {
            VerifyingKey::from_sec1_bytes(bytes)
                .map_err(|_| KeyError::CurveError("point is not on the curve".into()))?
        };
        Ok(Self {
            curve: Curve::Secp256r1,
            secret: None,
            public,
        })
    }

    /// Import a private key from Wallet Import Format
    pub fn from_wif(wif: &str) -> Result<Self, KeyError> {
        let payload = codec::decode_with_checksum(wif)?;
        if payload.len() != WIF_PAYLOAD_LEN {
            return Err(KeyError::InvalidEncoding(format!(
                "WIF payload must be {} bytes, got {}",
                WIF_PAYLOAD_LEN,
                payload.len()
            )));
        }
        if payload[0] != WIF_PREFIX {
            return Err(KeyError::InvalidEncoding(format!(
                "WIF prefix must be 0x80, got {:#04x}",
                payload[0]
            )));
        }
        if payload[WIF_PAYLOAD_LEN - 1] != WIF_COMPRESSED {
            return Err(KeyError::InvalidEncoding(
                "WIF is missing the compressed-key marker".into(),
            ));
        }

        Self::from_private_key(&payload[1..1 + PRIVATE_KEY_LEN])
    }

    /// Export the private key in Wallet Import Format
    pub fn to_wif(&self) -> Result<String, KeyError> {
        let scalar = self.private_key_bytes().ok_or(KeyError::MissingPrivateKey)?;

        let mut payload = Vec::with_capacity(WIF_PAYLOAD_LEN);
        payload.push(WIF_PREFIX);
        payload.extend_from_slice(&scalar);
        payload.push(WIF_COMPRESSED);
        Ok(codec::encode_with_checksum(&payload).0)
    }

    pub fn curve(&self) -> Curve {
        self.curve
    }

    /// True iff the pair carries a non-zero private scalar
    pub fn has_private_key(&self) -> bool {
        self.secret.is_some()
    }

    /// The private scalar as 32 big-endian bytes
    pub fn private_key_bytes(&self) -> Option<[u8; PRIVATE_KEY_LEN]> {
        self.secret.as_ref().map(|key| {
            let mut out = [0u8; PRIVATE_KEY_LEN];
            out.copy_from_slice(&key.to_bytes());
            out
        })
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.public
    }

    /// Compressed public key: `0x02`/`0x03` by Y parity, then X
    pub fn public_key_compressed(&self) -> [u8; COMPRESSED_PUBKEY_LEN] {
        encode_compressed_pubkey(&self.public)
    }

    /// Get the public key as a hex string (compressed format)
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key_compressed())
    }

    /// Sign a message. The message is hashed with SHA-256 first.
    pub fn sign(&self, message: &[u8]) -> Result<[u8; SIGNATURE_LEN], KeyError> {
        let key = self.secret.as_ref().ok_or(KeyError::MissingPrivateKey)?;
        let signature: Signature = key
            .try_sign(message)
            .map_err(|e| KeyError::CurveError(e.to_string()))?;
        Ok(signature_bytes(&signature))
    }

    /// Sign a precomputed 32-byte digest
    pub fn sign_digest(&self, digest: &[u8; 32]) -> Result<[u8; SIGNATURE_LEN], KeyError> {
        let key = self.secret.as_ref().ok_or(KeyError::MissingPrivateKey)?;
        let signature: Signature = key
            .sign_prehash(digest)
            .map_err(|e| KeyError::CurveError(e.to_string()))?;
        Ok(signature_bytes(&signature))
    }

    /// Verify a signature produced by [`KeyPair::sign`].
    ///
    /// Fails only on a signature of the wrong length; every other mismatch
    /// yields `Ok(false)`.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<bool, KeyError> {
        let signature = parse_signature(signature)?;
        Ok(signature.map_or(false, |sig| self.public.verify(message, &sig).is_ok()))
    }

    /// Verify a signature over a precomputed 32-byte digest
    pub fn verify_digest(&self, digest: &[u8; 32], signature: &[u8]) -> Result<bool, KeyError> {
        let signature = parse_signature(signature)?;
        Ok(signature.map_or(false, |sig| {
            self.public.verify_prehash(digest, &sig).is_ok()
        }))
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("curve", &self.curve)
            .field("public", &self.public_key_hex())
            .field("has_private_key", &self.has_private_key())
            .finish()
    }
}

fn signature_bytes(signature: &Signature) -> [u8; SIGNATURE_LEN] {
    let mut out = [0u8; SIGNATURE_LEN];
    out.copy_from_slice(&signature.to_bytes());
    out
}

fn parse_signature(bytes: &[u8]) -> Result<Option<Signature>, KeyError> {
    if bytes.len() != SIGNATURE_LEN {
        return Err(KeyError::SignatureLengthInvalid(bytes.len()));
    }
    Ok(Signature::from_slice(bytes).ok())
}

/// Encode a public point as 33 bytes
pub fn encode_compressed_pubkey(key: &VerifyingKey) -> [u8; COMPRESSED_PUBKEY_LEN] {
    let point = key.to_encoded_point(true);
    let mut out = [0u8; COMPRESSED_PUBKEY_LEN];
    out.copy_from_slice(point.as_bytes());
    out
}

/// Recover a public point from its compressed encoding.
///
/// Solves `y^2 = x^3 - 3x + b (mod p)`. P-256's prime is `3 mod 4`, so the
/// root is `alpha^((p + 1) / 4)`. The prefix's low bit picks `y` or `p - y`.
pub fn decode_compressed_pubkey(bytes: &[u8]) -> Result<VerifyingKey, KeyError> {
    if bytes.len() != COMPRESSED_PUBKEY_LEN {
        return Err(KeyError::InvalidEncoding(format!(
            "compressed public key must be {} bytes, got {}",
            COMPRESSED_PUBKEY_LEN,
            bytes.len()
        )));
    }
    let prefix = bytes[0];
    if prefix != 0x02 && prefix != 0x03 {
        return Err(KeyError::CurveError(format!(
            "unsupported public key prefix {:#04x}",
            prefix
        )));
    }

    let p = BigUint::from_bytes_be(&P256_P);
    let b = BigUint::from_bytes_be(&P256_B);
    let x = BigUint::from_bytes_be(&bytes[1..]);
    if x >= p {
        return Err(KeyError::CurveError("x coordinate exceeds field prime".into()));
    }

    // x^3 - 3x + b, kept non-negative by adding 3p
    let alpha = (x.modpow(&BigUint::from(3u32), &p) + &b + &p * 3u32 - &x * 3u32) % &p;
    let exponent = (&p + 1u32) >> 2;
    let mut y = alpha.modpow(&exponent, &p);
    if (&y * &y) % &p != alpha {
        return Err(KeyError::CurveError("x has no square root on the curve".into()));
    }

    let y_odd = y.to_bytes_le()[0] & 1 == 1;
    if y_odd != (prefix & 1 == 1) {
        y = (&p - &y) % &p;
    }

    let mut sec1 = [0u8; 65];
    sec1[0] = 0x04;
    sec1[1..33].copy_from_slice(&bytes[1..]);
    let y_bytes = y.to_bytes_be();
    sec1[65 - y_bytes.len()..].copy_from_slice(&y_bytes);

    VerifyingKey::from_sec1_bytes(&sec1)
        .map_err(|_| KeyError::CurveError("recovered point is not on the curve".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash::sha256;
    use rand::RngCore;

    const GENERATOR_COMPRESSED: &str =
        "036b17d1f2e12c4247f8bce6e563a440f277037d812deb33a0f4a13945d898c296";

    fn scalar_one() -> KeyPair {
        let mut bytes = [0u8; 32];
        bytes[31] = 1;
        KeyPair::from_private_key(&bytes).unwrap()
    }

    #[test]
    fn test_key_pair_generation() {
        let kp = KeyPair::generate();
        assert!(kp.has_private_key());
        assert_eq!(kp.curve(), Curve::Secp256r1);
        assert_eq!(kp.public_key_hex().len(), 66);
    }

    #[test]
    fn test_generator_compressed_encoding() {
        assert_eq!(scalar_one().public_key_hex(), GENERATOR_COMPRESSED);
    }

    #[test]
    fn test_negated_generator_has_even_prefix() {
        let n_minus_one =
            hex::decode("ffffffff00000000ffffffffffffffffbce6faada7179e84f3b9cac2fc632550")
                .unwrap();
        let kp = KeyPair::from_private_key(&n_minus_one).unwrap();
        assert_eq!(kp.public_key_hex(), format!("02{}", &GENERATOR_COMPRESSED[2..]));
    }

    #[test]
    fn test_wif_of_scalar_one() {
        let wif = scalar_one().to_wif().unwrap();
        assert_eq!(wif, "KwDiBf89QgGbjEhKnhXJuH7LrciVrZi3qYjgd9M7rFU73sVHnoWn");
        let restored = KeyPair::from_wif(&wif).unwrap();
        assert_eq!(restored.public_key_hex(), GENERATOR_COMPRESSED);
    }

    #[test]
    fn test_wif_round_trip() {
        let kp = KeyPair::generate();
        let restored = KeyPair::from_wif(&kp.to_wif().unwrap()).unwrap();
        assert_eq!(kp.private_key_bytes(), restored.private_key_bytes());
        assert_eq!(kp.public_key_compressed(), restored.public_key_compressed());
    }

    #[test]
    fn test_wif_rejects_bad_layout() {
        let mut payload = vec![0x80];
        payload.extend_from_slice(&[7u8; 32]);
        payload.push(0x01);

        let mut wrong_prefix = payload.clone();
        wrong_prefix[0] = 0xef;
        let (text, _) = codec::encode_with_checksum(&wrong_prefix);
        assert!(matches!(KeyPair::from_wif(&text), Err(KeyError::InvalidEncoding(_))));

        let mut no_marker = payload.clone();
        no_marker[33] = 0x00;
        let (text, _) = codec::encode_with_checksum(&no_marker);
        assert!(matches!(KeyPair::from_wif(&text), Err(KeyError::InvalidEncoding(_))));

        let (text, _) = codec::encode_with_checksum(&payload[..33]);
        assert!(matches!(KeyPair::from_wif(&text), Err(KeyError::InvalidEncoding(_))));

        let mut zero = payload.clone();
        zero[1..33].fill(0);
        let (text, _) = codec::encode_with_checksum(&zero);
        assert!(matches!(KeyPair::from_wif(&text), Err(KeyError::InvalidEncoding(_))));
    }

    #[test]
    fn test_wif_checksum_failure() {
        let wif = scalar_one().to_wif().unwrap();
        let mut raw = codec::decode(&wif).unwrap();
        raw[10] ^= 0x01;
        assert_eq!(
            KeyPair::from_wif(&codec::encode(&raw)).unwrap_err(),
            KeyError::Codec(CodecError::ChecksumMismatch)
        );
    }

    #[test]
    fn test_sign_and_verify_many_payloads() {
        let kp = KeyPair::generate();
        let mut rng = rand::thread_rng();

        for i in 0..100 {
            let mut payload = vec![0u8; 1 + i % 97];
            rng.fill_bytes(&mut payload);

            let signature = kp.sign(&payload).unwrap();
            assert!(kp.verify(&payload, &signature).unwrap());

            let bit = (rng.next_u32() as usize) % (payload.len() * 8);
            let mut tampered = payload.clone();
            tampered[bit / 8] ^= 1 << (bit % 8);
            assert!(!kp.verify(&tampered, &signature).unwrap());

            let bit = (rng.next_u32() as usize) % (SIGNATURE_LEN * 8);
            let mut bad_sig = signature;
            bad_sig[bit / 8] ^= 1 << (bit % 8);
            assert!(!kp.verify(&payload, &bad_sig).unwrap());
        }
    }

    #[test]
    fn test_signing_is_deterministic() {
        let kp = scalar_one();
        assert_eq!(kp.sign(b"payload").unwrap(), kp.sign(b"payload").unwrap());
    }

    #[test]
    fn test_sign_digest_matches_message_signing() {
        let kp = KeyPair::generate();
        let message = b"unsigned transaction bytes";
        let digest = sha256(message);

        let signature = kp.sign_digest(&digest).unwrap();
        assert!(kp.verify(message, &signature).unwrap());
        assert!(kp.verify_digest(&digest, &signature).unwrap());
    }

    #[test]
    fn test_verify_rejects_wrong_length() {
        let kp = KeyPair::generate();
        assert_eq!(
            kp.verify(b"data", &[0u8; 63]),
            Err(KeyError::SignatureLengthInvalid(63))
        );
        assert_eq!(kp.verify(b"data", &[0u8; 64]), Ok(false));
    }

    #[test]
    fn test_public_only_cannot_sign() {
        let kp = KeyPair::generate();
        let public = KeyPair::from_public_key(&kp.public_key_compressed()).unwrap();
        assert!(!public.has_private_key());
        assert_eq!(public.sign(b"data"), Err(KeyError::MissingPrivateKey));
        assert_eq!(public.to_wif(), Err(KeyError::MissingPrivateKey));

        let signature = kp.sign(b"data").unwrap();
        assert!(public.verify(b"data", &signature).unwrap());
    }

    #[test]
    fn test_compressed_pubkey_round_trip_both_parities() {
        let mut seen_even = false;
        let mut seen_odd = false;

        for _ in 0..200 {
            let kp = KeyPair::generate();
            let encoded = kp.public_key_compressed();
            let decoded = decode_compressed_pubkey(&encoded).unwrap();
            assert_eq!(&decoded, kp.verifying_key());
            assert_eq!(
                decoded.to_encoded_point(false),
                kp.verifying_key().to_encoded_point(false)
            );

            match encoded[0] {
                0x02 => seen_even = true,
                0x03 => seen_odd = true,
                other => panic!("unexpected prefix {:#x}", other),
            }
            if seen_even && seen_odd {
                break;
            }
        }
        assert!(seen_even && seen_odd);
    }

    #[test]
    fn test_decompress_rejects_bad_input() {
        let mut bytes = hex::decode(GENERATOR_COMPRESSED).unwrap();
        bytes[0] = 0x04;
        assert!(matches!(
            decode_compressed_pubkey(&bytes),
            Err(KeyError::CurveError(_))
        ));

        assert!(matches!(
            decode_compressed_pubkey(&bytes[..32]),
            Err(KeyError::InvalidEncoding(_))
        ));

        let mut beyond_prime = [0xffu8; 33];
        beyond_prime[0] = 0x02;
        assert!(matches!(
            decode_compressed_pubkey(&beyond_prime),
            Err(KeyError::CurveError(_))
        ));
    }

    #[test]
    fn test_decompress_finds_non_residue() {
        // Roughly half of all x values are not on the curve
        let mut failures = 0;
        for x in 0u8..32 {
            let mut bytes = [0u8; 33];
            bytes[0] = 0x02;
            bytes[32] = x;
            if let Err(err) = decode_compressed_pubkey(&bytes) {
                assert!(matches!(err, KeyError::CurveError(_)));
                failures += 1;
            }
        }
        assert!(failures > 0);
    }
}
