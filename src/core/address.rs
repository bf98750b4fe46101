//! Addresses
//!
//! An address is the Base58Check encoding of `version || script_hash`,
//! where the script hash is `hash160` of an authorization script.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use super::types::UInt160;
use crate::codec::{self, CodecError};
use crate::config;
use crate::contract::build_basic_verify_script;
use crate::crypto::{hash160, KeyPair};

/// `version || script_hash`
const RAW_LEN: usize = 1 + UInt160::LEN;

/// Address errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("Address payload must be 21 bytes, got {0}")]
    InvalidLength(usize),
}

/// A NEO address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    script: Option<Vec<u8>>,
    script_hash: UInt160,
    display: String,
    raw: [u8; RAW_LEN],
}

impl Address {
    /// Derive from an authorization script using the process-wide version
    pub fn from_script(script: &[u8]) -> Self {
        Self::from_script_with_version(script, config::address_version())
    }

    pub fn from_script_with_version(script: &[u8], version: u8) -> Self {
        let script_hash = UInt160::from_wire_bytes(hash160(script));
        let mut address = Self::from_script_hash_with_version(script_hash, version);
        address.script = Some(script.to_vec());
        address
    }

    /// Derive from a bare script hash using the process-wide version
    pub fn from_script_hash(script_hash: UInt160) -> Self {
        Self::from_script_hash_with_version(script_hash, config::address_version())
    }

    pub fn from_script_hash_with_version(script_hash: UInt160, version: u8) -> Self {
        let mut raw = [0u8; RAW_LEN];
        raw[0] = version;
        raw[1..].copy_from_slice(script_hash.as_bytes());
        let (display, _) = codec::encode_with_checksum(&raw);

        Self {
            script: None,
            script_hash,
            display,
            raw,
        }
    }

    /// Parse an address string, validating its checksum
    pub fn parse(text: &str) -> Result<Self, AddressError> {
        let payload = codec::decode_with_checksum(text)?;
        if payload.len() != RAW_LEN {
            return Err(AddressError::InvalidLength(payload.len()));
        }

        let mut raw = [0u8; RAW_LEN];
        raw.copy_from_slice(&payload);
        Ok(Self {
            script: None,
            script_hash: UInt160::from_slice(&raw[1..])?,
            display: text.to_string(),
            raw,
        })
    }

    pub fn script(&self) -> Option<&[u8]> {
        self.script.as_deref()
    }

    pub fn has_script(&self) -> bool {
        self.script.is_some()
    }

    pub fn script_hash(&self) -> &UInt160 {
        &self.script_hash
    }

    pub fn version(&self) -> u8 {
        self.raw[0]
    }

    pub fn as_str(&self) -> &str {
        &self.display
    }

    /// `version || script_hash`, without the checksum
    pub fn raw_bytes(&self) -> &[u8] {
        &self.raw
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.display)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

impl KeyPair {
    /// Single-signature verification script: `PUSHBYTES33 <pubkey> CHECKSIG`
    pub fn verification_script(&self) -> Vec<u8> {
        build_basic_verify_script(&self.public_key_compressed())
    }

    pub fn script_hash(&self) -> UInt160 {
        UInt160::from_wire_bytes(hash160(&self.verification_script()))
    }

    /// Address of the single-signature script, using the process-wide version
    pub fn basic_address(&self) -> Address {
        Address::from_script(&self.verification_script())
    }

    pub fn basic_address_with_version(&self, version: u8) -> Address {
        Address::from_script_with_version(&self.verification_script(), version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_ADDRESS_VERSION;

    fn scalar_one() -> KeyPair {
        let mut bytes = [0u8; 32];
        bytes[31] = 1;
        KeyPair::from_private_key(&bytes).unwrap()
    }

    #[test]
    fn test_address_of_scalar_one() {
        let address = scalar_one().basic_address_with_version(DEFAULT_ADDRESS_VERSION);
        assert_eq!(address.as_str(), "AR6NuGFzZfzqbXR3YasfXNmR3VHVNKi2yo");
        assert_eq!(
            address.script_hash().to_wire_hex(),
            "66390a342e73b750424b4c41c2108cdb40153aa1"
        );
        assert!(address.has_script());
        assert_eq!(address.version(), 23);
    }

    #[test]
    fn test_round_trip_from_script() {
        let kp = KeyPair::generate();
        let address = kp.basic_address_with_version(DEFAULT_ADDRESS_VERSION);
        assert!(address.as_str().starts_with('A'));

        let parsed = Address::parse(address.as_str()).unwrap();
        assert_eq!(parsed.script_hash(), address.script_hash());
        assert_eq!(parsed.raw_bytes(), address.raw_bytes());
        assert!(!parsed.has_script());
    }

    #[test]
    fn test_round_trip_from_script_hash() {
        let hash = UInt160::from_wire_bytes([0x42; 20]);
        let address = Address::from_script_hash_with_version(hash, DEFAULT_ADDRESS_VERSION);
        let parsed: Address = address.to_string().parse().unwrap();
        assert_eq!(*parsed.script_hash(), hash);
        assert_eq!(parsed, address);
    }

    #[test]
    fn test_script_hash_matches_hash160() {
        let script = [0x51u8, 0x52, 0x93];
        let address = Address::from_script_with_version(&script, 23);
        assert_eq!(address.script_hash().as_bytes(), &hash160(&script));
        assert_eq!(address.script(), Some(&script[..]));
        assert_eq!(address.raw_bytes()[0], 23);
    }

    #[test]
    fn test_explicit_version_changes_prefix() {
        let hash = UInt160::from_wire_bytes([0x11; 20]);
        let a = Address::from_script_hash_with_version(hash, 23);
        let b = Address::from_script_hash_with_version(hash, 53);
        assert_ne!(a.as_str(), b.as_str());
        assert_eq!(Address::parse(b.as_str()).unwrap().version(), 53);
    }

    #[test]
    fn test_parse_rejects_corruption() {
        let address = scalar_one().basic_address_with_version(23);
        let mut text = address.to_string();
        let last = text.pop().unwrap();
        text.push(if last == 'o' { 'p' } else { 'o' });
        assert_eq!(
            Address::parse(&text),
            Err(AddressError::Codec(CodecError::ChecksumMismatch))
        );
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        let (text, _) = codec::encode_with_checksum(&[23u8; 20]);
        assert_eq!(Address::parse(&text), Err(AddressError::InvalidLength(20)));
    }

    #[test]
    fn test_serde_as_string() {
        let address = scalar_one().basic_address_with_version(23);
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, "\"AR6NuGFzZfzqbXR3YasfXNmR3VHVNKi2yo\"");
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back.script_hash(), address.script_hash());
    }
}
