//! Transaction witnesses
//!
//! A witness pairs an invocation script (pushes signatures) with a
//! verification script (checks them). Its script hash is the hash of the
//! verification script.

use serde::{Deserialize, Serialize};

use super::types::UInt160;
use crate::codec::VarInt;
use crate::crypto::hash160;

/// Invocation and verification scripts proving authorization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Witness {
    #[serde(with = "hex_bytes", rename = "invocation")]
    invocation_script: Vec<u8>,
    #[serde(with = "hex_bytes", rename = "verification")]
    verification_script: Vec<u8>,
}

impl Witness {
    pub fn new(invocation_script: Vec<u8>, verification_script: Vec<u8>) -> Self {
        Self {
            invocation_script,
            verification_script,
        }
    }

    pub fn invocation_script(&self) -> &[u8] {
        &self.invocation_script
    }

    pub fn verification_script(&self) -> &[u8] {
        &self.verification_script
    }

    /// Script hash of the account this witness signs for
    pub fn script_hash(&self) -> UInt160 {
        UInt160::from_wire_bytes(hash160(&self.verification_script))
    }

    /// Append `VarInt len || invocation || VarInt len || verification`
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        VarInt::from(self.invocation_script.len()).encode_into(out);
        out.extend_from_slice(&self.invocation_script);
        VarInt::from(self.verification_script.len()).encode_into(out);
        out.extend_from_slice(&self.verification_script);
    }

    pub fn size(&self) -> usize {
        VarInt::from(self.invocation_script.len()).length()
            + self.invocation_script.len()
            + VarInt::from(self.verification_script.len()).length()
            + self.verification_script.len()
    }
}

/// Hex strings for byte vectors, the form nodes report scripts in
mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        hex::decode(text).map_err(serde::de::Error::custom)
    }
}
