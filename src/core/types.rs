//! Fixed-size hash types
//!
//! Both types store bytes in wire order, the order they are serialized in
//! a transaction. NEO displays hashes with the bytes reversed, so the hex
//! helpers come in two flavours: `*_display_hex` (reversed, what explorers
//! and nodes print) and `*_wire_hex` (as stored).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::codec::CodecError;

macro_rules! fixed_hash {
    ($name:ident, $len:expr, $doc:literal) => {
        #[doc = $doc]
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name([u8; $len]);

        impl $name {
            pub const LEN: usize = $len;

            /// Wrap bytes that are already in wire order
            pub const fn from_wire_bytes(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            /// Wire-order bytes from a slice of the right length
            pub fn from_slice(bytes: &[u8]) -> Result<Self, CodecError> {
                if bytes.len() != $len {
                    return Err(CodecError::InvalidLength {
                        expected: $len,
                        actual: bytes.len(),
                    });
                }
                let mut out = [0u8; $len];
                out.copy_from_slice(bytes);
                Ok(Self(out))
            }

            /// Parse display-order hex (an optional `0x` prefix is accepted)
            pub fn from_display_hex(text: &str) -> Result<Self, CodecError> {
                let mut hash = Self::from_wire_hex(text)?;
                hash.0.reverse();
                Ok(hash)
            }

            /// Parse wire-order hex (an optional `0x` prefix is accepted)
            pub fn from_wire_hex(text: &str) -> Result<Self, CodecError> {
                let text = text.strip_prefix("0x").unwrap_or(text);
                let bytes = hex::decode(text)
                    .map_err(|e| CodecError::InvalidEncoding(format!("hex: {}", e)))?;
                Self::from_slice(&bytes)
            }

            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// Bytes in display order
            pub fn to_reversed_bytes(&self) -> [u8; $len] {
                let mut out = self.0;
                out.reverse();
                out
            }

            pub fn to_display_hex(&self) -> String {
                hex::encode(self.to_reversed_bytes())
            }

            pub fn to_wire_hex(&self) -> String {
                hex::encode(self.0)
            }

            pub fn is_zero(&self) -> bool {
                self.0.iter().all(|b| *b == 0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.to_display_hex())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}(0x{})", stringify!($name), self.to_display_hex())
            }
        }

        impl FromStr for $name {
            type Err = CodecError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_display_hex(s)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_display_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let text = String::deserialize(deserializer)?;
                Self::from_display_hex(&text).map_err(serde::de::Error::custom)
            }
        }
    };
}

fixed_hash!(UInt160, 20, "A 20-byte hash: script hashes and contract hashes");
fixed_hash!(UInt256, 32, "A 32-byte hash: transaction ids and asset ids");
