//! Variable-length unsigned integers
//!
//! Canonical encoding used for every count and length prefix in the
//! transaction wire format:
//!
//! | value              | bytes                          |
//! |--------------------|--------------------------------|
//! | `< 0xfd`           | 1 raw byte                     |
//! | `<= 0xffff`        | `0xfd` + u16 little-endian     |
//! | `<= 0xffff_ffff`   | `0xfe` + u32 little-endian     |
//! | otherwise          | `0xff` + u64 little-endian     |

use super::CodecError;

const MARKER_U16: u8 = 0xfd;
const MARKER_U32: u8 = 0xfe;
const MARKER_U64: u8 = 0xff;

/// A variable-length integer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct VarInt(pub u64);

impl VarInt {
    /// Serialized size in bytes, without encoding
    pub fn length(&self) -> usize {
        match self.0 {
            v if v < MARKER_U16 as u64 => 1,
            v if v <= 0xffff => 3,
            v if v <= 0xffff_ffff => 5,
            _ => 9,
        }
    }

    /// Encode into a fresh buffer
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.length());
        self.encode_into(&mut out);
        out
    }

    /// Append the encoding to an existing buffer
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        let value = self.0;
        if value < MARKER_U16 as u64 {
            out.push(value as u8);
        } else if value <= 0xffff {
            out.push(MARKER_U16);
            out.extend_from_slice(&(value as u16).to_le_bytes());
        } else if value <= 0xffff_ffff {
            out.push(MARKER_U32);
            out.extend_from_slice(&(value as u32).to_le_bytes());
        } else {
            out.push(MARKER_U64);
            out.extend_from_slice(&value.to_le_bytes());
        }
    }

    /// Decode from the front of `bytes`.
    ///
    /// Returns the value and the number of bytes consumed. Trailing bytes
    /// are left for the caller.
    pub fn decode(bytes: &[u8]) -> Result<(VarInt, usize), CodecError> {
        let marker = *bytes.first().ok_or(CodecError::InvalidLength {
            expected: 1,
            actual: 0,
        })?;

        let width = match marker {
            MARKER_U16 => 2,
            MARKER_U32 => 4,
            MARKER_U64 => 8,
            small => return Ok((VarInt(small as u64), 1)),
        };

        let body = bytes
            .get(1..1 + width)
            .ok_or(CodecError::InvalidLength {
                expected: 1 + width,
                actual: bytes.len(),
            })?;

        let mut buf = [0u8; 8];
        buf[..width].copy_from_slice(body);
        Ok((VarInt(u64::from_le_bytes(buf)), 1 + width))
    }
}

impl From<u64> for VarInt {
    fn from(value: u64) -> Self {
        VarInt(value)
    }
}

impl From<usize> for VarInt {
    fn from(value: usize) -> Self {
        VarInt(value as u64)
    }
}
