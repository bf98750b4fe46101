//! Well-known assets and fixed-point amounts
//!
//! UTXO values are `i64` fixed-point with 10^8 units per coin.

use super::types::UInt256;
use crate::codec::CodecError;

/// Units per whole coin
pub const ASSET_VALUE_BASE: i64 = 100_000_000;
const FRACTION_DIGITS: usize = 8;

/// Native governing token, `c56f33fc...daff7c9b` in display order
pub const NEO_ASSET_ID: UInt256 = UInt256::from_wire_bytes([
    0x9b, 0x7c, 0xff, 0xda, 0xa6, 0x74, 0xbe, 0xae, 0x0f, 0x93, 0x0e, 0xbe, 0x60, 0x85, 0xaf, 0x90,
    0x93, 0xe5, 0xfe, 0x56, 0xb3, 0x4a, 0x5c, 0x22, 0x0c, 0xcd, 0xcf, 0x6e, 0xfc, 0x33, 0x6f, 0xc5,
]);

/// Native utility token, `602c7971...69282de7` in display order
pub const GAS_ASSET_ID: UInt256 = UInt256::from_wire_bytes([
    0xe7, 0x2d, 0x28, 0x69, 0x79, 0xee, 0x6c, 0xb1, 0xb7, 0xe6, 0x5d, 0xfd, 0xdf, 0xb2, 0xe3, 0x84,
    0x10, 0x0b, 0x8d, 0x14, 0x8e, 0x77, 0x58, 0xde, 0x42, 0xe4, 0x16, 0x8b, 0x71, 0x79, 0x2c, 0x60,
]);

const KNOWN_ASSETS: [(&str, UInt256); 2] = [("NEO", NEO_ASSET_ID), ("GAS", GAS_ASSET_ID)];

/// Look up a well-known asset by symbol (case-insensitive)
pub fn asset_id(symbol: &str) -> Option<UInt256> {
    KNOWN_ASSETS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(symbol))
        .map(|(_, id)| *id)
}

/// Symbol of a well-known asset id
pub fn asset_symbol(id: &UInt256) -> Option<&'static str> {
    KNOWN_ASSETS
        .iter()
        .find(|(_, known)| known == id)
        .map(|(name, _)| *name)
}

/// Resolve a symbol or a display-order hex asset id
pub fn resolve_asset(text: &str) -> Result<UInt256, CodecError> {
    match asset_id(text) {
        Some(id) => Ok(id),
        None => UInt256::from_display_hex(text),
    }
}

/// Parse a decimal amount such as `"1.5"` into fixed-point units.
///
/// Parsing is exact: more than eight fractional digits is an error rather
/// than a silent truncation.
pub fn parse_fixed8(text: &str) -> Result<i64, CodecError> {
    let invalid =
        |reason: &str| CodecError::InvalidEncoding(format!("amount {:?}: {}", text, reason));

    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let (whole, fraction) = body.split_once('.').unwrap_or((body, ""));

    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid("empty"));
    }
    if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(invalid("not a decimal number"));
    }
    if fraction.len() > FRACTION_DIGITS {
        return Err(invalid("more than 8 fractional digits"));
    }

    let whole: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid("out of range"))?
    };
    let mut fraction_units: i64 = 0;
    for (i, digit) in fraction.bytes().enumerate() {
        fraction_units += (digit - b'0') as i64 * 10i64.pow((FRACTION_DIGITS - 1 - i) as u32);
    }

    let units = whole
        .checked_mul(ASSET_VALUE_BASE)
        .and_then(|v| v.checked_add(fraction_units))
        .ok_or_else(|| invalid("out of range"))?;
    Ok(if negative { -units } else { units })
}

/// Render fixed-point units as a decimal string without trailing zeros
pub fn format_fixed8(units: i64) -> String {
    let sign = if units < 0 { "-" } else { "" };
    let magnitude = units.unsigned_abs();
    let base = ASSET_VALUE_BASE as u64;
    let whole = magnitude / base;
    let fraction = magnitude % base;

    if fraction == 0 {
        return format!("{}{}", sign, whole);
    }
    let digits = format!("{:08}", fraction);
    format!("{}{}.{}", sign, whole, digits.trim_end_matches('0'))
}
