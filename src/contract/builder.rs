//! Script builder
//!
//! Emits the push/pack/call sequences that invocation and verification
//! scripts are made of.

use num_bigint::BigInt;
use rand::Rng;

use super::opcodes::{OpCode, PUSHBYTES75};
use super::params::ContractParam;
use super::ScriptError;
use crate::codec::VarInt;
use crate::core::types::UInt160;
use crate::core::witness::Witness;
use crate::crypto::{sha256, KeyPair};

/// Accumulates script bytes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptBuilder {
    buffer: Vec<u8>,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, op: OpCode) -> &mut Self {
        self.buffer.push(op as u8);
        self
    }

    /// Emit an opcode followed by raw operand bytes
    pub fn emit_with(&mut self, op: OpCode, operand: &[u8]) -> &mut Self {
        self.buffer.push(op as u8);
        self.buffer.extend_from_slice(operand);
        self
    }

    /// Push an integer. -1 and 0..=16 have single-byte opcodes; anything
    /// else is pushed as the little-endian bytes of its magnitude.
    pub fn push_number(&mut self, n: &BigInt) -> &mut Self {
        if let Some(op) = i64::try_from(n).ok().and_then(OpCode::small_int) {
            return self.emit(op);
        }
        let bytes = n.magnitude().to_bytes_le();
        self.push_bytes(&bytes)
    }

    pub fn push_integer(&mut self, n: i64) -> &mut Self {
        self.push_number(&BigInt::from(n))
    }

    /// Push raw bytes with the shortest length prefix
    pub fn push_bytes(&mut self, data: &[u8]) -> &mut Self {
        let len = data.len();
        if len <= PUSHBYTES75 as usize {
            self.buffer.push(len as u8);
        } else if len <= u8::MAX as usize {
            self.emit_with(OpCode::PushData1, &[len as u8]);
        } else if len <= u16::MAX as usize {
            self.emit_with(OpCode::PushData2, &(len as u16).to_le_bytes());
        } else {
            self.emit_with(OpCode::PushData4, &(len as u32).to_le_bytes());
        }
        self.buffer.extend_from_slice(data);
        self
    }

    /// Push a UTF-8 string
    pub fn push_string(&mut self, s: &str) -> &mut Self {
        self.push_bytes(s.as_bytes())
    }

    pub fn push_bool(&mut self, value: bool) -> &mut Self {
        self.emit(if value { OpCode::PUSHT } else { OpCode::PUSHF })
    }

    /// Push a single argument
    pub fn push_param(&mut self, param: &ContractParam) -> Result<&mut Self, ScriptError> {
        param.validate()?;
        self.push_param_unchecked(param);
        Ok(self)
    }

    /// Push `elements` last-first, then the count, then `PACK`.
    ///
    /// A consumer unpacking the array sees the elements in their original
    /// order. Every element is validated before anything is emitted.
    pub fn push_array(&mut self, elements: &[ContractParam]) -> Result<&mut Self, ScriptError> {
        elements.iter().try_for_each(ContractParam::validate)?;
        self.push_array_unchecked(elements);
        Ok(self)
    }

    fn push_array_unchecked(&mut self, elements: &[ContractParam]) {
        for element in elements.iter().rev() {
            self.push_param_unchecked(element);
        }
        self.push_number(&BigInt::from(elements.len()));
        self.emit(OpCode::Pack);
    }

    fn push_param_unchecked(&mut self, param: &ContractParam) {
        match param {
            // Hashes are held in wire order, the reverse of their display hex
            ContractParam::Hash160(hash) => {
                self.push_bytes(hash.as_bytes());
            }
            ContractParam::Hash256(hash) => {
                self.push_bytes(hash.as_bytes());
            }
            ContractParam::ByteArray(bytes) => {
                self.push_bytes(bytes);
            }
            ContractParam::Integer(n) => {
                self.push_number(n);
            }
            ContractParam::String(s) => {
                self.push_string(s);
            }
            ContractParam::Boolean(b) => {
                self.push_bool(*b);
            }
            ContractParam::Array(items) => self.push_array_unchecked(items),
            // Rejected by validate()
            ContractParam::Void => {}
        }
    }

    /// `APPCALL` followed by the contract hash in wire order
    pub fn emit_app_call(&mut self, script_hash: &UInt160) -> &mut Self {
        self.emit_with(OpCode::AppCall, script_hash.as_bytes())
    }

    /// `SYSCALL` followed by the length-prefixed interop service name
    pub fn emit_syscall(&mut self, api: &str) -> &mut Self {
        self.buffer.push(OpCode::Syscall as u8);
        VarInt::from(api.len()).encode_into(&mut self.buffer);
        self.buffer.extend_from_slice(api.as_bytes());
        self
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }
}

/// Script that calls `method` on a deployed contract.
///
/// Layout: `[nonce DROP] args-array method APPCALL hash`. The optional
/// random nonce keeps otherwise identical invocations from sharing a
/// transaction id.
pub fn build_call_method_script(
    contract_hash: &UInt160,
    method: &str,
    args: &[ContractParam],
    with_nonce: bool,
) -> Result<Vec<u8>, ScriptError> {
    args.iter().try_for_each(ContractParam::validate)?;

    let mut sb = ScriptBuilder::new();
    if with_nonce {
        let nonce: u32 = rand::thread_rng().gen();
        sb.push_number(&BigInt::from(nonce)).emit(OpCode::Drop);
    }
    sb.push_array(args)?;
    sb.push_string(method).emit_app_call(contract_hash);
    Ok(sb.into_bytes())
}

/// Single-signature verification script: `PUSHBYTES33 <pubkey> CHECKSIG`
pub fn build_basic_verify_script(compressed_pubkey: &[u8; 33]) -> Vec<u8> {
    let mut sb = ScriptBuilder::new();
    sb.push_bytes(compressed_pubkey).emit(OpCode::CheckSig);
    sb.into_bytes()
}

/// Witness for a single-signature account.
///
/// The invocation script pushes the signature over `sha256(payload)`; the
/// verification script is the key's basic verification script.
pub fn build_basic_witness_script(
    keypair: &KeyPair,
    unsigned_payload: &[u8],
) -> Result<Witness, ScriptError> {
    let signature = keypair.sign_digest(&sha256(unsigned_payload))?;

    let mut invocation = ScriptBuilder::new();
    invocation.push_bytes(&signature);

    Ok(Witness::new(
        invocation.into_bytes(),
        keypair.verification_script(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyError;

    fn script_of(build: impl FnOnce(&mut ScriptBuilder) -> &mut ScriptBuilder) -> Vec<u8> {
        let mut sb = ScriptBuilder::new();
        build(&mut sb);
        sb.into_bytes()
    }

    #[test]
    fn test_push_small_numbers() {
        assert_eq!(script_of(|sb| sb.push_integer(-1)), vec![0x4f]);
        assert_eq!(script_of(|sb| sb.push_integer(0)), vec![0x00]);
        assert_eq!(script_of(|sb| sb.push_integer(1)), vec![0x51]);
        assert_eq!(script_of(|sb| sb.push_integer(16)), vec![0x60]);
    }

    #[test]
    fn test_push_larger_numbers_as_magnitude() {
        assert_eq!(script_of(|sb| sb.push_integer(17)), vec![0x01, 0x11]);
        assert_eq!(script_of(|sb| sb.push_integer(1000)), vec![0x02, 0xe8, 0x03]);
        assert_eq!(script_of(|sb| sb.push_integer(-1000)), vec![0x02, 0xe8, 0x03]);
        assert_eq!(
            script_of(|sb| sb.push_integer(100_000_000)),
            vec![0x04, 0x00, 0xe1, 0xf5, 0x05]
        );
    }

    #[test]
    fn test_push_number_drops_sign_bit() {
        // 128 has its top bit set, so a node reads it back as -128
        assert_eq!(script_of(|sb| sb.push_integer(128)), vec![0x01, 0x80]);
        assert_eq!(script_of(|sb| sb.push_integer(-128)), vec![0x01, 0x80]);
        assert_eq!(script_of(|sb| sb.push_integer(255)), vec![0x01, 0xff]);
    }

    #[test]
    fn test_push_number_beyond_i64() {
        let big = BigInt::from(1u8) << 70;
        let mut expected = vec![0x09];
        expected.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0, 0, 0x40]);
        assert_eq!(script_of(|sb| sb.push_number(&big)), expected);
        assert_eq!(script_of(|sb| sb.push_number(&-big.clone())), expected);
    }

    #[test]
    fn test_push_bytes_prefixes() {
        let cases: [(usize, &[u8]); 6] = [
            (0, &[0x00]),
            (75, &[0x4b]),
            (76, &[0x4c, 76]),
            (255, &[0x4c, 0xff]),
            (256, &[0x4d, 0x00, 0x01]),
            (65536, &[0x4e, 0x00, 0x00, 0x01, 0x00]),
        ];
        for (len, prefix) in cases {
            let data = vec![0xab; len];
            let script = script_of(|sb| sb.push_bytes(&data));
            assert_eq!(&script[..prefix.len()], prefix, "length {}", len);
            assert_eq!(script.len(), prefix.len() + len);
        }
    }

    #[test]
    fn test_push_bool_and_string() {
        assert_eq!(script_of(|sb| sb.push_bool(true).push_bool(false)), vec![0x51, 0x00]);
        assert_eq!(script_of(|sb| sb.push_string("abc")), vec![0x03, b'a', b'b', b'c']);
    }

    #[test]
    fn test_push_array_reverses_elements() {
        let args = [
            ContractParam::from(1i64),
            ContractParam::from("x"),
            ContractParam::from(true),
        ];
        let script = script_of(|sb| sb.push_array(&args).unwrap());
        // true, "x", 1, count 3, PACK
        assert_eq!(script, vec![0x51, 0x01, b'x', 0x51, 0x53, 0xc1]);
    }

    #[test]
    fn test_push_empty_array() {
        let script = script_of(|sb| sb.push_array(&[]).unwrap());
        assert_eq!(script, vec![0x00, 0xc1]);
    }

    #[test]
    fn test_push_hash_in_wire_order() {
        let hash = UInt160::from_display_hex("0x0000000000000000000000000000000000000102").unwrap();
        let script = script_of(|sb| sb.push_param(&hash.into()).unwrap());
        assert_eq!(script[0], 20);
        assert_eq!(&script[1..3], &[0x02, 0x01]);
    }

    #[test]
    fn test_nested_array() {
        let args = [ContractParam::Array(vec![2i64.into(), 3i64.into()])];
        let script = script_of(|sb| sb.push_array(&args).unwrap());
        assert_eq!(script, vec![0x53, 0x52, 0x52, 0xc1, 0x51, 0xc1]);
    }

    #[test]
    fn test_void_rejected_before_emitting() {
        let mut sb = ScriptBuilder::new();
        let args = [ContractParam::from(5i64), ContractParam::Void];
        assert_eq!(
            sb.push_array(&args).unwrap_err(),
            ScriptError::UnsupportedArgumentType("Void".into())
        );
        assert!(sb.is_empty());
    }

    #[test]
    fn test_app_call_reverses_display_hash() {
        let hash = UInt160::from_display_hex("ecc6b20d3ccac1ee9ef109af5a7cdb85706b1df9").unwrap();
        let script = script_of(|sb| sb.emit_app_call(&hash));
        assert_eq!(script[0], 0x67);
        assert_eq!(
            hex::encode(&script[1..]),
            "f91d6b7085db7c5aaf09f19eeec1ca3c0db2c6ec"
        );
    }

    #[test]
    fn test_call_method_script_layout() {
        let hash = UInt160::from_wire_bytes([0x11; 20]);
        let script =
            build_call_method_script(&hash, "name", &[ContractParam::from(1i64)], false).unwrap();

        let mut expected = vec![0x51, 0x51, 0xc1, 0x04];
        expected.extend_from_slice(b"name");
        expected.push(0x67);
        expected.extend_from_slice(&[0x11; 20]);
        assert_eq!(script, expected);
    }

    #[test]
    fn test_call_method_nonce_decorrelates() {
        let hash = UInt160::from_wire_bytes([0x22; 20]);
        let plain = build_call_method_script(&hash, "balanceOf", &[], false).unwrap();
        let a = build_call_method_script(&hash, "balanceOf", &[], true).unwrap();
        let b = build_call_method_script(&hash, "balanceOf", &[], true).unwrap();

        assert!(a.ends_with(&plain));
        assert_eq!(a[a.len() - plain.len() - 1], OpCode::Drop as u8);
        // Two random 32-bit nonces colliding is vanishingly unlikely
        assert_ne!(a, b);
    }

    #[test]
    fn test_call_method_rejects_void() {
        let hash = UInt160::default();
        assert!(matches!(
            build_call_method_script(&hash, "m", &[ContractParam::Void], true),
            Err(ScriptError::UnsupportedArgumentType(_))
        ));
    }

    #[test]
    fn test_basic_verify_script() {
        let kp = KeyPair::generate();
        let script = build_basic_verify_script(&kp.public_key_compressed());
        assert_eq!(script.len(), 35);
        assert_eq!(script[0], 0x21);
        assert_eq!(&script[1..34], &kp.public_key_compressed());
        assert_eq!(script[34], 0xac);
    }

    #[test]
    fn test_basic_witness_signature_verifies() {
        let kp = KeyPair::generate();
        let payload = b"\x80\x00\x00\x00\x00";
        let witness = build_basic_witness_script(&kp, payload).unwrap();

        assert_eq!(witness.invocation_script()[0], 0x40);
        assert_eq!(witness.invocation_script().len(), 65);
        assert_eq!(witness.verification_script(), &kp.verification_script()[..]);
        assert!(kp.verify(payload, &witness.invocation_script()[1..]).unwrap());
    }

    #[test]
    fn test_witness_needs_private_key() {
        let kp = KeyPair::generate();
        let public = KeyPair::from_public_key(&kp.public_key_compressed()).unwrap();
        assert_eq!(
            build_basic_witness_script(&public, b"tx").unwrap_err(),
            ScriptError::Key(KeyError::MissingPrivateKey)
        );
    }

    #[test]
    fn test_syscall() {
        let script = script_of(|sb| sb.emit_syscall("Neo.Runtime.Log"));
        assert_eq!(script[0], 0x68);
        assert_eq!(script[1], 15);
        assert_eq!(&script[2..], b"Neo.Runtime.Log");
    }
}
