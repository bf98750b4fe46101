//! Transaction construction and serialization
//!
//! Building happens in two phases:
//! - [`TransactionBuilder`] accumulates attributes, inputs and outputs.
//!   Its unsigned bytes and id are memoized and recomputed after any
//!   mutation.
//! - [`TransactionBuilder::build`] seals the structure into an immutable
//!   [`Transaction`]. Only witnesses can be added from then on, so a
//!   signature can never go stale.
//!
//! Unsigned layout: `type | version | extra data | attributes | inputs |
//! outputs`, every collection prefixed with a VarInt count. The raw
//! transaction appends the witnesses.

use std::cell::OnceCell;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use super::address::{Address, AddressError};
use super::asset::format_fixed8;
use super::types::{UInt160, UInt256};
use super::witness::Witness;
use crate::codec::{CodecError, VarInt};
use crate::contract::{build_basic_witness_script, ScriptError};
use crate::crypto::{hash256, KeyError, KeyPair};

// =============================================================================
// Constants
// =============================================================================

/// Longest data a variable-length attribute can carry
pub const MAX_ATTRIBUTE_DATA: usize = 255;

/// Data length of hash-like attributes
const HASH_ATTRIBUTE_LEN: usize = 32;

// =============================================================================
// Error Types
// =============================================================================

/// Transaction-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("Invalid length for {field}: expected {expected}, got {actual}")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("Invalid encoding for {field}: {reason}")]
    InvalidEncoding { field: &'static str, reason: String },
    #[error("Unknown attribute usage {0:#04x}")]
    UnknownAttributeUsage(u8),
    #[error("Output value must be positive, got {0}")]
    InvalidValue(i64),
    #[error(transparent)]
    Address(#[from] AddressError),
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error(transparent)]
    Script(#[from] ScriptError),
}

impl TransactionError {
    fn from_codec(field: &'static str, err: CodecError) -> Self {
        match err {
            CodecError::InvalidLength { expected, actual } => TransactionError::InvalidLength {
                field,
                expected,
                actual,
            },
            other => TransactionError::InvalidEncoding {
                field,
                reason: other.to_string(),
            },
        }
    }
}

// =============================================================================
// Transaction Type
// =============================================================================

/// Transaction kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TransactionType {
    Miner = 0x00,
    Issue = 0x01,
    Claim = 0x02,
    /// Moves UTXO value only
    Contract = 0x80,
    /// Carries a script that invokes a deployed contract
    Invocation = 0xd1,
}

impl TransactionType {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(TransactionType::Miner),
            0x01 => Some(TransactionType::Issue),
            0x02 => Some(TransactionType::Claim),
            0x80 => Some(TransactionType::Contract),
            0xd1 => Some(TransactionType::Invocation),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TransactionType::Miner => "MinerTransaction",
            TransactionType::Issue => "IssueTransaction",
            TransactionType::Claim => "ClaimTransaction",
            TransactionType::Contract => "ContractTransaction",
            TransactionType::Invocation => "InvocationTransaction",
        }
    }
}

// =============================================================================
// Attributes
// =============================================================================

/// What an attribute's data means, and so how long it may be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeUsage {
    ContractHash,
    Ecdh02,
    Ecdh03,
    /// A script hash that must also sign the transaction
    Script,
    Vote,
    CertUrl,
    DescriptionUrl,
    Description,
    /// `Hash1` through `Hash15`
    Hash(u8),
    /// `Remark` (0) through `Remark15`
    Remark(u8),
}

impl AttributeUsage {
    pub fn from_byte(byte: u8) -> Result<Self, TransactionError> {
        match byte {
            0x00 => Ok(AttributeUsage::ContractHash),
            0x02 => Ok(AttributeUsage::Ecdh02),
            0x03 => Ok(AttributeUsage::Ecdh03),
            0x20 => Ok(AttributeUsage::Script),
            0x30 => Ok(AttributeUsage::Vote),
            0x80 => Ok(AttributeUsage::CertUrl),
            0x81 => Ok(AttributeUsage::DescriptionUrl),
            0x90 => Ok(AttributeUsage::Description),
            0xa1..=0xaf => Ok(AttributeUsage::Hash(byte - 0xa0)),
            0xf0..=0xff => Ok(AttributeUsage::Remark(byte - 0xf0)),
            other => Err(TransactionError::UnknownAttributeUsage(other)),
        }
    }

    pub fn as_byte(&self) -> u8 {
        match self {
            AttributeUsage::ContractHash => 0x00,
            AttributeUsage::Ecdh02 => 0x02,
            AttributeUsage::Ecdh03 => 0x03,
            AttributeUsage::Script => 0x20,
            AttributeUsage::Vote => 0x30,
            AttributeUsage::CertUrl => 0x80,
            AttributeUsage::DescriptionUrl => 0x81,
            AttributeUsage::Description => 0x90,
            AttributeUsage::Hash(n) => 0xa0 | (n & 0x0f),
            AttributeUsage::Remark(n) => 0xf0 | (n & 0x0f),
        }
    }

    /// `Hash` takes 1..=15 and `Remark` 0..=15; other kinds are always valid
    pub fn is_valid(&self) -> bool {
        match self {
            AttributeUsage::Hash(n) => (1..=15).contains(n),
            AttributeUsage::Remark(n) => *n <= 15,
            _ => true,
        }
    }

    /// Variable-length kinds carry a one-byte length before their data
    pub fn is_variable_length(&self) -> bool {
        matches!(
            self,
            AttributeUsage::CertUrl
                | AttributeUsage::DescriptionUrl
                | AttributeUsage::Description
                | AttributeUsage::Remark(_)
        )
    }

    /// Required data length for fixed kinds
    pub fn fixed_length(&self) -> Option<usize> {
        match self {
            AttributeUsage::Script => Some(UInt160::LEN),
            _ if self.is_variable_length() => None,
            _ => Some(HASH_ATTRIBUTE_LEN),
        }
    }
}

/// A usage byte plus its data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionAttribute {
    usage: AttributeUsage,
    data: Vec<u8>,
}

impl TransactionAttribute {
    /// Create an attribute, checking the data length against the usage
    pub fn new(usage: AttributeUsage, data: Vec<u8>) -> Result<Self, TransactionError> {
        if !usage.is_valid() {
            let byte = match usage {
                AttributeUsage::Hash(n) => 0xa0u8.wrapping_add(n),
                AttributeUsage::Remark(n) => 0xf0u8.wrapping_add(n),
                other => other.as_byte(),
            };
            return Err(TransactionError::UnknownAttributeUsage(byte));
        }
        match usage.fixed_length() {
            Some(expected) if data.len() != expected => {
                return Err(TransactionError::InvalidLength {
                    field: "attribute data",
                    expected,
                    actual: data.len(),
                });
            }
            None if data.len() > MAX_ATTRIBUTE_DATA => {
                return Err(TransactionError::InvalidLength {
                    field: "attribute data",
                    expected: MAX_ATTRIBUTE_DATA,
                    actual: data.len(),
                });
            }
            _ => {}
        }
        Ok(Self { usage, data })
    }

    /// Declares `script_hash` as an additional signer
    pub fn script(script_hash: &UInt160) -> Self {
        Self {
            usage: AttributeUsage::Script,
            data: script_hash.as_bytes().to_vec(),
        }
    }

    pub fn remark(text: &str) -> Result<Self, TransactionError> {
        Self::new(AttributeUsage::Remark(0), text.as_bytes().to_vec())
    }

    pub fn usage(&self) -> AttributeUsage {
        self.usage
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn encode_into(&self, out: &mut Vec<u8>) {
        out.push(self.usage.as_byte());
        if self.usage.is_variable_length() {
            out.push(self.data.len() as u8);
        }
        out.extend_from_slice(&self.data);
    }
}

// =============================================================================
// Inputs, Outputs and UTXOs
// =============================================================================

/// Reference to an earlier output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxInput {
    pub prev_hash: UInt256,
    pub prev_index: u16,
}

impl TxInput {
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.prev_hash.as_bytes());
        out.extend_from_slice(&self.prev_index.to_le_bytes());
    }
}

/// Value sent to a script hash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxOutput {
    pub asset_id: UInt256,
    /// Fixed-point, 10^8 units per coin
    pub value: i64,
    pub script_hash: UInt160,
}

impl TxOutput {
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.asset_id.as_bytes());
        out.extend_from_slice(&self.value.to_le_bytes());
        out.extend_from_slice(self.script_hash.as_bytes());
    }
}

/// An unspent output as reported by a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    pub tx_hash: UInt256,
    pub index: u16,
    pub asset_id: UInt256,
    pub value: i64,
    pub script_hash: UInt160,
}

impl Utxo {
    pub fn as_input(&self) -> TxInput {
        TxInput {
            prev_hash: self.tx_hash,
            prev_index: self.index,
        }
    }
}

// =============================================================================
// Shared body
// =============================================================================

/// Everything covered by the transaction id
#[derive(Debug, Clone, PartialEq, Eq)]
struct TxBody {
    tx_type: TransactionType,
    version: u8,
    script: Vec<u8>,
    gas: i64,
    attributes: Vec<TransactionAttribute>,
    inputs: Vec<TxInput>,
    outputs: Vec<TxOutput>,
}

impl TxBody {
    fn encode_unsigned(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.push(self.tx_type as u8);
        out.push(self.version);

        if self.tx_type == TransactionType::Invocation {
            VarInt::from(self.script.len()).encode_into(&mut out);
            out.extend_from_slice(&self.script);
            if self.version >= 1 {
                out.extend_from_slice(&self.gas.to_le_bytes());
            }
        }

        VarInt::from(self.attributes.len()).encode_into(&mut out);
        for attribute in &self.attributes {
            attribute.encode_into(&mut out);
        }
        VarInt::from(self.inputs.len()).encode_into(&mut out);
        for input in &self.inputs {
            input.encode_into(&mut out);
        }
        VarInt::from(self.outputs.len()).encode_into(&mut out);
        for output in &self.outputs {
            output.encode_into(&mut out);
        }
        out
    }
}

// =============================================================================
// Transaction Builder
// =============================================================================

/// Mutable phase of transaction construction
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    body: TxBody,
    /// Emptied by every mutation
    unsigned_cache: OnceCell<Vec<u8>>,
}

impl TransactionBuilder {
    pub fn new(tx_type: TransactionType) -> Self {
        Self {
            body: TxBody {
                tx_type,
                version: 0,
                script: Vec::new(),
                gas: 0,
                attributes: Vec::new(),
                inputs: Vec::new(),
                outputs: Vec::new(),
            },
            unsigned_cache: OnceCell::new(),
        }
    }

    /// A value transfer
    pub fn contract() -> Self {
        Self::new(TransactionType::Contract)
    }

    /// A contract invocation running `script`
    pub fn invocation(script: Vec<u8>) -> Self {
        let mut builder = Self::new(TransactionType::Invocation);
        builder.body.script = script;
        builder
    }

    fn touch(&mut self) {
        self.unsigned_cache.take();
    }

    pub fn set_version(&mut self, version: u8) -> &mut Self {
        self.body.version = version;
        self.touch();
        self
    }

    /// Gas attached to an invocation. Serialized only from version 1.
    pub fn set_gas(&mut self, gas: i64) -> &mut Self {
        self.body.gas = gas;
        self.touch();
        self
    }

    pub fn set_invocation_script(&mut self, script: Vec<u8>) -> &mut Self {
        self.body.script = script;
        self.touch();
        self
    }

    /// Validate and append an attribute given as a raw usage byte
    pub fn append_attribute(
        &mut self,
        usage: u8,
        data: &[u8],
    ) -> Result<&mut Self, TransactionError> {
        let usage = AttributeUsage::from_byte(usage)?;
        let attribute = TransactionAttribute::new(usage, data.to_vec())?;
        Ok(self.push_attribute(attribute))
    }

    pub fn push_attribute(&mut self, attribute: TransactionAttribute) -> &mut Self {
        self.body.attributes.push(attribute);
        self.touch();
        self
    }

    /// Spend an unspent output
    pub fn append_input(&mut self, utxo: &Utxo) -> &mut Self {
        self.body.inputs.push(utxo.as_input());
        self.touch();
        self
    }

    /// Spend output `index` of the transaction with display-order hex id
    pub fn append_input_by_hash(
        &mut self,
        tx_hash: &str,
        index: u16,
    ) -> Result<&mut Self, TransactionError> {
        let prev_hash = UInt256::from_display_hex(tx_hash)
            .map_err(|e| TransactionError::from_codec("prev_hash", e))?;
        self.body.inputs.push(TxInput {
            prev_hash,
            prev_index: index,
        });
        self.touch();
        Ok(self)
    }

    /// Send `value` units of `asset_id` to `address`
    pub fn append_output(
        &mut self,
        address: &Address,
        asset_id: UInt256,
        value: i64,
    ) -> Result<&mut Self, TransactionError> {
        if value <= 0 {
            return Err(TransactionError::InvalidValue(value));
        }
        self.body.outputs.push(TxOutput {
            asset_id,
            value,
            script_hash: *address.script_hash(),
        });
        self.touch();
        Ok(self)
    }

    /// Like [`append_output`](Self::append_output), parsing the address
    /// string and the display-order asset id first
    pub fn append_output_by_address_string(
        &mut self,
        address: &str,
        asset_id: &str,
        value: i64,
    ) -> Result<&mut Self, TransactionError> {
        let address = Address::parse(address)?;
        let asset_id = UInt256::from_display_hex(asset_id)
            .map_err(|e| TransactionError::from_codec("asset_id", e))?;
        self.append_output(&address, asset_id, value)
    }

    pub fn tx_type(&self) -> TransactionType {
        self.body.tx_type
    }

    pub fn attributes(&self) -> &[TransactionAttribute] {
        &self.body.attributes
    }

    pub fn inputs(&self) -> &[TxInput] {
        &self.body.inputs
    }

    pub fn outputs(&self) -> &[TxOutput] {
        &self.body.outputs
    }

    /// True when the unsigned bytes must be recomputed
    pub fn is_dirty(&self) -> bool {
        self.unsigned_cache.get().is_none()
    }

    /// Canonical unsigned serialization
    pub fn unsigned_bytes(&self) -> &[u8] {
        self.unsigned_cache.get_or_init(|| self.body.encode_unsigned())
    }

    pub fn hash(&self) -> UInt256 {
        UInt256::from_wire_bytes(hash256(self.unsigned_bytes()))
    }

    /// Transaction id as display hex
    pub fn txid(&self) -> String {
        self.hash().to_display_hex()
    }

    /// Seal the structure
    pub fn build(self) -> Transaction {
        let unsigned = match self.unsigned_cache.into_inner() {
            Some(bytes) => bytes,
            None => self.body.encode_unsigned(),
        };
        let hash = UInt256::from_wire_bytes(hash256(&unsigned));
        log::debug!("Sealed {} {}", self.body.tx_type.name(), hash);

        Transaction {
            body: self.body,
            unsigned,
            hash,
            witnesses: Vec::new(),
            witness_cache: OnceCell::new(),
        }
    }

    /// Seal and attach one basic witness per key, ordered by script hash
    pub fn sign_with(self, keys: &[KeyPair]) -> Result<Transaction, TransactionError> {
        let mut signers: Vec<&KeyPair> = keys.iter().collect();
        signers.sort_by_key(|kp| kp.script_hash().to_reversed_bytes());

        let mut tx = self.build();
        for key in signers {
            tx.append_basic_sign_witness(key)?;
        }
        Ok(tx)
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A sealed transaction. Attributes, inputs and outputs are fixed; only
/// witnesses can still be appended.
#[derive(Debug, Clone)]
pub struct Transaction {
    body: TxBody,
    unsigned: Vec<u8>,
    hash: UInt256,
    witnesses: Vec<Witness>,
    /// Emptied when a witness is appended
    witness_cache: OnceCell<Vec<u8>>,
}

impl Transaction {
    pub fn tx_type(&self) -> TransactionType {
        self.body.tx_type
    }

    pub fn version(&self) -> u8 {
        self.body.version
    }

    /// Invocation script, empty for other kinds
    pub fn script(&self) -> &[u8] {
        &self.body.script
    }

    pub fn gas(&self) -> i64 {
        self.body.gas
    }

    pub fn attributes(&self) -> &[TransactionAttribute] {
        &self.body.attributes
    }

    pub fn inputs(&self) -> &[TxInput] {
        &self.body.inputs
    }

    pub fn outputs(&self) -> &[TxOutput] {
        &self.body.outputs
    }

    pub fn witnesses(&self) -> &[Witness] {
        &self.witnesses
    }

    pub fn unsigned_bytes(&self) -> &[u8] {
        &self.unsigned
    }

    pub fn hash(&self) -> UInt256 {
        self.hash
    }

    pub fn txid(&self) -> String {
        self.hash.to_display_hex()
    }

    pub fn append_witness(&mut self, witness: Witness) -> &mut Self {
        self.witnesses.push(witness);
        self.witness_cache.take();
        self
    }

    /// Sign the unsigned bytes with `keypair` and append the witness
    pub fn append_basic_sign_witness(
        &mut self,
        keypair: &KeyPair,
    ) -> Result<&mut Self, TransactionError> {
        let witness = build_basic_witness_script(keypair, &self.unsigned)?;
        log::debug!("Signed {} for {}", self.hash, witness.script_hash());
        Ok(self.append_witness(witness))
    }

    /// `VarInt count` then each witness
    pub fn witness_bytes(&self) -> &[u8] {
        self.witness_cache.get_or_init(|| {
            let mut out = Vec::new();
            VarInt::from(self.witnesses.len()).encode_into(&mut out);
            for witness in &self.witnesses {
                witness.encode_into(&mut out);
            }
            out
        })
    }

    /// Unsigned bytes followed by witness bytes, ready for submission
    pub fn raw_transaction(&self) -> Vec<u8> {
        let witnesses = self.witness_bytes();
        let mut raw = Vec::with_capacity(self.unsigned.len() + witnesses.len());
        raw.extend_from_slice(&self.unsigned);
        raw.extend_from_slice(witnesses);
        raw
    }

    pub fn raw_transaction_hex(&self) -> String {
        hex::encode(self.raw_transaction())
    }

    pub fn size(&self) -> usize {
        self.unsigned.len() + self.witness_bytes().len()
    }

    /// Summary in the shape nodes use for verbose transactions
    pub fn to_json(&self) -> Value {
        let attributes: Vec<Value> = self
            .body
            .attributes
            .iter()
            .map(|a| json!({ "usage": a.usage().as_byte(), "data": hex::encode(a.data()) }))
            .collect();
        let vin: Vec<Value> = self
            .body
            .inputs
            .iter()
            .map(|i| json!({ "txid": i.prev_hash.to_display_hex(), "vout": i.prev_index }))
            .collect();
        let vout: Vec<Value> = self
            .body
            .outputs
            .iter()
            .enumerate()
            .map(|(n, o)| {
                json!({
                    "n": n,
                    "asset": o.asset_id.to_display_hex(),
                    "value": format_fixed8(o.value),
                    "address": Address::from_script_hash(o.script_hash).to_string(),
                })
            })
            .collect();

        let mut value = json!({
            "txid": self.txid(),
            "size": self.size(),
            "type": self.body.tx_type.name(),
            "version": self.body.version,
            "attributes": attributes,
            "vin": vin,
            "vout": vout,
            "scripts": self.witnesses,
        });
        if self.body.tx_type == TransactionType::Invocation {
            value["script"] = json!(hex::encode(&self.body.script));
            value["gas"] = json!(format_fixed8(self.body.gas));
        }
        value
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({} in, {} out, {} witnesses)",
            self.body.tx_type.name(),
            self.txid(),
            self.body.inputs.len(),
            self.body.outputs.len(),
            self.witnesses.len()
        )
    }
}
