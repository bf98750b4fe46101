//! JSON-RPC wire types and result parsing

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::RpcError;
use crate::core::asset::{parse_fixed8, ASSET_VALUE_BASE, GAS_ASSET_ID, NEO_ASSET_ID};
use crate::core::{Address, UInt256, Utxo};

// ============================================================================
// Envelope
// ============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub method: &'a str,
    pub params: Value,
    pub id: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RpcErrorObject {
    pub code: i64,
    pub message: String,
}

// ============================================================================
// Results
// ============================================================================

/// NEO and GAS held by an account, fixed-point
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Balance {
    pub neo: i64,
    pub gas: i64,
}

/// One value left on the evaluation stack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackItem {
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(default)]
    pub value: Value,
}

/// Outcome of a simulated or logged script execution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvokeResult {
    pub state: String,
    /// Fixed-point GAS
    pub gas_consumed: i64,
    pub stack: Vec<StackItem>,
}

/// `getaccountstate` result. Unknown assets and unparsable values are
/// skipped; both balances default to zero.
pub(crate) fn parse_balance(result: &Value) -> Result<Balance, RpcError> {
    let balances = result
        .get("balances")
        .and_then(Value::as_array)
        .ok_or_else(|| RpcError::InvalidField("balances".into()))?;

    let mut balance = Balance::default();
    for entry in balances {
        let asset = entry.get("asset").and_then(Value::as_str);
        let value = entry.get("value").and_then(Value::as_str);
        let (Some(asset), Some(value)) = (asset, value) else {
            continue;
        };
        let (Ok(asset), Ok(value)) = (UInt256::from_display_hex(asset), parse_fixed8(value)) else {
            continue;
        };
        if asset == NEO_ASSET_ID {
            balance.neo = value;
        } else if asset == GAS_ASSET_ID {
            balance.gas = value;
        }
    }
    Ok(balance)
}

#[derive(Debug, Deserialize)]
struct UnspentsResult {
    #[serde(default)]
    balance: Vec<UnspentAsset>,
}

#[derive(Debug, Deserialize)]
struct UnspentAsset {
    asset_hash: String,
    #[serde(default)]
    unspent: Vec<UnspentEntry>,
}

#[derive(Debug, Deserialize)]
struct UnspentEntry {
    txid: String,
    n: u16,
    value: f64,
}

/// `getunspents` result, optionally keeping a single asset
pub(crate) fn parse_unspents(
    result: Value,
    address: &Address,
    asset_filter: Option<&UInt256>,
) -> Result<Vec<Utxo>, RpcError> {
    let parsed: UnspentsResult = serde_json::from_value(result)?;

    let mut utxos = Vec::new();
    for asset in parsed.balance {
        let asset_id = UInt256::from_display_hex(&asset.asset_hash)?;
        if asset_filter.map_or(false, |wanted| *wanted != asset_id) {
            continue;
        }
        for entry in asset.unspent {
            utxos.push(Utxo {
                tx_hash: UInt256::from_display_hex(&entry.txid)?,
                index: entry.n,
                asset_id,
                value: (entry.value * ASSET_VALUE_BASE as f64).round() as i64,
                script_hash: *address.script_hash(),
            });
        }
    }
    Ok(utxos)
}

/// `invoke`/`invokescript`/`getapplicationlog` result.
///
/// The VM must have halted. Newer nodes report `"HALT"`, older ones
/// `"HALT, BREAK"`; both are accepted. Application logs nest the execution
/// under `executions` and name the state `vmstate`.
pub(crate) fn parse_invoke_result(result: &Value) -> Result<InvokeResult, RpcError> {
    let execution = result
        .get("executions")
        .and_then(Value::as_array)
        .and_then(|executions| executions.first())
        .unwrap_or(result);

    let state = execution
        .get("state")
        .or_else(|| execution.get("vmstate"))
        .and_then(Value::as_str)
        .ok_or_else(|| RpcError::InvalidField("state".into()))?;
    if state != "HALT" && state != "HALT, BREAK" {
        return Err(RpcError::VmFault(state.to_string()));
    }

    let gas_consumed = match execution.get("gas_consumed").and_then(Value::as_str) {
        Some(text) => parse_fixed8(text)?,
        None => 0,
    };

    let stack = execution
        .get("stack")
        .cloned()
        .ok_or_else(|| RpcError::InvalidField("stack".into()))?;
    let stack: Vec<StackItem> = serde_json::from_value(stack)?;

    Ok(InvokeResult {
        state: state.to_string(),
        gas_consumed,
        stack,
    })
}
