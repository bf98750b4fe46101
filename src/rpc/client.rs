//! Async JSON-RPC client for a NEO node

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde_json::{json, Value};

use super::types::{
    parse_balance, parse_invoke_result, parse_unspents, Balance, InvokeResult, RpcRequest,
    RpcResponse,
};
use super::RpcError;
use crate::config::SdkConfig;
use crate::contract::ContractParam;
use crate::core::{Address, UInt160, UInt256, Utxo};

/// JSON-RPC 2.0 client. Every request carries the client's timeout.
#[derive(Debug)]
pub struct RpcClient {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, RpcError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            url: url.into(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn from_config(config: &SdkConfig) -> Result<Self, RpcError> {
        Self::new(config.rpc_url.clone(), config.rpc_timeout())
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send one request and return its `result`
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
        };
        log::debug!("RPC {} -> {}", method, self.url);

        let response: RpcResponse = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(error) = response.error {
            log::warn!("RPC {} failed: {} ({})", method, error.message, error.code);
            return Err(RpcError::Node {
                code: error.code,
                message: error.message,
            });
        }
        response
            .result
            .ok_or_else(|| RpcError::NoResult(method.to_string()))
    }

    /// Number of blocks in the chain
    pub async fn block_count(&self) -> Result<u64, RpcError> {
        self.call("getblockcount", json!([]))
            .await?
            .as_u64()
            .ok_or_else(|| RpcError::InvalidField("getblockcount result".into()))
    }

    /// Index of the newest block
    pub async fn block_height(&self) -> Result<u64, RpcError> {
        Ok(self.block_count().await?.saturating_sub(1))
    }

    /// Verbose block at `height`
    pub async fn block(&self, height: u64) -> Result<Value, RpcError> {
        self.call("getblock", json!([height, 1])).await
    }

    /// Verbose transaction with display-order id `txid`
    pub async fn raw_transaction(&self, txid: &str) -> Result<Value, RpcError> {
        self.call("getrawtransaction", json!([txid, 1])).await
    }

    pub async fn account_state(&self, address: &Address) -> Result<Balance, RpcError> {
        let result = self
            .call("getaccountstate", json!([address.as_str()]))
            .await?;
        parse_balance(&result)
    }

    /// Unspent outputs of `address`, all assets or only `asset_filter`
    pub async fn unspents(
        &self,
        address: &Address,
        asset_filter: Option<&UInt256>,
    ) -> Result<Vec<Utxo>, RpcError> {
        let result = self.call("getunspents", json!([address.as_str()])).await?;
        parse_unspents(result, address, asset_filter)
    }

    /// Simulate calling a deployed contract
    pub async fn invoke(
        &self,
        script_hash: &UInt160,
        params: &[ContractParam],
    ) -> Result<InvokeResult, RpcError> {
        let params: Vec<Value> = params.iter().map(ContractParam::to_rpc_json).collect();
        let result = self
            .call("invoke", json!([script_hash.to_display_hex(), params]))
            .await?;
        parse_invoke_result(&result)
    }

    /// Simulate running `script`
    pub async fn invoke_script(&self, script: &[u8]) -> Result<InvokeResult, RpcError> {
        let result = self
            .call("invokescript", json!([hex::encode(script)]))
            .await?;
        parse_invoke_result(&result)
    }

    /// Execution log of a confirmed invocation transaction
    pub async fn application_log(&self, txid: &str) -> Result<InvokeResult, RpcError> {
        let result = self.call("getapplicationlog", json!([txid])).await?;
        parse_invoke_result(&result)
    }

    /// Relay a signed transaction. `Ok(false)` means the node refused it.
    pub async fn send_raw_transaction(&self, raw_hex: &str) -> Result<bool, RpcError> {
        let accepted = self
            .call("sendrawtransaction", json!([raw_hex]))
            .await?
            .as_bool()
            .ok_or_else(|| RpcError::InvalidField("sendrawtransaction result".into()))?;
        if !accepted {
            log::warn!("Node rejected raw transaction");
        }
        Ok(accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::asset::GAS_ASSET_ID;
    use axum::{routing::post, Json, Router};

    const GAS: &str = "602c79718b16e442de58778e148d0b1084e3b2dffd5de6b7b16cee7969282de7";

    /// Canned answers keyed on the method name
    async fn fake_node(Json(request): Json<Value>) -> Json<Value> {
        let id = request["id"].clone();
        let params = request["params"].clone();
        let result = match request["method"].as_str().unwrap_or_default() {
            "getblockcount" => json!(1234),
            "getblock" => json!({ "index": params[0], "verbose": params[1] }),
            "getrawtransaction" => json!({ "txid": params[0] }),
            "getaccountstate" => json!({
                "balances": [{ "asset": format!("0x{}", GAS), "value": "7.25" }]
            }),
            "getunspents" => json!({
                "address": params[0],
                "balance": [{
                    "asset_hash": GAS,
                    "asset_symbol": "GAS",
                    "amount": 1.5,
                    "unspent": [{ "txid": "ab".repeat(32), "n": 4, "value": 1.5 }]
                }]
            }),
            "invoke" => json!({
                "state": "HALT, BREAK",
                "gas_consumed": "0.2",
                "stack": [{ "type": "String", "value": params[1][0]["value"] }]
            }),
            "invokescript" => json!({ "state": "FAULT", "gas_consumed": "0", "stack": [] }),
            "sendrawtransaction" => json!(params[0] == "00"),
            _ => {
                return Json(json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "error": { "code": -32601, "message": "Method not found" }
                }))
            }
        };
        Json(json!({ "jsonrpc": "2.0", "id": id, "result": result }))
    }

    async fn spawn_fake_node() -> RpcClient {
        let app = Router::new().route("/", post(fake_node));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        RpcClient::new(format!("http://{}/", addr), Duration::from_secs(5)).unwrap()
    }

    fn test_address() -> Address {
        Address::from_script_hash_with_version(UInt160::from_wire_bytes([7; 20]), 23)
    }

    #[tokio::test]
    async fn test_block_count_and_height() {
        let client = spawn_fake_node().await;
        assert_eq!(client.block_count().await.unwrap(), 1234);
        assert_eq!(client.block_height().await.unwrap(), 1233);
    }

    #[tokio::test]
    async fn test_block_and_transaction_params() {
        let client = spawn_fake_node().await;
        let block = client.block(42).await.unwrap();
        assert_eq!(block["index"], 42);
        assert_eq!(block["verbose"], 1);

        let tx = client.raw_transaction("0xabc").await.unwrap();
        assert_eq!(tx["txid"], "0xabc");
    }

    #[tokio::test]
    async fn test_account_state() {
        let client = spawn_fake_node().await;
        let balance = client.account_state(&test_address()).await.unwrap();
        assert_eq!(balance.neo, 0);
        assert_eq!(balance.gas, 725_000_000);
    }

    #[tokio::test]
    async fn test_unspents() {
        let client = spawn_fake_node().await;
        let address = test_address();
        let utxos = client.unspents(&address, Some(&GAS_ASSET_ID)).await.unwrap();
        assert_eq!(utxos.len(), 1);
        assert_eq!(utxos[0].index, 4);
        assert_eq!(utxos[0].value, 150_000_000);
        assert_eq!(utxos[0].script_hash, *address.script_hash());

        let none = client
            .unspents(&address, Some(&crate::core::NEO_ASSET_ID))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_invoke_serializes_params() {
        let client = spawn_fake_node().await;
        let hash = UInt160::from_wire_bytes([1; 20]);
        let result = client
            .invoke(&hash, &[ContractParam::from("symbol")])
            .await
            .unwrap();
        assert_eq!(result.gas_consumed, 20_000_000);
        assert_eq!(result.stack[0].value, "symbol");
    }

    #[tokio::test]
    async fn test_invoke_script_fault() {
        let client = spawn_fake_node().await;
        assert!(matches!(
            client.invoke_script(&[0xf0]).await,
            Err(RpcError::VmFault(_))
        ));
    }

    #[tokio::test]
    async fn test_send_raw_transaction() {
        let client = spawn_fake_node().await;
        assert!(client.send_raw_transaction("00").await.unwrap());
        assert!(!client.send_raw_transaction("01").await.unwrap());
    }

    #[tokio::test]
    async fn test_node_error() {
        let client = spawn_fake_node().await;
        match client.application_log("0x01").await {
            Err(RpcError::Node { code, message }) => {
                assert_eq!(code, -32601);
                assert_eq!(message, "Method not found");
            }
            other => panic!("expected node error, got {:?}", other),
        }
    }
}
