//! CLI commands for the NEO SDK
//!
//! Implements the command handlers behind the `neo-sdk` binary.

use std::path::Path;
use std::sync::Arc;

use crate::config::SdkConfig;
use crate::contract::{build_call_method_script, disassemble, ContractParam};
use crate::core::{
    asset_symbol, format_fixed8, parse_fixed8, resolve_asset, Address, Transaction,
    TransactionAttribute, TransactionBuilder, UInt160, UInt256, Utxo,
};
use crate::crypto::KeyPair;
use crate::network::BlockFollower;
use crate::rpc::{InvokeResult, RpcClient};

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Settings shared by every command
pub struct AppContext {
    pub config: SdkConfig,
}

impl AppContext {
    /// Load the config file if one is given, then apply flag overrides
    pub fn new(config_path: Option<&Path>, rpc_url: Option<String>) -> CliResult<Self> {
        let mut config = match config_path {
            Some(path) => SdkConfig::load(path)?,
            None => SdkConfig::default(),
        };
        if let Some(url) = rpc_url {
            config.rpc_url = url;
        }
        Ok(Self { config })
    }

    pub fn rpc(&self) -> CliResult<RpcClient> {
        Ok(RpcClient::from_config(&self.config)?)
    }
}

/// Generate a new key pair
pub fn cmd_key_new() -> CliResult<()> {
    let keypair = KeyPair::generate();

    println!("🔐 New key pair generated!");
    println!("   📍 Address: {}", keypair.basic_address());
    println!("   🔑 Public Key: {}", keypair.public_key_hex());
    println!("   🗝️  WIF: {}", keypair.to_wif()?);
    println!("\n   ⚠️  IMPORTANT: Anyone holding the WIF controls the funds.");
    Ok(())
}

/// Show the public side of a WIF key
pub fn cmd_key_show(wif: &str) -> CliResult<()> {
    let keypair = KeyPair::from_wif(wif)?;

    println!("🔑 Key ({})", keypair.curve().name());
    println!("   ├─ Public Key: {}", keypair.public_key_hex());
    println!("   ├─ Script Hash: {}", keypair.script_hash());
    println!("   └─ Address: {}", keypair.basic_address());
    Ok(())
}

/// Address of a verification script given as hex
pub fn cmd_address_from_script(script_hex: &str) -> CliResult<()> {
    let script = hex::decode(script_hex.trim_start_matches("0x"))?;
    let address = Address::from_script(&script);

    println!("📍 {}", address);
    println!("   └─ Script Hash: {}", address.script_hash());
    Ok(())
}

/// Address of a display-order script hash
pub fn cmd_address_from_script_hash(script_hash: &str) -> CliResult<()> {
    let address = Address::from_script_hash(UInt160::from_display_hex(script_hash)?);
    println!("📍 {}", address);
    Ok(())
}

pub fn cmd_address_parse(text: &str) -> CliResult<()> {
    let address = Address::parse(text)?;

    println!("📍 {}", address);
    println!("   ├─ Version: {}", address.version());
    println!("   └─ Script Hash: {}", address.script_hash());
    Ok(())
}

/// NEO and GAS held by an address
pub async fn cmd_balance(ctx: &AppContext, address: &str) -> CliResult<()> {
    let address = Address::parse(address)?;
    let balance = ctx.rpc()?.account_state(&address).await?;

    println!("💰 Balance for {}", address);
    println!("   ├─ NEO: {}", format_fixed8(balance.neo));
    println!("   └─ GAS: {}", format_fixed8(balance.gas));
    Ok(())
}

/// Pick unspent outputs of `asset_id`, largest first, until they cover
/// `amount`. Returns the selection and its total.
pub fn select_inputs(
    utxos: &[Utxo],
    asset_id: &UInt256,
    amount: i64,
) -> Option<(Vec<Utxo>, i64)> {
    let mut candidates: Vec<&Utxo> = utxos.iter().filter(|u| u.asset_id == *asset_id).collect();
    candidates.sort_by(|a, b| b.value.cmp(&a.value));

    let mut selected = Vec::new();
    let mut total = 0i64;
    for utxo in candidates {
        if total >= amount {
            break;
        }
        total = total.checked_add(utxo.value)?;
        selected.push(utxo.clone());
    }
    (total >= amount).then_some((selected, total))
}

/// Signed contract transaction sending `amount` to `to`, with change
/// returned to the signer
pub fn build_transfer(
    keypair: &KeyPair,
    utxos: &[Utxo],
    to: &Address,
    asset_id: UInt256,
    amount: i64,
) -> CliResult<Transaction> {
    let (selected, total) = select_inputs(utxos, &asset_id, amount).ok_or_else(|| {
        format!(
            "Insufficient funds: need {} of {}",
            format_fixed8(amount),
            asset_label(&asset_id)
        )
    })?;

    let mut builder = TransactionBuilder::contract();
    for utxo in &selected {
        builder.append_input(utxo);
    }
    builder.append_output(to, asset_id, amount)?;
    if total > amount {
        builder.append_output(&keypair.basic_address(), asset_id, total - amount)?;
    }
    Ok(builder.sign_with(std::slice::from_ref(keypair))?)
}

pub struct TransferArgs<'a> {
    pub wif: &'a str,
    pub to: &'a str,
    pub asset: &'a str,
    pub amount: &'a str,
    pub send: bool,
}

/// Send an asset from a WIF-controlled account
pub async fn cmd_transfer(ctx: &AppContext, args: TransferArgs<'_>) -> CliResult<()> {
    let keypair = KeyPair::from_wif(args.wif)?;
    let to = Address::parse(args.to)?;
    let asset_id = resolve_asset(args.asset)?;
    let amount = parse_fixed8(args.amount)?;
    if amount <= 0 {
        return Err("Amount must be positive".into());
    }

    let rpc = ctx.rpc()?;
    let from = keypair.basic_address();
    let utxos = rpc.unspents(&from, Some(&asset_id)).await?;
    let tx = build_transfer(&keypair, &utxos, &to, asset_id, amount)?;

    println!(
        "💸 Transfer {} {} from {} to {}",
        format_fixed8(amount),
        asset_label(&asset_id),
        from,
        to
    );
    print_transaction(&tx);

    if args.send {
        submit(&rpc, &tx).await?;
    }
    Ok(())
}

pub struct InvokeArgs<'a> {
    pub contract: &'a str,
    pub method: &'a str,
    pub args: &'a [String],
    pub wif: Option<&'a str>,
    pub test: bool,
    pub send: bool,
}

/// Call a contract method, either simulated or as an invocation transaction
pub async fn cmd_invoke(ctx: &AppContext, args: InvokeArgs<'_>) -> CliResult<()> {
    let contract = UInt160::from_display_hex(args.contract)?;
    let params = args
        .args
        .iter()
        .map(|arg| arg.parse::<ContractParam>())
        .collect::<Result<Vec<_>, _>>()?;

    if args.test {
        let script = build_call_method_script(&contract, args.method, &params, false)?;
        let result = ctx.rpc()?.invoke_script(&script).await?;
        print_invoke_result(&result);
        return Ok(());
    }

    let script = build_call_method_script(&contract, args.method, &params, true)?;
    let mut builder = TransactionBuilder::invocation(script);
    let tx = match args.wif {
        Some(wif) => {
            let keypair = KeyPair::from_wif(wif)?;
            builder.push_attribute(TransactionAttribute::script(&keypair.script_hash()));
            builder.sign_with(std::slice::from_ref(&keypair))?
        }
        None => builder.build(),
    };

    println!("📜 Invoke {}.{}", contract, args.method);
    print_transaction(&tx);

    if args.send {
        submit(&ctx.rpc()?, &tx).await?;
    }
    Ok(())
}

/// Print new blocks until Ctrl-C
pub async fn cmd_follow(ctx: &AppContext, from: u64) -> CliResult<()> {
    let rpc = Arc::new(ctx.rpc()?);
    let (handle, mut blocks) = BlockFollower::from_config(rpc, from, &ctx.config).start();

    println!("👀 Following blocks after height {} (Ctrl-C to stop)", from);
    loop {
        tokio::select! {
            block = blocks.recv() => {
                let Some(block) = block else { break };
                let index = block.get("index").and_then(|v| v.as_u64()).unwrap_or_default();
                let hash = block.get("hash").and_then(|v| v.as_str()).unwrap_or("?");
                let tx_count = block
                    .get("tx")
                    .and_then(|v| v.as_array())
                    .map_or(0, |txs| txs.len());
                println!("   📦 Block {} {} ({} txs)", index, hash, tx_count);
            }
            _ = tokio::signal::ctrl_c() => {
                break;
            }
        }
    }

    println!("\n👋 Stopped at height {}", handle.current_height());
    handle.stop().await;
    Ok(())
}

pub fn cmd_disasm(script_hex: &str) -> CliResult<()> {
    let script = hex::decode(script_hex.trim_start_matches("0x"))?;
    for line in disassemble(&script) {
        println!("{}", line);
    }
    Ok(())
}

fn asset_label(asset_id: &UInt256) -> String {
    asset_symbol(asset_id).map_or_else(|| asset_id.to_string(), str::to_string)
}

fn print_transaction(tx: &Transaction) {
    println!("   ├─ Type: {}", tx.tx_type().name());
    println!("   ├─ TxID: {}", tx.txid());
    println!("   ├─ Size: {} bytes", tx.size());
    println!("   └─ Raw: {}", tx.raw_transaction_hex());
}

fn print_invoke_result(result: &InvokeResult) {
    println!("🧪 Simulation: {}", result.state);
    println!("   ├─ GAS consumed: {}", format_fixed8(result.gas_consumed));
    println!("   └─ Stack ({} items)", result.stack.len());
    for item in &result.stack {
        println!("      {}: {}", item.item_type, item.value);
    }
}

async fn submit(rpc: &RpcClient, tx: &Transaction) -> CliResult<()> {
    if rpc.send_raw_transaction(&tx.raw_transaction_hex()).await? {
        println!("\n✅ Transaction {} relayed", tx.txid());
        Ok(())
    } else {
        Err(format!("Node rejected transaction {}", tx.txid()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GAS_ASSET_ID, NEO_ASSET_ID};
    use tempfile::TempDir;

    fn utxo(n: u16, asset_id: UInt256, value: i64) -> Utxo {
        Utxo {
            tx_hash: UInt256::from_wire_bytes([n as u8; 32]),
            index: n,
            asset_id,
            value,
            script_hash: UInt160::default(),
        }
    }

    fn test_key() -> KeyPair {
        let mut scalar = [0u8; 32];
        scalar[31] = 1;
        KeyPair::from_private_key(&scalar).unwrap()
    }

    #[test]
    fn test_select_inputs_largest_first() {
        let utxos = vec![
            utxo(0, GAS_ASSET_ID, 10),
            utxo(1, NEO_ASSET_ID, 1000),
            utxo(2, GAS_ASSET_ID, 50),
            utxo(3, GAS_ASSET_ID, 30),
        ];

        let (selected, total) = select_inputs(&utxos, &GAS_ASSET_ID, 60).unwrap();
        assert_eq!(total, 80);
        assert_eq!(selected.iter().map(|u| u.index).collect::<Vec<_>>(), vec![2, 3]);

        assert!(select_inputs(&utxos, &GAS_ASSET_ID, 91).is_none());
        assert!(select_inputs(&[], &GAS_ASSET_ID, 1).is_none());
    }

    #[test]
    fn test_build_transfer_with_change() {
        let keypair = test_key();
        let to = Address::from_script_hash_with_version(UInt160::from_wire_bytes([9; 20]), 23);
        let utxos = vec![utxo(1, NEO_ASSET_ID, 5), utxo(2, NEO_ASSET_ID, 3)];

        let tx = build_transfer(&keypair, &utxos, &to, NEO_ASSET_ID, 6).unwrap();
        assert_eq!(tx.inputs().len(), 2);
        assert_eq!(tx.outputs().len(), 2);
        assert_eq!(tx.outputs()[0].value, 6);
        assert_eq!(tx.outputs()[0].script_hash, *to.script_hash());
        assert_eq!(tx.outputs()[1].value, 2);
        assert_eq!(tx.outputs()[1].script_hash, keypair.script_hash());
        assert_eq!(tx.witnesses().len(), 1);

        let exact = build_transfer(&keypair, &utxos, &to, NEO_ASSET_ID, 8).unwrap();
        assert_eq!(exact.outputs().len(), 1);

        assert!(build_transfer(&keypair, &utxos, &to, NEO_ASSET_ID, 9).is_err());
    }

    #[test]
    fn test_context_overrides_rpc_url() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("neo.json");
        let config = SdkConfig {
            rpc_url: "http://file:10332".into(),
            ..Default::default()
        };
        config.save(&path).unwrap();

        let ctx = AppContext::new(Some(&path), None).unwrap();
        assert_eq!(ctx.config.rpc_url, "http://file:10332");

        let ctx = AppContext::new(Some(&path), Some("http://flag:10332".into())).unwrap();
        assert_eq!(ctx.config.rpc_url, "http://flag:10332");

        assert!(AppContext::new(Some(&temp_dir.path().join("missing.json")), None).is_err());
    }

    #[test]
    fn test_disasm_rejects_bad_hex() {
        assert!(cmd_disasm("0x51ac").is_ok());
        assert!(cmd_disasm("zz").is_err());
    }
}
