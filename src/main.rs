//! NEO SDK CLI Application
//!
//! Keys, addresses, transfers and contract calls against a NEO node.

use clap::{ArgGroup, Parser, Subcommand};
use neo_sdk::cli::{self, AppContext, InvokeArgs, TransferArgs};
use std::future::Future;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "neo-sdk")]
#[command(version)]
#[command(about = "NEO client toolkit: keys, addresses, transactions and RPC", long_about = None)]
struct Cli {
    /// JSON config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Node JSON-RPC endpoint (overrides the config file)
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Key pair operations
    Key {
        #[command(subcommand)]
        action: KeyCommands,
    },

    /// Derive or inspect an address
    #[command(group(
        ArgGroup::new("source")
            .required(true)
            .args(["script", "script_hash", "parse"])
    ))]
    Address {
        /// Verification script (hex)
        #[arg(long)]
        script: Option<String>,

        /// Script hash (display-order hex)
        #[arg(long)]
        script_hash: Option<String>,

        /// Address to decode
        #[arg(long)]
        parse: Option<String>,
    },

    /// Show NEO and GAS balances
    Balance {
        #[arg(short, long)]
        address: String,
    },

    /// Send NEO, GAS or another UTXO asset
    Transfer {
        /// Sender's private key
        #[arg(long)]
        wif: String,

        /// Recipient's address
        #[arg(long)]
        to: String,

        /// NEO, GAS or an asset id
        #[arg(long)]
        asset: String,

        /// Decimal amount, up to 8 places
        #[arg(long)]
        amount: String,

        /// Relay the signed transaction
        #[arg(long)]
        send: bool,
    },

    /// Call a contract method
    Invoke {
        /// Contract script hash (display-order hex)
        #[arg(long)]
        contract: String,

        #[arg(long)]
        method: String,

        /// Argument as type:value, e.g. string:hello or int:42
        #[arg(long = "arg")]
        args: Vec<String>,

        /// Sign the invocation with this key
        #[arg(long)]
        wif: Option<String>,

        /// Simulate with invokescript instead of building a transaction
        #[arg(long, conflicts_with = "send")]
        test: bool,

        /// Relay the transaction
        #[arg(long)]
        send: bool,
    },

    /// Print new blocks as they arrive
    Follow {
        /// Last height already seen
        #[arg(long, default_value = "0")]
        from: u64,
    },

    /// Disassemble a script
    Disasm {
        #[arg(long)]
        script: String,
    },
}

#[derive(Subcommand)]
enum KeyCommands {
    /// Generate a new key pair
    New,
    /// Show the public key and address of a WIF
    Show {
        #[arg(long)]
        wif: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let ctx = AppContext::new(cli.config.as_deref(), cli.rpc_url)?;
    ctx.config.apply();

    match cli.command {
        Commands::Key { action } => match action {
            KeyCommands::New => cli::cmd_key_new()?,
            KeyCommands::Show { wif } => cli::cmd_key_show(&wif)?,
        },

        Commands::Address {
            script,
            script_hash,
            parse,
        } => {
            if let Some(script) = script {
                cli::cmd_address_from_script(&script)?;
            } else if let Some(script_hash) = script_hash {
                cli::cmd_address_from_script_hash(&script_hash)?;
            } else if let Some(parse) = parse {
                cli::cmd_address_parse(&parse)?;
            }
        }

        Commands::Disasm { script } => cli::cmd_disasm(&script)?,

        Commands::Balance { address } => block_on(cli::cmd_balance(&ctx, &address))?,

        Commands::Transfer {
            wif,
            to,
            asset,
            amount,
            send,
        } => {
            let args = TransferArgs {
                wif: &wif,
                to: &to,
                asset: &asset,
                amount: &amount,
                send,
            };
            block_on(cli::cmd_transfer(&ctx, args))?;
        }

        Commands::Invoke {
            contract,
            method,
            args,
            wif,
            test,
            send,
        } => {
            let args = InvokeArgs {
                contract: &contract,
                method: &method,
                args: &args,
                wif: wif.as_deref(),
                test,
                send,
            };
            block_on(cli::cmd_invoke(&ctx, args))?;
        }

        Commands::Follow { from } => block_on(cli::cmd_follow(&ctx, from))?,
    }

    Ok(())
}

/// Run a node-facing command on a fresh runtime
fn block_on<F>(command: F) -> Result<(), Box<dyn std::error::Error>>
where
    F: Future<Output = Result<(), Box<dyn std::error::Error>>>,
{
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(command)
}
