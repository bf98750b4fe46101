//! Command-line front end

pub mod commands;

pub use commands::{
    build_transfer, cmd_address_from_script, cmd_address_from_script_hash, cmd_address_parse,
    cmd_balance, cmd_disasm, cmd_follow, cmd_invoke, cmd_key_new, cmd_key_show, cmd_transfer,
    select_inputs, AppContext, CliResult, InvokeArgs, TransferArgs,
};
