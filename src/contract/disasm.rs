//! Script disassembly
//!
//! Renders bytecode as one line per instruction for inspection. Nothing is
//! executed.

use super::opcodes::{OpCode, Operand, PUSHBYTES1, PUSHBYTES75};
use crate::core::types::UInt160;

/// Disassemble a script into instruction lines.
///
/// Direct pushes print as `PUSHBYTES<n> 0x<hex>`, `APPCALL` and `TAILCALL`
/// print the display-order contract hash, `SYSCALL` prints the service
/// name. A payload running past the end renders as `<truncated>` and ends
/// the listing.
pub fn disassemble(script: &[u8]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut pc = 0;

    while pc < script.len() {
        let byte = script[pc];
        pc += 1;

        if (PUSHBYTES1..=PUSHBYTES75).contains(&byte) {
            let len = byte as usize;
            match script.get(pc..pc + len) {
                Some(data) => {
                    lines.push(format!("PUSHBYTES{} 0x{}", len, hex::encode(data)));
                    pc += len;
                }
                None => {
                    lines.push(format!("PUSHBYTES{} <truncated>", len));
                    break;
                }
            }
            continue;
        }

        let op = match OpCode::from_byte(byte) {
            Some(op) => op,
            None => {
                lines.push(format!("UNKNOWN 0x{:02x}", byte));
                continue;
            }
        };

        match op.operand() {
            Operand::None => lines.push(op.name().to_string()),
            Operand::Fixed(len) => match script.get(pc..pc + len) {
                Some(data) => {
                    lines.push(format!("{} {}", op.name(), render_fixed(op, data)));
                    pc += len;
                }
                None => {
                    lines.push(format!("{} <truncated>", op.name()));
                    break;
                }
            },
            Operand::Prefixed(width) => {
                let data = script.get(pc..pc + width).and_then(|prefix| {
                    let mut buf = [0u8; 4];
                    buf[..width].copy_from_slice(prefix);
                    let len = u32::from_le_bytes(buf) as usize;
                    script.get(pc + width..pc + width + len)
                });
                match data {
                    Some(data) => {
                        lines.push(format!("{} {}", op.name(), render_prefixed(op, data)));
                        pc += width + data.len();
                    }
                    None => {
                        lines.push(format!("{} <truncated>", op.name()));
                        break;
                    }
                }
            }
        }
    }

    lines
}

fn render_fixed(op: OpCode, data: &[u8]) -> String {
    match op {
        OpCode::AppCall | OpCode::TailCall => match UInt160::from_slice(data) {
            Ok(hash) => format!("0x{}", hash.to_display_hex()),
            Err(_) => format!("0x{}", hex::encode(data)),
        },
        OpCode::Jmp | OpCode::JmpIf | OpCode::JmpIfNot | OpCode::Call => {
            let offset = i16::from_le_bytes([data[0], data[1]]);
            format!("{:+}", offset)
        }
        _ => format!("0x{}", hex::encode(data)),
    }
}

fn render_prefixed(op: OpCode, data: &[u8]) -> String {
    match op {
        OpCode::Syscall => String::from_utf8_lossy(data).into_owned(),
        _ => format!("0x{}", hex::encode(data)),
    }
}
