//! Stack machine opcodes
//!
//! Defines the instruction set that invocation and verification scripts
//! are written in. The SDK only emits and disassembles these bytes; it
//! never executes them.
//!
//! `0x01..=0x4B` are not listed: each pushes that many following bytes
//! (see [`PUSHBYTES1`] and [`PUSHBYTES75`]).

/// First direct-push opcode, pushes one byte
pub const PUSHBYTES1: u8 = 0x01;
/// Last direct-push opcode, pushes 75 bytes
pub const PUSHBYTES75: u8 = 0x4B;

/// How an opcode's operand is laid out after the opcode byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    None,
    /// A fixed number of bytes
    Fixed(usize),
    /// A little-endian length of the given width, then that many bytes
    Prefixed(usize),
}

macro_rules! opcodes {
    ($($variant:ident = $byte:literal => $name:literal,)*) => {
        /// Opcodes understood by the NEO virtual machine
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum OpCode {
            $($variant = $byte,)*
        }

        impl OpCode {
            /// Convert byte to opcode
            pub fn from_byte(byte: u8) -> Option<Self> {
                match byte {
                    $($byte => Some(OpCode::$variant),)*
                    _ => None,
                }
            }

            /// Mnemonic for disassembly
            pub fn name(&self) -> &'static str {
                match self {
                    $(OpCode::$variant => $name,)*
                }
            }
        }
    };
}

opcodes! {
    // Constants
    Push0 = 0x00 => "PUSH0",
    PushData1 = 0x4C => "PUSHDATA1",
    PushData2 = 0x4D => "PUSHDATA2",
    PushData4 = 0x4E => "PUSHDATA4",
    PushM1 = 0x4F => "PUSHM1",
    Push1 = 0x51 => "PUSH1",
    Push2 = 0x52 => "PUSH2",
    Push3 = 0x53 => "PUSH3",
    Push4 = 0x54 => "PUSH4",
    Push5 = 0x55 => "PUSH5",
    Push6 = 0x56 => "PUSH6",
    Push7 = 0x57 => "PUSH7",
    Push8 = 0x58 => "PUSH8",
    Push9 = 0x59 => "PUSH9",
    Push10 = 0x5A => "PUSH10",
    Push11 = 0x5B => "PUSH11",
    Push12 = 0x5C => "PUSH12",
    Push13 = 0x5D => "PUSH13",
    Push14 = 0x5E => "PUSH14",
    Push15 = 0x5F => "PUSH15",
    Push16 = 0x60 => "PUSH16",

    // Flow control
    Nop = 0x61 => "NOP",
    Jmp = 0x62 => "JMP",
    JmpIf = 0x63 => "JMPIF",
    JmpIfNot = 0x64 => "JMPIFNOT",
    Call = 0x65 => "CALL",
    Ret = 0x66 => "RET",
    AppCall = 0x67 => "APPCALL",
    Syscall = 0x68 => "SYSCALL",
    TailCall = 0x69 => "TAILCALL",

    // Stack
    DupFromAltStack = 0x6A => "DUPFROMALTSTACK",
    ToAltStack = 0x6B => "TOALTSTACK",
    FromAltStack = 0x6C => "FROMALTSTACK",
    XDrop = 0x6D => "XDROP",
    XSwap = 0x72 => "XSWAP",
    XTuck = 0x73 => "XTUCK",
    Depth = 0x74 => "DEPTH",
    Drop = 0x75 => "DROP",
    Dup = 0x76 => "DUP",
    Nip = 0x77 => "NIP",
    Over = 0x78 => "OVER",
    Pick = 0x79 => "PICK",
    Roll = 0x7A => "ROLL",
    Rot = 0x7B => "ROT",
    Swap = 0x7C => "SWAP",
    Tuck = 0x7D => "TUCK",

    // Splice
    Cat = 0x7E => "CAT",
    Substr = 0x7F => "SUBSTR",
    Left = 0x80 => "LEFT",
    Right = 0x81 => "RIGHT",
    Size = 0x82 => "SIZE",

    // Bitwise logic
    Invert = 0x83 => "INVERT",
    And = 0x84 => "AND",
    Or = 0x85 => "OR",
    Xor = 0x86 => "XOR",
    Equal = 0x87 => "EQUAL",

    // Arithmetic
    Inc = 0x8B => "INC",
    Dec = 0x8C => "DEC",
    Sign = 0x8D => "SIGN",
    Negate = 0x8F => "NEGATE",
    Abs = 0x90 => "ABS",
    Not = 0x91 => "NOT",
    Nz = 0x92 => "NZ",
    Add = 0x93 => "ADD",
    Sub = 0x94 => "SUB",
    Mul = 0x95 => "MUL",
    Div = 0x96 => "DIV",
    Mod = 0x97 => "MOD",
    Shl = 0x98 => "SHL",
    Shr = 0x99 => "SHR",
    BoolAnd = 0x9A => "BOOLAND",
    BoolOr = 0x9B => "BOOLOR",
    NumEqual = 0x9C => "NUMEQUAL",
    NumNotEqual = 0x9E => "NUMNOTEQUAL",
    Lt = 0x9F => "LT",
    Gt = 0xA0 => "GT",
    Lte = 0xA1 => "LTE",
    Gte = 0xA2 => "GTE",
    Min = 0xA3 => "MIN",
    Max = 0xA4 => "MAX",
    Within = 0xA5 => "WITHIN",

    // Crypto
    Sha1 = 0xA7 => "SHA1",
    Sha256 = 0xA8 => "SHA256",
    Hash160 = 0xA9 => "HASH160",
    Hash256 = 0xAA => "HASH256",
    CheckSig = 0xAC => "CHECKSIG",
    Verify = 0xAD => "VERIFY",
    CheckMultiSig = 0xAE => "CHECKMULTISIG",

    // Arrays and maps
    ArraySize = 0xC0 => "ARRAYSIZE",
    Pack = 0xC1 => "PACK",
    Unpack = 0xC2 => "UNPACK",
    PickItem = 0xC3 => "PICKITEM",
    SetItem = 0xC4 => "SETITEM",
    NewArray = 0xC5 => "NEWARRAY",
    NewStruct = 0xC6 => "NEWSTRUCT",
    NewMap = 0xC7 => "NEWMAP",
    Append = 0xC8 => "APPEND",
    Reverse = 0xC9 => "REVERSE",
    Remove = 0xCA => "REMOVE",
    HasKey = 0xCB => "HASKEY",
    Keys = 0xCC => "KEYS",
    Values = 0xCD => "VALUES",

    // Exceptions
    Throw = 0xF0 => "THROW",
    ThrowIfNot = 0xF1 => "THROWIFNOT",
}

impl OpCode {
    /// `PUSHF` is `PUSH0`
    pub const PUSHF: OpCode = OpCode::Push0;
    /// `PUSHT` is `PUSH1`
    pub const PUSHT: OpCode = OpCode::Push1;

    /// Single-byte push for -1 and 0..=16
    pub fn small_int(value: i64) -> Option<Self> {
        match value {
            -1 => Some(OpCode::PushM1),
            0 => Some(OpCode::Push0),
            1..=16 => OpCode::from_byte(OpCode::Push1 as u8 - 1 + value as u8),
            _ => None,
        }
    }

    /// Layout of the bytes following this opcode
    pub fn operand(&self) -> Operand {
        match self {
            OpCode::PushData1 => Operand::Prefixed(1),
            OpCode::PushData2 => Operand::Prefixed(2),
            OpCode::PushData4 => Operand::Prefixed(4),
            OpCode::Jmp | OpCode::JmpIf | OpCode::JmpIfNot | OpCode::Call => Operand::Fixed(2),
            OpCode::AppCall | OpCode::TailCall => Operand::Fixed(20),
            OpCode::Syscall => Operand::Prefixed(1),
            _ => Operand::None,
        }
    }
}
