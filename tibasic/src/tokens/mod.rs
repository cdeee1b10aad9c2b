//! Token vocabulary shared by the compile and decompile paths

mod table;

pub use table::TokenTable;

use std::fmt;
use std::io;
use thiserror::Error;

/// Mnemonic of the token that ends a logical line
pub const NEWLINE_MNEMONIC: &str = "\n";

/// Mnemonic that switches the decompiler in and out of raw assembly mode
pub const ASM_PROGRAM_MNEMONIC: &str = "AsmPrgm";

/// Errors raised while loading a token table
#[derive(Error, Debug)]
pub enum TableError {
    #[error("Token data is not valid JSON")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    IoError(#[from] io::Error),

    #[error("Token with bytes '{0}' has an empty mnemonic")]
    EmptyMnemonic(String),

    #[error("Invalid token bytes '{bytes}' for mnemonic {mnemonic:?}")]
    InvalidBytes { mnemonic: String, bytes: String },

    #[error("Duplicate mnemonic {0:?}")]
    DuplicateMnemonic(String),

    #[error("Duplicate {width}-byte opcode {opcode:#06X} ({first:?} and {second:?})")]
    DuplicateOpcode {
        opcode: u16,
        width: usize,
        first: String,
        second: String,
    },
}

/// Number of bytes a token occupies in the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenWidth {
    One = 1,
    Two = 2,
}

impl TokenWidth {
    pub fn bytes(self) -> usize {
        self as usize
    }
}

/// A single encoded token: value plus the width it is serialized with.
///
/// Two-byte values are stored as the little-endian reading of their stream
/// bytes, so the prefix byte (`0xBB` in `BB 6C`) is the low byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    pub value: u16,
    pub width: TokenWidth,
}

impl Opcode {
    pub fn single(byte: u8) -> Self {
        Self {
            value: byte as u16,
            width: TokenWidth::One,
        }
    }

    pub fn double(first: u8, second: u8) -> Self {
        Self {
            value: u16::from_le_bytes([first, second]),
            width: TokenWidth::Two,
        }
    }

    /// Build an opcode from its bytes in stream order
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        match *bytes {
            [byte] => Some(Self::single(byte)),
            [first, second] => Some(Self::double(first, second)),
            _ => None,
        }
    }

    /// Append the opcode's bytes to a payload buffer
    pub fn push_to(&self, payload: &mut Vec<u8>) {
        let [low, high] = self.value.to_le_bytes();
        payload.push(low);
        if self.width == TokenWidth::Two {
            payload.push(high);
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [low, high] = self.value.to_le_bytes();
        match self.width {
            TokenWidth::One => write!(f, "{:02X}", low),
            TokenWidth::Two => write!(f, "{:02X} {:02X}", low, high),
        }
    }
}

/// Immutable token table entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub mnemonic: String,
    pub opcode: u16,
    pub width: TokenWidth,
}

impl Token {
    pub fn new(mnemonic: &str, code: Opcode) -> Self {
        Self {
            mnemonic: mnemonic.to_string(),
            opcode: code.value,
            width: code.width,
        }
    }

    /// The encoded form of this token
    pub fn code(&self) -> Opcode {
        Opcode {
            value: self.opcode,
            width: self.width,
        }
    }
}
