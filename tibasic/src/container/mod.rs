//! The TI-83F (`.8Xp`) program file container
//!
//! ```text
//! offset  size  field
//!   0      8    signature         "**TI83F*"
//!   8      3    extension         1A 0A 00
//!  11     42    comment           null padded
//!  53      2    data_length       17 + L + 2
//!  55     17    variable entry
//!  72      2    payload length L
//!  74      L    payload
//!  74+L    2    checksum          over bytes [55 .. 74+L)
//! ```
//!
//! All multi-byte integers are little-endian.

mod header;
mod parser;
mod program;

pub use header::{variable_name, ProgramHeader, VariableEntry};
pub use parser::Parser;
pub use program::Program;

use std::io;
use thiserror::Error;

pub const SIGNATURE: [u8; 8] = *b"**TI83F*";
pub const EXTENSION: [u8; 3] = [0x1A, 0x0A, 0x00];
pub const COMMENT_LEN: usize = 42;
pub const NAME_LEN: usize = 8;

/// Size of the program header on disk
pub const HEADER_SIZE: usize = 55;

/// Size of the variable entry on disk
pub const VARIABLE_ENTRY_SIZE: usize = 17;

/// Value of the variable entry's leading field
pub const ENTRY_START: u16 = 0x000D;

/// Variable type code of a program
pub const PROGRAM_TYPE: u8 = 0x05;

/// Largest payload whose `data_length` still fits in 16 bits
pub const MAX_PAYLOAD_LEN: usize = u16::MAX as usize - VARIABLE_ENTRY_SIZE - 2;

pub const DEFAULT_COMMENT: &str = "Generated by the TI-BASIC Compiler.";

#[derive(Error, Debug)]
pub enum ContainerError {
    #[error(transparent)]
    IoError(#[from] io::Error),

    #[error("Payload of {0} bytes exceeds the {max} byte limit", max = MAX_PAYLOAD_LEN)]
    PayloadTooLarge(usize),

    #[error("Invalid header comment: {0}")]
    InvalidComment(String),

    #[error("Checksum mismatch: file stores {stored:#06X}, contents sum to {computed:#06X}")]
    ChecksumMismatch { stored: u16, computed: u16 },

    #[error("File ends before the checksum")]
    MissingChecksum,
}

/// Low 16 bits of the byte sum over the variable entry, the payload length
/// prefix and the payload
pub fn checksum(entry: &VariableEntry, payload_length: u16, payload: &[u8]) -> u16 {
    entry
        .to_bytes()
        .iter()
        .chain(payload_length.to_le_bytes().iter())
        .chain(payload.iter())
        .fold(0u16, |sum, &byte| sum.wrapping_add(byte as u16))
}
