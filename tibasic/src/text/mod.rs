//! Conversion between TI-BASIC source text and token payloads

mod scanner;
mod tokenizer;
mod detokenizer;

pub use scanner::{clean_line, LineScanner, SourceLine};
pub use tokenizer::{OpcodeStream, TokenizeError, Tokenizer};
pub use detokenizer::{DecodeState, Detokenizer};
