// tibasic - TI-BASIC source text to and from TI-83F program files

pub mod tokens;
pub mod text;
pub mod container;
pub mod translator;

pub use tokens::{Opcode, Token, TokenTable, TokenWidth};
pub use text::{Detokenizer, LineScanner, OpcodeStream, Tokenizer};
pub use container::{Parser, Program};
pub use translator::{TranslateError, TranslateResult, Translator, TranslatorConfig};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
