use std::collections::hash_map::Entry;
use std::fs;
use std::path::Path;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use crate::tokens::{Opcode, TableError, Token, TokenWidth, NEWLINE_MNEMONIC};

/// The token data shipped with the crate
const STANDARD_TOKENS: &str = include_str!("tokens.json");

/// On-disk layout of a token data file
#[derive(Debug, Serialize, Deserialize)]
struct TokenFile {
    tokens: Vec<TokenRecord>,
}

/// One entry of a token data file. `bytes` holds one or two hex bytes in
/// stream order, e.g. `"DE"` or `"BB 6C"`.
#[derive(Debug, Serialize, Deserialize)]
struct TokenRecord {
    mnemonic: String,
    bytes: String,
}

impl TokenRecord {
    fn into_token(self) -> Result<Token, TableError> {
        let invalid = || TableError::InvalidBytes {
            mnemonic: self.mnemonic.clone(),
            bytes: self.bytes.clone(),
        };

        let bytes = self
            .bytes
            .split_whitespace()
            .map(|hex| {
                if hex.len() == 2 {
                    u8::from_str_radix(hex, 16).ok()
                } else {
                    None
                }
            })
            .collect::<Option<Vec<u8>>>()
            .ok_or_else(invalid)?;
        let code = Opcode::from_bytes(&bytes).ok_or_else(invalid)?;

        Ok(Token::new(&self.mnemonic, code))
    }
}

/// Bidirectional mapping between mnemonics and opcodes
#[derive(Debug, Clone)]
pub struct TokenTable {
    tokens: Vec<Token>,
    by_mnemonic: FxHashMap<String, usize>,
    by_opcode: FxHashMap<u16, usize>,
    longest_mnemonic: usize,
    newline: Option<usize>,
}

impl TokenTable {
    /// The built-in TI-83+/84+ token table
    pub fn standard() -> Result<Self, TableError> {
        Self::from_json(STANDARD_TOKENS)
    }

    /// Load a table from token data in JSON form
    pub fn from_json(json: &str) -> Result<Self, TableError> {
        let file: TokenFile = serde_json::from_str(json)?;
        let tokens = file
            .tokens
            .into_iter()
            .map(TokenRecord::into_token)
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_tokens(tokens)
    }

    /// Load a table from a token data file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TableError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Build the indices over a list of entries.
    ///
    /// Mnemonics must be unique. An opcode may appear twice only with
    /// different widths; the earlier entry then answers opcode lookups.
    pub fn from_tokens(tokens: Vec<Token>) -> Result<Self, TableError> {
        let mut by_mnemonic = FxHashMap::default();
        let mut by_opcode: FxHashMap<u16, usize> = FxHashMap::default();
        let mut longest_mnemonic = 0;

        for (index, token) in tokens.iter().enumerate() {
            if token.mnemonic.is_empty() {
                return Err(TableError::EmptyMnemonic(token.code().to_string()));
            }
            if token.width == TokenWidth::One && token.opcode > 0xFF {
                return Err(TableError::InvalidBytes {
                    mnemonic: token.mnemonic.clone(),
                    bytes: format!("{:04X}", token.opcode),
                });
            }

            if by_mnemonic.insert(token.mnemonic.clone(), index).is_some() {
                return Err(TableError::DuplicateMnemonic(token.mnemonic.clone()));
            }

            match by_opcode.entry(token.opcode) {
                Entry::Vacant(slot) => {
                    slot.insert(index);
                }
                Entry::Occupied(slot) => {
                    let first = &tokens[*slot.get()];
                    if first.width == token.width {
                        return Err(TableError::DuplicateOpcode {
                            opcode: token.opcode,
                            width: token.width.bytes(),
                            first: first.mnemonic.clone(),
                            second: token.mnemonic.clone(),
                        });
                    }
                }
            }

            longest_mnemonic = longest_mnemonic.max(token.mnemonic.len());
        }

        let newline = by_mnemonic.get(NEWLINE_MNEMONIC).copied();

        Ok(Self {
            tokens,
            by_mnemonic,
            by_opcode,
            longest_mnemonic,
            newline,
        })
    }

    /// Exact, case-sensitive mnemonic match
    pub fn lookup_by_mnemonic(&self, mnemonic: &str) -> Option<&Token> {
        self.by_mnemonic.get(mnemonic).map(|&index| &self.tokens[index])
    }

    /// Match against the full two-byte value
    pub fn lookup_by_opcode_16(&self, value: u16) -> Option<&Token> {
        self.by_opcode.get(&value).map(|&index| &self.tokens[index])
    }

    /// Match against a single byte
    pub fn lookup_by_opcode_8(&self, value: u8) -> Option<&Token> {
        self.lookup_by_opcode_16(value as u16)
    }

    /// Length in bytes of the longest mnemonic
    pub fn longest_mnemonic(&self) -> usize {
        self.longest_mnemonic
    }

    /// The entry that terminates a line, if the table defines one
    pub fn newline(&self) -> Option<&Token> {
        self.newline.map(|index| &self.tokens[index])
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Entries in the order they were loaded
    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }

    /// Render the table in the token data file format
    pub fn to_json(&self) -> Result<String, TableError> {
        let file = TokenFile {
            tokens: self
                .tokens
                .iter()
                .map(|token| TokenRecord {
                    mnemonic: token.mnemonic.clone(),
                    bytes: token.code().to_string(),
                })
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }
}
