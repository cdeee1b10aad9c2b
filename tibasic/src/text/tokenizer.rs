use std::io::{self, BufRead};
use thiserror::Error;
use crate::text::LineScanner;
use crate::tokens::{Opcode, Token, TokenTable};

#[derive(Error, Debug)]
pub enum TokenizeError {
    #[error("Invalid token {found:?} at line {line}, column {column}")]
    InvalidToken {
        line: usize,
        column: usize,
        found: char,
    },

    #[error(transparent)]
    IoError(#[from] io::Error),
}

/// Ordered opcodes produced by the tokenizer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpcodeStream {
    opcodes: Vec<Opcode>,
    byte_len: usize,
}

impl OpcodeStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, opcode: Opcode) {
        self.byte_len += opcode.width.bytes();
        self.opcodes.push(opcode);
    }

    /// Number of opcodes in the stream
    pub fn len(&self) -> usize {
        self.opcodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.opcodes.is_empty()
    }

    /// Serialized size: the sum of every opcode's width
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    pub fn iter(&self) -> impl Iterator<Item = &Opcode> {
        self.opcodes.iter()
    }

    /// Serialize the stream into payload bytes
    pub fn to_payload(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(self.byte_len);
        for opcode in &self.opcodes {
            opcode.push_to(&mut payload);
        }
        payload
    }
}

/// Greedy longest-match tokenizer over a token table
pub struct Tokenizer<'t> {
    table: &'t TokenTable,
}

impl<'t> Tokenizer<'t> {
    pub fn new(table: &'t TokenTable) -> Self {
        Self { table }
    }

    /// Tokenize a whole source text, one newline token per emitted line
    pub fn tokenize<R: BufRead>(&self, reader: R) -> Result<OpcodeStream, TokenizeError> {
        let mut stream = OpcodeStream::new();
        for line in LineScanner::new(reader) {
            let line = line?;
            self.tokenize_line(&line.text, line.number, &mut stream)?;
        }
        Ok(stream)
    }

    /// Tokenize one cleaned line and terminate it with the table's newline.
    ///
    /// Letters without a matching mnemonic become their uppercase ASCII code.
    pub fn tokenize_line(
        &self,
        line: &str,
        line_number: usize,
        stream: &mut OpcodeStream,
    ) -> Result<(), TokenizeError> {
        let mut rest = line;
        let mut column = 1;

        while let Some(first) = rest.chars().next() {
            let (opcode, consumed) = match self.longest_match(rest) {
                Some(token) => {
                    tracing::debug!(line = line_number, column, token = ?token.mnemonic, "matched token");
                    (token.code(), token.mnemonic.len())
                }
                None if first.is_ascii_alphabetic() => {
                    let letter = first.to_ascii_uppercase();
                    tracing::debug!(line = line_number, column, token = ?letter, "matched letter");
                    (Opcode::single(letter as u8), 1)
                }
                None => {
                    return Err(TokenizeError::InvalidToken {
                        line: line_number,
                        column,
                        found: first,
                    })
                }
            };

            stream.push(opcode);
            column += rest[..consumed].chars().count();
            rest = &rest[consumed..];
        }

        if let Some(newline) = self.table.newline() {
            stream.push(newline.code());
        }
        Ok(())
    }

    /// Longest mnemonic that prefixes `text`, starting no wider than the text
    fn longest_match(&self, text: &str) -> Option<&'t Token> {
        let widest = self.table.longest_mnemonic().min(text.len());
        (1..=widest)
            .rev()
            .filter_map(|width| text.get(..width))
            .find_map(|prefix| self.table.lookup_by_mnemonic(prefix))
    }
}
