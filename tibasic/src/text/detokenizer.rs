use crate::tokens::{TokenTable, ASM_PROGRAM_MNEMONIC};

/// Byte value of the newline token, used as the line break inside asm blocks
const ASM_NEWLINE_BYTE: u8 = 0x3F;

/// Decoding state of the detokenizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeState {
    /// Bytes are decoded through the token table
    Normal,
    /// Bytes are copied verbatim
    Asm,
}

impl DecodeState {
    fn toggled(self) -> Self {
        match self {
            DecodeState::Normal => DecodeState::Asm,
            DecodeState::Asm => DecodeState::Normal,
        }
    }
}

/// Turns payload bytes back into source text
pub struct Detokenizer<'t> {
    table: &'t TokenTable,
}

impl<'t> Detokenizer<'t> {
    pub fn new(table: &'t TokenTable) -> Self {
        Self { table }
    }

    /// Decode a payload.
    ///
    /// The output is raw bytes: mnemonics are UTF-8, but anything copied
    /// through in asm mode or as an unknown opcode is passed on unchanged.
    pub fn detokenize(&self, payload: &[u8]) -> Vec<u8> {
        let mut output = Vec::with_capacity(payload.len() * 2);
        let mut state = DecodeState::Normal;
        let mut position = 0;

        while position < payload.len() {
            let low = payload[position];

            if state == DecodeState::Asm {
                if low == ASM_NEWLINE_BYTE {
                    output.push(b'\n');
                }
                output.push(low);
                position += 1;
                continue;
            }

            // A lone final byte peeks as if followed by zero
            let high = payload.get(position + 1).copied().unwrap_or(0);
            let value = u16::from_le_bytes([low, high]);

            let token = self
                .table
                .lookup_by_opcode_16(value)
                .or_else(|| self.table.lookup_by_opcode_8(low));

            match token {
                Some(token) => {
                    tracing::trace!(offset = position, token = ?token.mnemonic, "decoded token");
                    output.extend_from_slice(token.mnemonic.as_bytes());
                    // The 8-bit fallback still advances by the entry's own width
                    position += token.width.bytes();

                    if token.mnemonic == ASM_PROGRAM_MNEMONIC {
                        state = state.toggled();
                        tracing::trace!(offset = position, ?state, "switched decode state");
                    }
                }
                None => {
                    tracing::trace!(offset = position, byte = low, "unknown opcode, copied as literal");
                    output.push(low);
                    position += 1;
                }
            }
        }

        output
    }
}
