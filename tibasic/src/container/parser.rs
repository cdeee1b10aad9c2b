use std::io::{self, Read};
use byteorder::{LittleEndian, ReadBytesExt};
use crate::container::{ContainerError, Program, ProgramHeader, VariableEntry};

pub struct Parser;

impl Parser {
    /// Parse a program file from a reader (file, memory buffer, etc.)
    ///
    /// The signature is not validated. A payload shorter than its length
    /// prefix is accepted, and a missing checksum is reported as `None`.
    pub fn parse<R: Read>(reader: &mut R) -> Result<Program, ContainerError> {
        let header = ProgramHeader::read_from(reader)?;
        if !header.has_valid_signature() {
            tracing::warn!(
                signature = %String::from_utf8_lossy(&header.signature),
                "unexpected file signature"
            );
        }

        let entry = VariableEntry::read_from(reader)?;
        let payload_length = reader.read_u16::<LittleEndian>()?;

        let mut payload = Vec::with_capacity(payload_length as usize);
        reader
            .by_ref()
            .take(payload_length as u64)
            .read_to_end(&mut payload)?;

        let checksum = match reader.read_u16::<LittleEndian>() {
            Ok(checksum) => Some(checksum),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => None,
            Err(e) => return Err(e.into()),
        };

        let program = Program {
            header,
            entry,
            payload_length,
            payload,
            checksum,
        };

        if program.is_truncated() {
            tracing::warn!(
                declared = program.payload_length,
                found = program.payload.len(),
                "payload is shorter than its length prefix"
            );
        }

        Ok(program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use crate::container::{variable_name, DEFAULT_COMMENT, HEADER_SIZE, VARIABLE_ENTRY_SIZE};

    fn create_valid_program() -> Program {
        Program::new(
            variable_name("tests/Hello.8xp"),
            DEFAULT_COMMENT,
            vec![0xDE, 0x2A, 0x48, 0x49, 0x2A, 0x3F],
        )
        .unwrap()
    }

    #[test]
    fn test_parse_valid_program() {
        let program = create_valid_program();
        let mut cursor = Cursor::new(program.to_bytes());

        let parsed = Parser::parse(&mut cursor).unwrap();
        assert_eq!(parsed, program);
        assert_eq!(parsed.entry.name_text(), "HELLO");
        assert_eq!(parsed.header.comment_text(), DEFAULT_COMMENT);
        assert!(parsed.verify_checksum().is_ok());
    }

    #[test]
    fn test_parse_reproduces_bytes() {
        let bytes = create_valid_program().to_bytes();
        let parsed = Parser::parse(&mut Cursor::new(bytes.clone())).unwrap();
        assert_eq!(parsed.to_bytes(), bytes);
    }

    #[test]
    fn test_parse_ignores_signature() {
        let mut bytes = create_valid_program().to_bytes();
        bytes[0..8].copy_from_slice(b"**TI82**");

        let parsed = Parser::parse(&mut Cursor::new(bytes)).unwrap();
        assert!(!parsed.header.has_valid_signature());
        assert_eq!(parsed.payload.len(), 6);
    }

    #[test]
    fn test_parse_missing_checksum() {
        let mut bytes = create_valid_program().to_bytes();
        bytes.truncate(bytes.len() - 2);

        let parsed = Parser::parse(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(parsed.checksum, None);
        assert!(matches!(parsed.verify_checksum(), Err(ContainerError::MissingChecksum)));
    }

    #[test]
    fn test_parse_truncated_payload() {
        let mut bytes = create_valid_program().to_bytes();
        let payload_start = HEADER_SIZE + VARIABLE_ENTRY_SIZE + 2;
        bytes.truncate(payload_start + 3);

        let parsed = Parser::parse(&mut Cursor::new(bytes)).unwrap();
        assert!(parsed.is_truncated());
        assert_eq!(parsed.payload_length, 6);
        assert_eq!(parsed.payload, vec![0xDE, 0x2A, 0x48]);
        assert_eq!(parsed.checksum, None);
    }

    #[test]
    fn test_parse_corrupted_checksum() {
        let mut bytes = create_valid_program().to_bytes();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;

        let parsed = Parser::parse(&mut Cursor::new(bytes)).unwrap();
        assert!(matches!(
            parsed.verify_checksum(),
            Err(ContainerError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_parse_truncated_header() {
        for truncate_at in [0, 10, 54, HEADER_SIZE + 5, HEADER_SIZE + VARIABLE_ENTRY_SIZE + 1] {
            let mut bytes = create_valid_program().to_bytes();
            bytes.truncate(truncate_at);

            match Parser::parse(&mut Cursor::new(bytes)) {
                Err(ContainerError::IoError(e)) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
                other => panic!("Expected IoError for truncation at {}, got {:?}", truncate_at, other),
            }
        }
    }
}
