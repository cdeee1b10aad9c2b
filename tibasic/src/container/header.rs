use std::io::{self, Read, Write};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use crate::container::{
    ContainerError, COMMENT_LEN, ENTRY_START, EXTENSION, HEADER_SIZE, MAX_PAYLOAD_LEN, NAME_LEN,
    PROGRAM_TYPE, SIGNATURE, VARIABLE_ENTRY_SIZE,
};

/// Derive the on-calculator variable name from a file path.
///
/// Everything up to the last `/` or `\` is dropped, then up to eight
/// characters are copied uppercased, stopping at the first `.`. Characters
/// outside ASCII have no place in the name and are skipped.
pub fn variable_name(path: &str) -> [u8; NAME_LEN] {
    let base = match path.rfind(|c: char| c == '/' || c == '\\') {
        Some(index) => &path[index + 1..],
        None => path,
    };

    let letters = base
        .chars()
        .take_while(|&c| c != '.')
        .filter(char::is_ascii)
        .map(|c| c.to_ascii_uppercase() as u8);

    let mut name = [0u8; NAME_LEN];
    for (slot, byte) in name.iter_mut().zip(letters) {
        *slot = byte;
    }
    name
}

/// Text of a null-padded fixed-width field
fn padded_text(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}

/// The 55-byte file prelude
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramHeader {
    pub signature: [u8; 8],
    pub extension: [u8; 3],
    pub comment: [u8; COMMENT_LEN],
    /// Size of everything between the header and the checksum
    pub data_length: u16,
}

impl ProgramHeader {
    /// Build a header for a payload of `payload_length` bytes
    pub fn new(comment: &str, payload_length: u16) -> Result<Self, ContainerError> {
        if payload_length as usize > MAX_PAYLOAD_LEN {
            return Err(ContainerError::PayloadTooLarge(payload_length as usize));
        }
        if !comment.bytes().all(|b| b.is_ascii_graphic() || b == b' ') {
            return Err(ContainerError::InvalidComment(format!(
                "{:?} must be printable ASCII",
                comment
            )));
        }
        if comment.len() > COMMENT_LEN {
            return Err(ContainerError::InvalidComment(format!(
                "{} bytes, at most {} fit",
                comment.len(),
                COMMENT_LEN
            )));
        }

        let mut field = [0u8; COMMENT_LEN];
        field[..comment.len()].copy_from_slice(comment.as_bytes());

        Ok(Self {
            signature: SIGNATURE,
            extension: EXTENSION,
            comment: field,
            data_length: VARIABLE_ENTRY_SIZE as u16 + payload_length + 2,
        })
    }

    pub fn comment_text(&self) -> String {
        padded_text(&self.comment)
    }

    pub fn has_valid_signature(&self) -> bool {
        self.signature == SIGNATURE && self.extension == EXTENSION
    }

    /// On-disk bytes of the header
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..8].copy_from_slice(&self.signature);
        bytes[8..11].copy_from_slice(&self.extension);
        bytes[11..53].copy_from_slice(&self.comment);
        bytes[53..55].copy_from_slice(&self.data_length.to_le_bytes());
        bytes
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.signature)?;
        writer.write_all(&self.extension)?;
        writer.write_all(&self.comment)?;
        writer.write_u16::<LittleEndian>(self.data_length)
    }

    pub fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        let mut signature = [0u8; 8];
        reader.read_exact(&mut signature)?;
        let mut extension = [0u8; 3];
        reader.read_exact(&mut extension)?;
        let mut comment = [0u8; COMMENT_LEN];
        reader.read_exact(&mut comment)?;
        let data_length = reader.read_u16::<LittleEndian>()?;

        Ok(Self {
            signature,
            extension,
            comment,
            data_length,
        })
    }
}

/// The 17-byte record describing the embedded program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableEntry {
    pub start: u16,
    pub length1: u16,
    pub kind: u8,
    pub name: [u8; NAME_LEN],
    pub version: u8,
    pub flags: u8,
    pub length2: u16,
}

impl VariableEntry {
    /// Entry for an unarchived program with a payload of `payload_length`
    /// bytes, which must not exceed `MAX_PAYLOAD_LEN`
    pub fn for_program(name: [u8; NAME_LEN], payload_length: u16) -> Self {
        // Both length fields count the payload plus its 2-byte length prefix
        let length = payload_length + 2;
        Self {
            start: ENTRY_START,
            length1: length,
            kind: PROGRAM_TYPE,
            name,
            version: 0,
            flags: 0,
            length2: length,
        }
    }

    pub fn name_text(&self) -> String {
        padded_text(&self.name)
    }

    /// On-disk bytes of the entry
    pub fn to_bytes(&self) -> [u8; VARIABLE_ENTRY_SIZE] {
        let mut bytes = [0u8; VARIABLE_ENTRY_SIZE];
        bytes[0..2].copy_from_slice(&self.start.to_le_bytes());
        bytes[2..4].copy_from_slice(&self.length1.to_le_bytes());
        bytes[4] = self.kind;
        bytes[5..13].copy_from_slice(&self.name);
        bytes[13] = self.version;
        bytes[14] = self.flags;
        bytes[15..17].copy_from_slice(&self.length2.to_le_bytes());
        bytes
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.to_bytes())
    }

    pub fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        let start = reader.read_u16::<LittleEndian>()?;
        let length1 = reader.read_u16::<LittleEndian>()?;
        let kind = reader.read_u8()?;
        let mut name = [0u8; NAME_LEN];
        reader.read_exact(&mut name)?;
        let version = reader.read_u8()?;
        let flags = reader.read_u8()?;
        let length2 = reader.read_u16::<LittleEndian>()?;

        Ok(Self {
            start,
            length1,
            kind,
            name,
            version,
            flags,
            length2,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use crate::container::{DEFAULT_COMMENT, HEADER_SIZE};

    #[test]
    fn test_variable_name_strips_path_and_extension() {
        assert_eq!(&variable_name("path/to/Hello.world.txt"), b"HELLO\0\0\0");
        assert_eq!(&variable_name("C:\\calc\\game.8xp"), b"GAME\0\0\0\0");
        assert_eq!(&variable_name("mixed/dir\\prog.8xp"), b"PROG\0\0\0\0");
    }

    #[test]
    fn test_variable_name_truncates_to_eight() {
        assert_eq!(&variable_name("averylongname.8xp"), b"AVERYLON");
        assert_eq!(&variable_name("noextension"), b"NOEXTENS");
    }

    #[test]
    fn test_variable_name_edge_cases() {
        assert_eq!(variable_name(""), [0; NAME_LEN]);
        assert_eq!(variable_name("dir/"), [0; NAME_LEN]);
        assert_eq!(variable_name(".hidden"), [0; NAME_LEN]);
        assert_eq!(&variable_name("a1"), b"A1\0\0\0\0\0\0");
    }

    #[test]
    fn test_variable_name_skips_non_ascii() {
        assert_eq!(&variable_name("out/abcdefgé.8xp"), b"ABCDEFG\0");
        assert_eq!(&variable_name("out/é.8xp"), b"\0\0\0\0\0\0\0\0");
        assert_eq!(&variable_name("ñandú"), b"AND\0\0\0\0\0");
        assert_eq!(&variable_name("πprogram1.8xp"), b"PROGRAM1");
        assert!(variable_name("日本語/テスト.8xp").is_ascii());
    }

    #[test]
    fn test_header_layout() {
        let header = ProgramHeader::new(DEFAULT_COMMENT, 10).unwrap();
        let mut bytes = Vec::new();
        header.write_to(&mut bytes).unwrap();

        assert_eq!(bytes.len(), HEADER_SIZE);
        assert_eq!(&bytes[0..8], b"**TI83F*");
        assert_eq!(&bytes[8..11], &[0x1A, 0x0A, 0x00]);
        assert_eq!(&bytes[11..11 + DEFAULT_COMMENT.len()], DEFAULT_COMMENT.as_bytes());
        assert!(bytes[11 + DEFAULT_COMMENT.len()..53].iter().all(|&b| b == 0));
        // 17 + 10 + 2
        assert_eq!(&bytes[53..55], &[29, 0]);
    }

    #[test]
    fn test_header_comment_limits() {
        let exact = "x".repeat(COMMENT_LEN);
        let header = ProgramHeader::new(&exact, 0).unwrap();
        assert_eq!(header.comment_text(), exact);

        let too_long = "x".repeat(COMMENT_LEN + 1);
        assert!(matches!(
            ProgramHeader::new(&too_long, 0),
            Err(ContainerError::InvalidComment(_))
        ));
        assert!(matches!(
            ProgramHeader::new("π", 0),
            Err(ContainerError::InvalidComment(_))
        ));
    }

    #[test]
    fn test_header_comment_rejects_control_characters() {
        for comment in ["bell\x07", "tab\there", "nul\0", "line\n"] {
            assert!(
                matches!(
                    ProgramHeader::new(comment, 0),
                    Err(ContainerError::InvalidComment(_))
                ),
                "{:?} was accepted",
                comment
            );
        }
        assert!(ProgramHeader::new("Made with ~ & {braces}!", 0).is_ok());
    }

    #[test]
    fn test_header_to_bytes_matches_writer() {
        let header = ProgramHeader::new("hello", 7).unwrap();
        let mut written = Vec::new();
        header.write_to(&mut written).unwrap();
        assert_eq!(header.to_bytes().to_vec(), written);
    }

    #[test]
    fn test_header_read_back() {
        let header = ProgramHeader::new("hello", 3).unwrap();
        let mut bytes = Vec::new();
        header.write_to(&mut bytes).unwrap();

        let read = ProgramHeader::read_from(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(read, header);
        assert_eq!(read.comment_text(), "hello");
        assert!(read.has_valid_signature());
    }

    #[test]
    fn test_entry_layout() {
        let entry = VariableEntry::for_program(variable_name("prog.8xp"), 0x0102);
        let bytes = entry.to_bytes();

        assert_eq!(&bytes[0..2], &[0x0D, 0x00]);
        assert_eq!(&bytes[2..4], &[0x04, 0x01]);
        assert_eq!(bytes[4], 0x05);
        assert_eq!(&bytes[5..13], b"PROG\0\0\0\0");
        assert_eq!(bytes[13], 0);
        assert_eq!(bytes[14], 0);
        assert_eq!(&bytes[15..17], &[0x04, 0x01]);
    }

    #[test]
    fn test_entry_lengths_agree() {
        let entry = VariableEntry::for_program([0; NAME_LEN], 7);
        assert_eq!(entry.length1, 9);
        assert_eq!(entry.length1, entry.length2);
    }

    #[test]
    fn test_entry_read_back() {
        let entry = VariableEntry::for_program(variable_name("demo"), 42);
        let mut bytes = Vec::new();
        entry.write_to(&mut bytes).unwrap();
        assert_eq!(bytes.len(), VARIABLE_ENTRY_SIZE);

        let read = VariableEntry::read_from(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(read, entry);
        assert_eq!(read.name_text(), "DEMO");
    }

    #[test]
    fn test_truncated_entry() {
        let result = VariableEntry::read_from(&mut Cursor::new(vec![0x0D, 0x00, 0x02]));
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::UnexpectedEof);
    }
}
