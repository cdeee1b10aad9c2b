use std::io::{self, Write};
use byteorder::{LittleEndian, WriteBytesExt};
use crate::container::{
    checksum, ContainerError, ProgramHeader, VariableEntry, HEADER_SIZE, MAX_PAYLOAD_LEN, NAME_LEN,
    VARIABLE_ENTRY_SIZE,
};

/// A program file held in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub header: ProgramHeader,
    pub entry: VariableEntry,
    /// Length prefix as stored; may exceed `payload.len()` for a truncated file
    pub payload_length: u16,
    pub payload: Vec<u8>,
    /// Stored checksum, `None` when the file ends before it
    pub checksum: Option<u16>,
}

impl Program {
    /// Wrap a payload in a fresh header and variable entry
    pub fn new(name: [u8; NAME_LEN], comment: &str, payload: Vec<u8>) -> Result<Self, ContainerError> {
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(ContainerError::PayloadTooLarge(payload.len()));
        }

        let payload_length = payload.len() as u16;
        let header = ProgramHeader::new(comment, payload_length)?;
        let entry = VariableEntry::for_program(name, payload_length);
        let checksum = checksum(&entry, payload_length, &payload);

        Ok(Self {
            header,
            entry,
            payload_length,
            payload,
            checksum: Some(checksum),
        })
    }

    /// Checksum recomputed from the entry and payload
    pub fn computed_checksum(&self) -> u16 {
        checksum(&self.entry, self.payload_length, &self.payload)
    }

    /// Compare the stored checksum against the contents
    pub fn verify_checksum(&self) -> Result<(), ContainerError> {
        let stored = self.checksum.ok_or(ContainerError::MissingChecksum)?;
        let computed = self.computed_checksum();
        if stored != computed {
            return Err(ContainerError::ChecksumMismatch { stored, computed });
        }
        Ok(())
    }

    /// True when the file held fewer payload bytes than its length prefix claims
    pub fn is_truncated(&self) -> bool {
        self.payload.len() < self.payload_length as usize
    }

    /// Emit the program in document order: header, entry, length, payload,
    /// checksum
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.header.write_to(writer)?;
        self.entry.write_to(writer)?;
        writer.write_u16::<LittleEndian>(self.payload_length)?;
        writer.write_all(&self.payload)?;
        writer.write_u16::<LittleEndian>(self.checksum.unwrap_or_else(|| self.computed_checksum()))?;
        Ok(())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let checksum = self.checksum.unwrap_or_else(|| self.computed_checksum());
        let mut bytes = Vec::with_capacity(HEADER_SIZE + VARIABLE_ENTRY_SIZE + 2 + self.payload.len() + 2);
        bytes.extend_from_slice(&self.header.to_bytes());
        bytes.extend_from_slice(&self.entry.to_bytes());
        bytes.extend_from_slice(&self.payload_length.to_le_bytes());
        bytes.extend_from_slice(&self.payload);
        bytes.extend_from_slice(&checksum.to_le_bytes());
        bytes
    }
}
