use crate::errors::{FormatError, Result};
use log::trace;

pub const MSD_MAGIC: &[u8; 4] = b"WMSD";
pub const HEADER_SIZE: usize = 0x14;
const DIRECTORY_ENTRY_SIZE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MsdHeader {
    pub timebase: u32,
    pub packet_count: u32,
}

/// One directory entry together with the payload bytes that follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet<'a> {
    pub this_id: u32,
    pub next_id: u32,
    pub payload: &'a [u8],
}

impl Packet<'_> {
    pub fn length(&self) -> u32 {
        self.payload.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsdFile<'a> {
    pub header: MsdHeader,
    pub packets: Vec<Packet<'a>>,
}

/// Rounds a byte count up to the next multiple of 4.
pub(crate) fn align4(length: usize) -> usize {
    (length + 3) & !3
}

/// Reads a little-endian `u32` from a slice already known to hold `at + 4` bytes.
fn le_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

impl<'a> MsdFile<'a> {
    pub fn parse(bytes: &'a [u8]) -> Result<Self> {
        if bytes.get(..MSD_MAGIC.len()) != Some(&MSD_MAGIC[..]) {
            return Err(FormatError::BadMagic(bytes.iter().take(4).copied().collect()));
        }
        if bytes.len() < HEADER_SIZE {
            return Err(FormatError::TruncatedHeader(bytes.len()));
        }
        // Bytes 8..16 are reserved.
        let header = MsdHeader {
            timebase: le_u32(bytes, 0x04),
            packet_count: le_u32(bytes, 0x10),
        };

        let mut offset = HEADER_SIZE;
        let capacity = (header.packet_count as usize).min(bytes.len() / DIRECTORY_ENTRY_SIZE);
        let mut packets = Vec::with_capacity(capacity);
        for index in 0..header.packet_count {
            let entry = bytes
                .get(offset..offset + DIRECTORY_ENTRY_SIZE)
                .ok_or(FormatError::TruncatedDirectory { index, offset })?;
            // Bytes 8..12 of an entry are unused.
            let this_id = le_u32(entry, 0);
            let next_id = le_u32(entry, 4);
            let length = le_u32(entry, 12);
            offset += DIRECTORY_ENTRY_SIZE;

            let payload = offset
                .checked_add(length as usize)
                .and_then(|end| bytes.get(offset..end))
                .ok_or(FormatError::TruncatedPayload {
                    index,
                    offset,
                    length,
                })?;
            trace!("Packet {index}: id {this_id} -> {next_id}, {length} bytes at {offset:#x}");
            packets.push(Packet {
                this_id,
                next_id,
                payload,
            });
            offset += align4(payload.len());
        }

        Ok(Self { header, packets })
    }
}

impl<'a> TryFrom<&'a [u8]> for MsdFile<'a> {
    type Error = FormatError;

    fn try_from(value: &'a [u8]) -> Result<Self> {
        Self::parse(value)
    }
}
