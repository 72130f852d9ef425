use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("Invalid MSD magic {0:02X?}, expected \"WMSD\"")]
    BadMagic(Vec<u8>),
    #[error("MSD header is truncated to {0} bytes, expected at least 20")]
    TruncatedHeader(usize),
    #[error("Directory entry {index} at offset {offset:#x} runs past the end of input")]
    TruncatedDirectory { index: u32, offset: usize },
    #[error("Payload of packet {index} ({length} bytes at offset {offset:#x}) runs past the end of input")]
    TruncatedPayload { index: u32, offset: usize, length: u32 },
    #[error("Timebase {0} is not a valid SMF division, expected 0..=32767")]
    TimebaseOutOfRange(u32),
}

pub type Result<T> = std::result::Result<T, FormatError>;
