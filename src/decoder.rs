use crate::{
    events::{MidiEvent, TimedEvent},
    msd::align4,
};
use derive_more::{Display, From, Into};
use log::trace;

pub const RECORD_SIZE: usize = 12;

/// Message length per status nibble `0x8..=0xF`, indexed by `(status >> 4) & 7`.
pub const SHORT_MESSAGE_LENGTHS: [usize; 8] = [3, 3, 2, 3, 2, 2, 3, 0];

const CLASS_MASK: u8 = 0xBF;
const EXTENDED_BLOCK: u8 = 0x80;
const BLOCK_LENGTH_MASK: u32 = 0x00FF_FFFF;
const NOT_A_STATUS: u8 = 0xFF;

pub fn short_message_length(status: u8) -> usize {
    SHORT_MESSAGE_LENGTHS[usize::from((status >> 4) & 0x07)]
}

/// Ticks accumulated since the last emitted event.
///
/// Threaded through every decode call and across packet boundaries; taking
/// the value for an event leaves zero behind.
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, From, Into)]
pub struct DeltaTime(u32);

impl DeltaTime {
    pub const ZERO: Self = Self(0);

    pub fn ticks(self) -> u32 {
        self.0
    }

    #[must_use]
    pub fn advance(self, ticks: u32) -> Self {
        Self(self.0.saturating_add(ticks))
    }

    pub fn take(&mut self) -> u32 {
        std::mem::take(&mut self.0)
    }
}

/// How a 12-byte record is to be interpreted, decided once from its last four bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    ShortMessage { length: usize },
    Tempo([u8; 3]),
    SysEx { length: usize },
    SkipBlock { length: usize },
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRecord {
    pub dtime: u32,
    /// Bytes 8..12: status and data, or a block length plus type flags.
    pub body: [u8; 4],
}

impl RawRecord {
    pub fn new(bytes: &[u8; RECORD_SIZE]) -> Self {
        Self {
            dtime: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            body: [bytes[8], bytes[9], bytes[10], bytes[11]],
        }
    }

    pub fn param(&self) -> u32 {
        u32::from_le_bytes(self.body)
    }

    pub fn kind(&self) -> RecordKind {
        let [status, data1, data2, flags] = self.body;
        let block_length = (self.param() & BLOCK_LENGTH_MASK) as usize;
        match flags & CLASS_MASK {
            0x00 if status != NOT_A_STATUS => RecordKind::ShortMessage {
                length: short_message_length(status),
            },
            0x01 => RecordKind::Tempo([data2, data1, status]),
            EXTENDED_BLOCK => RecordKind::SysEx {
                length: block_length,
            },
            _ if flags & EXTENDED_BLOCK != 0 => RecordKind::SkipBlock {
                length: block_length,
            },
            _ => RecordKind::Ignored,
        }
    }
}

/// Walks one packet payload as a sequence of records, yielding the events it encodes.
///
/// A trailing partial record is dropped. Once exhausted, [`PacketDecoder::pending`]
/// holds the delta-time to carry into whatever comes next.
#[derive(Debug, Clone)]
pub struct PacketDecoder<'a> {
    payload: &'a [u8],
    offset: usize,
    delta: DeltaTime,
}

impl<'a> PacketDecoder<'a> {
    pub fn new(payload: &'a [u8], carry: DeltaTime) -> Self {
        Self {
            payload,
            offset: 0,
            delta: carry,
        }
    }

    pub fn pending(&self) -> DeltaTime {
        self.delta
    }

    fn next_record(&mut self) -> Option<&'a [u8; RECORD_SIZE]> {
        let payload = self.payload;
        let record = payload
            .get(self.offset..self.offset.checked_add(RECORD_SIZE)?)?
            .try_into()
            .ok()?;
        self.offset += RECORD_SIZE;
        Some(record)
    }

    fn skip(&mut self, length: usize) {
        self.offset = self.offset.saturating_add(align4(length));
    }
}

impl<'a> Iterator for PacketDecoder<'a> {
    type Item = TimedEvent<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(bytes) = self.next_record() {
            let record = RawRecord::new(bytes);
            self.delta = self.delta.advance(record.dtime);
            let event = match record.kind() {
                RecordKind::ShortMessage { length } => MidiEvent::ShortMessage(&bytes[8..8 + length]),
                RecordKind::Tempo(tempo) => MidiEvent::Tempo(tempo),
                RecordKind::SysEx { length } => {
                    let payload = self.payload;
                    let start = self.offset;
                    match start
                        .checked_add(length)
                        .and_then(|end| payload.get(start..end))
                    {
                        Some(data) => {
                            self.skip(length);
                            MidiEvent::SysEx(data)
                        }
                        None => {
                            trace!(
                                "SysEx of {length} bytes at {start:#x} exceeds payload of {}, dropped",
                                payload.len()
                            );
                            self.delta.take();
                            continue;
                        }
                    }
                }
                RecordKind::SkipBlock { length } => {
                    trace!("Skipping {length} byte block at {:#x}", self.offset);
                    self.skip(length);
                    continue;
                }
                RecordKind::Ignored => continue,
            };
            return Some(TimedEvent::new(self.delta.take(), event));
        }
        None
    }
}

/// Decodes a payload into its events and the delta-time left over after the last one.
pub fn decode_events(payload: &[u8], carry: DeltaTime) -> (Vec<TimedEvent<'_>>, DeltaTime) {
    let mut decoder = PacketDecoder::new(payload, carry);
    let events = decoder.by_ref().collect();
    (events, decoder.pending())
}

/// Like [`decode_events`], but returns the encoded track bytes.
pub fn decode_payload(payload: &[u8], carry: DeltaTime) -> (Vec<u8>, DeltaTime) {
    let mut decoder = PacketDecoder::new(payload, carry);
    let bytes = decoder.by_ref().flat_map(|event| event.encode()).collect();
    (bytes, decoder.pending())
}
