use crate::{
    config::ConversionOptions,
    decoder::{decode_payload, DeltaTime},
    errors::{FormatError, Result},
    events::{MidiEvent, TimedEvent},
    msd::{MsdFile, Packet},
    smf_writer::SmfFile,
};
use log::debug;

/// Largest SMF division with ticks per quarter note semantics; bit 15 selects SMPTE timing.
const MAX_METRICAL_TIMEBASE: u32 = 0x7FFF;

/// Builds the single track body for a packet list.
///
/// Every packet whose id equals the last packet's `next_id` starts a loop, so
/// a malformed chain may produce more than one loop start.
pub fn assemble_track(packets: &[Packet], options: &ConversionOptions) -> Vec<u8> {
    let loop_style = options.loop_style;
    let loop_target = packets.last().map(|packet| packet.next_id);
    let mut track = vec![];
    let mut delta = DeltaTime::ZERO;
    let mut looped = false;

    for (index, packet) in packets.iter().enumerate() {
        if Some(packet.this_id) == loop_target {
            debug!("Loop starts at packet {index} (id {})", packet.this_id);
            track.extend(TimedEvent::new(delta.take(), loop_style.start_event()).encode());
            looped = true;
        }
        if packet.is_empty() {
            continue;
        }
        let (events, pending) = decode_payload(packet.payload, delta);
        track.extend(events);
        delta = pending;
    }

    if looped {
        if let Some(event) = loop_style.end_event() {
            track.extend(TimedEvent::new(delta.take(), event).encode());
        }
    }
    track.extend(TimedEvent::new(delta.take(), MidiEvent::EndOfTrack).encode());
    track
}

impl SmfFile {
    pub fn from_msd(msd: &MsdFile, options: &ConversionOptions) -> Result<Self> {
        let timebase = msd.header.timebase;
        let division = u16::try_from(timebase)
            .ok()
            .filter(|&division| u32::from(division) <= MAX_METRICAL_TIMEBASE)
            .ok_or(FormatError::TimebaseOutOfRange(timebase))?;
        debug!(
            "Converting {} packets at timebase {division}",
            msd.packets.len()
        );
        Ok(Self::single_track(
            division,
            assemble_track(&msd.packets, options),
        ))
    }
}

impl TryFrom<&MsdFile<'_>> for SmfFile {
    type Error = FormatError;

    fn try_from(value: &MsdFile<'_>) -> Result<Self> {
        Self::from_msd(value, &ConversionOptions::default())
    }
}

/// Converts the bytes of one MSD file into the bytes of a Standard MIDI File.
pub fn convert(msd_bytes: &[u8]) -> Result<Vec<u8>> {
    convert_with(msd_bytes, &ConversionOptions::default())
}

pub fn convert_with(msd_bytes: &[u8], options: &ConversionOptions) -> Result<Vec<u8>> {
    let msd = MsdFile::parse(msd_bytes)?;
    Ok(SmfFile::from_msd(&msd, options)?.to_bytes())
}
