use crate::smf_writer::{
    meta_event, short_message, sysex, META_END_OF_TRACK, META_MARKER, META_TEMPO,
};
use derive_more::Display;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum LoopTag {
    #[display(fmt = "loopstart")]
    Start,
    #[display(fmt = "loopend")]
    End,
}

impl LoopTag {
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            LoopTag::Start => b"loopstart",
            LoopTag::End => b"loopend",
        }
    }
}

/// An event as it will appear in the output track, borrowing from the MSD input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent<'a> {
    /// Raw status and data bytes, possibly empty.
    ShortMessage(&'a [u8]),
    /// Microseconds per quarter note, big-endian.
    Tempo([u8; 3]),
    SysEx(&'a [u8]),
    LoopMarker(LoopTag),
    EndOfTrack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedEvent<'a> {
    pub delta: u32,
    pub event: MidiEvent<'a>,
}

impl<'a> TimedEvent<'a> {
    pub fn new(delta: u32, event: MidiEvent<'a>) -> Self {
        Self { delta, event }
    }

    pub fn encode(&self) -> Vec<u8> {
        let delta = self.delta;
        match self.event {
            MidiEvent::ShortMessage(data) => short_message(delta, data),
            MidiEvent::Tempo(tempo) => meta_event(delta, META_TEMPO, Some(&tempo)),
            MidiEvent::SysEx(data) => sysex(delta, data),
            MidiEvent::LoopMarker(tag) => meta_event(delta, META_MARKER, Some(tag.as_bytes())),
            MidiEvent::EndOfTrack => meta_event(delta, META_END_OF_TRACK, None),
        }
    }
}
