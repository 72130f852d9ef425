//! Human-readable listing of a produced SMF, read back through `midly`.

use anyhow::{anyhow, Result};
use midly::{
    MetaMessage::{Marker, Tempo},
    MidiMessage::{NoteOff, NoteOn},
    Smf, TrackEvent,
    TrackEventKind::{Meta, Midi, SysEx},
};

fn describe_event(event: &TrackEvent) -> String {
    match event.kind {
        Midi { channel, message } => {
            let msg = match message {
                NoteOn { key, vel } => format!("NoteOn key={} vel={}", key.as_int(), vel.as_int()),
                NoteOff { key, vel } => format!("NoteOff key={} vel={}", key.as_int(), vel.as_int()),
                _ => format!("{message:?}"),
            };
            format!("ch{:<2} {msg}", channel.as_int())
        }
        SysEx(data) => format!("SysEx({data:02X?})"),
        Meta(Marker(text)) => format!("Marker('{}')", String::from_utf8_lossy(text)),
        Meta(Tempo(tempo)) => format!("Tempo({} us/qn)", tempo.as_int()),
        Meta(message) => format!("{message:?}"),
        kind => format!("{kind:?}"),
    }
}

/// One line for the header, then one per track and per event with its delta and absolute tick.
pub fn describe(smf_bytes: &[u8]) -> Result<Vec<String>> {
    let smf = Smf::parse(smf_bytes).map_err(|e| anyhow!("Failed to parse SMF: {e}"))?;
    let mut lines = vec![
        format!("format: {:?}", smf.header.format),
        format!("timing: {:?}", smf.header.timing),
    ];
    for (index, track) in smf.tracks.iter().enumerate() {
        lines.push(format!("track {index}"));
        let mut ticks = 0u64;
        for event in track {
            let delta = event.delta.as_int();
            ticks += u64::from(delta);
            lines.push(format!(
                "{:>8} {ticks:>8} {}",
                format!("+{delta}"),
                describe_event(event)
            ));
        }
    }
    Ok(lines)
}
