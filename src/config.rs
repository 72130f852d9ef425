use crate::events::{LoopTag, MidiEvent};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Controller 111 on channel 0, value 0.
static LOOP_START_CONTROL_CHANGE: [u8; 3] = [0xB0, 0x6F, 0x00];

/// How loop points found in the packet chain are written to the track.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LoopStyle {
    /// `loopstart` / `loopend` marker meta events.
    #[default]
    Marker,
    /// A CC#111 event at the loop start, as RPG Maker expects. Nothing marks the end.
    #[value(name = "cc111")]
    ControlChange111,
}

impl LoopStyle {
    pub fn start_event(self) -> MidiEvent<'static> {
        match self {
            LoopStyle::Marker => MidiEvent::LoopMarker(LoopTag::Start),
            LoopStyle::ControlChange111 => MidiEvent::ShortMessage(&LOOP_START_CONTROL_CHANGE),
        }
    }

    pub fn end_event(self) -> Option<MidiEvent<'static>> {
        match self {
            LoopStyle::Marker => Some(MidiEvent::LoopMarker(LoopTag::End)),
            LoopStyle::ControlChange111 => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionOptions {
    pub loop_style: LoopStyle,
}

#[derive(Parser, Debug)]
#[command(
    name = "msd2smf",
    about = "Convert MSD sequence files to Standard MIDI Files"
)]
pub struct Args {
    /// An .msd file, or a directory whose .msd files are all converted.
    pub input: PathBuf,

    /// Directory for the .mid files. Defaults to next to each input file.
    #[arg(short, long = "output-dir")]
    pub output_dir: Option<PathBuf>,

    /// How loop points are written.
    #[arg(short, long, value_enum, default_value_t = LoopStyle::Marker)]
    pub loop_style: LoopStyle,

    /// Log every event of each converted file.
    #[arg(short, long, default_value_t = false)]
    pub dump: bool,

    /// Prints extra information to the terminal.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn options(&self) -> ConversionOptions {
        ConversionOptions {
            loop_style: self.loop_style,
        }
    }
}
