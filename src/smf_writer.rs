//! Builders for the byte fragments of a Standard MIDI File.

pub const META_MARKER: u8 = 0x06;
pub const META_END_OF_TRACK: u8 = 0x2F;
pub const META_TEMPO: u8 = 0x51;

const META_PREFIX: u8 = 0xFF;
const SYSEX_START: u8 = 0xF0;
const HEADER_TAG: &[u8; 4] = b"MThd";
const TRACK_TAG: &[u8; 4] = b"MTrk";

/// Frames `body` as `tag || u32_be(len(body)) || body`.
pub fn chunk(tag: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(8 + body.len());
    out.extend_from_slice(tag);
    out.extend_from_slice(&(body.len() as u32).to_be_bytes());
    out.extend_from_slice(body);
    out
}

/// Encodes a MIDI variable-length quantity, most significant group first.
///
/// `None` encodes to nothing at all. It is only meant as a data-length
/// placeholder and never as a delta-time.
pub fn vlq(value: Option<u32>) -> Vec<u8> {
    let Some(mut value) = value else {
        return Vec::new();
    };
    let mut out = vec![(value & 0x7F) as u8];
    value >>= 7;
    while value > 0 {
        out.push((value & 0x7F) as u8 | 0x80);
        value >>= 7;
    }
    out.reverse();
    out
}

pub fn meta_event(delta: u32, kind: u8, data: Option<&[u8]>) -> Vec<u8> {
    let data = data.unwrap_or_default();
    let mut out = vlq(Some(delta));
    out.push(META_PREFIX);
    out.push(kind);
    out.extend(vlq(Some(data.len() as u32)));
    out.extend_from_slice(data);
    out
}

/// Frames a SysEx block. A leading `F0` in `data` is dropped since the framing
/// supplies its own.
pub fn sysex(delta: u32, data: &[u8]) -> Vec<u8> {
    let data = data.strip_prefix(&[SYSEX_START]).unwrap_or(data);
    let mut out = vlq(Some(delta));
    out.push(SYSEX_START);
    out.extend(vlq(Some(data.len() as u32)));
    out.extend_from_slice(data);
    out
}

pub fn short_message(delta: u32, data: &[u8]) -> Vec<u8> {
    let mut out = vlq(Some(delta));
    out.extend_from_slice(data);
    out
}

/// A complete SMF: header chunk plus one `MTrk` chunk per encoded track body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmfFile {
    pub timebase: u16,
    pub tracks: Vec<Vec<u8>>,
}

impl SmfFile {
    pub fn single_track(timebase: u16, track: Vec<u8>) -> Self {
        Self {
            timebase,
            tracks: vec![track],
        }
    }

    pub fn format(&self) -> u16 {
        match self.tracks.len() {
            0 | 1 => 0,
            _ => 1,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut header = Vec::with_capacity(6);
        header.extend_from_slice(&self.format().to_be_bytes());
        header.extend_from_slice(&(self.tracks.len() as u16).to_be_bytes());
        header.extend_from_slice(&self.timebase.to_be_bytes());

        let mut out = chunk(HEADER_TAG, &header);
        for track in &self.tracks {
            out.extend(chunk(TRACK_TAG, track));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn decode_vlq(bytes: &[u8]) -> u32 {
        bytes
            .iter()
            .fold(0, |acc, byte| (acc << 7) | u32::from(byte & 0x7F))
    }

    #[rstest(
        value, expect,
        case(0, &[0x00]),
        case(0x40, &[0x40]),
        case(127, &[0x7F]),
        case(128, &[0x81, 0x00]),
        case(0x2000, &[0xC0, 0x00]),
        case(0x3FFF, &[0xFF, 0x7F]),
        case(0x4000, &[0x81, 0x80, 0x00]),
        case(0x0FFF_FFFF, &[0xFF, 0xFF, 0xFF, 0x7F]),
        case(u32::MAX, &[0x8F, 0xFF, 0xFF, 0xFF, 0x7F]),
    )]
    fn vlq_encodes_known_values(value: u32, expect: &[u8]) {
        assert_eq!(vlq(Some(value)), expect);
    }

    #[test]
    fn vlq_of_nothing_is_empty() {
        assert_eq!(vlq(None), Vec::<u8>::new());
    }

    #[test]
    fn vlq_decodes_back_across_group_boundaries() {
        let samples = (0..28)
            .flat_map(|shift| {
                let base = 1u32 << shift;
                [base - 1, base, base + 1]
            })
            .chain([0x0FFF_FFFF, 0x0ABC_DEF0, 480, 96_000]);
        for value in samples {
            let bytes = vlq(Some(value));
            let (last, leading) = bytes.split_last().unwrap();
            assert!(leading.iter().all(|byte| byte & 0x80 != 0), "{value:#x}");
            assert_eq!(last & 0x80, 0, "{value:#x}");
            assert_eq!(decode_vlq(&bytes), value);
        }
    }

    #[rstest(
        body,
        case(&[]),
        case(&[0x00, 0xFF, 0x2F, 0x00]),
        case(&[0x55; 300]),
    )]
    fn chunk_frames_with_big_endian_length(body: &[u8]) {
        let framed = chunk(b"MTrk", body);
        assert_eq!(framed.len(), 8 + body.len());
        assert_eq!(&framed[..4], b"MTrk");
        assert_eq!(&framed[4..8], &(body.len() as u32).to_be_bytes());
        assert_eq!(&framed[8..], body);
    }

    #[rstest(
        delta, kind, data, expect,
        case(0, META_END_OF_TRACK, None, vec![0x00, 0xFF, 0x2F, 0x00]),
        case(0x80, META_TEMPO, Some(&[0x07, 0xA1, 0x20][..]), vec![0x81, 0x00, 0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20]),
        case(5, META_MARKER, Some(&b"loopend"[..]), [&[0x05u8, 0xFF, 0x06, 0x07][..], &b"loopend"[..]].concat()),
    )]
    fn meta_event_frames_data(delta: u32, kind: u8, data: Option<&[u8]>, expect: Vec<u8>) {
        assert_eq!(meta_event(delta, kind, data), expect);
    }

    #[test]
    fn sysex_drops_leading_start_byte() {
        assert_eq!(sysex(0, &[0xF0, 0x01, 0x02]), sysex(0, &[0x01, 0x02]));
        assert_eq!(sysex(0, &[0x01, 0x02]), vec![0x00, 0xF0, 0x02, 0x01, 0x02]);
    }

    #[test]
    fn sysex_keeps_start_byte_found_later() {
        assert_eq!(
            sysex(3, &[0x41, 0xF0, 0xF7]),
            vec![0x03, 0xF0, 0x03, 0x41, 0xF0, 0xF7]
        );
    }

    #[test]
    fn sysex_of_empty_block() {
        assert_eq!(sysex(0, &[]), vec![0x00, 0xF0, 0x00]);
    }

    #[test]
    fn short_message_is_delta_then_data() {
        assert_eq!(short_message(200, &[0x90, 0x3C, 0x64]), vec![0x81, 0x48, 0x90, 0x3C, 0x64]);
        assert_eq!(short_message(0, &[]), vec![0x00]);
    }

    #[test]
    fn single_track_file_layout() {
        let smf = SmfFile::single_track(480, vec![0x00, 0xFF, 0x2F, 0x00]);
        assert_eq!(smf.format(), 0);
        assert_eq!(
            smf.to_bytes(),
            [
                &b"MThd"[..],
                &[0u8, 0, 0, 6, 0, 0, 0, 1, 0x01, 0xE0][..],
                &b"MTrk"[..],
                &[0u8, 0, 0, 4, 0x00, 0xFF, 0x2F, 0x00][..],
            ]
            .concat()
        );
    }

    #[test]
    fn several_tracks_use_format_one() {
        let smf = SmfFile {
            timebase: 96,
            tracks: vec![vec![], vec![]],
        };
        assert_eq!(smf.format(), 1);
        assert_eq!(&smf.to_bytes()[8..12], &[0u8, 1, 0, 2]);
    }
}
