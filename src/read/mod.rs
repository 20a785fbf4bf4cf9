use log::*;
use nom::combinator::verify;
use nom::multi::count;
use nom::number::complete::*;
use nom::IResult;

use super::*;

mod utilities;
pub(crate) use utilities::*;

/// Decoded per-track header: key count, begin index into the float region, layout.
#[derive(Debug, PartialEq, Clone, Copy)]
struct Header {
    key_count: usize,
    begin: usize,
    format: TrackFormat,
}

impl Header {
    fn parse(ty: TrackType) -> impl Fn(&[u8]) -> IResult<&[u8], Self> {
        move |i: &[u8]| match ty.format_family() {
            Family::Legacy { has_slope } => {
                let (i, key_count) = be_i32(i)?;
                let (i, begin) = be_i32(i)?;
                let (i, slope_flags) = if has_slope { be_i32(i)? } else { (i, 0) };
                let header = Header {
                    key_count: key_count as u16 as usize,
                    begin: begin as u16 as usize,
                    format: TrackFormat::Legacy {
                        has_slope,
                        slope_flags: slope_flags as u16,
                    },
                };
                Ok((i, header))
            }
            Family::Unified => {
                let (i, key_count) = be_u16(i)?;
                let (i, begin) = be_u16(i)?;
                let (i, element_count) = verify(be_u16, |n: &u16| (1..=4).contains(n))(i)?;
                let header = Header {
                    key_count: key_count as usize,
                    begin: begin as usize,
                    format: TrackFormat::Unified { element_count },
                };
                Ok((i, header))
            }
        }
    }
}

fn parse_samples(header: Header) -> impl Fn(&[u8]) -> IResult<&[u8], Vec<Keyframe>> {
    move |i: &[u8]| {
        let Header {
            key_count, format, ..
        } = header;
        if key_count == 1 && format.bare_single() {
            let (i, value) = be_f32(i)?;
            let keyframe = Keyframe {
                value,
                ..Default::default()
            };
            return Ok((i, vec![keyframe]));
        }
        let width = format.element_count() as usize;
        let (i, floats) = count(be_f32, key_count * width)(i)?;
        let keyframes = floats
            .chunks(width)
            .enumerate()
            .map(|(idx, sample)| format.keyframe(idx, sample))
            .collect();
        Ok((i, keyframes))
    }
}

impl Track {
    /// Parses one track header at the input position and its samples from the shared
    /// float region of `i0`, which starts at the absolute `data_offset`.
    ///
    /// The remaining input is the position right after the header, so sibling tracks can
    /// be parsed back to back. Sample data running past the end of `i0` fails with
    /// `ErrorKind::Eof` instead of being read partially.
    pub fn parse<'a>(
        i0: &'a [u8],
        data_offset: usize,
        ty: TrackType,
    ) -> impl Fn(&'a [u8]) -> IResult<&'a [u8], Track> {
        move |i: &'a [u8]| {
            let (i, header) = Header::parse(ty)(i)?;
            let start = data_offset + ty.data_skip() + 4 * header.begin;
            let len = 4 * header.format.stored_floats(header.key_count);
            let data = slice_at(i0, start, len)?;
            let (_, keyframes) = parse_samples(header)(data)?;
            trace!(
                "{:?} track: {} key(s) at float #{}, {:?}",
                ty,
                header.key_count,
                header.begin,
                header.format
            );
            Ok((i, Track::from_keyframes(ty, header.format, keyframes)))
        }
    }
}

/// Parses `n` sibling tracks that share one float region.
pub fn read_tracks<'a>(
    i0: &'a [u8],
    data_offset: usize,
    n: usize,
    ty: TrackType,
) -> impl Fn(&'a [u8]) -> IResult<&'a [u8], Vec<Track>> {
    move |i: &'a [u8]| count(Track::parse(i0, data_offset, ty), n)(i)
}
