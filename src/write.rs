use cookie_factory::bytes::*;
use cookie_factory::combinator::*;
use cookie_factory::multi::*;
use cookie_factory::sequence::tuple;
use cookie_factory::*;

use super::*;

use log::*;
use std::io;

/// Largest key count or begin index a header can carry. Legacy fields are `i32` on disk
/// but only their low 16 bits are read back.
const HEADER_MAX: usize = u16::MAX as usize;

fn header<W: io::Write>(format: TrackFormat, key_count: usize, begin: usize) -> impl SerializeFn<W> {
    let (legacy, has_slope, slope_flags) = match format {
        TrackFormat::Legacy {
            has_slope,
            slope_flags,
        } => (true, has_slope, slope_flags),
        TrackFormat::Unified { .. } => (false, false, 0),
    };
    tuple((
        cond(
            legacy,
            tuple((
                be_i32(key_count as i32),
                be_i32(begin as i32),
                cond(has_slope, be_i32(slope_flags as i32)),
            )),
        ),
        cond(
            !legacy,
            tuple((
                be_u16(key_count as u16),
                be_u16(begin as u16),
                be_u16(format.element_count()),
            )),
        ),
    ))
}

impl Track {
    /// Appends this track's samples to the shared float region and returns a serializer
    /// for its header, whose begin index points at the appended samples.
    ///
    /// The shared region is flushed separately, once every sibling track is appended.
    /// Fails without touching `floats` when the key count or begin index overflows the
    /// header.
    pub fn write<W: io::Write>(&self, floats: &mut Vec<f32>) -> Result<impl SerializeFn<W>, Error> {
        let begin = floats.len();
        let key_count = self.keys.len();
        for &(field, value) in &[("key count", key_count), ("begin index", begin)] {
            if value > HEADER_MAX {
                return Err(Error::HeaderOverflow { field, value });
            }
        }
        if key_count == 1 && self.format.bare_single() {
            floats.extend(self.keyframes().map(|kf| kf.value));
        } else {
            for kf in self.keyframes() {
                self.format.push_sample(kf, floats);
            }
        }
        trace!("{:?} track: {} key(s) from float #{}", self.ty, key_count, begin);
        Ok(header(self.format, key_count, begin))
    }
}

/// Serializes the shared float region, with the leading float count camera files carry.
pub fn write_float_data<'a, W: io::Write + 'a>(floats: &'a [f32], ty: TrackType) -> impl SerializeFn<W> + 'a {
    tuple((
        cond(ty.data_skip() == 4, be_u32(floats.len() as u32)),
        all(floats.iter().map(|f| be_f32(*f))),
    ))
}

/// Encodes sibling track headers in the given order, returning the header bytes and the
/// float region they index into.
pub fn write_tracks<'a, I>(tracks: I) -> Result<(Vec<u8>, Vec<f32>), Error>
where
    I: IntoIterator<Item = &'a Track>,
{
    let mut floats = vec![];
    let mut headers = vec![];
    for track in tracks {
        headers = gen_simple(track.write(&mut floats)?, headers)?;
    }
    Ok((headers, floats))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn begin_index_is_buffer_length() {
        let mut first = Track::new(TrackType::Path);
        first.add_keyframe(0, 1., 0., 0.);
        first.add_keyframe(4, 2., 0., 0.);
        let mut second = Track::new(TrackType::Path);
        second.add_keyframe(8, 3., 0., 0.);
        second.add_keyframe(9, 4., 0., 0.);

        let (headers, floats) = write_tracks(&[first, second]).unwrap();
        assert_eq!(floats.len(), 16);
        assert_eq!(&headers[..6], &[0, 2, 0, 0, 0, 4]);
        assert_eq!(&headers[6..], &[0, 2, 0, 8, 0, 4]);
    }

    #[test]
    fn legacy_header_shape() {
        let mut track = Track::new(TrackType::Ckan);
        track.add_keyframe(2, 1., 0.5, 0.75);
        let mut floats = vec![9.];
        let out = gen_simple(track.write(&mut floats).unwrap(), Vec::<u8>::new()).unwrap();
        assert_eq!(out, [0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1]);
        assert_eq!(floats, [9., 2., 1., 0.5, 0.75]);
    }

    #[test]
    fn single_unified_key_writes_bare_value() {
        let mut track = Track::new(TrackType::Light);
        track.add_keyframe(0, 6., 1., 1.);
        let mut floats = vec![];
        gen_simple(track.write::<Vec<u8>>(&mut floats).unwrap(), Vec::new()).unwrap();
        assert_eq!(floats, [6.]);
    }

    #[test]
    fn float_region_prefix() {
        let floats = [1.0f32];
        let camera = gen_simple(write_float_data(&floats, TrackType::Canm), Vec::<u8>::new()).unwrap();
        assert_eq!(camera, [0, 0, 0, 1, 0x3F, 0x80, 0, 0]);
        let path = gen_simple(write_float_data(&floats, TrackType::Path), Vec::<u8>::new()).unwrap();
        assert_eq!(path, [0x3F, 0x80, 0, 0]);
    }

    fn dense_path_track(keys: u32, element_count: u16) -> Track {
        let mut track = Track::new(TrackType::Path);
        track.set_format(TrackFormat::Unified { element_count });
        for frame in 0..keys {
            track.add_keyframe(frame, frame as f32, 0., 0.);
        }
        track
    }

    #[test]
    fn begin_index_overflow_is_rejected() {
        // fills floats 0..=65535, so the next track would begin at 65536
        let full = dense_path_track(16384, 4);
        let mut next = Track::new(TrackType::Path);
        next.add_keyframe(1, 111., 0., 0.);
        next.add_keyframe(2, 222., 0., 0.);
        match write_tracks(&[full.clone(), next.clone()]) {
            Err(Error::HeaderOverflow { field, value }) => {
                assert_eq!(field, "begin index");
                assert_eq!(value, 65536);
            }
            other => panic!("unexpected {:?}", other.map(|(h, f)| (h.len(), f.len()))),
        }

        let mut floats = vec![0.; 65536];
        assert!(next.write::<Vec<u8>>(&mut floats).is_err());
        assert_eq!(floats.len(), 65536);

        let mut floats = vec![0.; 65535];
        assert!(next.write::<Vec<u8>>(&mut floats).is_ok());
    }

    #[test]
    fn key_count_overflow_is_rejected() {
        let track = dense_path_track(65536, 1);
        match write_tracks(&[track]) {
            Err(Error::HeaderOverflow { field, .. }) => assert_eq!(field, "key count"),
            other => panic!("unexpected {:?}", other.map(|(h, f)| (h.len(), f.len()))),
        }
        assert!(write_tracks(&[dense_path_track(65535, 1)]).is_ok());
    }
}
