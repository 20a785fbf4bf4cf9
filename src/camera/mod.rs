//! Camera animation documents (`.canm`).
//!
//! ```text
//! 0x00  magic            4 bytes, normally "ANDO"
//! 0x04  type             "CANM" or "CKAN"
//! 0x08  reserved         16 bytes, kept verbatim
//! 0x18  end frame        i32
//! 0x1C  header size      u32, bytes of track headers that follow
//! 0x20  track headers    one per TRACK_ORDER entry
//! ....  float region     u32 float count, then the floats
//! ```

use cgmath::Vector3;
use log::*;
use nom::bytes::complete::take;
use nom::error::ErrorKind;
use nom::number::complete::*;
use nom::IResult;

use crate::read::{read_at, read_tracks};
use crate::{Error, Track, TrackType};

mod write;

pub const HEADER_SIZE: usize = 0x20;

/// Tracks of a camera animation, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackName {
    PositionX,
    PositionY,
    PositionZ,
    TargetX,
    TargetY,
    TargetZ,
    Twist,
    FovY,
}

/// Interpolated camera state at one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub eye: Vector3<f32>,
    pub target: Vector3<f32>,
    pub twist: f32,
    pub fov_y: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CameraAnimation {
    /// `TrackType::Ckan` or `TrackType::Canm`
    pub kind: TrackType,
    pub magic: [u8; 4],
    pub reserved: [u8; 16],
    pub end_frame: i32,
    tracks: [Track; 8],
}

fn empty_tracks(kind: TrackType) -> [Track; 8] {
    let t = || Track::new(kind);
    [t(), t(), t(), t(), t(), t(), t(), t()]
}

impl CameraAnimation {
    /// Order of the track headers, used for both loading and saving.
    pub const TRACK_ORDER: [TrackName; 8] = [
        TrackName::PositionX,
        TrackName::PositionY,
        TrackName::PositionZ,
        TrackName::TargetX,
        TrackName::TargetY,
        TrackName::TargetZ,
        TrackName::Twist,
        TrackName::FovY,
    ];

    pub fn new(kind: TrackType) -> Self {
        Self {
            kind,
            magic: *b"ANDO",
            reserved: [0; 16],
            end_frame: 0,
            tracks: empty_tracks(kind),
        }
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, Error> {
        let (_, anim) = Self::parse(data)?;
        Ok(anim)
    }

    pub fn parse(i0: &[u8]) -> IResult<&[u8], Self> {
        let (i, magic) = take(4usize)(i0)?;
        let (i, tag) = take(4usize)(i)?;
        let kind = match tag {
            b"CANM" => TrackType::Canm,
            b"CKAN" => TrackType::Ckan,
            _ => return Err(nom::Err::Error((tag, ErrorKind::Tag))),
        };
        let (i, reserved) = take(16usize)(i)?;
        let (i, end_frame) = be_i32(i)?;
        let (i, header_size) = be_u32(i)?;
        let data_offset = HEADER_SIZE + header_size as usize;
        let (i, float_count) = read_at(i0, data_offset, be_u32)(i)?;
        debug!(
            "{:?} camera: end frame {}, float region at {:#x} with {} float(s)",
            kind, end_frame, data_offset, float_count
        );

        // tracks may only index floats the region declares
        let declared_end = (float_count as usize)
            .checked_mul(4)
            .and_then(|n| n.checked_add(data_offset + kind.data_skip()))
            .unwrap_or(usize::MAX);
        if declared_end > i0.len() {
            warn!(
                "float region declares {} float(s) but the file ends at {:#x}",
                float_count,
                i0.len()
            );
        }
        let region = &i0[..declared_end.min(i0.len())];
        let (i, tracks) = read_tracks(region, data_offset, Self::TRACK_ORDER.len(), kind)(i)?;
        let mut anim = Self::new(kind);
        anim.magic.copy_from_slice(magic);
        anim.reserved.copy_from_slice(reserved);
        anim.end_frame = end_frame;
        for (slot, track) in anim.tracks.iter_mut().zip(tracks) {
            *slot = track;
        }
        Ok((i, anim))
    }

    pub fn track(&self, name: TrackName) -> &Track {
        &self.tracks[name as usize]
    }

    pub fn track_mut(&mut self, name: TrackName) -> &mut Track {
        &mut self.tracks[name as usize]
    }

    pub fn tracks(&self) -> impl Iterator<Item = (TrackName, &Track)> + '_ {
        Self::TRACK_ORDER.iter().copied().zip(self.tracks.iter())
    }

    pub fn clear(&mut self) {
        for track in self.tracks.iter_mut() {
            track.clear();
        }
    }

    pub fn sample(&self, frame: f32, hermite: bool) -> CameraPose {
        use TrackName::*;
        let at = |name| self.track(name).evaluate(frame, hermite);
        CameraPose {
            eye: Vector3::new(at(PositionX), at(PositionY), at(PositionZ)),
            target: Vector3::new(at(TargetX), at(TargetY), at(TargetZ)),
            twist: at(Twist),
            fov_y: at(FovY),
        }
    }

    /// Records `pose` as a keyframe on every track, overwriting values already keyed at `frame`.
    pub fn key_pose(&mut self, frame: u32, pose: &CameraPose) {
        use TrackName::*;
        let values = [
            (PositionX, pose.eye.x),
            (PositionY, pose.eye.y),
            (PositionZ, pose.eye.z),
            (TargetX, pose.target.x),
            (TargetY, pose.target.y),
            (TargetZ, pose.target.z),
            (Twist, pose.twist),
            (FovY, pose.fov_y),
        ];
        for (name, value) in values.iter() {
            self.track_mut(*name).set_keyframe(frame, *value);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::TrackFormat;

    const EPSILON: f32 = 1e-5;

    fn position_document() -> CameraAnimation {
        let mut anim = CameraAnimation::new(TrackType::Ckan);
        anim.end_frame = 10;
        let keys = [(0u32, 0.5f32), (5, 0.), (10, -0.5)];
        for (axis, name) in [TrackName::PositionX, TrackName::PositionY, TrackName::PositionZ]
            .iter()
            .enumerate()
        {
            let track = anim.track_mut(*name);
            for (frame, slope) in keys.iter() {
                let value = (axis as f32 + 1.) * *frame as f32;
                track.add_keyframe(*frame, value, *slope, -*slope);
            }
        }
        anim
    }

    #[test]
    fn position_tracks_round_trip() {
        let anim = position_document();
        let bytes = anim.to_bytes().unwrap();
        let decoded = CameraAnimation::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, anim);
        assert_eq!(
            decoded.track(TrackName::PositionY).format(),
            TrackFormat::Legacy {
                has_slope: true,
                slope_flags: 1
            }
        );

        for name in &[TrackName::PositionX, TrackName::PositionY, TrackName::PositionZ] {
            let track = decoded.track(*name);
            let scale = (*name as usize + 1) as f32;
            for frame in &[0., 5., 10.] {
                assert_eq!(track.evaluate(*frame, true), scale * frame);
                assert_eq!(track.evaluate(*frame, false), scale * frame);
            }
            assert!((track.evaluate(7., false) - scale * 7.).abs() < EPSILON);
            let smooth = crate::hermite(scale * 5., scale * 10., 0., -0.5, 0.4);
            assert!((track.evaluate(7., true) - smooth).abs() < EPSILON);
        }

        let pose = decoded.sample(7., false);
        assert!((pose.eye.z - 21.).abs() < EPSILON);
        assert_eq!(pose.target, Vector3::new(0., 0., 0.));
    }

    #[test]
    fn header_layout() {
        let bytes = position_document().to_bytes().unwrap();
        assert_eq!(&bytes[..8], b"ANDOCKAN");
        assert_eq!(&bytes[0x18..0x1C], &[0, 0, 0, 10]);
        // eight legacy headers of three i32 fields
        assert_eq!(&bytes[0x1C..0x20], &[0, 0, 0, 96]);
        assert_eq!(&bytes[0x80..0x84], &[0, 0, 0, 36]);
        assert_eq!(bytes.len(), 0x84 + 36 * 4);
    }

    #[test]
    fn canm_round_trip() {
        let mut anim = CameraAnimation::new(TrackType::Canm);
        anim.reserved[3] = 0x7F;
        anim.track_mut(TrackName::FovY).add_keyframe(0, 45., 0., 0.);
        anim.track_mut(TrackName::FovY).add_keyframe(30, 60., 0., 0.);
        anim.track_mut(TrackName::Twist).add_keyframe(12, 0.25, 0., 0.);
        let decoded = CameraAnimation::from_bytes(&anim.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, anim);
        assert_eq!(decoded.sample(15., true).fov_y, 52.5);
    }

    #[test]
    fn unknown_type_is_rejected() {
        let mut bytes = CameraAnimation::new(TrackType::Canm).to_bytes().unwrap();
        bytes[4..8].copy_from_slice(b"CXYZ");
        match CameraAnimation::from_bytes(&bytes) {
            Err(Error::Parse(ErrorKind::Tag)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn truncated_float_region_is_rejected() {
        let bytes = position_document().to_bytes().unwrap();
        assert!(CameraAnimation::from_bytes(&bytes[..bytes.len() - 4]).is_err());
        assert!(CameraAnimation::from_bytes(&bytes[..0x10]).is_err());
    }

    #[test]
    fn tracks_past_the_float_count_are_rejected() {
        let mut bytes = position_document().to_bytes().unwrap();
        bytes[0x80..0x84].copy_from_slice(&35u32.to_be_bytes());
        match CameraAnimation::from_bytes(&bytes) {
            Err(Error::Parse(ErrorKind::Eof)) => {}
            other => panic!("unexpected {:?}", other),
        }

        // a count larger than the file only limits what the buffer holds
        bytes[0x80..0x84].copy_from_slice(&40u32.to_be_bytes());
        assert_eq!(CameraAnimation::from_bytes(&bytes).unwrap(), position_document());
    }

    #[test]
    fn key_pose_upserts_all_tracks() {
        let mut anim = CameraAnimation::new(TrackType::Ckan);
        let pose = CameraPose {
            eye: Vector3::new(1., 2., 3.),
            target: Vector3::new(4., 5., 6.),
            twist: 0.5,
            fov_y: 45.,
        };
        anim.key_pose(0, &pose);
        anim.key_pose(0, &CameraPose { twist: 1., ..pose });
        anim.key_pose(20, &pose);
        assert!(anim.tracks().all(|(_, t)| t.keys() == [0, 20]));
        assert_eq!(anim.track(TrackName::Twist).keyframe(0).map(|k| k.value), Some(1.));
        assert_eq!(anim.sample(20., false), pose);

        anim.clear();
        assert!(anim.tracks().all(|(_, t)| t.is_empty()));
    }
}
