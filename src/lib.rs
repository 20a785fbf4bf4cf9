//! Camera/path animation tracks and placement tables for a GameCube-era asset pipeline.
//!
//! Tracks are decoded with `nom` and re-encoded with `cookie-factory`, always big-endian.

pub mod camera;
mod error;
mod interp;
pub mod jmp;
pub mod placement;
pub mod read;
mod write;

pub use error::Error;
pub use interp::{hermite, mix};
pub use read::read_tracks;
pub use write::{write_float_data, write_tracks};

use log::*;
use std::collections::HashMap;

/// Format family tag of a track, taken from the document that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackType {
    /// Legacy camera animation with a slope flag per track
    Ckan,
    /// Legacy camera animation, frame/value pairs only
    Canm,
    Path,
    Light,
    Animation,
}

/// Header shape shared by a group of track types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// `keyCount`, `beginIndex` and optionally `slopeFlags`, each stored as an `i32`
    Legacy { has_slope: bool },
    /// `keyCount`, `beginIndex`, `elementCount`, each stored as a `u16`
    Unified,
}

/// What a track with exactly one keyframe evaluates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SingleKey {
    /// The keyframe value at every frame
    Hold,
    /// Interpolate from an implicit `(0, 0, slope 1)` origin up to the keyframe
    RampFromOrigin,
}

impl TrackType {
    pub fn format_family(self) -> Family {
        use TrackType::*;
        match self {
            Ckan => Family::Legacy { has_slope: true },
            Canm => Family::Legacy { has_slope: false },
            Path | Light | Animation => Family::Unified,
        }
    }

    /// Bytes between the start of the shared float region and its first float.
    pub fn data_skip(self) -> usize {
        match self {
            TrackType::Ckan | TrackType::Canm => 4,
            _ => 0,
        }
    }

    pub fn single_key(self) -> SingleKey {
        match self.format_family() {
            Family::Legacy { .. } => SingleKey::RampFromOrigin,
            Family::Unified => SingleKey::Hold,
        }
    }

    /// Layout used for tracks created from scratch.
    pub fn default_format(self) -> TrackFormat {
        match self.format_family() {
            Family::Legacy { has_slope } => TrackFormat::Legacy {
                has_slope,
                slope_flags: has_slope as u16,
            },
            Family::Unified => TrackFormat::Unified { element_count: 4 },
        }
    }
}

/// On-disk sample layout of one decoded track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackFormat {
    Legacy { has_slope: bool, slope_flags: u16 },
    Unified { element_count: u16 },
}

impl TrackFormat {
    /// Floats stored per keyframe: 1 value, 2 frame+value, 3 one slope, 4 in/out slopes.
    pub fn element_count(self) -> u16 {
        match self {
            TrackFormat::Legacy { has_slope: false, .. } => 2,
            TrackFormat::Legacy { slope_flags: 0, .. } => 3,
            TrackFormat::Legacy { .. } => 4,
            TrackFormat::Unified { element_count } => element_count,
        }
    }

    pub fn symmetric_slope(self) -> bool {
        self.element_count() == 3
    }

    pub fn fits(self, ty: TrackType) -> bool {
        match (self, ty.format_family()) {
            (TrackFormat::Legacy { has_slope, .. }, Family::Legacy { has_slope: h }) => has_slope == h,
            (TrackFormat::Unified { element_count }, Family::Unified) => {
                (1..=4).contains(&element_count)
            }
            _ => false,
        }
    }

    /// Unified layouts drop the frame (and slopes) of a lone keyframe.
    pub(crate) fn bare_single(self) -> bool {
        match self {
            TrackFormat::Unified { .. } => true,
            TrackFormat::Legacy { .. } => false,
        }
    }

    pub(crate) fn stored_floats(self, key_count: usize) -> usize {
        if key_count == 1 && self.bare_single() {
            1
        } else {
            key_count * self.element_count() as usize
        }
    }

    pub(crate) fn keyframe(self, index: usize, sample: &[f32]) -> Keyframe {
        match sample {
            [value] => Keyframe {
                frame: index as f32,
                value: *value,
                ..Default::default()
            },
            [frame, value] => Keyframe {
                frame: *frame,
                value: *value,
                ..Default::default()
            },
            [frame, value, slope] => Keyframe {
                frame: *frame,
                value: *value,
                in_slope: *slope,
                out_slope: *slope,
            },
            [frame, value, in_slope, out_slope, ..] => Keyframe {
                frame: *frame,
                value: *value,
                in_slope: *in_slope,
                out_slope: *out_slope,
            },
            [] => Keyframe::default(),
        }
    }

    pub(crate) fn push_sample(self, kf: &Keyframe, out: &mut Vec<f32>) {
        match self.element_count() {
            1 => out.push(kf.value),
            2 => out.extend_from_slice(&[kf.frame, kf.value]),
            3 => out.extend_from_slice(&[kf.frame, kf.value, kf.in_slope]),
            _ => out.extend_from_slice(&[kf.frame, kf.value, kf.in_slope, kf.out_slope]),
        }
    }
}

#[derive(Debug, Default, PartialEq, PartialOrd, Clone, Copy)]
pub struct Keyframe {
    pub frame: f32,
    pub value: f32,
    pub in_slope: f32,
    pub out_slope: f32,
}

/// One animation curve.
///
/// `keys` is the sorted, duplicate-free list of frame numbers and always holds exactly
/// the keys of `frames`; every mutation goes through methods that keep both in step.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    ty: TrackType,
    format: TrackFormat,
    keys: Vec<u32>,
    frames: HashMap<u32, Keyframe>,
}

fn frame_key(frame: f32) -> u32 {
    frame as u32
}

impl Track {
    pub fn new(ty: TrackType) -> Self {
        Self {
            ty,
            format: ty.default_format(),
            keys: vec![],
            frames: HashMap::new(),
        }
    }

    pub(crate) fn from_keyframes(ty: TrackType, format: TrackFormat, keyframes: Vec<Keyframe>) -> Self {
        let mut frames = HashMap::with_capacity(keyframes.len());
        for kf in keyframes {
            let key = frame_key(kf.frame);
            if frames.contains_key(&key) {
                warn!("duplicate keyframe at frame {}, keeping the first", key);
                continue;
            }
            frames.insert(key, kf);
        }
        let mut keys: Vec<u32> = frames.keys().copied().collect();
        keys.sort_unstable();
        Self {
            ty,
            format,
            keys,
            frames,
        }
    }

    pub fn track_type(&self) -> TrackType {
        self.ty
    }

    pub fn format(&self) -> TrackFormat {
        self.format
    }

    /// Switches the sample layout; refused when it does not belong to this track's type.
    pub fn set_format(&mut self, format: TrackFormat) -> bool {
        if !format.fits(self.ty) {
            return false;
        }
        self.format = format;
        true
    }

    pub fn element_count(&self) -> u16 {
        self.format.element_count()
    }

    pub fn symmetric_slope(&self) -> bool {
        self.format.symmetric_slope()
    }

    pub fn keys(&self) -> &[u32] {
        &self.keys
    }

    /// Keyframes in ascending frame order.
    pub fn keyframes(&self) -> impl Iterator<Item = &Keyframe> + '_ {
        self.keys.iter().filter_map(move |k| self.frames.get(k))
    }

    pub fn keyframe(&self, frame: u32) -> Option<&Keyframe> {
        self.frames.get(&frame)
    }

    pub fn keyframe_mut(&mut self, frame: u32) -> Option<&mut Keyframe> {
        self.frames.get_mut(&frame)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Inserts a keyframe; does nothing when `frame` already has one.
    pub fn add_keyframe(&mut self, frame: u32, value: f32, in_slope: f32, out_slope: f32) {
        let pos = match self.keys.binary_search(&frame) {
            Ok(_) => return,
            Err(pos) => pos,
        };
        self.keys.insert(pos, frame);
        self.frames.insert(
            frame,
            Keyframe {
                frame: frame as f32,
                value,
                in_slope,
                out_slope,
            },
        );
    }

    pub fn delete_keyframe(&mut self, frame: u32) {
        if let Ok(pos) = self.keys.binary_search(&frame) {
            self.keys.remove(pos);
            self.frames.remove(&frame);
        }
    }

    /// Overwrites the value at `frame`, adding a flat keyframe if there is none yet.
    pub fn set_keyframe(&mut self, frame: u32, value: f32) {
        match self.frames.get_mut(&frame) {
            Some(kf) => kf.value = value,
            None => self.add_keyframe(frame, value, 0., 0.),
        }
    }

    pub fn clear(&mut self) {
        self.keys.clear();
        self.frames.clear();
    }
}
