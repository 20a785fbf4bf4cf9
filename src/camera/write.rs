use cookie_factory::bytes::*;
use cookie_factory::combinator::*;
use cookie_factory::sequence::tuple;
use cookie_factory::*;

use super::CameraAnimation;
use crate::{write_float_data, write_tracks, Error, TrackType};

use log::*;
use std::io;

impl CameraAnimation {
    fn type_tag(&self) -> Result<&'static [u8; 4], Error> {
        match self.kind {
            TrackType::Ckan => Ok(b"CKAN"),
            TrackType::Canm => Ok(b"CANM"),
            kind => Err(Error::NotCamera(kind)),
        }
    }

    /// Serializes the whole document into `writer`, returning it back.
    ///
    /// Every track must be of the document's camera type with a layout that fits it.
    pub fn write<W: io::Write>(&self, writer: W) -> Result<W, Error> {
        let tag = self.type_tag()?;
        for track in self.tracks.iter() {
            if track.track_type() != self.kind || !track.format().fits(self.kind) {
                return Err(Error::TrackMismatch {
                    kind: self.kind,
                    ty: track.track_type(),
                    format: track.format(),
                });
            }
        }
        let (headers, floats) = write_tracks(self.tracks.iter())?;
        trace!(
            "writing {} byte(s) of track headers and {} float(s)",
            headers.len(),
            floats.len()
        );
        let writer = gen_simple(
            tuple((
                slice(self.magic),
                slice(tag),
                slice(self.reserved),
                be_i32(self.end_frame),
                be_u32(headers.len() as u32),
                slice(&headers),
                write_float_data(&floats, self.kind),
            )),
            writer,
        )?;
        Ok(writer)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        self.write(Vec::new())
    }
}
