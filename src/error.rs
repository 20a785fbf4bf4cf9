use cookie_factory::GenError;
use nom::error::ErrorKind;
use thiserror::Error;

use crate::{TrackFormat, TrackType};

#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed data ({0:?})")]
    Parse(ErrorKind),
    #[error("unexpected end of data")]
    Incomplete,
    #[error("table entry size is zero")]
    ZeroEntrySize,
    #[error("negative count in table header: {0}")]
    NegativeCount(i32),
    #[error("table records end at {end:#x} but the buffer is only {len:#x} bytes")]
    TableOutOfBounds { end: u64, len: usize },
    #[error("{field} {value} does not fit a track header")]
    HeaderOverflow { field: &'static str, value: usize },
    #[error("{0:?} is not a camera track type")]
    NotCamera(TrackType),
    #[error("{ty:?} track with {format:?} layout does not belong in a {kind:?} document")]
    TrackMismatch {
        kind: TrackType,
        ty: TrackType,
        format: TrackFormat,
    },
    #[error("failed to serialize: {0:?}")]
    Serialize(GenError),
    #[error("malformed table template")]
    Template(#[from] serde_json::Error),
}

impl<'a> From<nom::Err<(&'a [u8], ErrorKind)>> for Error {
    fn from(err: nom::Err<(&'a [u8], ErrorKind)>) -> Self {
        match err {
            nom::Err::Error((_, kind)) | nom::Err::Failure((_, kind)) => Error::Parse(kind),
            nom::Err::Incomplete(_) => Error::Incomplete,
        }
    }
}

impl From<GenError> for Error {
    fn from(err: GenError) -> Self {
        Error::Serialize(err)
    }
}
