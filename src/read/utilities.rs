use nom::error::ErrorKind;
use nom::IResult;

/// `len` bytes of `i0` starting at the absolute `offset`.
pub(crate) fn slice_at(
    i0: &[u8],
    offset: usize,
    len: usize,
) -> Result<&[u8], nom::Err<(&[u8], ErrorKind)>> {
    match offset.checked_add(len) {
        Some(end) if end <= i0.len() => Ok(&i0[offset..end]),
        _ => Err(nom::Err::Error((i0, ErrorKind::Eof))),
    }
}

/// Runs `f` at an absolute offset of `i0` without moving the caller's position.
pub(crate) fn read_at<'a, O, F>(i0: &'a [u8], offset: usize, f: F) -> impl Fn(&'a [u8]) -> IResult<&'a [u8], O>
where
    F: Fn(&'a [u8]) -> IResult<&'a [u8], O>,
{
    move |i: &'a [u8]| {
        if offset > i0.len() {
            return Err(nom::Err::Error((i0, ErrorKind::Eof)));
        }
        f(&i0[offset..]).map(|(_, v)| (i, v))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use nom::number::complete::be_u16;

    #[test]
    fn slice_at_bounds() {
        let data = [1u8, 2, 3, 4];
        assert_eq!(slice_at(&data, 1, 3).unwrap(), &[2, 3, 4]);
        assert_eq!(slice_at(&data, 4, 0).unwrap(), &[] as &[u8]);
        assert!(slice_at(&data, 2, 3).is_err());
        assert!(slice_at(&data, usize::MAX, 2).is_err());
    }

    #[test]
    fn read_at_keeps_position() {
        let data = [0u8, 1, 0xAB, 0xCD];
        let (rest, v) = read_at(&data, 2, be_u16)(&data[1..]).unwrap();
        assert_eq!(v, 0xABCD);
        assert_eq!(rest, &data[1..]);
        assert!(read_at(&data, 5, be_u16)(&data[..]).is_err());
    }
}
