use std::mem;

use bytemuck::AnyBitPattern;

use crate::error::{Error, ErrorKind, Result};

/// A cursor over a borrowed byte buffer.
///
/// `position` is an absolute offset into the original input, so a reader bounded to a single
/// segment still reports offsets that make sense for the whole file. `buf` ends at the bound of
/// the view.
#[derive(Debug, Clone)]
pub(crate) struct Reader<'a> {
    buf: &'a [u8],
    position: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, position: 0 }
    }

    /// Returns a reader over the next `len` bytes, without advancing `self`.
    pub(crate) fn sub_reader(&self, len: usize) -> Result<Reader<'a>> {
        if self.remaining().len() < len {
            return Err(self.truncated());
        }
        Ok(Reader {
            buf: &self.buf[..self.position + len],
            position: self.position,
        })
    }

    #[inline]
    pub(crate) fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub(crate) fn remaining(&self) -> &'a [u8] {
        &self.buf[self.position..]
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.position == self.buf.len()
    }

    fn truncated(&self) -> Error {
        Error::from(ErrorKind::Truncated).at(self.position)
    }

    /// Moves the cursor forward by `count` bytes.
    pub(crate) fn skip(&mut self, count: usize) -> Result<()> {
        self.read_slice(count).map(drop)
    }

    pub(crate) fn peek_u8(&self, offset: usize) -> Result<u8> {
        match self.remaining().get(offset) {
            Some(&byte) => Ok(byte),
            None => Err(Error::from(ErrorKind::Truncated).at(self.position + offset)),
        }
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8> {
        let byte = self.peek_u8(0)?;
        self.position += 1;
        Ok(byte)
    }

    pub(crate) fn read_u16(&mut self) -> Result<u16> {
        let b = self.read_array::<2>()?;
        Ok(u16::from_be_bytes(b))
    }

    pub(crate) fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut array = [0; N];
        array.copy_from_slice(self.read_slice(N)?);
        Ok(array)
    }

    pub(crate) fn read_slice(&mut self, count: usize) -> Result<&'a [u8]> {
        if self.remaining().len() < count {
            Err(self.truncated())
        } else {
            let slice = &self.remaining()[..count];
            self.position += count;
            Ok(slice)
        }
    }

    pub(crate) fn read_obj<T: AnyBitPattern>(&mut self) -> Result<&'a T> {
        assert_eq!(mem::align_of::<T>(), 1);

        let bytes = self.read_slice(mem::size_of::<T>())?;
        Ok(bytemuck::from_bytes(bytes))
    }

    pub(crate) fn read_objs<T: AnyBitPattern>(&mut self, count: usize) -> Result<&'a [T]> {
        assert_eq!(mem::align_of::<T>(), 1);

        let byte_count = count
            .checked_mul(mem::size_of::<T>())
            .ok_or_else(|| self.truncated())?;
        let bytes = self.read_slice(byte_count)?;
        Ok(bytemuck::cast_slice(bytes))
    }

    pub(crate) fn read_length(&mut self) -> Result<u16> {
        // Length parameter is the length of the segment parameters, including the length parameter,
        // but excluding the FF xx marker.

        let offset = self.position;
        let len = self.read_u16()?;
        if len < 2 {
            return Err(Error::from(ErrorKind::InvalidLength(len)).at(offset));
        }
        Ok(len - 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_primitives() {
        let mut reader = Reader::new(&[0x12, 0x34, 0x56, 0x78, 0x9A]);
        assert_eq!(reader.read_u8().unwrap(), 0x12);
        assert_eq!(reader.read_u16().unwrap(), 0x3456);
        assert_eq!(reader.position(), 3);
        assert_eq!(reader.read_slice(2).unwrap(), &[0x78, 0x9A]);
        assert!(reader.is_empty());
        assert_eq!(*reader.read_u8().unwrap_err().kind(), ErrorKind::Truncated);
        assert_eq!(reader.read_slice(0).unwrap(), &[] as &[u8]);
    }

    #[test]
    fn short_reads_do_not_advance() {
        let mut reader = Reader::new(&[1, 2, 3]);
        reader.read_u8().unwrap();

        let err = reader.read_slice(3).unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::Truncated);
        assert_eq!(err.offset(), Some(1));
        assert_eq!(reader.position(), 1);

        let mut reader = Reader::new(&[0xAB]);
        assert_eq!(*reader.read_u16().unwrap_err().kind(), ErrorKind::Truncated);
        assert_eq!(reader.position(), 0);
        assert_eq!(reader.read_u8().unwrap(), 0xAB);
    }

    #[test]
    fn sub_reader_is_bounded() {
        let data = [0, 1, 2, 3, 4, 5];
        let mut reader = Reader::new(&data);
        reader.skip(1).unwrap();

        let mut sub = reader.sub_reader(3).unwrap();
        assert_eq!(sub.position(), 1);
        assert_eq!(sub.remaining(), &[1, 2, 3]);
        assert_eq!(*sub.read_slice(4).unwrap_err().kind(), ErrorKind::Truncated);
        assert_eq!(sub.read_slice(3).unwrap(), &[1, 2, 3]);
        assert_eq!(*sub.peek_u8(0).unwrap_err().kind(), ErrorKind::Truncated);

        // The parent reader is unaffected.
        assert_eq!(reader.position(), 1);
        assert_eq!(*reader.sub_reader(6).unwrap_err().kind(), ErrorKind::Truncated);
    }

    #[test]
    fn objs_are_bounds_checked() {
        let mut reader = Reader::new(&[1, 2, 3, 4, 5]);
        let err = reader.read_objs::<[u8; 3]>(2).unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::Truncated);
        assert_eq!(reader.read_objs::<[u8; 2]>(2).unwrap(), &[[1, 2], [3, 4]]);
        assert_eq!(reader.read_obj::<u8>().unwrap(), &5);
    }

    #[test]
    fn length() {
        let mut reader = Reader::new(&[0x00, 0x10]);
        assert_eq!(reader.read_length().unwrap(), 14);

        let mut reader = Reader::new(&[0x00, 0x01]);
        let err = reader.read_length().unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::InvalidLength(1));
        assert_eq!(err.offset(), Some(0));
    }
}
