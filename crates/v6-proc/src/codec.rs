//! Little-endian field codecs for fixed-layout kernel records.

use crate::error::RecordError;

pub(crate) struct RecordWriter<const N: usize> {
    buf: [u8; N],
    pos: usize,
}

impl<const N: usize> RecordWriter<N> {
    pub(crate) fn new() -> Self {
        Self {
            buf: [0; N],
            pos: 0,
        }
    }

    pub(crate) fn u8(&mut self, v: u8) -> &mut Self {
        self.buf[self.pos] = v;
        self.pos += 1;
        self
    }

    pub(crate) fn i8(&mut self, v: i8) -> &mut Self {
        self.u8(v as u8)
    }

    pub(crate) fn u16_le(&mut self, v: u16) -> &mut Self {
        self.buf[self.pos..self.pos + 2].copy_from_slice(&v.to_le_bytes());
        self.pos += 2;
        self
    }

    pub(crate) fn i16_le(&mut self, v: i16) -> &mut Self {
        self.u16_le(v as u16)
    }

    pub(crate) fn finish(&self) -> [u8; N] {
        debug_assert_eq!(self.pos, N, "record layout does not fill {N} bytes");
        self.buf
    }
}

pub(crate) struct RecordReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> RecordReader<'a> {
    /// Fails unless `bytes` is exactly `expected` long, so field reads below cannot run past it.
    pub(crate) fn new(
        record: &'static str,
        bytes: &'a [u8],
        expected: usize,
    ) -> Result<Self, RecordError> {
        if bytes.len() != expected {
            return Err(RecordError::Length {
                record,
                expected,
                found: bytes.len(),
            });
        }
        Ok(Self { bytes, pos: 0 })
    }

    pub(crate) fn u8(&mut self) -> u8 {
        let v = self.bytes[self.pos];
        self.pos += 1;
        v
    }

    pub(crate) fn i8(&mut self) -> i8 {
        self.u8() as i8
    }

    pub(crate) fn u16_le(&mut self) -> u16 {
        let v = u16::from_le_bytes([self.bytes[self.pos], self.bytes[self.pos + 1]]);
        self.pos += 2;
        v
    }

    pub(crate) fn i16_le(&mut self) -> i16 {
        self.u16_le() as i16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_emits_little_endian_words() {
        let bytes = RecordWriter::<5>::new()
            .u8(0xAA)
            .u16_le(0x1234)
            .i16_le(-2)
            .finish();
        assert_eq!(bytes, [0xAA, 0x34, 0x12, 0xFE, 0xFF]);
    }

    #[test]
    fn reader_rejects_wrong_length() {
        let err = RecordReader::new("test", &[0; 3], 4).err();
        assert_eq!(
            err,
            Some(RecordError::Length {
                record: "test",
                expected: 4,
                found: 3
            })
        );
    }

    #[test]
    fn reader_decodes_fields_in_order() {
        let mut r = RecordReader::new("test", &[0x80, 0x34, 0x12], 3).unwrap();
        assert_eq!(r.i8(), -128);
        assert_eq!(r.u16_le(), 0x1234);
    }
}
