use super::DecodeError;
use paste::paste;

macro_rules! read_le {
    ($($t:ty),*) => {
        paste! {
            $(
                pub fn [<read_ $t>](&mut self) -> Result<$t, DecodeError> {
                    let bytes = self.read_array::<{ std::mem::size_of::<$t>() }>()?;
                    Ok(<$t>::from_le_bytes(bytes))
                }
            )*
        }
    };
}

/// A cursor over a borrowed byte slice.
#[derive(Debug, Clone)]
pub struct BufReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> BufReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    read_le!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

    pub fn read_bool(&mut self) -> Result<bool, DecodeError> {
        Ok(self.read_u8()? != 0)
    }

    /// Reads an unsigned LEB128 number.
    pub fn read_uleb(&mut self) -> Result<u64, DecodeError> {
        let mut result = 0u64;
        let mut shift = 0u32;
        loop {
            let byte = self.read_u8()?;
            if shift >= 64 || (shift == 63 && byte > 1) {
                return Err(DecodeError::InvalidUleb);
            }
            result |= ((byte & 0x7f) as u64) << shift;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
        }
    }

    /// Reads a length prefixed byte sequence.
    pub fn read_bytes(&mut self) -> Result<&'a [u8], DecodeError> {
        let len = self.read_uleb()? as usize;
        self.read_fixed_bytes(len)
    }

    pub fn read_fixed_bytes(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < len {
            return Err(DecodeError::BufferOverflow {
                needed: len,
                remaining: self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_fixed_bytes(N)?);
        Ok(out)
    }

    /// Reads a length prefixed UTF-8 string.
    pub fn read_str(&mut self) -> Result<&'a str, DecodeError> {
        let bytes = self.read_bytes()?;
        std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8)
    }

    /// Reads a length prefixed sequence, decoding each element with `f`.
    pub fn read_seq<T, F>(&mut self, mut f: F) -> Result<Vec<T>, DecodeError>
    where
        F: FnMut(&mut Self) -> Result<T, DecodeError>,
    {
        let len = self.read_uleb()? as usize;
        let mut items = Vec::with_capacity(len.min(self.remaining()));
        for _ in 0..len {
            items.push(f(self)?);
        }
        Ok(items)
    }

    pub fn expect_end(&self) -> Result<(), DecodeError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DecodeError::ExtraTrailingBytes(self.remaining()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::BufWriter;

    #[test]
    fn test_read_numbers() {
        let mut w = BufWriter::new();
        w.write_u8(1);
        w.write_u16(0x0203);
        w.write_u32(0x04050607);
        w.write_i64(-5);
        w.write_f64(1.5);
        let bytes = w.into_bytes();

        let mut r = BufReader::new(&bytes);
        assert_eq!(r.read_u8().unwrap(), 1);
        assert_eq!(r.read_u16().unwrap(), 0x0203);
        assert_eq!(r.read_u32().unwrap(), 0x04050607);
        assert_eq!(r.read_i64().unwrap(), -5);
        assert_eq!(r.read_f64().unwrap(), 1.5);
        assert!(r.is_empty());
    }

    #[test]
    fn test_read_uleb() {
        let mut r = BufReader::new(&[0xe5, 0x8e, 0x26]);
        assert_eq!(r.read_uleb().unwrap(), 624485);
    }

    #[test]
    fn test_overflow_is_an_error() {
        let mut r = BufReader::new(&[1, 2]);
        assert_eq!(
            r.read_u32(),
            Err(DecodeError::BufferOverflow {
                needed: 4,
                remaining: 2
            })
        );
    }

    #[test]
    fn test_read_bytes_with_bad_length() {
        let mut r = BufReader::new(&[5, 1, 2]);
        assert!(matches!(
            r.read_bytes(),
            Err(DecodeError::BufferOverflow { .. })
        ));
    }
}
