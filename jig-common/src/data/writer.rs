use paste::paste;

macro_rules! write_le {
    ($($t:ty),*) => {
        paste! {
            $(
                pub fn [<write_ $t>](&mut self, value: $t) -> &mut Self {
                    self.buf.extend_from_slice(&value.to_le_bytes());
                    self
                }
            )*
        }
    };
}

/// An append only byte buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufWriter {
    buf: Vec<u8>,
}

impl BufWriter {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    write_le!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

    pub fn write_bool(&mut self, value: bool) -> &mut Self {
        self.write_u8(value as u8)
    }

    /// Writes an unsigned LEB128 number.
    pub fn write_uleb(&mut self, mut value: u64) -> &mut Self {
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            if value == 0 {
                self.buf.push(byte);
                return self;
            }
            self.buf.push(byte | 0x80);
        }
    }

    /// Writes a length prefixed byte sequence.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.write_uleb(bytes.len() as u64);
        self.write_fixed_bytes(bytes)
    }

    pub fn write_fixed_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn write_str(&mut self, value: &str) -> &mut Self {
        self.write_bytes(value.as_bytes())
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn data(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_uleb() {
        let mut w = BufWriter::new();
        w.write_uleb(0).write_uleb(127).write_uleb(128).write_uleb(624485);
        assert_eq!(w.data(), &[0x00, 0x7f, 0x80, 0x01, 0xe5, 0x8e, 0x26]);
    }

    #[test]
    fn test_write_bytes_is_length_prefixed() {
        let mut w = BufWriter::new();
        w.write_bytes(&[9, 9, 9]);
        assert_eq!(w.into_bytes(), vec![3, 9, 9, 9]);
    }
}
