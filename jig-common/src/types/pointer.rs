use crate::crypto::Hash;
use crate::data::{BufReader, BufWriter, DecodeError};
use std::fmt;
use std::str::FromStr;

/// Identifies an output slot of a transaction, or a class inside a package: a 32-byte id followed
/// by a 2-byte little endian index.
///
/// Used for jig origins (where the jig was created), locations (where it was last touched) and
/// class pointers (package id + class index).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pointer {
    pub id: [u8; 32],
    pub idx: u16,
}

impl Pointer {
    pub const LENGTH: usize = 34;

    pub const fn new(id: [u8; 32], idx: u16) -> Self {
        Self { id, idx }
    }

    pub fn from_hash(hash: Hash, idx: u16) -> Self {
        Self { id: hash.0, idx }
    }

    pub fn to_bytes(&self) -> [u8; Self::LENGTH] {
        let mut bytes = [0u8; Self::LENGTH];
        bytes[..32].copy_from_slice(&self.id);
        bytes[32..].copy_from_slice(&self.idx.to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() != Self::LENGTH {
            return Err(DecodeError::InvalidLength {
                expected: Self::LENGTH,
                actual: bytes.len(),
            });
        }
        let mut reader = BufReader::new(bytes);
        Self::read(&mut reader)
    }

    pub fn read(reader: &mut BufReader) -> Result<Self, DecodeError> {
        let id = reader.read_array::<32>()?;
        let idx = reader.read_u16()?;
        Ok(Self { id, idx })
    }

    pub fn write(&self, writer: &mut BufWriter) {
        writer.write_fixed_bytes(&self.to_bytes());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsePointerError {
    MissingSeparator,
    InvalidId(String),
    InvalidIndex(String),
}

impl fmt::Display for ParsePointerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for ParsePointerError {}

/// Textual form is `<hex id>_<idx>`.
impl FromStr for Pointer {
    type Err = ParsePointerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, idx) = s
            .split_once('_')
            .ok_or(ParsePointerError::MissingSeparator)?;
        let id = hex::decode(id)
            .ok()
            .and_then(|bytes| <[u8; 32]>::try_from(bytes).ok())
            .ok_or_else(|| ParsePointerError::InvalidId(id.to_owned()))?;
        let idx = idx
            .parse::<u16>()
            .map_err(|_| ParsePointerError::InvalidIndex(idx.to_owned()))?;
        Ok(Self { id, idx })
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}_{}", hex::encode(self.id), self.idx)
    }
}

impl fmt::Debug for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Pointer({})", self)
    }
}
