use super::{Lock, PackageId, Pointer};
use crate::crypto::{hash, Hash};
use crate::data::{BufReader, BufWriter, DecodeError};

/// Output ids are the hash of the output's canonical encoding.
pub type OutputId = Hash;

/// Durable state of a jig, as produced by a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub origin: Pointer,
    pub location: Pointer,
    pub class_ptr: Pointer,
    pub lock: Lock,
    /// The jig's own fields, lifted out of contract memory.
    pub state: Vec<u8>,
    /// Unix timestamp (seconds) of the transaction that produced the output.
    pub created_at: u64,
}

impl Output {
    pub fn id(&self) -> OutputId {
        hash(self.to_bytes())
    }

    pub fn package_id(&self) -> PackageId {
        PackageId::from(self.class_ptr.id)
    }

    pub fn class_idx(&self) -> u16 {
        self.class_ptr.idx
    }

    /// Canonical encoding. The timestamp is metadata and is not part of it.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = BufWriter::new();
        self.origin.write(&mut writer);
        self.location.write(&mut writer);
        self.class_ptr.write(&mut writer);
        self.lock.write(&mut writer);
        writer.write_bytes(&self.state);
        writer.into_bytes()
    }

    pub fn from_bytes(bytes: &[u8], created_at: u64) -> Result<Self, DecodeError> {
        let mut reader = BufReader::new(bytes);
        let output = Self {
            origin: Pointer::read(&mut reader)?,
            location: Pointer::read(&mut reader)?,
            class_ptr: Pointer::read(&mut reader)?,
            lock: Lock::read(&mut reader)?,
            state: reader.read_bytes()?.to_vec(),
            created_at,
        };
        reader.expect_end()?;
        Ok(output)
    }
}
