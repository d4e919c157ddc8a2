use crate::constants::ADDRESS_LENGTH;
use crate::crypto::Address;
use crate::data::{BufReader, BufWriter, DecodeError};
use crate::types::Pointer;
use strum::{Display, EnumIter};

/// Kind of lock attached to a jig. The numeric values are shared with contract code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum LockType {
    Frozen,
    None,
    Pubkey,
    Caller,
    Anyone,
}

impl LockType {
    pub fn as_i32(&self) -> i32 {
        match self {
            LockType::Frozen => -1,
            LockType::None => 0,
            LockType::Pubkey => 1,
            LockType::Caller => 2,
            LockType::Anyone => 3,
        }
    }

    pub fn from_i32(value: i32) -> Result<Self, DecodeError> {
        match value {
            -1 => Ok(LockType::Frozen),
            0 => Ok(LockType::None),
            1 => Ok(LockType::Pubkey),
            2 => Ok(LockType::Caller),
            3 => Ok(LockType::Anyone),
            other => Err(DecodeError::InvalidLockType(other)),
        }
    }

    /// Length of the data carried by locks of this kind.
    pub fn data_len(&self) -> usize {
        match self {
            LockType::Pubkey => ADDRESS_LENGTH,
            LockType::Caller => Pointer::LENGTH,
            LockType::Frozen | LockType::None | LockType::Anyone => 0,
        }
    }
}

/// Durable form of a jig lock: the kind plus its raw data (an address for pubkey locks, the
/// parent origin for caller locks, nothing otherwise).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Lock {
    pub lock_type: LockType,
    pub data: Vec<u8>,
}

impl Lock {
    pub fn new(lock_type: LockType, data: Vec<u8>) -> Result<Self, DecodeError> {
        if data.len() != lock_type.data_len() {
            return Err(DecodeError::InvalidLength {
                expected: lock_type.data_len(),
                actual: data.len(),
            });
        }
        Ok(Self { lock_type, data })
    }

    pub fn none() -> Self {
        Self {
            lock_type: LockType::None,
            data: vec![],
        }
    }

    pub fn frozen() -> Self {
        Self {
            lock_type: LockType::Frozen,
            data: vec![],
        }
    }

    pub fn anyone() -> Self {
        Self {
            lock_type: LockType::Anyone,
            data: vec![],
        }
    }

    pub fn pubkey(address: &Address) -> Self {
        Self {
            lock_type: LockType::Pubkey,
            data: address.0.to_vec(),
        }
    }

    pub fn caller(parent: &Pointer) -> Self {
        Self {
            lock_type: LockType::Caller,
            data: parent.to_bytes().to_vec(),
        }
    }

    /// Wire form: one byte kind (two's complement) followed by the fixed size data.
    pub fn write(&self, writer: &mut BufWriter) {
        writer.write_i8(self.lock_type.as_i32() as i8);
        writer.write_fixed_bytes(&self.data);
    }

    pub fn read(reader: &mut BufReader) -> Result<Self, DecodeError> {
        let lock_type = LockType::from_i32(reader.read_i8()? as i32)?;
        let data = reader.read_fixed_bytes(lock_type.data_len())?.to_vec();
        Ok(Self { lock_type, data })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = BufWriter::new();
        self.write(&mut writer);
        writer.into_bytes()
    }
}
