use crate::abi::AbiTypeExt;
use crate::types::*;
use paste::paste;
use wasmi::core::{ValType, F32, F64};
use wasmi::Val;

macro_rules! word_conversions {
    ($($t:ty),*) => {
        paste! {
            $(
                pub fn [<from_ $t>](value: $t) -> Self {
                    Self::from_bytes(&value.to_le_bytes())
                }

                pub fn [<to_ $t>](&self) -> $t {
                    let mut bytes = [0u8; std::mem::size_of::<$t>()];
                    bytes.copy_from_slice(&self.0[..std::mem::size_of::<$t>()]);
                    <$t>::from_le_bytes(bytes)
                }
            )*
        }
    };
}

/// A value the size of the largest wasm number. Pointers, numbers and booleans travel between
/// the host and a container as words; only the first `own_size` bytes of a word are meaningful
/// for its type.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct WasmWord([u8; 8]);

impl WasmWord {
    pub const fn null() -> Self {
        Self([0u8; 8])
    }

    /// Little endian, zero padded. Extra bytes are ignored.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut word = [0u8; 8];
        let len = bytes.len().min(8);
        word[..len].copy_from_slice(&bytes[..len]);
        Self(word)
    }

    word_conversions!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

    pub fn from_bool(value: bool) -> Self {
        Self::from_u8(value as u8)
    }

    pub fn to_bool(&self) -> bool {
        self.0[0] != 0
    }

    pub fn is_null(&self) -> bool {
        self.0 == [0u8; 8]
    }

    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }

    /// The bytes a value of type `ty` takes in memory.
    pub fn serialize(&self, ty: &TypeNode) -> &[u8] {
        &self.0[..ty.own_size() as usize]
    }

    pub fn to_val(&self, ty: &TypeNode) -> Val {
        match ty.val_type() {
            ValType::I64 => Val::I64(self.to_i64()),
            ValType::F32 => Val::F32(F32::from_bits(self.to_u32())),
            ValType::F64 => Val::F64(F64::from_bits(self.to_u64())),
            _ => Val::I32(self.to_i32()),
        }
    }

    pub fn from_val(val: &Val) -> Self {
        match val {
            Val::I32(value) => Self::from_i32(*value),
            Val::I64(value) => Self::from_i64(*value),
            Val::F32(value) => Self::from_u32(value.to_bits()),
            Val::F64(value) => Self::from_u64(value.to_bits()),
            _ => Self::null(),
        }
    }
}

impl fmt::Debug for WasmWord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "WasmWord({})", hex::encode(self.0))
    }
}
