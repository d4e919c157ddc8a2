//! Marshalling between the wire format and the memory of a container.
//!
//! [`LowerValue`] reads a value from its wire form and builds it inside a container, returning
//! the word (number or pointer) that represents it. [`LiftValue`] walks the memory from a word
//! and writes the wire form back. Both are driven by the ABI type of the value.

mod jig_data;
mod lift;
mod lower;
mod traits;
mod word;

#[cfg(test)]
mod test_memory;

pub use jig_data::*;
pub use lift::*;
pub use lower::*;
pub use traits::*;
pub use word::*;

use crate::abi::*;
use crate::errors::*;
use crate::types::*;

/// Size of the header of an `Array`: buffer, data start, byte length and length.
pub const ARRAY_HEADER_SIZE: u32 = 16;
/// Size of the header of a typed array: buffer, data start and byte length.
pub const TYPED_ARRAY_HEADER_SIZE: u32 = 12;
/// Size of the header of a `Map` or a `Set`.
pub const COLLECTION_HEADER_SIZE: u32 = 24;
/// Capacity of the entries buffer of a fresh `Map` or `Set`.
pub const COLLECTION_INITIAL_CAPACITY: u32 = 4;

pub const TYPED_ARRAYS: [&str; 11] = [
    "Int8Array",
    "Int16Array",
    "Int32Array",
    "Int64Array",
    "Uint8Array",
    "Uint8ClampedArray",
    "Uint16Array",
    "Uint32Array",
    "Uint64Array",
    "Float32Array",
    "Float64Array",
];

pub fn is_typed_array(name: &str) -> bool {
    TYPED_ARRAYS.contains(&name)
}

/// `ptr` moved by `offset` bytes. Addresses found in a container never wrap around.
pub fn ptr_at(ptr: u32, offset: u32) -> Result<u32, ExecutionError> {
    ptr.checked_add(offset).ok_or(ExecutionError::MemoryAccess {
        ptr,
        len: offset as usize,
    })
}

/// Address of element `idx` of a sequence of `size` byte elements starting at `start`.
pub fn element_at(start: u32, idx: u32, size: u32) -> Result<u32, ExecutionError> {
    let offset = idx.checked_mul(size).ok_or(ExecutionError::MemoryAccess {
        ptr: start,
        len: idx as usize * size as usize,
    })?;
    ptr_at(start, offset)
}

/// How a type defined by the ABI is laid out in memory.
pub(crate) enum AbiShape {
    /// `*Name`: the jig itself, every field in place.
    Jig(Vec<AbiField>),
    Object(Vec<AbiField>),
    /// A reference to a jig: `{$output, $lock}`.
    Proxy,
}

pub(crate) fn abi_shape(abi: &AbiAccess, ty: &TypeNode) -> Result<AbiShape, ExecutionError> {
    match abi.exported_by_name(&ty.name) {
        Some(AbiExport::Class(class)) if ty.is_jig_state() => Ok(AbiShape::Jig(class.fields.clone())),
        Some(AbiExport::Class(_)) | Some(AbiExport::Interface(_)) => Ok(AbiShape::Proxy),
        Some(AbiExport::Object(object)) => Ok(AbiShape::Object(object.fields.clone())),
        Some(AbiExport::Function(_)) => Err(ExecutionError::InvalidType(ty.name.clone())),
        None => match abi.imported_by_name(&ty.name) {
            Some(import) => match (import.kind, &import.object) {
                (CodeKind::ProxyClass, _) | (CodeKind::ProxyInterface, _) => Ok(AbiShape::Proxy),
                (_, Some(object)) => Ok(AbiShape::Object(object.fields.clone())),
                _ => Err(ExecutionError::InvalidType(ty.name.clone())),
            },
            None => Err(ExecutionError::UnknownType(ty.name.clone())),
        },
    }
}

pub(crate) fn type_arg(ty: &TypeNode, idx: usize) -> Result<&TypeNode, ExecutionError> {
    ty.args
        .get(idx)
        .ok_or_else(|| ExecutionError::UnknownType(ty.normalized_name()))
}
