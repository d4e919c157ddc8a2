use crate::types::*;
use wasmi::core::ValType;

/// Memory facts about an ABI type.
pub trait AbiTypeExt {
    /// Bytes taken by a value of this type inside an object, array or argument buffer.
    /// Anything that isn't a number is a 4 byte pointer.
    fn own_size(&self) -> u32;

    /// Type used to pass a value of this type to a wasm function.
    fn val_type(&self) -> ValType;

    fn is_void(&self) -> bool;
}

impl AbiTypeExt for TypeNode {
    fn own_size(&self) -> u32 {
        match self.name.as_str() {
            "bool" | "u8" | "i8" => 1,
            "u16" | "i16" => 2,
            "u64" | "i64" | "f64" => 8,
            _ => 4,
        }
    }

    fn val_type(&self) -> ValType {
        match self.name.as_str() {
            "u64" | "i64" => ValType::I64,
            "f32" => ValType::F32,
            "f64" => ValType::F64,
            _ => ValType::I32,
        }
    }

    fn is_void(&self) -> bool {
        self.name == "void"
    }
}

/// Rounds `offset` up to the next multiple of `size`. Sizes are powers of two.
pub fn align_to(offset: u32, size: u32) -> u32 {
    if size <= 1 {
        return offset;
    }
    let mask = size - 1;
    (offset + mask) & !mask
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbiField {
    pub name: String,
    pub ty: TypeNode,
    pub offset: u32,
}

/// Lays out fields one after the other, each aligned to its own size.
pub fn layout_fields(fields: &[FieldNode]) -> Vec<AbiField> {
    let mut offset = 0u32;
    fields
        .iter()
        .map(|field| {
            let size = field.ty.own_size();
            let aligned = align_to(offset, size);
            offset = aligned + size;
            AbiField {
                name: field.name.clone(),
                ty: field.ty.clone(),
                offset: aligned,
            }
        })
        .collect()
}

/// Bytes taken by an object with the given layout.
pub fn object_size(fields: &[AbiField]) -> u32 {
    fields
        .last()
        .map(|field| field.offset + field.ty.own_size())
        .unwrap_or(0)
}

/// Layout of a `Map` or `Set` entry. A set entry is a map entry without value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryLayout {
    pub value_offset: u32,
    pub tag_offset: u32,
    pub size: u32,
}

impl EntryLayout {
    pub fn of(key: &TypeNode, value: Option<&TypeNode>) -> Self {
        let key_size = key.own_size();
        let (value_offset, value_size) = match value {
            Some(value) => {
                let size = value.own_size();
                (align_to(key_size, size), size)
            }
            None => (key_size, 0),
        };
        let tag_offset = align_to(value_offset + value_size, 4);
        let entry_align = key_size.max(value_size).max(4);
        Self {
            value_offset,
            tag_offset,
            size: align_to(tag_offset + 4, entry_align),
        }
    }
}

/// Name of the contract export inserting an entry in a `Map` or `Set` of the given type.
pub fn put_entry_fn_name(ty: &TypeNode) -> String {
    let name = ty.to_present().normalized_name();
    let digest = blake3::hash(name.as_bytes());
    let prefix = if ty.name == "Set" {
        "__put_set_entry_"
    } else {
        "__put_map_entry_"
    };
    format!("{}{}", prefix, hex::encode(&digest.as_bytes()[0..4]))
}
