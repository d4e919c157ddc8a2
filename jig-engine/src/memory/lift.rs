use super::*;
use crate::abi::*;
use crate::errors::*;
use crate::types::*;
use num_bigint::BigUint;

/// Extracts values out of a container into their wire form.
pub struct LiftValue<'m, M: ContainerMemory + ?Sized> {
    mem: &'m M,
}

impl<'m, M: ContainerMemory + ?Sized> LiftValue<'m, M> {
    pub fn new(mem: &'m M) -> Self {
        Self { mem }
    }

    pub fn lift(&self, word: WasmWord, ty: &TypeNode) -> Result<Vec<u8>, RuntimeError> {
        let mut writer = BufWriter::new();
        self.lift_into(word, ty, &mut writer)?;
        Ok(writer.into_bytes())
    }

    pub fn lift_into(
        &self,
        word: WasmWord,
        ty: &TypeNode,
        writer: &mut BufWriter,
    ) -> Result<(), RuntimeError> {
        if ty.nullable {
            if word.is_null() {
                writer.write_u8(0);
                return Ok(());
            }
            writer.write_u8(1);
            return self.lift_into(word, &ty.to_present(), writer);
        }

        match ty.name.as_str() {
            "bool" => {
                writer.write_bool(word.to_bool());
            }
            "u8" => {
                writer.write_u8(word.to_u8());
            }
            "i8" => {
                writer.write_i8(word.to_i8());
            }
            "u16" => {
                writer.write_u16(word.to_u16());
            }
            "i16" => {
                writer.write_i16(word.to_i16());
            }
            "u32" | "usize" => {
                writer.write_u32(word.to_u32());
            }
            "i32" | "isize" => {
                writer.write_i32(word.to_i32());
            }
            "u64" => {
                writer.write_u64(word.to_u64());
            }
            "i64" => {
                writer.write_i64(word.to_i64());
            }
            "f32" => {
                writer.write_f32(word.to_f32());
            }
            "f64" => {
                writer.write_f64(word.to_f64());
            }
            "string" => {
                let value = self.mem.read_string(word.to_u32())?;
                writer.write_str(&value);
            }
            "ArrayBuffer" => {
                let bytes = self.mem.read_buffer(word.to_u32())?;
                writer.write_bytes(&bytes);
            }
            "Array" => self.lift_array(word.to_u32(), ty, writer)?,
            "StaticArray" => self.lift_static_array(word.to_u32(), ty, writer)?,
            "Set" => self.lift_set(word.to_u32(), ty, writer)?,
            "Map" => self.lift_map(word.to_u32(), ty, writer)?,
            "BigInt" => self.lift_big_int(word.to_u32(), ty, writer)?,
            name if is_typed_array(name) => self.lift_typed_array(word.to_u32(), writer)?,
            _ => self.lift_abi_type(word.to_u32(), ty, writer)?,
        }
        Ok(())
    }

    fn lift_elements(
        &self,
        data_start: u32,
        count: u32,
        elem_ty: &TypeNode,
        writer: &mut BufWriter,
    ) -> Result<(), RuntimeError> {
        let size = elem_ty.own_size();
        writer.write_uleb(count as u64);
        for i in 0..count {
            let word = self.mem.read_word(element_at(data_start, i, size)?, elem_ty)?;
            self.lift_into(word, elem_ty, writer)?;
        }
        Ok(())
    }

    fn lift_array(&self, ptr: u32, ty: &TypeNode, writer: &mut BufWriter) -> Result<(), RuntimeError> {
        let elem_ty = type_arg(ty, 0)?;
        let data_start = self.mem.read_u32(ptr_at(ptr, 4)?)?;
        let length = self.mem.read_u32(ptr_at(ptr, 12)?)?;
        self.lift_elements(data_start, length, elem_ty, writer)
    }

    fn lift_static_array(
        &self,
        ptr: u32,
        ty: &TypeNode,
        writer: &mut BufWriter,
    ) -> Result<(), RuntimeError> {
        let elem_ty = type_arg(ty, 0)?;
        let count = self.mem.block_size(ptr)? / elem_ty.own_size();
        self.lift_elements(ptr, count, elem_ty, writer)
    }

    fn lift_typed_array(&self, ptr: u32, writer: &mut BufWriter) -> Result<(), RuntimeError> {
        let data_start = self.mem.read_u32(ptr_at(ptr, 4)?)?;
        let byte_len = self.mem.read_u32(ptr_at(ptr, 8)?)?;
        let bytes = self.mem.read(data_start, byte_len as usize)?;
        writer.write_bytes(&bytes);
        Ok(())
    }

    /// Live entries of a map or set, in insertion order. Deleted entries are tagged in the
    /// lowest bit of their link word.
    fn live_entries(&self, ptr: u32, layout: &EntryLayout) -> Result<Vec<u32>, RuntimeError> {
        let entries = self.mem.read_u32(ptr_at(ptr, 8)?)?;
        let entries_offset = self.mem.read_u32(ptr_at(ptr, 16)?)?;

        let mut live = Vec::new();
        for i in 0..entries_offset {
            let entry = element_at(entries, i, layout.size)?;
            let tag = self.mem.read_u32(ptr_at(entry, layout.tag_offset)?)?;
            if tag & 1 == 0 {
                live.push(entry);
            }
        }
        Ok(live)
    }

    fn lift_set(&self, ptr: u32, ty: &TypeNode, writer: &mut BufWriter) -> Result<(), RuntimeError> {
        let elem_ty = type_arg(ty, 0)?;
        let layout = EntryLayout::of(elem_ty, None);
        let entries = self.live_entries(ptr, &layout)?;

        writer.write_uleb(entries.len() as u64);
        for entry in entries {
            let word = self.mem.read_word(entry, elem_ty)?;
            self.lift_into(word, elem_ty, writer)?;
        }
        Ok(())
    }

    fn lift_map(&self, ptr: u32, ty: &TypeNode, writer: &mut BufWriter) -> Result<(), RuntimeError> {
        let key_ty = type_arg(ty, 0)?;
        let value_ty = type_arg(ty, 1)?;
        let layout = EntryLayout::of(key_ty, Some(value_ty));
        let entries = self.live_entries(ptr, &layout)?;

        writer.write_uleb(entries.len() as u64);
        for entry in entries {
            let key = self.mem.read_word(entry, key_ty)?;
            self.lift_into(key, key_ty, writer)?;
            let value = self.mem.read_word(ptr_at(entry, layout.value_offset)?, value_ty)?;
            self.lift_into(value, value_ty, writer)?;
        }
        Ok(())
    }

    fn lift_big_int(&self, ptr: u32, ty: &TypeNode, writer: &mut BufWriter) -> Result<(), RuntimeError> {
        let fields = match abi_shape(self.mem.abi(), ty)? {
            AbiShape::Object(fields) => fields,
            _ => return Err(ExecutionError::InvalidType(ty.name.clone()).into()),
        };
        let raw = self.lift_fields(ptr, &fields)?;

        let mut reader = BufReader::new(&raw);
        let digit_bytes = reader.read_bytes()?;
        let n = reader.read_i32()?.max(0) as usize;
        let is_neg = reader.read_bool()?;
        let digits: Vec<u32> = digit_bytes
            .chunks_exact(4)
            .take(n)
            .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();

        writer
            .write_bool(is_neg)
            .write_bytes(&BigUint::new(digits).to_bytes_le());
        Ok(())
    }

    fn lift_abi_type(&self, ptr: u32, ty: &TypeNode, writer: &mut BufWriter) -> Result<(), RuntimeError> {
        match abi_shape(self.mem.abi(), ty)? {
            AbiShape::Jig(fields) => {
                // Output and lock are kept by the host, only the state is extracted.
                let state = fields.get(BASE_JIG_FIELDS.len()..).unwrap_or_default();
                writer.write_fixed_bytes(&self.lift_fields(ptr, state)?);
            }
            AbiShape::Object(fields) => {
                writer.write_fixed_bytes(&self.lift_fields(ptr, &fields)?);
            }
            AbiShape::Proxy => {
                let output = self.mem.read_u32(ptr)?;
                let origin = self.mem.read_u32(output)?;
                let origin = self.mem.read_buffer(origin)?;
                writer.write_fixed_bytes(&Pointer::from_bytes(&origin)?.to_bytes());
            }
        }
        Ok(())
    }

    fn lift_fields(&self, ptr: u32, fields: &[AbiField]) -> Result<Vec<u8>, RuntimeError> {
        let mut writer = BufWriter::new();
        for field in fields {
            let word = self.mem.read_word(ptr_at(ptr, field.offset)?, &field.ty)?;
            self.lift_into(word, &field.ty, &mut writer)?;
        }
        Ok(writer.into_bytes())
    }
}
