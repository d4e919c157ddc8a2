use super::*;
use crate::abi::*;
use crate::errors::*;
use crate::types::*;
use num_bigint::BigUint;

/// Builds values inside a container from their wire form.
pub struct LowerValue<'m, M: ContainerMemory + ?Sized> {
    mem: &'m mut M,
}

impl<'m, M: ContainerMemory + ?Sized> LowerValue<'m, M> {
    pub fn new(mem: &'m mut M) -> Self {
        Self { mem }
    }

    /// Lowers a single value. A jig (`*Name`) must take the whole buffer.
    pub fn lower(&mut self, bytes: &[u8], ty: &TypeNode) -> Result<WasmWord, RuntimeError> {
        let mut reader = BufReader::new(bytes);
        let word = self.lower_from_reader(&mut reader, ty)?;
        if ty.is_jig_state() {
            reader.expect_end()?;
        }
        Ok(word)
    }

    pub fn lower_from_reader(
        &mut self,
        reader: &mut BufReader,
        ty: &TypeNode,
    ) -> Result<WasmWord, RuntimeError> {
        if ty.nullable {
            return match reader.read_u8()? {
                0 => Ok(WasmWord::null()),
                _ => self.lower_from_reader(reader, &ty.to_present()),
            };
        }

        let word = match ty.name.as_str() {
            "bool" => WasmWord::from_bool(reader.read_bool()?),
            "u8" => WasmWord::from_u8(reader.read_u8()?),
            "i8" => WasmWord::from_i8(reader.read_i8()?),
            "u16" => WasmWord::from_u16(reader.read_u16()?),
            "i16" => WasmWord::from_i16(reader.read_i16()?),
            "u32" | "usize" => WasmWord::from_u32(reader.read_u32()?),
            "i32" | "isize" => WasmWord::from_i32(reader.read_i32()?),
            "u64" => WasmWord::from_u64(reader.read_u64()?),
            "i64" => WasmWord::from_i64(reader.read_i64()?),
            "f32" => WasmWord::from_f32(reader.read_f32()?),
            "f64" => WasmWord::from_f64(reader.read_f64()?),
            "string" => {
                let value = reader.read_str()?;
                WasmWord::from_u32(self.mem.alloc_string(value)?)
            }
            "ArrayBuffer" => {
                let bytes = reader.read_bytes()?;
                WasmWord::from_u32(self.mem.alloc_buffer(bytes)?)
            }
            "Array" => self.lower_array(reader, ty)?,
            "StaticArray" => self.lower_static_array(reader, ty)?,
            "Set" => self.lower_set(reader, ty)?,
            "Map" => self.lower_map(reader, ty)?,
            "BigInt" => self.lower_big_int(reader, ty)?,
            name if is_typed_array(name) => self.lower_typed_array(reader, ty)?,
            _ => self.lower_abi_type(reader, ty)?,
        };
        Ok(word)
    }

    fn lower_seq(
        &mut self,
        reader: &mut BufReader,
        elem_ty: &TypeNode,
    ) -> Result<Vec<WasmWord>, RuntimeError> {
        let count = reader.read_uleb()?;
        (0..count)
            .map(|_| self.lower_from_reader(reader, elem_ty))
            .collect()
    }

    fn write_elements(
        &mut self,
        ptr: u32,
        words: &[WasmWord],
        elem_ty: &TypeNode,
    ) -> Result<(), RuntimeError> {
        let size = elem_ty.own_size();
        for (i, word) in words.iter().enumerate() {
            self.mem.write_word(element_at(ptr, i as u32, size)?, *word, elem_ty)?;
        }
        Ok(())
    }

    fn lower_array(
        &mut self,
        reader: &mut BufReader,
        ty: &TypeNode,
    ) -> Result<WasmWord, RuntimeError> {
        let elem_ty = type_arg(ty, 0)?;
        let words = self.lower_seq(reader, elem_ty)?;
        let byte_len = elem_ty.own_size() * words.len() as u32;

        let buf = self.mem.malloc(byte_len, BUF_RTID)?;
        self.write_elements(buf, &words, elem_ty)?;

        let rtid = self.mem.abi().rtid_of(ty)?;
        let ptr = self.mem.malloc(ARRAY_HEADER_SIZE, rtid)?;
        self.mem.write_u32(ptr, buf)?;
        self.mem.write_u32(ptr_at(ptr, 4)?, buf)?;
        self.mem.write_u32(ptr_at(ptr, 8)?, byte_len)?;
        self.mem.write_u32(ptr_at(ptr, 12)?, words.len() as u32)?;
        Ok(WasmWord::from_u32(ptr))
    }

    fn lower_static_array(
        &mut self,
        reader: &mut BufReader,
        ty: &TypeNode,
    ) -> Result<WasmWord, RuntimeError> {
        let elem_ty = type_arg(ty, 0)?;
        let words = self.lower_seq(reader, elem_ty)?;
        let byte_len = elem_ty.own_size() * words.len() as u32;

        let rtid = self.mem.abi().rtid_of(ty)?;
        let ptr = self.mem.malloc(byte_len, rtid)?;
        self.write_elements(ptr, &words, elem_ty)?;
        Ok(WasmWord::from_u32(ptr))
    }

    fn lower_typed_array(
        &mut self,
        reader: &mut BufReader,
        ty: &TypeNode,
    ) -> Result<WasmWord, RuntimeError> {
        let bytes = reader.read_bytes()?;
        let buf = self.mem.alloc_buffer(bytes)?;

        let rtid = self.mem.abi().rtid_of(ty)?;
        let ptr = self.mem.malloc(TYPED_ARRAY_HEADER_SIZE, rtid)?;
        self.mem.write_u32(ptr, buf)?;
        self.mem.write_u32(ptr_at(ptr, 4)?, buf)?;
        self.mem.write_u32(ptr_at(ptr, 8)?, bytes.len() as u32)?;
        Ok(WasmWord::from_u32(ptr))
    }

    /// An empty map or set. Entries are added by the container itself.
    fn alloc_collection(&mut self, ty: &TypeNode, layout: EntryLayout) -> Result<u32, RuntimeError> {
        let buckets = self.mem.alloc_buffer(&[0u8; 16])?;
        let entries_len = (COLLECTION_INITIAL_CAPACITY * layout.size) as usize;
        let entries = self.mem.alloc_buffer(&vec![0u8; entries_len])?;

        let rtid = self.mem.abi().rtid_of(ty)?;
        let ptr = self.mem.malloc(COLLECTION_HEADER_SIZE, rtid)?;
        self.mem.write_u32(ptr, buckets)?;
        self.mem.write_u32(ptr_at(ptr, 4)?, COLLECTION_INITIAL_CAPACITY - 1)?;
        self.mem.write_u32(ptr_at(ptr, 8)?, entries)?;
        self.mem.write_u32(ptr_at(ptr, 12)?, COLLECTION_INITIAL_CAPACITY)?;
        self.mem.write_u32(ptr_at(ptr, 16)?, 0)?;
        self.mem.write_u32(ptr_at(ptr, 20)?, 0)?;
        Ok(ptr)
    }

    fn lower_set(&mut self, reader: &mut BufReader, ty: &TypeNode) -> Result<WasmWord, RuntimeError> {
        let elem_ty = type_arg(ty, 0)?;
        let ptr = self.alloc_collection(ty, EntryLayout::of(elem_ty, None))?;
        let put_fn = put_entry_fn_name(ty);

        let count = reader.read_uleb()?;
        for _ in 0..count {
            let elem = self.lower_from_reader(reader, elem_ty)?;
            self.mem.call_export(
                &put_fn,
                &[
                    (WasmWord::from_u32(ptr), TypeNode::simple("u32")),
                    (elem, elem_ty.clone()),
                ],
            )?;
        }
        Ok(WasmWord::from_u32(ptr))
    }

    fn lower_map(&mut self, reader: &mut BufReader, ty: &TypeNode) -> Result<WasmWord, RuntimeError> {
        let key_ty = type_arg(ty, 0)?;
        let value_ty = type_arg(ty, 1)?;
        let ptr = self.alloc_collection(ty, EntryLayout::of(key_ty, Some(value_ty)))?;
        let put_fn = put_entry_fn_name(ty);

        let count = reader.read_uleb()?;
        for _ in 0..count {
            let key = self.lower_from_reader(reader, key_ty)?;
            let value = self.lower_from_reader(reader, value_ty)?;
            self.mem.call_export(
                &put_fn,
                &[
                    (WasmWord::from_u32(ptr), TypeNode::simple("u32")),
                    (key, key_ty.clone()),
                    (value, value_ty.clone()),
                ],
            )?;
        }
        Ok(WasmWord::from_u32(ptr))
    }

    /// Wire form: sign flag and little endian magnitude. In memory: `{d: Uint32Array, n, isNeg}`.
    fn lower_big_int(
        &mut self,
        reader: &mut BufReader,
        ty: &TypeNode,
    ) -> Result<WasmWord, RuntimeError> {
        let is_neg = reader.read_bool()?;
        let magnitude = BigUint::from_bytes_le(reader.read_bytes()?);
        let digits = magnitude.to_u32_digits();
        let digit_bytes: Vec<u8> = digits.iter().flat_map(|d| d.to_le_bytes()).collect();

        let mut writer = BufWriter::new();
        writer
            .write_bytes(&digit_bytes)
            .write_i32(digits.len() as i32)
            .write_bool(is_neg);
        let bytes = writer.into_bytes();
        self.lower_abi_type(&mut BufReader::new(&bytes), ty)
    }

    fn lower_abi_type(
        &mut self,
        reader: &mut BufReader,
        ty: &TypeNode,
    ) -> Result<WasmWord, RuntimeError> {
        match abi_shape(self.mem.abi(), ty)? {
            AbiShape::Jig(fields) | AbiShape::Object(fields) => {
                self.lower_object(reader, &fields, ty)
            }
            AbiShape::Proxy => self.lower_proxy(reader, ty),
        }
    }

    fn lower_object(
        &mut self,
        reader: &mut BufReader,
        fields: &[AbiField],
        ty: &TypeNode,
    ) -> Result<WasmWord, RuntimeError> {
        let words = fields
            .iter()
            .map(|field| self.lower_from_reader(reader, &field.ty))
            .collect::<Result<Vec<_>, _>>()?;

        let rtid = self.mem.abi().rtid_of(ty)?;
        let ptr = self.mem.malloc(object_size(fields), rtid)?;
        for (field, word) in fields.iter().zip(words) {
            self.mem.write_word(ptr_at(ptr, field.offset)?, word, &field.ty)?;
        }
        Ok(WasmWord::from_u32(ptr))
    }

    /// Wire form: the origin of the jig. In memory: `{$output, $lock}` of the jig.
    fn lower_proxy(&mut self, reader: &mut BufReader, ty: &TypeNode) -> Result<WasmWord, RuntimeError> {
        let origin = Pointer::read(reader)?;
        let jig_data = self.mem.jig_data(&origin)?;

        let mut writer = BufWriter::new();
        jig_data.write(&mut writer);
        let bytes = writer.into_bytes();
        let mut jig_reader = BufReader::new(&bytes);
        let output = self.lower_from_reader(&mut jig_reader, &output_type())?;
        let lock = self.lower_from_reader(&mut jig_reader, &TypeNode::simple(LOCK_TYPE_NAME))?;

        let rtid = self.mem.abi().rtid_of(ty)?;
        let ptr = self.mem.malloc(8, rtid)?;
        self.mem.write_u32(ptr, output.to_u32())?;
        self.mem.write_u32(ptr_at(ptr, 4)?, lock.to_u32())?;
        Ok(WasmWord::from_u32(ptr))
    }
}
