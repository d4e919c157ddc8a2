use super::*;
use crate::abi::*;
use crate::errors::*;
use crate::types::*;

/// A container memory living in the host: a bump allocator over a byte vector, with the map and
/// set helpers emulated the way compiled contracts implement them.
pub struct TestMemory {
    abi: AbiAccess,
    bytes: Vec<u8>,
    next: u32,
    jigs: HashMap<Pointer, JigData>,
}

impl TestMemory {
    pub fn new(abi: AbiAccess) -> Self {
        Self {
            abi,
            bytes: vec![0u8; 1024],
            next: 16,
            jigs: HashMap::new(),
        }
    }

    pub fn add_jig(&mut self, data: JigData) {
        self.jigs.insert(data.origin, data);
    }

    fn put_entry(&mut self, args: &[(WasmWord, TypeNode)]) -> Result<(), RuntimeError> {
        let ptr = args[0].0.to_u32();
        let (key, key_ty) = &args[1];
        let value = args.get(2);
        let layout = EntryLayout::of(key_ty, value.map(|(_, ty)| ty));

        let mut entries = self.read_u32(ptr + 8)?;
        let capacity = self.read_u32(ptr + 12)?;
        let offset = self.read_u32(ptr + 16)?;
        if offset == capacity {
            let old = self.read(entries, (capacity * layout.size) as usize)?;
            let mut grown = old.clone();
            grown.resize(old.len() * 2, 0);
            entries = self.alloc_buffer(&grown)?;
            self.write_u32(ptr + 8, entries)?;
            self.write_u32(ptr + 12, capacity * 2)?;
        }

        let entry = entries + offset * layout.size;
        self.write_word(entry, *key, key_ty)?;
        if let Some((value, value_ty)) = value {
            self.write_word(entry + layout.value_offset, *value, value_ty)?;
        }
        self.write_u32(entry + layout.tag_offset, 0)?;
        self.write_u32(ptr + 16, offset + 1)?;
        let count = self.read_u32(ptr + 20)?;
        self.write_u32(ptr + 20, count + 1)
    }
}

impl ContainerMemory for TestMemory {
    fn abi(&self) -> &AbiAccess {
        &self.abi
    }

    fn read(&self, ptr: u32, len: usize) -> Result<Vec<u8>, RuntimeError> {
        let start = ptr as usize;
        self.bytes
            .get(start..start + len)
            .map(|bytes| bytes.to_vec())
            .ok_or_else(|| ExecutionError::MemoryAccess { ptr, len }.into())
    }

    fn write(&mut self, ptr: u32, bytes: &[u8]) -> Result<(), RuntimeError> {
        let start = ptr as usize;
        let len = bytes.len();
        self.bytes
            .get_mut(start..start + len)
            .ok_or(ExecutionError::MemoryAccess { ptr, len })?
            .copy_from_slice(bytes);
        Ok(())
    }

    fn malloc(&mut self, size: u32, rtid: u32) -> Result<u32, RuntimeError> {
        let ptr = align_to(self.next + 8, 8);
        self.next = ptr + size;
        if self.bytes.len() < self.next as usize {
            self.bytes.resize(self.next as usize * 2, 0);
        }
        self.write_u32(ptr - 8, rtid)?;
        self.write_u32(ptr - 4, size)?;
        Ok(ptr)
    }

    fn call_export(&mut self, name: &str, args: &[(WasmWord, TypeNode)]) -> Result<(), RuntimeError> {
        if name.starts_with("__put_") {
            self.put_entry(args)
        } else {
            Err(ExecutionError::UnknownExport(name.to_string()).into())
        }
    }

    fn jig_data(&self, origin: &Pointer) -> Result<JigData, RuntimeError> {
        self.jigs
            .get(origin)
            .cloned()
            .ok_or_else(|| ExecutionError::MissingReferencedOutput(*origin).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABI: &str = r#"{
        "version": 1,
        "exports": [0, 1, 2],
        "imports": [],
        "defs": [
            {
                "kind": "class",
                "name": "Counter",
                "extends": "Jig",
                "fields": [
                    { "name": "count", "type": { "name": "u32" } },
                    { "name": "label", "type": { "name": "string" } }
                ],
                "methods": []
            },
            { "kind": "object", "name": "Point", "fields": [{ "name": "x", "type": { "name": "u8" } }, { "name": "y", "type": { "name": "u32" } }] },
            {
                "kind": "object",
                "name": "Bag",
                "fields": [
                    { "name": "tags", "type": { "name": "Set", "args": [{ "name": "u16" }] } },
                    { "name": "counts", "type": { "name": "Map", "args": [{ "name": "string" }, { "name": "u32" }] } }
                ]
            }
        ],
        "typeIds": [
            { "id": 10, "name": "Counter" },
            { "id": 11, "name": "Point" },
            { "id": 12, "name": "Array<u32>" },
            { "id": 13, "name": "Map<string,u32>" },
            { "id": 14, "name": "Set<u16>" },
            { "id": 15, "name": "Output" },
            { "id": 16, "name": "Lock" },
            { "id": 17, "name": "BigInt" },
            { "id": 18, "name": "Uint32Array" },
            { "id": 19, "name": "StaticArray<u16>" },
            { "id": 20, "name": "Array<Point | null>" },
            { "id": 21, "name": "Array<Array<u32>>" },
            { "id": 22, "name": "Array<u8>" },
            { "id": 23, "name": "Map<string,Array<u8>>" },
            { "id": 24, "name": "Bag" }
        ]
    }"#;

    fn memory() -> TestMemory {
        TestMemory::new(AbiAccess::new(abi_from_json(ABI).unwrap()).unwrap())
    }

    fn ty(name: &str) -> TypeNode {
        TypeNode::simple(name)
    }

    fn generic(name: &str, args: &[&str]) -> TypeNode {
        TypeNode::generic(name, args.iter().map(|arg| ty(arg)).collect())
    }

    fn lower(mem: &mut TestMemory, bytes: &[u8], ty: &TypeNode) -> Result<WasmWord, RuntimeError> {
        LowerValue::new(mem).lower(bytes, ty)
    }

    fn lift(mem: &TestMemory, word: WasmWord, ty: &TypeNode) -> Vec<u8> {
        LiftValue::new(mem).lift(word, ty).unwrap()
    }

    #[test]
    fn test_numbers_stay_in_the_word() {
        let mut mem = memory();
        let word = lower(&mut mem, &300u16.to_le_bytes(), &ty("u16")).unwrap();
        assert_eq!(word.to_u16(), 300);
        assert_eq!(lift(&mem, word, &ty("u16")), 300u16.to_le_bytes());

        let word = lower(&mut mem, &[1], &ty("bool")).unwrap();
        assert!(word.to_bool());
    }

    #[test]
    fn test_string_is_utf16_block() {
        let mut mem = memory();
        let mut writer = BufWriter::new();
        writer.write_str("hé");
        let bytes = writer.into_bytes();

        let ptr = lower(&mut mem, &bytes, &ty("string")).unwrap().to_u32();
        assert_eq!(mem.block_rtid(ptr).unwrap(), STRING_RTID);
        assert_eq!(mem.block_size(ptr).unwrap(), 4);
        assert_eq!(mem.read(ptr, 4).unwrap(), vec![b'h', 0, 0xe9, 0]);
        assert_eq!(lift(&mem, WasmWord::from_u32(ptr), &ty("string")), bytes);
    }

    #[test]
    fn test_array_header() {
        let mut mem = memory();
        let mut writer = BufWriter::new();
        writer.write_uleb(3).write_u32(7).write_u32(8).write_u32(9);
        let bytes = writer.into_bytes();
        let array = generic("Array", &["u32"]);

        let ptr = lower(&mut mem, &bytes, &array).unwrap().to_u32();
        assert_eq!(mem.block_rtid(ptr).unwrap(), 12);
        let buf = mem.read_u32(ptr).unwrap();
        assert_eq!(mem.read_u32(ptr + 4).unwrap(), buf);
        assert_eq!(mem.read_u32(ptr + 8).unwrap(), 12);
        assert_eq!(mem.read_u32(ptr + 12).unwrap(), 3);
        assert_eq!(mem.read_u32(buf + 8).unwrap(), 9);
        assert_eq!(lift(&mem, WasmWord::from_u32(ptr), &array), bytes);
    }

    #[test]
    fn test_static_array_count_comes_from_block_size() {
        let mut mem = memory();
        let mut writer = BufWriter::new();
        writer.write_uleb(2).write_u16(1).write_u16(2);
        let bytes = writer.into_bytes();
        let array = generic("StaticArray", &["u16"]);

        let ptr = lower(&mut mem, &bytes, &array).unwrap().to_u32();
        assert_eq!(mem.block_size(ptr).unwrap(), 4);
        assert_eq!(lift(&mem, WasmWord::from_u32(ptr), &array), bytes);
    }

    #[test]
    fn test_nullable_objects_in_array() {
        let mut mem = memory();
        let mut writer = BufWriter::new();
        writer
            .write_uleb(2)
            .write_u8(1)
            .write_u8(3)
            .write_u32(40)
            .write_u8(0);
        let bytes = writer.into_bytes();
        let array = TypeNode::generic("Array", vec![ty("Point").nullable()]);

        let ptr = lower(&mut mem, &bytes, &array).unwrap().to_u32();
        let buf = mem.read_u32(ptr).unwrap();
        let point = mem.read_u32(buf).unwrap();
        assert_eq!(mem.block_rtid(point).unwrap(), 11);
        assert_eq!(mem.read_u32(point + 4).unwrap(), 40);
        assert_eq!(mem.read_u32(buf + 4).unwrap(), 0);
        assert_eq!(lift(&mem, WasmWord::from_u32(ptr), &array), bytes);
    }

    #[test]
    fn test_map_goes_through_put_entry_and_skips_deleted() {
        let mut mem = memory();
        let map = generic("Map", &["string", "u32"]);
        let mut writer = BufWriter::new();
        writer.write_uleb(5);
        for (i, key) in ["a", "b", "c", "d", "e"].iter().enumerate() {
            writer.write_str(key).write_u32(i as u32);
        }
        let bytes = writer.into_bytes();

        let ptr = lower(&mut mem, &bytes, &map).unwrap().to_u32();
        assert_eq!(mem.read_u32(ptr + 12).unwrap(), 8);
        assert_eq!(mem.read_u32(ptr + 20).unwrap(), 5);
        assert_eq!(lift(&mem, WasmWord::from_u32(ptr), &map), bytes);

        // Delete "b".
        let layout = EntryLayout::of(&ty("string"), Some(&ty("u32")));
        let entries = mem.read_u32(ptr + 8).unwrap();
        mem.write_u32(entries + layout.size + layout.tag_offset, 1).unwrap();

        let mut writer = BufWriter::new();
        writer.write_uleb(4);
        for (key, value) in [("a", 0u32), ("c", 2), ("d", 3), ("e", 4)] {
            writer.write_str(key).write_u32(value);
        }
        assert_eq!(lift(&mem, WasmWord::from_u32(ptr), &map), writer.into_bytes());
    }

    #[test]
    fn test_set() {
        let mut mem = memory();
        let set = generic("Set", &["u16"]);
        let mut writer = BufWriter::new();
        writer.write_uleb(2).write_u16(5).write_u16(6);
        let bytes = writer.into_bytes();

        let ptr = lower(&mut mem, &bytes, &set).unwrap().to_u32();
        assert_eq!(mem.block_rtid(ptr).unwrap(), 14);
        assert_eq!(lift(&mem, WasmWord::from_u32(ptr), &set), bytes);
    }

    #[test]
    fn test_nested_arrays() {
        let mut mem = memory();
        let mut writer = BufWriter::new();
        writer
            .write_uleb(3)
            .write_uleb(2)
            .write_u32(1)
            .write_u32(2)
            .write_uleb(0)
            .write_uleb(1)
            .write_u32(3);
        let bytes = writer.into_bytes();
        let array = TypeNode::generic("Array", vec![generic("Array", &["u32"])]);

        let ptr = lower(&mut mem, &bytes, &array).unwrap().to_u32();
        assert_eq!(mem.block_rtid(ptr).unwrap(), 21);
        let buf = mem.read_u32(ptr).unwrap();
        let first = mem.read_u32(buf).unwrap();
        assert_eq!(mem.block_rtid(first).unwrap(), 12);
        assert_eq!(mem.read_u32(first + 12).unwrap(), 2);
        assert_eq!(lift(&mem, WasmWord::from_u32(ptr), &array), bytes);
    }

    #[test]
    fn test_map_of_arrays() {
        let mut mem = memory();
        let map = TypeNode::generic("Map", vec![ty("string"), generic("Array", &["u8"])]);
        let mut writer = BufWriter::new();
        writer
            .write_uleb(2)
            .write_str("a")
            .write_uleb(2)
            .write_u8(1)
            .write_u8(2)
            .write_str("b")
            .write_uleb(0);
        let bytes = writer.into_bytes();

        let ptr = lower(&mut mem, &bytes, &map).unwrap().to_u32();
        assert_eq!(mem.block_rtid(ptr).unwrap(), 23);
        assert_eq!(mem.read_u32(ptr + 20).unwrap(), 2);
        assert_eq!(lift(&mem, WasmWord::from_u32(ptr), &map), bytes);
    }

    #[test]
    fn test_collections_inside_object() {
        let mut mem = memory();
        let mut writer = BufWriter::new();
        writer
            .write_uleb(2)
            .write_u16(5)
            .write_u16(9)
            .write_uleb(1)
            .write_str("x")
            .write_u32(1);
        let bytes = writer.into_bytes();

        let ptr = lower(&mut mem, &bytes, &ty("Bag")).unwrap().to_u32();
        assert_eq!(mem.block_rtid(ptr).unwrap(), 24);
        let tags = mem.read_u32(ptr).unwrap();
        assert_eq!(mem.block_rtid(tags).unwrap(), 14);
        let counts = mem.read_u32(ptr + 4).unwrap();
        assert_eq!(mem.block_rtid(counts).unwrap(), 13);
        assert_eq!(lift(&mem, WasmWord::from_u32(ptr), &ty("Bag")), bytes);
    }

    #[test]
    fn test_nullable_string() {
        let mut mem = memory();
        let nullable = ty("string").nullable();

        let word = lower(&mut mem, &[0], &nullable).unwrap();
        assert!(word.is_null());
        assert_eq!(lift(&mem, word, &nullable), vec![0]);

        let mut writer = BufWriter::new();
        writer.write_u8(1).write_str("hi");
        let bytes = writer.into_bytes();
        let word = lower(&mut mem, &bytes, &nullable).unwrap();
        assert_eq!(mem.block_rtid(word.to_u32()).unwrap(), STRING_RTID);
        assert_eq!(lift(&mem, word, &nullable), bytes);
    }

    #[test]
    fn test_truncated_value_is_a_decode_error() {
        let mut mem = memory();
        let err = lower(&mut mem, &[1, 2], &ty("u32")).unwrap_err();
        assert_eq!(
            err,
            RuntimeError::ExecutionError(ExecutionError::DecodeError(
                DecodeError::BufferOverflow {
                    needed: 4,
                    remaining: 2
                }
            ))
        );
    }

    #[test]
    fn test_addresses_past_the_end_of_memory_fail() {
        let mem = memory();
        let array = generic("Array", &["u32"]);

        let err = LiftValue::new(&mem)
            .lift(WasmWord::from_u32(0xFFFF_FFFD), &array)
            .unwrap_err();
        assert_eq!(
            err,
            RuntimeError::ExecutionError(ExecutionError::MemoryAccess {
                ptr: 0xFFFF_FFFD,
                len: 4
            })
        );

        let err = LiftValue::new(&mem)
            .lift(WasmWord::from_u32(u32::MAX), &ty("*Counter"))
            .unwrap_err();
        assert_eq!(
            err,
            RuntimeError::ExecutionError(ExecutionError::MemoryAccess {
                ptr: u32::MAX,
                len: 8
            })
        );
    }

    #[test]
    fn test_element_addresses_do_not_wrap() {
        assert_eq!(element_at(100, 3, 4), Ok(112));
        assert_eq!(
            element_at(0xFFFF_FFF0, 4, 4),
            Err(ExecutionError::MemoryAccess {
                ptr: 0xFFFF_FFF0,
                len: 16
            })
        );
        assert_eq!(
            element_at(16, u32::MAX, 2),
            Err(ExecutionError::MemoryAccess {
                ptr: 16,
                len: u32::MAX as usize * 2
            })
        );
    }

    #[test]
    fn test_big_int_digits() {
        let mut mem = memory();
        let value: u64 = 0x1_0000_0002;
        let magnitude = num_bigint::BigUint::from(value).to_bytes_le();
        let mut writer = BufWriter::new();
        writer.write_bool(true).write_bytes(&magnitude);
        let bytes = writer.into_bytes();

        let ptr = lower(&mut mem, &bytes, &ty("BigInt")).unwrap().to_u32();
        assert_eq!(mem.read_u32(ptr + 4).unwrap(), 2);
        assert_eq!(mem.read(ptr + 8, 1).unwrap(), vec![1]);
        let digits = mem.read_u32(ptr).unwrap();
        let digits_buf = mem.read_u32(digits).unwrap();
        assert_eq!(mem.read_u32(digits_buf).unwrap(), 2);
        assert_eq!(mem.read_u32(digits_buf + 4).unwrap(), 1);
        assert_eq!(lift(&mem, WasmWord::from_u32(ptr), &ty("BigInt")), bytes);
    }

    fn jig_data() -> JigData {
        JigData {
            origin: Pointer::new([1u8; 32], 0),
            location: Pointer::new([2u8; 32], 1),
            class_ptr: Pointer::new([3u8; 32], 0),
            lock: Lock::anyone(),
        }
    }

    #[test]
    fn test_jig_lift_extracts_state_only() {
        let mut mem = memory();
        let output = Output {
            origin: jig_data().origin,
            location: jig_data().location,
            class_ptr: jig_data().class_ptr,
            lock: Lock::anyone(),
            state: {
                let mut writer = BufWriter::new();
                writer.write_u32(42).write_str("hits");
                writer.into_bytes()
            },
            created_at: 0,
        };

        let jig_ty = ty("*Counter");
        let ptr = lower(&mut mem, &hydration_bytes(&output), &jig_ty)
            .unwrap()
            .to_u32();
        assert_eq!(mem.block_rtid(ptr).unwrap(), 10);
        assert_eq!(mem.read_u32(ptr + 8).unwrap(), 42);

        let output_ptr = mem.read_u32(ptr).unwrap();
        let origin_ptr = mem.read_u32(output_ptr).unwrap();
        assert_eq!(mem.read_buffer(origin_ptr).unwrap(), output.origin.to_bytes());

        assert_eq!(lift(&mem, WasmWord::from_u32(ptr), &jig_ty), output.state);
    }

    #[test]
    fn test_jig_must_take_whole_buffer() {
        let mut mem = memory();
        let mut writer = BufWriter::new();
        jig_data().write(&mut writer);
        writer.write_u32(1).write_str("x").write_u8(0);

        let err = lower(&mut mem, &writer.into_bytes(), &ty("*Counter")).unwrap_err();
        assert_eq!(
            err,
            RuntimeError::ExecutionError(ExecutionError::DecodeError(
                DecodeError::ExtraTrailingBytes(1)
            ))
        );
    }

    #[test]
    fn test_proxy_is_origin_on_the_wire() {
        let mut mem = memory();
        mem.add_jig(jig_data());
        let origin = jig_data().origin.to_bytes();

        let ptr = lower(&mut mem, &origin, &ty("Counter")).unwrap().to_u32();
        let lock_ptr = mem.read_u32(ptr + 4).unwrap();
        assert_eq!(mem.read_u32(lock_ptr + 4).unwrap() as i32, LockType::Anyone.as_i32());
        assert_eq!(lift(&mem, WasmWord::from_u32(ptr), &ty("Counter")), origin);
    }

    #[test]
    fn test_proxy_to_unknown_jig() {
        let mut mem = memory();
        let origin = Pointer::new([9u8; 32], 0);
        let err = lower(&mut mem, &origin.to_bytes(), &ty("Counter")).unwrap_err();
        assert_eq!(
            err,
            RuntimeError::ExecutionError(ExecutionError::MissingReferencedOutput(origin))
        );
    }

    #[test]
    fn test_unknown_types() {
        let mut mem = memory();
        assert!(matches!(
            lower(&mut mem, &[0], &ty("Nope")),
            Err(RuntimeError::ExecutionError(ExecutionError::UnknownType(_)))
        ));
        assert!(matches!(
            lower(&mut mem, &[0], &generic("Array", &[])),
            Err(RuntimeError::ExecutionError(ExecutionError::UnknownType(_)))
        ));
    }
}
