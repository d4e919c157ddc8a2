use super::*;
use crate::abi::*;
use crate::errors::*;
use crate::types::*;

/// The linear memory of a container, plus the few exports marshalling depends on.
///
/// Blocks allocated with `malloc` carry a header: the runtime id 8 bytes before the block and the
/// block size 4 bytes before it.
pub trait ContainerMemory {
    fn abi(&self) -> &AbiAccess;

    fn read(&self, ptr: u32, len: usize) -> Result<Vec<u8>, RuntimeError>;

    fn write(&mut self, ptr: u32, bytes: &[u8]) -> Result<(), RuntimeError>;

    /// Allocates a block of `size` bytes through the container's own allocator.
    fn malloc(&mut self, size: u32, rtid: u32) -> Result<u32, RuntimeError>;

    /// Invokes an export of the container, discarding its result.
    fn call_export(&mut self, name: &str, args: &[(WasmWord, TypeNode)])
        -> Result<(), RuntimeError>;

    /// Output and lock of the jig with the given origin, live or in storage.
    fn jig_data(&self, origin: &Pointer) -> Result<JigData, RuntimeError>;

    fn read_word(&self, ptr: u32, ty: &TypeNode) -> Result<WasmWord, RuntimeError> {
        let bytes = self.read(ptr, ty.own_size() as usize)?;
        Ok(WasmWord::from_bytes(&bytes))
    }

    fn write_word(&mut self, ptr: u32, word: WasmWord, ty: &TypeNode) -> Result<(), RuntimeError> {
        self.write(ptr, word.serialize(ty))
    }

    fn read_u32(&self, ptr: u32) -> Result<u32, RuntimeError> {
        let bytes = self.read(ptr, 4)?;
        Ok(WasmWord::from_bytes(&bytes).to_u32())
    }

    fn write_u32(&mut self, ptr: u32, value: u32) -> Result<(), RuntimeError> {
        self.write(ptr, &value.to_le_bytes())
    }

    fn block_rtid(&self, ptr: u32) -> Result<u32, RuntimeError> {
        let header = ptr
            .checked_sub(8)
            .ok_or(ExecutionError::MemoryAccess { ptr, len: 8 })?;
        self.read_u32(header)
    }

    fn block_size(&self, ptr: u32) -> Result<u32, RuntimeError> {
        let header = ptr
            .checked_sub(4)
            .ok_or(ExecutionError::MemoryAccess { ptr, len: 4 })?;
        self.read_u32(header)
    }

    /// The whole content of a block.
    fn read_block(&self, ptr: u32) -> Result<Vec<u8>, RuntimeError> {
        let size = self.block_size(ptr)?;
        self.read(ptr, size as usize)
    }

    /// The content of an `ArrayBuffer`.
    fn read_buffer(&self, ptr: u32) -> Result<Vec<u8>, RuntimeError> {
        let rtid = self.block_rtid(ptr)?;
        if rtid != BUF_RTID {
            return Err(ExecutionError::InvalidBufferRtid { ptr, rtid }.into());
        }
        self.read_block(ptr)
    }

    fn read_string(&self, ptr: u32) -> Result<String, RuntimeError> {
        let bytes = self.read_block(ptr)?;
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
            .collect();
        String::from_utf16(&units).map_err(|_| ExecutionError::InvalidUtf16(ptr).into())
    }

    fn alloc_block(&mut self, bytes: &[u8], rtid: u32) -> Result<u32, RuntimeError> {
        let ptr = self.malloc(bytes.len() as u32, rtid)?;
        self.write(ptr, bytes)?;
        Ok(ptr)
    }

    fn alloc_buffer(&mut self, bytes: &[u8]) -> Result<u32, RuntimeError> {
        self.alloc_block(bytes, BUF_RTID)
    }

    fn alloc_string(&mut self, value: &str) -> Result<u32, RuntimeError> {
        let bytes: Vec<u8> = value
            .encode_utf16()
            .flat_map(|unit| unit.to_le_bytes())
            .collect();
        self.alloc_block(&bytes, STRING_RTID)
    }
}
