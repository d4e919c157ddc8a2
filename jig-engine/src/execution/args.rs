use super::executor::Executor;
use crate::abi::*;
use crate::errors::*;
use crate::memory::*;
use crate::types::*;

/// Turns the argument buffer of an instruction into the plain wire form of its arguments.
///
/// The buffer starts with the positions of the arguments taken from earlier statements. Those
/// arguments, and every jig nested inside the others, are `u16` statement indexes that get
/// replaced by the value they point to.
pub(crate) struct ArgsTranslator<'e, 'a> {
    exec: &'e mut Executor<'a>,
    abi: Arc<AbiAccess>,
}

impl<'e, 'a> ArgsTranslator<'e, 'a> {
    pub fn new(exec: &'e mut Executor<'a>, abi: Arc<AbiAccess>) -> Self {
        Self { exec, abi }
    }

    pub fn translate(&mut self, args: &[ArgNode], bytes: &[u8]) -> Result<Vec<u8>, RuntimeError> {
        let mut reader = BufReader::new(bytes);
        let refs = reader.read_seq(|r| r.read_u8())?;

        let mut writer = BufWriter::with_capacity(bytes.len());
        for (position, arg) in args.iter().enumerate() {
            if refs.contains(&(position as u8)) {
                let stmt_idx = reader.read_u16()?;
                let value = self.exec.stmt_value_bytes(stmt_idx, &arg.ty)?;
                writer.write_fixed_bytes(&value);
            } else {
                self.translate_value(&mut reader, &arg.ty, &mut writer)?;
            }
        }
        reader.expect_end()?;
        Ok(writer.into_bytes())
    }

    fn translate_value(
        &mut self,
        reader: &mut BufReader,
        ty: &TypeNode,
        writer: &mut BufWriter,
    ) -> Result<(), RuntimeError> {
        if ty.nullable {
            let present = reader.read_u8()?;
            writer.write_u8(present);
            if present == 0 {
                return Ok(());
            }
            return self.translate_value(reader, &ty.to_present(), writer);
        }

        match ty.name.as_str() {
            "bool" | "u8" | "i8" | "u16" | "i16" | "u32" | "i32" | "usize" | "isize" | "u64"
            | "i64" | "f32" | "f64" => {
                writer.write_fixed_bytes(reader.read_fixed_bytes(ty.own_size() as usize)?);
            }
            "string" | "ArrayBuffer" => {
                writer.write_bytes(reader.read_bytes()?);
            }
            name if is_typed_array(name) => {
                writer.write_bytes(reader.read_bytes()?);
            }
            "Array" | "StaticArray" | "Set" => {
                let elem_ty = type_arg(ty, 0)?.clone();
                let count = reader.read_uleb()?;
                writer.write_uleb(count);
                for _ in 0..count {
                    self.translate_value(reader, &elem_ty, writer)?;
                }
            }
            "Map" => {
                let key_ty = type_arg(ty, 0)?.clone();
                let value_ty = type_arg(ty, 1)?.clone();
                let count = reader.read_uleb()?;
                writer.write_uleb(count);
                for _ in 0..count {
                    self.translate_value(reader, &key_ty, writer)?;
                    self.translate_value(reader, &value_ty, writer)?;
                }
            }
            "BigInt" => {
                writer
                    .write_bool(reader.read_bool()?)
                    .write_bytes(reader.read_bytes()?);
            }
            _ => match abi_shape(&self.abi, ty)? {
                AbiShape::Object(fields) => {
                    for field in &fields {
                        self.translate_value(reader, &field.ty, writer)?;
                    }
                }
                AbiShape::Proxy => {
                    let stmt_idx = reader.read_u16()?;
                    let origin = self.exec.stmt_origin(stmt_idx)?;
                    writer.write_fixed_bytes(&origin.to_bytes());
                }
                AbiShape::Jig(_) => return Err(ExecutionError::InvalidType(ty.name.clone()).into()),
            },
        }
        Ok(())
    }
}
