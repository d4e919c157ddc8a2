use crate::crypto::Address;
use crate::data::{BufReader, BufWriter, DecodeError};
use crate::types::{OutputId, PackageId, Pointer};
use std::collections::BTreeMap;
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[repr(u8)]
pub enum OpCode {
    Import = 0xa1,
    Load = 0xa2,
    LoadByOrigin = 0xa3,
    New = 0xb1,
    Call = 0xb2,
    Exec = 0xb3,
    ExecFunc = 0xb4,
    Fund = 0xc1,
    Lock = 0xc2,
    Deploy = 0xd1,
    Sign = 0xe1,
    SignTo = 0xe2,
}

impl OpCode {
    pub fn from_u8(value: u8) -> Option<Self> {
        let op = match value {
            0xa1 => OpCode::Import,
            0xa2 => OpCode::Load,
            0xa3 => OpCode::LoadByOrigin,
            0xb1 => OpCode::New,
            0xb2 => OpCode::Call,
            0xb3 => OpCode::Exec,
            0xb4 => OpCode::ExecFunc,
            0xc1 => OpCode::Fund,
            0xc2 => OpCode::Lock,
            0xd1 => OpCode::Deploy,
            0xe1 => OpCode::Sign,
            0xe2 => OpCode::SignTo,
            _ => return None,
        };
        Some(op)
    }
}

/// A transaction instruction. Indexes refer to the results of earlier instructions of the same
/// transaction; `args` are wire encoded argument buffers (see [`crate::transaction::ArgsBuilder`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Import {
        pkg_id: PackageId,
    },
    Load {
        output_id: OutputId,
    },
    LoadByOrigin {
        origin: Pointer,
    },
    New {
        pkg_idx: u16,
        class_idx: u16,
        args: Vec<u8>,
    },
    Call {
        jig_idx: u16,
        method_idx: u16,
        args: Vec<u8>,
    },
    Exec {
        pkg_idx: u16,
        class_idx: u16,
        method_idx: u16,
        args: Vec<u8>,
    },
    ExecFunc {
        pkg_idx: u16,
        fn_idx: u16,
        args: Vec<u8>,
    },
    Fund {
        coin_idx: u16,
    },
    Lock {
        jig_idx: u16,
        address: Address,
    },
    Deploy {
        entries: Vec<String>,
        sources: BTreeMap<String, String>,
    },
    Sign {
        sig: Vec<u8>,
        pubkey: Vec<u8>,
    },
    SignTo {
        sig: Vec<u8>,
        pubkey: Vec<u8>,
    },
}

impl Instruction {
    pub fn opcode(&self) -> OpCode {
        match self {
            Instruction::Import { .. } => OpCode::Import,
            Instruction::Load { .. } => OpCode::Load,
            Instruction::LoadByOrigin { .. } => OpCode::LoadByOrigin,
            Instruction::New { .. } => OpCode::New,
            Instruction::Call { .. } => OpCode::Call,
            Instruction::Exec { .. } => OpCode::Exec,
            Instruction::ExecFunc { .. } => OpCode::ExecFunc,
            Instruction::Fund { .. } => OpCode::Fund,
            Instruction::Lock { .. } => OpCode::Lock,
            Instruction::Deploy { .. } => OpCode::Deploy,
            Instruction::Sign { .. } => OpCode::Sign,
            Instruction::SignTo { .. } => OpCode::SignTo,
        }
    }

    pub fn write(&self, w: &mut BufWriter) {
        w.write_u8(self.opcode() as u8);
        match self {
            Instruction::Import { pkg_id } => {
                w.write_fixed_bytes(pkg_id.as_ref());
            }
            Instruction::Load { output_id } => {
                w.write_fixed_bytes(output_id.as_ref());
            }
            Instruction::LoadByOrigin { origin } => {
                origin.write(w);
            }
            Instruction::New {
                pkg_idx,
                class_idx,
                args,
            } => {
                w.write_u16(*pkg_idx).write_u16(*class_idx).write_bytes(args);
            }
            Instruction::Call {
                jig_idx,
                method_idx,
                args,
            } => {
                w.write_u16(*jig_idx).write_u16(*method_idx).write_bytes(args);
            }
            Instruction::Exec {
                pkg_idx,
                class_idx,
                method_idx,
                args,
            } => {
                w.write_u16(*pkg_idx)
                    .write_u16(*class_idx)
                    .write_u16(*method_idx)
                    .write_bytes(args);
            }
            Instruction::ExecFunc {
                pkg_idx,
                fn_idx,
                args,
            } => {
                w.write_u16(*pkg_idx).write_u16(*fn_idx).write_bytes(args);
            }
            Instruction::Fund { coin_idx } => {
                w.write_u16(*coin_idx);
            }
            Instruction::Lock { jig_idx, address } => {
                w.write_u16(*jig_idx).write_fixed_bytes(address.as_bytes());
            }
            Instruction::Deploy { entries, sources } => {
                w.write_uleb(entries.len() as u64);
                for entry in entries {
                    w.write_str(entry);
                }
                w.write_uleb(sources.len() as u64);
                for (name, content) in sources {
                    w.write_str(name).write_str(content);
                }
            }
            Instruction::Sign { sig, pubkey } | Instruction::SignTo { sig, pubkey } => {
                w.write_bytes(sig).write_bytes(pubkey);
            }
        }
    }

    pub fn read(r: &mut BufReader) -> Result<Self, DecodeError> {
        let byte = r.read_u8()?;
        let opcode = OpCode::from_u8(byte).ok_or(DecodeError::UnknownOpCode(byte))?;
        let instruction = match opcode {
            OpCode::Import => Instruction::Import {
                pkg_id: PackageId::from(r.read_array::<32>()?),
            },
            OpCode::Load => Instruction::Load {
                output_id: OutputId::from(r.read_array::<32>()?),
            },
            OpCode::LoadByOrigin => Instruction::LoadByOrigin {
                origin: Pointer::read(r)?,
            },
            OpCode::New => Instruction::New {
                pkg_idx: r.read_u16()?,
                class_idx: r.read_u16()?,
                args: r.read_bytes()?.to_vec(),
            },
            OpCode::Call => Instruction::Call {
                jig_idx: r.read_u16()?,
                method_idx: r.read_u16()?,
                args: r.read_bytes()?.to_vec(),
            },
            OpCode::Exec => Instruction::Exec {
                pkg_idx: r.read_u16()?,
                class_idx: r.read_u16()?,
                method_idx: r.read_u16()?,
                args: r.read_bytes()?.to_vec(),
            },
            OpCode::ExecFunc => Instruction::ExecFunc {
                pkg_idx: r.read_u16()?,
                fn_idx: r.read_u16()?,
                args: r.read_bytes()?.to_vec(),
            },
            OpCode::Fund => Instruction::Fund {
                coin_idx: r.read_u16()?,
            },
            OpCode::Lock => Instruction::Lock {
                jig_idx: r.read_u16()?,
                address: Address(r.read_array::<20>()?),
            },
            OpCode::Deploy => {
                let entries = r.read_seq(|r| r.read_str().map(str::to_owned))?;
                let sources = r
                    .read_seq(|r| Ok((r.read_str()?.to_owned(), r.read_str()?.to_owned())))?
                    .into_iter()
                    .collect();
                Instruction::Deploy { entries, sources }
            }
            OpCode::Sign => Instruction::Sign {
                sig: r.read_bytes()?.to_vec(),
                pubkey: r.read_bytes()?.to_vec(),
            },
            OpCode::SignTo => Instruction::SignTo {
                sig: r.read_bytes()?.to_vec(),
                pubkey: r.read_bytes()?.to_vec(),
            },
        };
        Ok(instruction)
    }
}
