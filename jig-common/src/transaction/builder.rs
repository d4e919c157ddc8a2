use super::{Instruction, Tx};
use crate::crypto::Address;
use crate::types::{OutputId, PackageId, Pointer};
use std::collections::BTreeMap;

/// Utility for building transactions.
#[derive(Debug, Default)]
pub struct TxBuilder {
    instructions: Vec<Instruction>,
}

impl TxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the next instruction will have.
    pub fn next_idx(&self) -> u16 {
        self.instructions.len() as u16
    }

    pub fn add_instruction(mut self, instruction: Instruction) -> Self {
        self.instructions.push(instruction);
        self
    }

    pub fn import(self, pkg_id: PackageId) -> Self {
        self.add_instruction(Instruction::Import { pkg_id })
    }

    pub fn load(self, output_id: OutputId) -> Self {
        self.add_instruction(Instruction::Load { output_id })
    }

    pub fn load_by_origin(self, origin: Pointer) -> Self {
        self.add_instruction(Instruction::LoadByOrigin { origin })
    }

    pub fn new_instance(self, pkg_idx: u16, class_idx: u16, args: Vec<u8>) -> Self {
        self.add_instruction(Instruction::New {
            pkg_idx,
            class_idx,
            args,
        })
    }

    pub fn call(self, jig_idx: u16, method_idx: u16, args: Vec<u8>) -> Self {
        self.add_instruction(Instruction::Call {
            jig_idx,
            method_idx,
            args,
        })
    }

    pub fn exec(self, pkg_idx: u16, class_idx: u16, method_idx: u16, args: Vec<u8>) -> Self {
        self.add_instruction(Instruction::Exec {
            pkg_idx,
            class_idx,
            method_idx,
            args,
        })
    }

    pub fn exec_func(self, pkg_idx: u16, fn_idx: u16, args: Vec<u8>) -> Self {
        self.add_instruction(Instruction::ExecFunc {
            pkg_idx,
            fn_idx,
            args,
        })
    }

    pub fn lock(self, jig_idx: u16, address: Address) -> Self {
        self.add_instruction(Instruction::Lock { jig_idx, address })
    }

    pub fn fund(self, coin_idx: u16) -> Self {
        self.add_instruction(Instruction::Fund { coin_idx })
    }

    pub fn deploy(self, entries: Vec<String>, sources: BTreeMap<String, String>) -> Self {
        self.add_instruction(Instruction::Deploy { entries, sources })
    }

    pub fn sign(self, sig: Vec<u8>, pubkey: Vec<u8>) -> Self {
        self.add_instruction(Instruction::Sign { sig, pubkey })
    }

    pub fn sign_to(self, sig: Vec<u8>, pubkey: Vec<u8>) -> Self {
        self.add_instruction(Instruction::SignTo { sig, pubkey })
    }

    pub fn build(self) -> Tx {
        Tx::new(self.instructions)
    }
}
