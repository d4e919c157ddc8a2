use super::Instruction;
use crate::crypto::{hash, Address, Hash};
use crate::data::{BufReader, BufWriter, DecodeError};

/// An ordered list of instructions executed atomically.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tx {
    pub instructions: Vec<Instruction>,
}

impl Tx {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    /// The transaction hash. Outputs of the transaction are addressed as `(hash, index)`.
    pub fn hash(&self) -> Hash {
        hash(self.to_bytes())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = BufWriter::new();
        writer.write_uleb(self.instructions.len() as u64);
        for instruction in &self.instructions {
            instruction.write(&mut writer);
        }
        writer.into_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = BufReader::new(bytes);
        let instructions = reader.read_seq(Instruction::read)?;
        reader.expect_end()?;
        Ok(Self { instructions })
    }

    /// Returns true when the owner of `address` signed the instruction at `stmt_idx`.
    ///
    /// A `SIGN` covers the whole transaction, a `SIGNTO` the instructions up to itself.
    /// Checking the signatures themselves is up to the signature verifier, not the VM.
    pub fn is_signed_by(&self, address: &Address, stmt_idx: usize) -> bool {
        self.instructions
            .iter()
            .enumerate()
            .any(|(i, instruction)| match instruction {
                Instruction::Sign { pubkey, .. } => Address::from_public_key(pubkey) == *address,
                Instruction::SignTo { pubkey, .. } => {
                    i >= stmt_idx && Address::from_public_key(pubkey) == *address
                }
                _ => false,
            })
    }

    /// Addresses of every signer of the transaction.
    pub fn signers(&self) -> Vec<Address> {
        self.instructions
            .iter()
            .filter_map(|instruction| match instruction {
                Instruction::Sign { pubkey, .. } | Instruction::SignTo { pubkey, .. } => {
                    Some(Address::from_public_key(pubkey))
                }
                _ => None,
            })
            .collect()
    }
}
