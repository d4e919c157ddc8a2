//! Shared building blocks of the jig VM: identifiers, locks and outputs, the little endian
//! buffer primitives every wire format is built from, the ABI schema emitted by the compiler and
//! the transaction model.

pub mod abi;
pub mod constants;
pub mod crypto;
pub mod data;
pub mod transaction;
pub mod types;

/// Each module should have its own prelude, which:
/// * Adds the types of the crate.
/// * Adds the buffer primitives.
pub mod prelude {
    pub use crate::abi::*;
    pub use crate::constants::*;
    pub use crate::crypto::*;
    pub use crate::data::*;
    pub use crate::transaction::*;
    pub use crate::types::*;
}
