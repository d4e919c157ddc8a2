//! Little endian buffer primitives. Every wire format of the VM (outputs, locks, instruction
//! arguments, lowered values) is written with [`BufWriter`] and read back with [`BufReader`].

mod error;
mod reader;
mod writer;

pub use error::*;
pub use reader::*;
pub use writer::*;
