mod vm;
pub mod wasm;

pub use vm::*;
