/// ABI lookups, field layouts and method tables built on top of the compiler's schema.
pub mod abi;
/// Collaborators of an execution: storage, compiler and clock.
pub mod context;
/// Jig VM errors.
pub mod errors;
/// Transaction execution.
pub mod execution;
/// Lock model of jigs.
pub mod locks;
/// Lowering and lifting of values between the wire format and wasm memory.
pub mod memory;
/// Common imports.
pub mod types;
/// Wasm containers and the `Vm` facade.
pub mod vm;
