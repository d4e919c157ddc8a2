mod args;
mod builder;
mod instruction;
mod tx;

pub use args::*;
pub use builder::*;
pub use instruction::*;
pub use tx::*;
