mod compiler;
mod test_runner;

pub use compiler::*;
pub use test_runner::*;
