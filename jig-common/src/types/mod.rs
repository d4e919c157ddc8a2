mod lock;
mod output;
mod package;
mod pointer;

pub use lock::*;
pub use output::*;
pub use package::*;
pub use pointer::*;
