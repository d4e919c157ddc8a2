mod constants;
mod container;
mod host;

pub use constants::*;
pub use container::*;
pub use host::*;
