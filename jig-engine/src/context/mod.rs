mod clock;
mod memory_storage;
mod package;
mod traits;
mod tx_context;

pub use clock::*;
pub use memory_storage::*;
pub use package::*;
pub use traits::*;
pub use tx_context::*;
