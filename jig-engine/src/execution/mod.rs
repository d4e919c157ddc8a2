mod args;
mod executor;
mod host_calls;
mod jig_ref;
mod logger;
mod measurements;
mod opts;
mod result;
mod statement;
mod tx_execution;
mod tx_state;

pub use executor::*;
pub use jig_ref::*;
pub use logger::*;
pub use measurements::*;
pub use opts::*;
pub use result::*;
pub use statement::*;
pub use tx_execution::*;
pub use tx_state::*;
