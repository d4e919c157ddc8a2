mod call_stack;
mod jig_lock;

pub use call_stack::*;
pub use jig_lock::*;
