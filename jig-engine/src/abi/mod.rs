mod access;
mod class;
mod layout;
mod well_known;

pub use access::*;
pub use class::*;
pub use layout::*;
pub use well_known::*;
