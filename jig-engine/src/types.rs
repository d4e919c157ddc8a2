pub use jig_common::prelude::*;
pub use std::collections::{BTreeMap, HashMap};
pub use std::fmt;
pub use std::fmt::Debug;
pub use std::sync::Arc;
