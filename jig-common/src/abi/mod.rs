//! The ABI schema emitted by the compiler next to every package.
//!
//! The schema is plain data. Lookups, field layouts and method tables are built on top of it by
//! the engine, once per loaded package.

mod schema;
mod type_node;

pub use schema::*;
pub use type_node::*;

/// Parses an ABI from its JSON form.
pub fn abi_from_json(json: &str) -> Result<Abi, serde_json::Error> {
    serde_json::from_str(json)
}

/// Serializes an ABI to its JSON form.
pub fn abi_to_json(abi: &Abi) -> Result<String, serde_json::Error> {
    serde_json::to_string(abi)
}
