use serde::{Deserialize, Serialize};
use std::fmt;

/// A node of an ABI type tree: a type name, its generic arguments and whether it is nullable.
///
/// Exported classes appear under two names: `*Name` denotes the jig itself (used for its own
/// state), `Name` a reference to a jig that may live anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeNode {
    pub name: String,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub args: Vec<TypeNode>,
}

impl TypeNode {
    pub fn simple<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            nullable: false,
            args: vec![],
        }
    }

    pub fn generic<S: Into<String>>(name: S, args: Vec<TypeNode>) -> Self {
        Self {
            name: name.into(),
            nullable: false,
            args,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// The same type without the nullable wrapper.
    pub fn to_present(&self) -> Self {
        Self {
            name: self.name.clone(),
            nullable: false,
            args: self.args.clone(),
        }
    }

    /// The name used to refer to a jig: the own-state marker `*` removed.
    pub fn proxy_name(&self) -> &str {
        self.name.trim_start_matches('*')
    }

    pub fn is_jig_state(&self) -> bool {
        self.name.starts_with('*')
    }

    /// Canonical text of the type, e.g. `Map<string,Array<u8>> | null`.
    ///
    /// Compilers derive generated helper names from it, so it must stay stable.
    pub fn normalized_name(&self) -> String {
        let mut name = self.name.clone();
        if !self.args.is_empty() {
            let args: Vec<String> = self.args.iter().map(|a| a.normalized_name()).collect();
            name.push('<');
            name.push_str(&args.join(","));
            name.push('>');
        }
        if self.nullable {
            name.push_str(" | null");
        }
        name
    }
}

impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.normalized_name())
    }
}
