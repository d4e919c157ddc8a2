use super::layout::*;
use crate::errors::*;
use crate::types::*;

pub const CONSTRUCTOR_NAME: &str = "constructor";

/// An exported class with its full field layout and method table.
#[derive(Debug, Clone, PartialEq)]
pub struct AbiClass {
    pub idx: u16,
    pub name: String,
    /// `$output`, `$lock`, then the fields of every parent, root first, then its own.
    pub fields: Vec<AbiField>,
    /// Methods of every parent, root first, then its own. The constructor is not part of it.
    pub methods: Vec<AbiMethod>,
    pub constructor: AbiMethod,
    /// The class name followed by the names of its parents.
    pub hierarchy: Vec<String>,
}

impl AbiClass {
    /// Type of the jig itself, as opposed to a proxy to it.
    pub fn own_type(&self) -> TypeNode {
        TypeNode::simple(format!("*{}", self.name))
    }

    /// Type of a reference to the jig.
    pub fn proxy_type(&self) -> TypeNode {
        TypeNode::simple(self.name.clone())
    }

    pub fn size(&self) -> u32 {
        object_size(&self.fields)
    }

    /// Fields persisted in the jig state: everything but `$output` and `$lock`.
    pub fn state_fields(&self) -> &[AbiField] {
        &self.fields[2..]
    }

    pub fn field_by_name(&self, name: &str) -> Result<&AbiField, ExecutionError> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .ok_or_else(|| ExecutionError::UnknownField {
                class_name: self.name.clone(),
                field: name.to_string(),
            })
    }

    pub fn method_by_idx(&self, idx: u16) -> Result<&AbiMethod, ExecutionError> {
        self.methods
            .get(idx as usize)
            .ok_or_else(|| ExecutionError::UnknownMethodIdx {
                class_name: self.name.clone(),
                idx,
            })
    }

    pub fn method_by_name(&self, name: &str) -> Result<&AbiMethod, ExecutionError> {
        if name == CONSTRUCTOR_NAME {
            return Ok(&self.constructor);
        }
        self.methods
            .iter()
            .find(|method| method.name == name)
            .ok_or_else(|| ExecutionError::UnknownMethod {
                class_name: self.name.clone(),
                method: name.to_string(),
            })
    }

    pub fn is_subclass_of(&self, name: &str) -> bool {
        self.hierarchy.iter().any(|n| n == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AbiMethod {
    pub idx: u16,
    /// Class declaring the method.
    pub class_name: String,
    pub kind: MethodKind,
    pub name: String,
    pub args: Vec<ArgNode>,
    pub rtype: TypeNode,
}

impl AbiMethod {
    /// Name of the export implementing the method.
    pub fn call_name(&self) -> String {
        format!("__{}_{}", self.class_name, self.name)
    }

    pub fn is_static(&self) -> bool {
        self.kind == MethodKind::Static
    }

    pub fn is_constructor(&self) -> bool {
        self.name == CONSTRUCTOR_NAME
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AbiFunction {
    pub idx: u16,
    pub name: String,
    pub args: Vec<ArgNode>,
    pub rtype: TypeNode,
}

/// A plain object: fields, no identity.
#[derive(Debug, Clone, PartialEq)]
pub struct AbiObject {
    pub name: String,
    pub fields: Vec<AbiField>,
}

impl AbiObject {
    pub fn new(node: &ObjectNode) -> Self {
        Self {
            name: node.name.clone(),
            fields: layout_fields(&node.fields),
        }
    }

    pub fn size(&self) -> u32 {
        object_size(&self.fields)
    }
}

pub(crate) fn void_type() -> TypeNode {
    TypeNode::simple("void")
}
