use super::TypeNode;
use serde::{Deserialize, Serialize};
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum CodeKind {
    Class,
    Function,
    Interface,
    Object,
    ProxyClass,
    ProxyFunction,
    ProxyInterface,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum MethodKind {
    Public,
    Protected,
    Static,
}

/// ABI of a compiled package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Abi {
    pub version: u16,
    /// Indexes into `defs` of the exported code, in export order.
    pub exports: Vec<u16>,
    /// Indexes into `defs` of the imported code, in import order.
    #[serde(default)]
    pub imports: Vec<u16>,
    pub defs: Vec<CodeDef>,
    /// Runtime type ids the compiler assigned to the heap allocated types.
    #[serde(rename = "typeIds")]
    pub type_ids: Vec<TypeIdNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CodeDef {
    Class(ClassNode),
    Function(FunctionNode),
    Interface(InterfaceNode),
    Object(ObjectNode),
    ProxyClass(ProxyNode),
    ProxyFunction(ProxyNode),
    ProxyInterface(ProxyNode),
}

impl CodeDef {
    pub fn name(&self) -> &str {
        match self {
            CodeDef::Class(node) => &node.name,
            CodeDef::Function(node) => &node.name,
            CodeDef::Interface(node) => &node.name,
            CodeDef::Object(node) => &node.name,
            CodeDef::ProxyClass(node)
            | CodeDef::ProxyFunction(node)
            | CodeDef::ProxyInterface(node) => &node.name,
        }
    }

    pub fn kind(&self) -> CodeKind {
        match self {
            CodeDef::Class(_) => CodeKind::Class,
            CodeDef::Function(_) => CodeKind::Function,
            CodeDef::Interface(_) => CodeKind::Interface,
            CodeDef::Object(_) => CodeKind::Object,
            CodeDef::ProxyClass(_) => CodeKind::ProxyClass,
            CodeDef::ProxyFunction(_) => CodeKind::ProxyFunction,
            CodeDef::ProxyInterface(_) => CodeKind::ProxyInterface,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassNode {
    pub name: String,
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub implements: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldNode>,
    #[serde(default)]
    pub methods: Vec<MethodNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionNode {
    pub name: String,
    #[serde(default)]
    pub args: Vec<ArgNode>,
    pub rtype: Option<TypeNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceNode {
    pub name: String,
    #[serde(default)]
    pub extends: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldNode>,
    #[serde(default)]
    pub methods: Vec<FunctionNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectNode {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldNode>,
}

/// An imported piece of code, defined in the package `pkg` (hex encoded id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyNode {
    pub name: String,
    pub pkg: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodNode {
    pub kind: MethodKind,
    pub name: String,
    #[serde(default)]
    pub args: Vec<ArgNode>,
    /// `None` for constructors.
    #[serde(default)]
    pub rtype: Option<TypeNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldNode {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeNode,
}

pub type ArgNode = FieldNode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeIdNode {
    pub id: u32,
    pub name: String,
}
