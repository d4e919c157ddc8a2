use super::class::*;
use super::layout::*;
use super::well_known::*;
use crate::errors::*;
use crate::types::*;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub enum AbiExport {
    Class(AbiClass),
    Function(AbiFunction),
    Interface(InterfaceNode),
    Object(AbiObject),
}

impl AbiExport {
    pub fn name(&self) -> &str {
        match self {
            AbiExport::Class(class) => &class.name,
            AbiExport::Function(function) => &function.name,
            AbiExport::Interface(interface) => &interface.name,
            AbiExport::Object(object) => &object.name,
        }
    }

    pub fn kind(&self) -> CodeKind {
        match self {
            AbiExport::Class(_) => CodeKind::Class,
            AbiExport::Function(_) => CodeKind::Function,
            AbiExport::Interface(_) => CodeKind::Interface,
            AbiExport::Object(_) => CodeKind::Object,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AbiImport {
    pub idx: u16,
    pub name: String,
    pub kind: CodeKind,
    /// Package defining the imported code. Imported objects have none.
    pub pkg: Option<PackageId>,
    pub object: Option<AbiObject>,
}

/// The ABI of a package, restructured for lookups.
///
/// Every ABI gets the well known objects (`Output`, `Lock`, `JigInitParams`, `__Jig`, `BigInt`)
/// appended to its exports and imports the `Coin` class unless it defines one itself.
#[derive(Debug, Clone, PartialEq)]
pub struct AbiAccess {
    pub abi: Abi,
    exports: Vec<AbiExport>,
    imports: Vec<AbiImport>,
    rtids: Vec<TypeIdNode>,
}

impl AbiAccess {
    pub fn new(original: Abi) -> Result<Self, ExecutionError> {
        let mut abi = original;
        for object in WELL_KNOWN_OBJECTS.iter() {
            abi.defs.push(CodeDef::Object(object.clone()));
            abi.exports.push((abi.defs.len() - 1) as u16);
        }
        if !abi.defs.iter().any(|def| def.name() == COIN_CLASS_NAME) {
            abi.defs.push(CodeDef::ProxyClass(COIN_IMPORT.clone()));
            abi.imports.push((abi.defs.len() - 1) as u16);
        }

        let exports = abi
            .exports
            .iter()
            .enumerate()
            .map(|(idx, def_idx)| Self::build_export(&abi, idx as u16, *def_idx))
            .collect::<Result<Vec<_>, _>>()?;
        let imports = abi
            .imports
            .iter()
            .enumerate()
            .map(|(idx, def_idx)| Self::build_import(&abi, idx as u16, *def_idx))
            .collect::<Result<Vec<_>, _>>()?;

        let mut rtids = abi.type_ids.clone();
        for (id, name) in [(BUF_RTID, "ArrayBuffer"), (STRING_RTID, "string")] {
            if !rtids.iter().any(|rtid| rtid.name == name) {
                rtids.push(TypeIdNode {
                    id,
                    name: name.to_string(),
                });
            }
        }

        Ok(Self {
            abi,
            exports,
            imports,
            rtids,
        })
    }

    fn def(abi: &Abi, def_idx: u16) -> Result<&CodeDef, ExecutionError> {
        abi.defs
            .get(def_idx as usize)
            .ok_or_else(|| ExecutionError::InvalidAbi(format!("missing def {}", def_idx)))
    }

    fn build_export(abi: &Abi, idx: u16, def_idx: u16) -> Result<AbiExport, ExecutionError> {
        let export = match Self::def(abi, def_idx)? {
            CodeDef::Class(node) => AbiExport::Class(Self::build_class(abi, idx, node)?),
            CodeDef::Function(node) => AbiExport::Function(AbiFunction {
                idx,
                name: node.name.clone(),
                args: node.args.clone(),
                rtype: node.rtype.clone().unwrap_or_else(void_type),
            }),
            CodeDef::Interface(node) => AbiExport::Interface(node.clone()),
            CodeDef::Object(node) => AbiExport::Object(AbiObject::new(node)),
            def => {
                return Err(ExecutionError::InvalidAbi(format!(
                    "{} {} can't be exported",
                    def.kind(),
                    def.name()
                )))
            }
        };
        Ok(export)
    }

    fn build_import(abi: &Abi, idx: u16, def_idx: u16) -> Result<AbiImport, ExecutionError> {
        let def = Self::def(abi, def_idx)?;
        let (pkg, object) = match def {
            CodeDef::ProxyClass(node)
            | CodeDef::ProxyFunction(node)
            | CodeDef::ProxyInterface(node) => {
                let pkg = PackageId::from_str(&node.pkg).map_err(|_| {
                    ExecutionError::InvalidAbi(format!(
                        "invalid package id for import {}: {}",
                        node.name, node.pkg
                    ))
                })?;
                (Some(pkg), None)
            }
            CodeDef::Object(node) => (None, Some(AbiObject::new(node))),
            def => {
                return Err(ExecutionError::InvalidAbi(format!(
                    "{} {} can't be imported",
                    def.kind(),
                    def.name()
                )))
            }
        };
        Ok(AbiImport {
            idx,
            name: def.name().to_string(),
            kind: def.kind(),
            pkg,
            object,
        })
    }

    fn exported_class_node<'a>(abi: &'a Abi, name: &str) -> Option<&'a ClassNode> {
        abi.exports
            .iter()
            .filter_map(|def_idx| abi.defs.get(*def_idx as usize))
            .find_map(|def| match def {
                CodeDef::Class(node) if node.name == name => Some(node),
                _ => None,
            })
    }

    fn build_class(abi: &Abi, idx: u16, node: &ClassNode) -> Result<AbiClass, ExecutionError> {
        // Root first. Parents that aren't exported by this package (like `Jig`) end the chain.
        let mut chain = vec![node];
        let mut parent = node.extends.as_deref();
        while let Some(parent_node) = parent.and_then(|name| Self::exported_class_node(abi, name))
        {
            if chain.len() > abi.defs.len() {
                return Err(ExecutionError::InvalidAbi(format!(
                    "circular inheritance in class {}",
                    node.name
                )));
            }
            chain.push(parent_node);
            parent = parent_node.extends.as_deref();
        }
        let hierarchy = chain.iter().map(|c| c.name.clone()).collect();
        chain.reverse();

        let mut field_nodes = BASE_JIG_FIELDS.clone();
        let mut methods: Vec<AbiMethod> = vec![];
        for class in &chain {
            field_nodes.extend(class.fields.iter().cloned());
            for method in class.methods.iter().filter(|m| m.name != CONSTRUCTOR_NAME) {
                let abi_method = AbiMethod {
                    idx: 0,
                    class_name: class.name.clone(),
                    kind: method.kind,
                    name: method.name.clone(),
                    args: method.args.clone(),
                    rtype: method.rtype.clone().unwrap_or_else(void_type),
                };
                match methods.iter_mut().find(|m| m.name == method.name) {
                    Some(overridden) => *overridden = abi_method,
                    None => methods.push(abi_method),
                }
            }
        }
        for (i, method) in methods.iter_mut().enumerate() {
            method.idx = i as u16;
        }

        let constructor_args = node
            .methods
            .iter()
            .find(|m| m.name == CONSTRUCTOR_NAME)
            .map(|m| m.args.clone())
            .unwrap_or_default();

        Ok(AbiClass {
            idx,
            name: node.name.clone(),
            fields: layout_fields(&field_nodes),
            methods,
            constructor: AbiMethod {
                idx: u16::MAX,
                class_name: node.name.clone(),
                kind: MethodKind::Public,
                name: CONSTRUCTOR_NAME.to_string(),
                args: constructor_args,
                rtype: TypeNode::simple(format!("*{}", node.name)),
            },
            hierarchy,
        })
    }

    pub fn version(&self) -> u16 {
        self.abi.version
    }

    pub fn exports(&self) -> &[AbiExport] {
        &self.exports
    }

    pub fn imports(&self) -> &[AbiImport] {
        &self.imports
    }

    /// Looks up an export by name. A leading `*` is ignored.
    pub fn exported_by_name(&self, name: &str) -> Option<&AbiExport> {
        let name = name.trim_start_matches('*');
        self.exports.iter().find(|export| export.name() == name)
    }

    pub fn exported_by_idx(&self, idx: u16) -> Option<&AbiExport> {
        self.exports.get(idx as usize)
    }

    pub fn class_by_idx(&self, idx: u16) -> Result<&AbiClass, ExecutionError> {
        match self.exported_by_idx(idx) {
            Some(AbiExport::Class(class)) => Ok(class),
            _ => Err(ExecutionError::UnknownClassIdx(idx)),
        }
    }

    pub fn class_by_name(&self, name: &str) -> Result<&AbiClass, ExecutionError> {
        match self.exported_by_name(name) {
            Some(AbiExport::Class(class)) => Ok(class),
            _ => Err(ExecutionError::UnknownClass(name.to_string())),
        }
    }

    pub fn function_by_idx(&self, idx: u16) -> Result<&AbiFunction, ExecutionError> {
        match self.exported_by_idx(idx) {
            Some(AbiExport::Function(function)) => Ok(function),
            _ => Err(ExecutionError::UnknownFunctionIdx(idx)),
        }
    }

    pub fn function_by_name(&self, name: &str) -> Result<&AbiFunction, ExecutionError> {
        match self.exported_by_name(name) {
            Some(AbiExport::Function(function)) => Ok(function),
            _ => Err(ExecutionError::UnknownExport(name.to_string())),
        }
    }

    pub fn imported_by_name(&self, name: &str) -> Option<&AbiImport> {
        let name = name.trim_start_matches('*');
        self.imports.iter().find(|import| import.name == name)
    }

    /// Exported or imported plain object.
    pub fn object_by_name(&self, name: &str) -> Option<&AbiObject> {
        match self.exported_by_name(name) {
            Some(AbiExport::Object(object)) => Some(object),
            _ => self
                .imported_by_name(name)
                .and_then(|import| import.object.as_ref()),
        }
    }

    pub fn rtid_by_name(&self, name: &str) -> Option<u32> {
        self.rtids
            .iter()
            .find(|rtid| rtid.name == name)
            .map(|rtid| rtid.id)
    }

    /// Runtime id of the blocks holding values of the given type.
    pub fn rtid_of(&self, ty: &TypeNode) -> Result<u32, ExecutionError> {
        let name = ty.to_present().normalized_name();
        let name = name.trim_start_matches('*');
        self.rtid_by_name(name)
            .ok_or_else(|| ExecutionError::UnknownRtidName(name.to_string()))
    }

    pub fn type_name_by_rtid(&self, id: u32) -> Option<&str> {
        self.rtids
            .iter()
            .find(|rtid| rtid.id == id)
            .map(|rtid| rtid.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABI: &str = r#"{
        "version": 1,
        "exports": [0, 1, 2, 3],
        "imports": [4],
        "defs": [
            {
                "kind": "class",
                "name": "Animal",
                "extends": "Jig",
                "fields": [{ "name": "legs", "type": { "name": "u8" } }],
                "methods": [
                    { "kind": "public", "name": "constructor", "args": [] },
                    { "kind": "public", "name": "walk", "args": [], "rtype": { "name": "void" } },
                    { "kind": "public", "name": "speak", "args": [], "rtype": { "name": "string" } }
                ]
            },
            {
                "kind": "class",
                "name": "Dog",
                "extends": "Animal",
                "fields": [{ "name": "weight", "type": { "name": "u64" } }],
                "methods": [
                    { "kind": "public", "name": "constructor", "args": [{ "name": "weight", "type": { "name": "u64" } }] },
                    { "kind": "public", "name": "speak", "args": [], "rtype": { "name": "string" } },
                    { "kind": "static", "name": "breed", "args": [], "rtype": { "name": "string" } }
                ]
            },
            { "kind": "function", "name": "double", "args": [{ "name": "x", "type": { "name": "u32" } }], "rtype": { "name": "u32" } },
            { "kind": "object", "name": "Point", "fields": [{ "name": "x", "type": { "name": "u8" } }, { "name": "y", "type": { "name": "u32" } }] },
            { "kind": "proxy_class", "name": "Cat", "pkg": "0101010101010101010101010101010101010101010101010101010101010101" }
        ],
        "typeIds": [{ "id": 10, "name": "Dog" }, { "id": 11, "name": "Map<string,u32>" }]
    }"#;

    fn access() -> AbiAccess {
        AbiAccess::new(abi_from_json(ABI).unwrap()).unwrap()
    }

    #[test]
    fn test_well_known_exports_and_coin_import() {
        let abi = access();
        assert!(matches!(abi.exported_by_name("Output"), Some(AbiExport::Object(_))));
        assert!(matches!(abi.exported_by_name("JigInitParams"), Some(AbiExport::Object(_))));
        assert!(matches!(abi.exported_by_name("BigInt"), Some(AbiExport::Object(_))));

        let coin = abi.imported_by_name("Coin").unwrap();
        assert_eq!(coin.kind, CodeKind::ProxyClass);
        assert_eq!(coin.pkg, Some(PackageId::from(COIN_PACKAGE_ID)));
    }

    #[test]
    fn test_class_inherits_fields_and_methods() {
        let abi = access();
        let dog = abi.class_by_idx(1).unwrap();

        let names: Vec<&str> = dog.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["$output", "$lock", "legs", "weight"]);
        let offsets: Vec<u32> = dog.fields.iter().map(|f| f.offset).collect();
        assert_eq!(offsets, vec![0, 4, 8, 16]);
        assert_eq!(dog.size(), 24);

        let walk = dog.method_by_idx(0).unwrap();
        assert_eq!(walk.call_name(), "__Animal_walk");
        let speak = dog.method_by_idx(1).unwrap();
        assert_eq!(speak.call_name(), "__Dog_speak");
        assert!(dog.method_by_idx(2).unwrap().is_static());
        assert!(dog.method_by_idx(3).is_err());

        assert_eq!(dog.constructor.args.len(), 1);
        assert_eq!(dog.constructor.call_name(), "__Dog_constructor");
        assert_eq!(dog.hierarchy, vec!["Dog".to_string(), "Animal".to_string()]);
        assert!(dog.is_subclass_of("Animal"));
    }

    #[test]
    fn test_lookups() {
        let abi = access();
        assert_eq!(abi.class_by_name("*Dog").unwrap().idx, 1);
        assert!(abi.class_by_name("Point").is_err());
        assert_eq!(abi.function_by_idx(2).unwrap().name, "double");
        assert_eq!(abi.object_by_name("Point").unwrap().size(), 8);
        assert_eq!(abi.imported_by_name("Cat").unwrap().pkg, Some(PackageId::from([1u8; 32])));
    }

    #[test]
    fn test_rtids() {
        let abi = access();
        assert_eq!(abi.rtid_of(&TypeNode::simple("*Dog")).unwrap(), 10);
        assert_eq!(abi.rtid_of(&TypeNode::simple("ArrayBuffer")).unwrap(), BUF_RTID);
        let map = TypeNode::generic(
            "Map",
            vec![TypeNode::simple("string"), TypeNode::simple("u32")],
        )
        .nullable();
        assert_eq!(abi.rtid_of(&map).unwrap(), 11);
        assert_eq!(abi.type_name_by_rtid(10), Some("Dog"));
        assert!(abi.rtid_of(&TypeNode::simple("Nope")).is_err());
    }
}
