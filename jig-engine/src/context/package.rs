use crate::abi::*;
use crate::errors::*;
use crate::types::*;
use wasmi::{Engine, Module};

/// What a compiler produces from the sources of a package.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledPackage {
    pub wasm: Vec<u8>,
    pub abi: Abi,
    pub docs: Option<String>,
}

/// A deployed package, ready to be instantiated.
///
/// The module is compiled once, when the package enters the system. Instantiating it later is
/// cheap and can happen while wasm is executing.
#[derive(Clone)]
pub struct PkgData {
    pub id: PackageId,
    pub entries: Vec<String>,
    pub sources: BTreeMap<String, String>,
    pub abi: Arc<AbiAccess>,
    pub docs: Option<String>,
    pub wasm: Arc<Vec<u8>>,
    pub module: Arc<Module>,
}

impl PkgData {
    pub fn new(
        engine: &Engine,
        id: PackageId,
        entries: Vec<String>,
        sources: BTreeMap<String, String>,
        compiled: CompiledPackage,
    ) -> Result<Self, ExecutionError> {
        let module = Module::new(engine, &compiled.wasm)
            .map_err(|e| ExecutionError::Compilation(e.to_string()))?;
        let abi = AbiAccess::new(compiled.abi)?;
        Ok(Self {
            id,
            entries,
            sources,
            abi: Arc::new(abi),
            docs: compiled.docs,
            wasm: Arc::new(compiled.wasm),
            module: Arc::new(module),
        })
    }

    /// A package addressed by the hash of its sources.
    pub fn from_sources(
        engine: &Engine,
        entries: Vec<String>,
        sources: BTreeMap<String, String>,
        compiled: CompiledPackage,
    ) -> Result<Self, ExecutionError> {
        let id = calculate_package_id(&entries, &sources);
        Self::new(engine, id, entries, sources, compiled)
    }
}

impl fmt::Debug for PkgData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("PkgData")
            .field("id", &self.id)
            .field("entries", &self.entries)
            .field("wasm_len", &self.wasm.len())
            .finish()
    }
}

impl PartialEq for PkgData {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.wasm == other.wasm
    }
}
