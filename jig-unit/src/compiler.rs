use jig_common::prelude::*;
use jig_engine::context::{CompiledPackage, Compiler};
use std::collections::BTreeMap;

/// Source holding the ABI of a WAT package, in its JSON form.
pub const ABI_SOURCE_NAME: &str = "abi.json";

/// Replaces the `${...}` snippet placeholders of a WAT source.
pub fn expand_snippets(wat: &str) -> String {
    wat.replace("${jig_runtime}", include_str!("../assets/snippets/jig_runtime.wat"))
}

pub fn wat2wasm(wat: &str) -> Vec<u8> {
    wat::parse_str(expand_snippets(wat)).expect("Failed to compile WAT into WASM")
}

/// Entries and sources of a package made of a single WAT file and its ABI.
pub fn package_sources(entry: &str, wat: &str, abi: &str) -> (Vec<String>, BTreeMap<String, String>) {
    let mut sources = BTreeMap::new();
    sources.insert(entry.to_string(), wat.to_string());
    sources.insert(ABI_SOURCE_NAME.to_string(), abi.to_string());
    (vec![entry.to_string()], sources)
}

/// Compiles packages written by hand: the first entry is the WAT module, with its snippets
/// expanded, and the ABI comes from the `abi.json` source.
#[derive(Debug, Clone, Copy, Default)]
pub struct WatCompiler;

impl Compiler for WatCompiler {
    fn compile(
        &self,
        entries: &[String],
        sources: &BTreeMap<String, String>,
    ) -> Result<CompiledPackage, String> {
        let entry = entries.first().ok_or("no entry file")?;
        let wat = sources
            .get(entry)
            .ok_or_else(|| format!("missing source: {}", entry))?;
        let wasm = wat::parse_str(expand_snippets(wat)).map_err(|e| e.to_string())?;

        let abi = sources
            .get(ABI_SOURCE_NAME)
            .ok_or_else(|| format!("missing source: {}", ABI_SOURCE_NAME))?;
        let abi = abi_from_json(abi).map_err(|e| e.to_string())?;

        Ok(CompiledPackage {
            wasm,
            abi,
            docs: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABI: &str = r#"{ "version": 1, "exports": [], "defs": [], "typeIds": [] }"#;

    #[test]
    fn test_compile_wat_package() {
        let (entries, sources) = package_sources("index.wat", "(module)", ABI);

        let compiled = WatCompiler.compile(&entries, &sources).unwrap();

        assert_eq!(compiled.wasm, wat2wasm("(module)"));
        assert_eq!(compiled.abi.version, 1);
    }

    #[test]
    fn test_compile_errors() {
        let (entries, mut sources) = package_sources("index.wat", "(module", ABI);
        assert!(WatCompiler.compile(&entries, &sources).is_err());

        sources.insert("index.wat".to_string(), "(module)".to_string());
        sources.remove(ABI_SOURCE_NAME);
        assert_eq!(
            WatCompiler.compile(&entries, &sources),
            Err("missing source: abi.json".to_string())
        );
        assert!(WatCompiler.compile(&[], &sources).is_err());
    }
}
