use super::package::*;
use super::traits::*;
use crate::execution::ExecutionResult;
use crate::types::*;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct Tables {
    /// Unspent outputs by id.
    utxos: HashMap<OutputId, Output>,
    /// Id of the latest output of every jig, by origin.
    tips: HashMap<Pointer, OutputId>,
    packages: HashMap<PackageId, PkgData>,
}

/// Keeps everything in memory. Only the latest output of every jig is reachable.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    tables: RwLock<Tables>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn utxo_count(&self) -> usize {
        self.read().utxos.len()
    }
}

impl Storage for MemoryStorage {
    fn output_by_id(&self, id: &OutputId) -> Option<Output> {
        self.read().utxos.get(id).cloned()
    }

    fn output_by_origin(&self, origin: &Pointer) -> Option<Output> {
        let tables = self.read();
        tables
            .tips
            .get(origin)
            .and_then(|id| tables.utxos.get(id))
            .cloned()
    }

    fn package_by_id(&self, id: &PackageId) -> Option<PkgData> {
        self.read().packages.get(id).cloned()
    }

    fn add_package(&self, package: PkgData) {
        self.write().packages.insert(package.id, package);
    }

    fn add_output(&self, output: Output) {
        let mut tables = self.write();
        let id = output.id();
        if let Some(previous) = tables.tips.insert(output.origin, id) {
            tables.utxos.remove(&previous);
        }
        tables.utxos.insert(id, output);
    }

    fn persist(&self, result: &ExecutionResult) {
        {
            let mut tables = self.write();
            for spent in &result.spends {
                tables.utxos.remove(&spent.id());
            }
            for package in &result.deploys {
                tables.packages.insert(package.id, package.clone());
            }
        }
        for output in &result.outputs {
            self.add_output(output.clone());
        }
    }
}
