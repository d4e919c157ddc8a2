use super::measurements::HydrosReport;
use crate::context::PkgData;
use crate::types::*;

/// Everything a successful transaction changes.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    pub tx_hash: Hash,
    /// One output per affected jig, in first-affected order.
    pub outputs: Vec<Output>,
    pub deploys: Vec<PkgData>,
    /// Previous outputs of the affected jigs that existed before the transaction.
    pub spends: Vec<Output>,
    /// Outputs of jigs loaded but left untouched.
    pub reads: Vec<Output>,
    pub executed_at: u64,
    pub hydros: HydrosReport,
}

impl ExecutionResult {
    pub fn output_by_origin(&self, origin: &Pointer) -> Option<&Output> {
        self.outputs.iter().find(|output| output.origin == *origin)
    }

    pub fn deployed_package_ids(&self) -> Vec<PackageId> {
        self.deploys.iter().map(|package| package.id).collect()
    }
}
