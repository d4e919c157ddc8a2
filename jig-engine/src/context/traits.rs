use super::package::*;
use crate::errors::*;
use crate::execution::ExecutionResult;
use crate::types::*;

/// Turns the sources of a package into a wasm module and its ABI.
pub trait Compiler: Send + Sync {
    fn compile(
        &self,
        entries: &[String],
        sources: &BTreeMap<String, String>,
    ) -> Result<CompiledPackage, String>;
}

/// Seconds since the unix epoch.
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

/// Durable state: unspent outputs and deployed packages.
pub trait Storage: Send + Sync {
    fn output_by_id(&self, id: &OutputId) -> Option<Output>;

    /// The latest unspent output of the jig with the given origin.
    fn output_by_origin(&self, origin: &Pointer) -> Option<Output>;

    fn package_by_id(&self, id: &PackageId) -> Option<PkgData>;

    fn add_package(&self, package: PkgData);

    fn add_output(&self, output: Output);

    /// Removes the spent outputs, adds the new ones and the deployed packages.
    fn persist(&self, result: &ExecutionResult);
}

/// Everything a transaction execution reads from outside.
pub trait ExecContext {
    fn tx_hash(&self) -> Hash;

    fn state_by_output_id(&self, id: &OutputId) -> Result<Output, ExecutionError>;

    fn state_by_origin(&self, origin: &Pointer) -> Result<Output, ExecutionError>;

    fn package_by_id(&self, id: &PackageId) -> Result<PkgData, ExecutionError>;

    fn compile(
        &self,
        entries: &[String],
        sources: &BTreeMap<String, String>,
    ) -> Result<PkgData, ExecutionError>;

    /// True when the statement at `stmt_idx` is covered by a signature of `address`.
    fn signed_by(&self, address: &Address, stmt_idx: usize) -> bool;

    fn signers(&self) -> Vec<Address>;

    fn now(&self) -> u64;
}
