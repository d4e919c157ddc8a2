use super::package::*;
use super::traits::*;
use crate::errors::*;
use crate::types::*;
use wasmi::Engine;

/// Execution context of a transaction backed by a [`Storage`].
pub struct StorageTxContext {
    tx: Tx,
    tx_hash: Hash,
    storage: Arc<dyn Storage>,
    compiler: Arc<dyn Compiler>,
    clock: Arc<dyn Clock>,
    engine: Engine,
}

impl StorageTxContext {
    pub fn new(
        tx: Tx,
        storage: Arc<dyn Storage>,
        compiler: Arc<dyn Compiler>,
        clock: Arc<dyn Clock>,
        engine: Engine,
    ) -> Self {
        let tx_hash = tx.hash();
        Self {
            tx,
            tx_hash,
            storage,
            compiler,
            clock,
            engine,
        }
    }

    pub fn tx(&self) -> &Tx {
        &self.tx
    }
}

impl ExecContext for StorageTxContext {
    fn tx_hash(&self) -> Hash {
        self.tx_hash
    }

    fn state_by_output_id(&self, id: &OutputId) -> Result<Output, ExecutionError> {
        self.storage
            .output_by_id(id)
            .ok_or(ExecutionError::OutputNotFound(*id))
    }

    fn state_by_origin(&self, origin: &Pointer) -> Result<Output, ExecutionError> {
        self.storage
            .output_by_origin(origin)
            .ok_or(ExecutionError::JigNotFound(*origin))
    }

    fn package_by_id(&self, id: &PackageId) -> Result<PkgData, ExecutionError> {
        self.storage
            .package_by_id(id)
            .ok_or(ExecutionError::UnknownPackage(*id))
    }

    fn compile(
        &self,
        entries: &[String],
        sources: &BTreeMap<String, String>,
    ) -> Result<PkgData, ExecutionError> {
        let compiled = self
            .compiler
            .compile(entries, sources)
            .map_err(ExecutionError::Compilation)?;
        PkgData::from_sources(&self.engine, entries.to_vec(), sources.clone(), compiled)
    }

    fn signed_by(&self, address: &Address, stmt_idx: usize) -> bool {
        self.tx.is_signed_by(address, stmt_idx)
    }

    fn signers(&self) -> Vec<Address> {
        self.tx.signers()
    }

    fn now(&self) -> u64 {
        self.clock.now()
    }
}
