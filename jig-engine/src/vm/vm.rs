use crate::context::*;
use crate::errors::*;
use crate::execution::*;
use crate::types::*;
use std::sync::atomic::{AtomicU64, Ordering};
use wasmi::{Config, Engine};

/// Entry point of the jig VM: executes transactions against a storage and persists their
/// results.
pub struct Vm {
    engine: Engine,
    storage: Arc<dyn Storage>,
    compiler: Arc<dyn Compiler>,
    clock: Arc<dyn Clock>,
    opts: ExecOpts,
    mint_count: AtomicU64,
}

impl Vm {
    pub fn new(storage: Arc<dyn Storage>, compiler: Arc<dyn Compiler>, clock: Arc<dyn Clock>) -> Self {
        let mut config = Config::default();
        config.consume_fuel(true);

        Self {
            engine: Engine::new(&config),
            storage,
            compiler,
            clock,
            opts: ExecOpts::default(),
            mint_count: AtomicU64::new(0),
        }
    }

    pub fn with_opts(mut self, opts: ExecOpts) -> Self {
        self.opts = opts;
        self
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub fn opts(&self) -> &ExecOpts {
        &self.opts
    }

    /// Executes a transaction without touching the storage.
    pub fn execute(&self, tx: &Tx) -> Result<ExecutionResult, RuntimeError> {
        let context = StorageTxContext::new(
            tx.clone(),
            self.storage.clone(),
            self.compiler.clone(),
            self.clock.clone(),
            self.engine.clone(),
        );
        TxExecution::new(&self.engine, Box::new(context), self.opts.clone())?.exec_tx(tx)
    }

    /// Executes a transaction and persists its result.
    pub fn exec_tx(&self, tx: &Tx) -> Result<ExecutionResult, RuntimeError> {
        let result = self.execute(tx)?;
        self.storage.persist(&result);
        Ok(result)
    }

    /// Compiles and stores a package outside of any transaction.
    pub fn add_package(
        &self,
        entries: Vec<String>,
        sources: BTreeMap<String, String>,
    ) -> Result<PackageId, RuntimeError> {
        let compiled = self
            .compiler
            .compile(&entries, &sources)
            .map_err(ExecutionError::Compilation)?;
        let package = PkgData::from_sources(&self.engine, entries, sources, compiled)?;
        let id = package.id;
        self.storage.add_package(package);
        Ok(id)
    }

    /// Stores an already compiled package under a fixed id, like the coin package.
    pub fn add_pre_compiled(
        &self,
        id: PackageId,
        entries: Vec<String>,
        sources: BTreeMap<String, String>,
        compiled: CompiledPackage,
    ) -> Result<PackageId, RuntimeError> {
        let package = PkgData::new(&self.engine, id, entries, sources, compiled)?;
        self.storage.add_package(package);
        Ok(id)
    }

    /// Creates a coin locked to `address` out of nothing.
    pub fn mint(&self, address: &Address, amount: u64) -> Output {
        let count = self.mint_count.fetch_add(1, Ordering::SeqCst);
        let origin = Pointer::from_hash(hash(count.to_le_bytes()), 0);
        let output = Output {
            origin,
            location: origin,
            class_ptr: COIN_CLASS_PTR,
            lock: Lock::pubkey(address),
            state: amount.to_le_bytes().to_vec(),
            created_at: self.clock.now(),
        };
        self.storage.add_output(output.clone());
        output
    }

    pub fn package_id(entries: &[String], sources: &BTreeMap<String, String>) -> PackageId {
        calculate_package_id(entries, sources)
    }
}
