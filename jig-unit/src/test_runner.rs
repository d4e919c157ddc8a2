use crate::compiler::*;
use jig_common::prelude::*;
use jig_engine::context::*;
use jig_engine::errors::RuntimeError;
use jig_engine::execution::{ExecOpts, ExecutionResult};
use jig_engine::vm::Vm;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Timestamp of every transaction run by a [`TestRunner`].
pub const TEST_TIMESTAMP: u64 = 1_700_000_000;

/// Default amount of the coins funding transactions.
pub const FUNDING_AMOUNT: u64 = MIN_FUND_AMOUNT;

/// A key pair for tests. Signatures are checked before execution, so only the public key
/// matters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub public_key: Vec<u8>,
    pub address: Address,
}

impl KeyPair {
    pub fn from_seed(seed: u64) -> Self {
        let public_key = hash(seed.to_le_bytes()).to_vec();
        let address = Address::from_public_key(&public_key);
        Self {
            public_key,
            address,
        }
    }

    pub fn signature(&self) -> Vec<u8> {
        vec![0u8; 64]
    }
}

pub struct TestRunnerBuilder {
    opts: ExecOpts,
}

impl TestRunnerBuilder {
    pub fn with_trace(mut self) -> Self {
        self.opts = self.opts.with_trace(true);
        self
    }

    pub fn with_opts(mut self, opts: ExecOpts) -> Self {
        self.opts = opts;
        self
    }

    pub fn build(self) -> TestRunner {
        let storage = Arc::new(MemoryStorage::new());
        let vm = Vm::new(
            storage.clone(),
            Arc::new(WatCompiler),
            Arc::new(FixedClock(TEST_TIMESTAMP)),
        )
        .with_opts(self.opts);

        let (entries, sources) = package_sources(
            "coin.wat",
            include_str!("../assets/coin.wat"),
            include_str!("../assets/coin.abi.json"),
        );
        let compiled = WatCompiler
            .compile(&entries, &sources)
            .expect("Failed to compile the coin package");
        vm.add_pre_compiled(PackageId::from(COIN_PACKAGE_ID), entries, sources, compiled)
            .expect("Failed to add the coin package");

        TestRunner {
            vm,
            storage,
            next_key_seed: 1,
        }
    }
}

/// An in-memory VM with the coin package deployed.
pub struct TestRunner {
    vm: Vm,
    storage: Arc<MemoryStorage>,
    next_key_seed: u64,
}

impl TestRunner {
    pub fn builder() -> TestRunnerBuilder {
        TestRunnerBuilder {
            opts: ExecOpts::for_tests(),
        }
    }

    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn vm(&self) -> &Vm {
        &self.vm
    }

    pub fn storage(&self) -> &MemoryStorage {
        &self.storage
    }

    pub fn new_key_pair(&mut self) -> KeyPair {
        let key = KeyPair::from_seed(self.next_key_seed);
        self.next_key_seed += 1;
        key
    }

    /// Compiles and stores a package, without a transaction.
    pub fn deploy(&self, entries: Vec<String>, sources: BTreeMap<String, String>) -> PackageId {
        self.vm
            .add_package(entries, sources)
            .expect("Failed to deploy package")
    }

    pub fn mint(&self, address: &Address, amount: u64) -> Output {
        self.vm.mint(address, amount)
    }

    /// Appends the instructions paying for a transaction: a fresh coin of `key`, funded, and the
    /// signature of `key`.
    pub fn fund_and_sign(&self, builder: TxBuilder, key: &KeyPair) -> Tx {
        self.fund_with(builder, key, FUNDING_AMOUNT)
    }

    pub fn fund_with(&self, builder: TxBuilder, key: &KeyPair, amount: u64) -> Tx {
        let coin = self.mint(&key.address, amount);
        let coin_idx = builder.next_idx();
        builder
            .load(coin.id())
            .fund(coin_idx)
            .sign(key.signature(), key.public_key.clone())
            .build()
    }

    /// Runs a transaction without persisting it.
    pub fn execute(&self, tx: &Tx) -> Result<ExecutionResult, RuntimeError> {
        self.vm.execute(tx)
    }

    /// Runs a transaction and persists its result.
    pub fn exec_tx(&self, tx: &Tx) -> Result<ExecutionResult, RuntimeError> {
        self.vm.exec_tx(tx)
    }

    pub fn output_by_origin(&self, origin: &Pointer) -> Option<Output> {
        self.storage.output_by_origin(origin)
    }
}

impl Default for TestRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coin_package_is_deployed() {
        let runner = TestRunner::new();

        let package = runner
            .storage()
            .package_by_id(&PackageId::from(COIN_PACKAGE_ID))
            .unwrap();

        assert_eq!(package.abi.class_by_idx(COIN_CLASS_IDX).unwrap().name, COIN_CLASS_NAME);
    }

    #[test]
    fn test_key_pairs_are_distinct() {
        let mut runner = TestRunner::new();
        let a = runner.new_key_pair();
        let b = runner.new_key_pair();

        assert_ne!(a.address, b.address);
        assert_eq!(a.address, Address::from_public_key(&a.public_key));
    }

    #[test]
    fn test_funded_coin_is_frozen() {
        // Arrange
        let mut runner = TestRunner::new();
        let key = runner.new_key_pair();
        let tx = runner.fund_and_sign(TxBuilder::new(), &key);

        // Act
        let result = runner.exec_tx(&tx).unwrap();

        // Assert
        assert_eq!(result.outputs.len(), 1);
        assert_eq!(result.outputs[0].lock, Lock::frozen());
        assert_eq!(result.spends.len(), 1);
        assert_eq!(runner.storage().utxo_count(), 1);
    }
}
