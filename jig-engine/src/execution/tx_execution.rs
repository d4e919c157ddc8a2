use super::executor::Executor;
use super::opts::ExecOpts;
use super::result::ExecutionResult;
use super::tx_state::TxState;
use crate::context::ExecContext;
use crate::errors::*;
use crate::tx_error;
use crate::types::*;
use crate::vm::wasm::HostFunctions;
use wasmi::{AsContextMut, Engine, Store};

/// One transaction: a store holding every container it loads, and the state shared by the
/// executor and the host functions.
pub struct TxExecution {
    store: Store<TxState>,
}

impl TxExecution {
    pub fn new(
        engine: &Engine,
        context: Box<dyn ExecContext>,
        opts: ExecOpts,
    ) -> Result<Self, RuntimeError> {
        let max_fuel = opts.max_fuel();
        let mut store = Store::new(engine, TxState::new(context, opts));
        store
            .set_fuel(max_fuel)
            .map_err(|e| ExecutionError::WasmInstantiation(e.to_string()))?;

        let host = HostFunctions::new(&mut store);
        store.data_mut().host = Some(host);
        Ok(Self { store })
    }

    pub fn executor(&mut self) -> Executor<'_> {
        Executor::new(self.store.as_context_mut())
    }

    pub fn state(&self) -> &TxState {
        self.store.data()
    }

    /// Runs every instruction in order, then finalizes. The first failure aborts everything.
    pub fn exec_tx(mut self, tx: &Tx) -> Result<ExecutionResult, RuntimeError> {
        for (idx, instruction) in tx.instructions.iter().enumerate() {
            if let Err(error) = self.executor().exec_instruction(instruction) {
                tx_error!(self.state(), "#{} {} failed: {}", idx, instruction.opcode(), error);
                return Err(error);
            }
        }
        self.finalize()
    }

    pub fn finalize(&mut self) -> Result<ExecutionResult, RuntimeError> {
        let remaining = self.store.get_fuel().unwrap_or_default();
        let consumed = self.state().opts().max_fuel().saturating_sub(remaining);
        self.store
            .data_mut()
            .measurements
            .wasm_executed
            .add(consumed)?;
        self.executor().finalize()
    }
}
