use super::jig_ref::*;
use super::logger::*;
use super::measurements::*;
use super::opts::*;
use super::statement::*;
use crate::context::*;
use crate::errors::*;
use crate::locks::*;
use crate::memory::*;
use crate::types::*;
use crate::vm::wasm::{HostFunctions, WasmContainer};
use indexmap::IndexMap;

/// Data of the store running a transaction. Shared by the executor and every host function.
pub struct TxState {
    pub(crate) context: Box<dyn ExecContext>,
    pub(crate) opts: ExecOpts,
    pub(crate) host: Option<HostFunctions>,
    pub(crate) containers: IndexMap<PackageId, WasmContainer>,
    pub(crate) jigs: Vec<JigRef>,
    /// Origins of the jigs touched by the transaction, in first-affected order.
    pub(crate) affected: Vec<Pointer>,
    pub(crate) stack: CallStack,
    /// Containers currently running wasm, innermost last.
    pub(crate) frames: Vec<PackageId>,
    /// Origins of the jigs whose constructor is running, innermost last.
    pub(crate) constructing: Vec<Pointer>,
    last_origin_idx: Option<u16>,
    pub(crate) statements: Vec<StatementResult>,
    pub(crate) deploys: Vec<PkgData>,
    pub(crate) fund_amount: u64,
    pub(crate) measurements: Measurements,
}

impl TxState {
    pub fn new(context: Box<dyn ExecContext>, opts: ExecOpts) -> Self {
        let measurements = Measurements::new(&opts);
        Self {
            context,
            opts,
            host: None,
            containers: IndexMap::new(),
            jigs: Vec::new(),
            affected: Vec::new(),
            stack: CallStack::new(),
            frames: Vec::new(),
            constructing: Vec::new(),
            last_origin_idx: None,
            statements: Vec::new(),
            deploys: Vec::new(),
            fund_amount: 0,
            measurements,
        }
    }

    pub fn is_tracing(&self) -> bool {
        self.opts.trace
    }

    pub fn log(&self, level: Level, msg: String) {
        println!("{}", format_log(self.stack.depth(), level, &msg));
    }

    pub fn opts(&self) -> &ExecOpts {
        &self.opts
    }

    pub fn jigs(&self) -> &[JigRef] {
        &self.jigs
    }

    pub fn statements(&self) -> &[StatementResult] {
        &self.statements
    }

    pub fn fund_amount(&self) -> u64 {
        self.fund_amount
    }

    pub fn jig_by_origin(&self, origin: &Pointer) -> Option<&JigRef> {
        self.jigs.iter().find(|jig| jig.origin == *origin)
    }

    pub(crate) fn jig_mut(&mut self, origin: &Pointer) -> Option<&mut JigRef> {
        self.jigs.iter_mut().find(|jig| jig.origin == *origin)
    }

    pub(crate) fn add_jig(&mut self, jig: JigRef) {
        match self.jig_mut(&jig.origin) {
            Some(existing) => *existing = jig,
            None => self.jigs.push(jig),
        }
    }

    pub(crate) fn mark_affected(&mut self, origin: Pointer) {
        if !self.affected.contains(&origin) {
            self.affected.push(origin);
        }
    }

    pub fn statement(&self, idx: usize) -> Result<&StatementResult, ExecutionError> {
        self.statements
            .get(idx)
            .ok_or(ExecutionError::UnknownStatementIndex(idx))
    }

    pub(crate) fn container(&self, id: &PackageId) -> Result<WasmContainer, ExecutionError> {
        self.containers
            .get(id)
            .cloned()
            .ok_or(ExecutionError::UnknownPackage(*id))
    }

    /// The container whose wasm called into the host.
    pub(crate) fn current_container(&self) -> Result<WasmContainer, ExecutionError> {
        let id = self.frames.last().ok_or(ExecutionError::NoActiveContainer)?;
        self.container(id)
    }

    /// Origin of the next jig. Indexes follow the affected jigs and never repeat.
    pub(crate) fn reserve_origin(&mut self) -> Pointer {
        let candidate = (self.affected.len() + self.constructing.len()) as u16;
        let idx = match self.last_origin_idx {
            Some(last) if last >= candidate => last + 1,
            _ => candidate,
        };
        self.last_origin_idx = Some(idx);
        Pointer::from_hash(self.context.tx_hash(), idx)
    }

    /// Output and lock of a jig, live or in storage.
    pub fn jig_data(&self, origin: &Pointer) -> Result<JigData, RuntimeError> {
        if let Some(jig) = self.jig_by_origin(origin) {
            return Ok(jig.jig_data());
        }
        self.context
            .state_by_origin(origin)
            .map(|output| JigData::from_output(&output))
            .map_err(|_| ExecutionError::MissingReferencedOutput(*origin).into())
    }
}

impl AuthContext for TxState {
    fn stack(&self) -> &CallStack {
        &self.stack
    }

    fn signed_by(&self, address: &Address) -> bool {
        self.context.signed_by(address, self.statements.len())
    }
}
