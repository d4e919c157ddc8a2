use super::args::*;
use super::jig_ref::*;
use super::logger::Level;
use super::result::*;
use super::statement::*;
use super::tx_state::*;
use crate::abi::*;
use crate::context::*;
use crate::errors::*;
use crate::locks::*;
use crate::memory::*;
use crate::types::*;
use crate::vm::wasm::*;
use crate::{tx_debug, tx_info, tx_trace, tx_warn};
use wasmi::StoreContextMut;

/// Runs instructions and host functions against the store of a transaction.
///
/// An executor is a thin view over the store context: the top level builds one per
/// instruction, every host function builds its own over the context of the wasm caller.
pub struct Executor<'a> {
    pub(crate) ctx: StoreContextMut<'a, TxState>,
}

impl<'a> Executor<'a> {
    pub fn new(ctx: StoreContextMut<'a, TxState>) -> Self {
        Self { ctx }
    }

    pub fn state(&self) -> &TxState {
        self.ctx.data()
    }

    pub(crate) fn state_mut(&mut self) -> &mut TxState {
        self.ctx.data_mut()
    }

    pub fn is_tracing(&self) -> bool {
        self.state().is_tracing()
    }

    pub fn log(&self, level: Level, msg: String) {
        self.state().log(level, msg)
    }

    //===================
    // Instructions
    //===================

    /// Runs one instruction and records its statement result.
    pub fn exec_instruction(&mut self, instruction: &Instruction) -> Result<(), RuntimeError> {
        let idx = self.state().statements.len();
        tx_info!(self, "#{} {}", idx, instruction.opcode());

        let result = match instruction {
            Instruction::Import { pkg_id } => self.op_import(pkg_id)?,
            Instruction::Load { output_id } => self.op_load(output_id)?,
            Instruction::LoadByOrigin { origin } => self.op_load_by_origin(origin)?,
            Instruction::New {
                pkg_idx,
                class_idx,
                args,
            } => self.op_new(*pkg_idx, *class_idx, args)?,
            Instruction::Call {
                jig_idx,
                method_idx,
                args,
            } => self.op_call(*jig_idx, *method_idx, args)?,
            Instruction::Exec {
                pkg_idx,
                class_idx,
                method_idx,
                args,
            } => self.op_exec(*pkg_idx, *class_idx, *method_idx, args)?,
            Instruction::ExecFunc {
                pkg_idx,
                fn_idx,
                args,
            } => self.op_exec_func(*pkg_idx, *fn_idx, args)?,
            Instruction::Fund { coin_idx } => self.op_fund(*coin_idx)?,
            Instruction::Lock { jig_idx, address } => self.op_lock(*jig_idx, address)?,
            Instruction::Deploy { entries, sources } => self.op_deploy(entries, sources)?,
            Instruction::Sign { .. } | Instruction::SignTo { .. } => self.op_sign()?,
        };

        tx_trace!(self, "#{} -> {}", idx, result.kind());
        self.state_mut().statements.push(result);
        Ok(())
    }

    pub fn op_import(&mut self, pkg_id: &PackageId) -> Result<StatementResult, RuntimeError> {
        let container = self.import(pkg_id)?;
        Ok(StatementResult::Package(container.id))
    }

    pub fn op_load(&mut self, output_id: &OutputId) -> Result<StatementResult, RuntimeError> {
        let output = self.state().context.state_by_output_id(output_id)?;
        let jig = self.hydrate(&output)?;
        Ok(StatementResult::Jig(jig.origin))
    }

    pub fn op_load_by_origin(&mut self, origin: &Pointer) -> Result<StatementResult, RuntimeError> {
        self.state_mut().measurements.origin_checks.inc()?;
        let output = self.state().context.state_by_origin(origin)?;
        let jig = self.hydrate(&output)?;
        Ok(StatementResult::Jig(jig.origin))
    }

    pub fn op_new(
        &mut self,
        pkg_idx: u16,
        class_idx: u16,
        args: &[u8],
    ) -> Result<StatementResult, RuntimeError> {
        let container = self.package_at(pkg_idx)?;
        let class = container.abi.class_by_idx(class_idx)?.clone();
        let args = self.translate_args(&container, &class.constructor.args, args)?;
        let jig = self.construct(&container, &class, &args)?;
        Ok(StatementResult::Jig(jig.origin))
    }

    pub fn op_call(
        &mut self,
        jig_idx: u16,
        method_idx: u16,
        args: &[u8],
    ) -> Result<StatementResult, RuntimeError> {
        let jig = self.jig_at(jig_idx)?;
        let container = self.state().container(&jig.package)?;
        let class = container.abi.class_by_idx(jig.class_idx)?.clone();
        let method = class.method_by_idx(method_idx)?.clone();
        if method.is_static() {
            return Err(ExecutionError::UnknownMethodIdx {
                class_name: class.name.clone(),
                idx: method_idx,
            }
            .into());
        }

        let args = self.translate_args(&container, &method.args, args)?;
        let args = self.lower_args(&container, &method.args, &args)?;
        self.state_mut().mark_affected(jig.origin);
        let word = self.call_method(&container, &jig, &class, &method, args)?;
        Ok(value_statement(&method.rtype, word, container.id))
    }

    /// Static methods run without a receiver and leave the call stack alone.
    pub fn op_exec(
        &mut self,
        pkg_idx: u16,
        class_idx: u16,
        method_idx: u16,
        args: &[u8],
    ) -> Result<StatementResult, RuntimeError> {
        let container = self.package_at(pkg_idx)?;
        let class = container.abi.class_by_idx(class_idx)?.clone();
        let method = class.method_by_idx(method_idx)?.clone();
        if !method.is_static() {
            return Err(ExecutionError::UnknownMethodIdx {
                class_name: class.name.clone(),
                idx: method_idx,
            }
            .into());
        }

        let args = self.translate_args(&container, &method.args, args)?;
        let args = self.lower_args(&container, &method.args, &args)?;
        let word = self.call_export(&container, &method.call_name(), &args)?;
        Ok(value_statement(&method.rtype, word, container.id))
    }

    pub fn op_exec_func(
        &mut self,
        pkg_idx: u16,
        fn_idx: u16,
        args: &[u8],
    ) -> Result<StatementResult, RuntimeError> {
        let container = self.package_at(pkg_idx)?;
        let function = container.abi.function_by_idx(fn_idx)?.clone();

        let args = self.translate_args(&container, &function.args, args)?;
        let args = self.lower_args(&container, &function.args, &args)?;
        let word = self.call_export(&container, &function.name, &args)?;
        Ok(value_statement(&function.rtype, word, container.id))
    }

    /// Burns a coin: its amount counts towards the funding of the transaction and it gets frozen.
    pub fn op_fund(&mut self, coin_idx: u16) -> Result<StatementResult, RuntimeError> {
        let coin = self.jig_at(coin_idx)?;
        if coin.class_ptr() != COIN_CLASS_PTR {
            return Err(ExecutionError::NotACoin(coin.origin).into());
        }
        self.check_lock_change(&coin, "fund")?;

        let container = self.state().container(&coin.package)?;
        let class = container.abi.class_by_idx(coin.class_idx)?;
        let field = class.field_by_name(COIN_AMOUNT_FIELD)?.clone();
        let amount = self
            .memory(container)
            .read_word(ptr_at(coin.ptr.to_u32(), field.offset)?, &field.ty)?
            .to_u64();

        let state = self.state_mut();
        state.fund_amount = state.fund_amount.saturating_add(amount);
        if let Some(jig) = state.jig_mut(&coin.origin) {
            jig.change_lock(JigLock::Frozen);
        }
        state.mark_affected(coin.origin);
        tx_debug!(self, "funded {} with {}", coin.origin, amount);
        Ok(StatementResult::Empty)
    }

    pub fn op_lock(
        &mut self,
        jig_idx: u16,
        address: &Address,
    ) -> Result<StatementResult, RuntimeError> {
        let jig = self.jig_at(jig_idx)?;
        self.change_lock(&jig.origin, JigLock::Pubkey(*address), "change lock")?;
        Ok(StatementResult::Empty)
    }

    pub fn op_deploy(
        &mut self,
        entries: &[String],
        sources: &BTreeMap<String, String>,
    ) -> Result<StatementResult, RuntimeError> {
        self.state_mut().measurements.deploys.inc()?;
        let package = self.state().context.compile(entries, sources)?;
        if !self.state().containers.contains_key(&package.id) {
            self.register_package(&package)?;
        }
        tx_debug!(self, "deployed package {}", package.id);
        let id = package.id;
        self.state_mut().deploys.push(package);
        Ok(StatementResult::Package(id))
    }

    /// Checking signatures is up to the signature verifier. Here they only count.
    pub fn op_sign(&mut self) -> Result<StatementResult, RuntimeError> {
        self.state_mut().measurements.num_sigs.inc()?;
        Ok(StatementResult::Empty)
    }

    //===================
    // Packages and jigs
    //===================

    /// The container of a package, instantiated on first use.
    pub(crate) fn import(&mut self, id: &PackageId) -> Result<WasmContainer, RuntimeError> {
        if let Some(container) = self.state().containers.get(id) {
            return Ok(container.clone());
        }
        let package = self.state().context.package_by_id(id)?;
        self.register_package(&package)
    }

    pub(crate) fn register_package(
        &mut self,
        package: &PkgData,
    ) -> Result<WasmContainer, RuntimeError> {
        self.state_mut().measurements.num_containers.inc()?;
        let host = self.state().host.clone().ok_or_else(|| {
            ExecutionError::WasmInstantiation("host functions are not linked".to_string())
        })?;

        let container = WasmContainer::instantiate(
            &mut self.ctx,
            package.id,
            package.abi.clone(),
            &package.module,
            &host,
        )?;
        self.state_mut()
            .containers
            .insert(package.id, container.clone());

        if container.has_export(&self.ctx, EXPORT_START) {
            call_export(&mut self.ctx, &container, EXPORT_START, &[])?;
        }
        tx_trace!(self, "container {} ready", package.id);
        Ok(container)
    }

    /// Brings a stored jig into its container. Hydrating a live jig returns it as it is.
    pub(crate) fn hydrate(&mut self, output: &Output) -> Result<JigRef, RuntimeError> {
        if let Some(jig) = self.state().jig_by_origin(&output.origin) {
            return Ok(jig.clone());
        }

        let container = self.import(&output.package_id())?;
        let class = container.abi.class_by_idx(output.class_idx())?.clone();
        let lock = JigLock::try_from(&output.lock)?;
        let ptr = self.lower(&container, &hydration_bytes(output), &class.own_type())?;

        let jig = JigRef {
            ptr,
            class_idx: class.idx,
            package: container.id,
            origin: output.origin,
            location: output.location,
            lock,
            is_new: false,
        };
        self.state_mut().add_jig(jig.clone());
        tx_debug!(self, "hydrated {} {}", class.name, output.origin);
        Ok(jig)
    }

    /// A live jig, or the latest stored state of it.
    pub(crate) fn jig_or_load(&mut self, origin: &Pointer) -> Result<JigRef, RuntimeError> {
        if let Some(jig) = self.state().jig_by_origin(origin) {
            return Ok(jig.clone());
        }
        self.state_mut().measurements.origin_checks.inc()?;
        let output = self.state().context.state_by_origin(origin)?;
        self.hydrate(&output)
    }

    pub(crate) fn live_jig(&self, origin: &Pointer) -> Result<JigRef, RuntimeError> {
        self.state()
            .jig_by_origin(origin)
            .cloned()
            .ok_or_else(|| ExecutionError::JigNotLive(*origin).into())
    }

    /// Runs the constructor of a class. The new jig is on top of the stack while it runs and
    /// links itself through `jig_init` and `jig_link`.
    pub(crate) fn construct(
        &mut self,
        container: &WasmContainer,
        class: &AbiClass,
        args: &[u8],
    ) -> Result<JigRef, RuntimeError> {
        let constructor = &class.constructor;
        let args = self.lower_args(container, &constructor.args, args)?;

        let origin = self.state_mut().reserve_origin();
        tx_debug!(self, "new {} {}", class.name, origin);
        self.state_mut().constructing.push(origin);
        self.state_mut().stack.push(origin);
        let result = self.call_export(container, &constructor.call_name(), &args);
        self.state_mut().stack.pop();
        self.state_mut().constructing.pop();
        result?;

        self.state()
            .jig_by_origin(&origin)
            .cloned()
            .ok_or_else(|| ExecutionError::JigNotCreated(origin).into())
    }

    /// Invokes an instance method with the jig on top of the stack.
    pub(crate) fn call_method(
        &mut self,
        container: &WasmContainer,
        jig: &JigRef,
        class: &AbiClass,
        method: &AbiMethod,
        args: Vec<(WasmWord, TypeNode)>,
    ) -> Result<Option<WasmWord>, RuntimeError> {
        // The lock may have changed since the handle was taken.
        let lock = self.live_jig(&jig.origin)?.lock;
        let caller = self.state().stack.top().copied();

        self.state_mut().stack.push(jig.origin);
        if !lock.accepts_execution(self.state()) {
            self.state_mut().stack.pop();
            let error = PermissionError {
                origin: jig.origin,
                operation: format!("exec \"{}\"", method.name),
                caller,
                frozen: lock.is_frozen(),
            };
            tx_warn!(self, "{}", error);
            return Err(error.into());
        }

        tx_trace!(self, "call {}.{}", class.name, method.name);
        let mut call_args = Vec::with_capacity(args.len() + 1);
        call_args.push((jig.ptr, class.own_type()));
        call_args.extend(args);
        let result = self.call_export(container, &method.call_name(), &call_args);
        self.state_mut().stack.pop();
        result
    }

    fn check_lock_change(&self, jig: &JigRef, operation: &str) -> Result<(), RuntimeError> {
        if jig.lock.can_be_changed_by(&jig.origin, self.state()) {
            return Ok(());
        }
        let error = PermissionError {
            origin: jig.origin,
            operation: operation.to_string(),
            caller: self.state().stack.top().copied(),
            frozen: jig.lock.is_frozen(),
        };
        tx_warn!(self, "{}", error);
        Err(error.into())
    }

    /// The only place a lock changes, apart from funding.
    pub(crate) fn change_lock(
        &mut self,
        origin: &Pointer,
        lock: JigLock,
        operation: &str,
    ) -> Result<(), RuntimeError> {
        let jig = self.live_jig(origin)?;
        self.check_lock_change(&jig, operation)?;

        tx_debug!(self, "lock {} -> {:?}", origin, lock);
        let state = self.state_mut();
        if let Some(jig) = state.jig_mut(origin) {
            jig.change_lock(lock);
        }
        state.mark_affected(*origin);
        Ok(())
    }

    //===================
    // Statements
    //===================

    fn package_at(&mut self, idx: u16) -> Result<WasmContainer, RuntimeError> {
        let id = match self.state().statement(idx as usize)? {
            StatementResult::Package(id) => *id,
            _ => return Err(ExecutionError::NotAPackage(idx as usize).into()),
        };
        self.import(&id)
    }

    /// The origin of the jig a statement refers to: a jig handle, or a value of a class type.
    pub(crate) fn stmt_origin(&mut self, idx: u16) -> Result<Pointer, RuntimeError> {
        match self.state().statement(idx as usize)?.clone() {
            StatementResult::Jig(origin) => Ok(origin),
            StatementResult::Value { ty, word, package } => {
                let container = self.state().container(&package)?;
                if word.is_null() || !is_jig_type(&container.abi, &ty) {
                    return Err(ExecutionError::NotAJig(idx as usize).into());
                }
                let bytes = self.lift(&container, word, &TypeNode::simple(ty.proxy_name()))?;
                Ok(Pointer::from_bytes(&bytes)?)
            }
            _ => Err(ExecutionError::NotAJig(idx as usize).into()),
        }
    }

    /// The live jig a statement refers to.
    pub(crate) fn jig_at(&mut self, idx: u16) -> Result<JigRef, RuntimeError> {
        let origin = self.stmt_origin(idx)?;
        self.live_jig(&origin)
    }

    /// The wire form of the value a statement left behind, as an argument of type `ty`.
    pub(crate) fn stmt_value_bytes(
        &mut self,
        idx: u16,
        ty: &TypeNode,
    ) -> Result<Vec<u8>, RuntimeError> {
        let mut writer = BufWriter::new();
        match self.state().statement(idx as usize)?.clone() {
            StatementResult::Value {
                ty: value_ty,
                word,
                package,
            } => {
                let container = self.state().container(&package)?;
                let mut value_ty = if value_ty.is_jig_state() {
                    TypeNode::simple(value_ty.proxy_name())
                } else {
                    value_ty
                };
                if value_ty.nullable && !ty.nullable {
                    if word.is_null() {
                        return Err(ExecutionError::NullArgument(idx as usize).into());
                    }
                    value_ty = value_ty.to_present();
                }
                if ty.nullable && !value_ty.nullable {
                    writer.write_u8(1);
                }
                writer.write_fixed_bytes(&self.lift(&container, word, &value_ty)?);
            }
            StatementResult::Jig(origin) => {
                if ty.nullable {
                    writer.write_u8(1);
                }
                writer.write_fixed_bytes(&origin.to_bytes());
            }
            _ => return Err(ExecutionError::NotAValue(idx as usize).into()),
        }
        Ok(writer.into_bytes())
    }

    //===================
    // Memory
    //===================

    pub(crate) fn memory(&mut self, container: WasmContainer) -> WasmMemory<'_, 'a> {
        WasmMemory::new(&mut self.ctx, container)
    }

    pub(crate) fn call_export(
        &mut self,
        container: &WasmContainer,
        name: &str,
        args: &[(WasmWord, TypeNode)],
    ) -> Result<Option<WasmWord>, RuntimeError> {
        call_export(&mut self.ctx, container, name, args)
    }

    pub(crate) fn lower(
        &mut self,
        container: &WasmContainer,
        bytes: &[u8],
        ty: &TypeNode,
    ) -> Result<WasmWord, RuntimeError> {
        self.state_mut()
            .measurements
            .moved_data
            .add(bytes.len() as u64)?;
        let mut memory = self.memory(container.clone());
        LowerValue::new(&mut memory).lower(bytes, ty)
    }

    pub(crate) fn lift(
        &mut self,
        container: &WasmContainer,
        word: WasmWord,
        ty: &TypeNode,
    ) -> Result<Vec<u8>, RuntimeError> {
        let bytes = {
            let memory = self.memory(container.clone());
            LiftValue::new(&memory).lift(word, ty)?
        };
        self.state_mut()
            .measurements
            .moved_data
            .add(bytes.len() as u64)?;
        Ok(bytes)
    }

    /// Lowers the arguments of a call, one after the other. They must take the whole buffer.
    pub(crate) fn lower_args(
        &mut self,
        container: &WasmContainer,
        args: &[ArgNode],
        bytes: &[u8],
    ) -> Result<Vec<(WasmWord, TypeNode)>, RuntimeError> {
        self.state_mut()
            .measurements
            .moved_data
            .add(bytes.len() as u64)?;
        let mut memory = self.memory(container.clone());
        let mut lower = LowerValue::new(&mut memory);
        let mut reader = BufReader::new(bytes);

        let mut words = Vec::with_capacity(args.len());
        for arg in args {
            let word = lower.lower_from_reader(&mut reader, &arg.ty)?;
            words.push((word, arg.ty.clone()));
        }
        reader.expect_end()?;
        Ok(words)
    }

    /// Resolves the statement references of an instruction's arguments.
    pub(crate) fn translate_args(
        &mut self,
        container: &WasmContainer,
        args: &[ArgNode],
        bytes: &[u8],
    ) -> Result<Vec<u8>, RuntimeError> {
        ArgsTranslator::new(self, container.abi.clone()).translate(args, bytes)
    }

    //===================
    // Finalize
    //===================

    /// Checks the invariants of a finished transaction and extracts the state of every jig it
    /// touched.
    pub fn finalize(&mut self) -> Result<ExecutionResult, RuntimeError> {
        let provided = self.state().fund_amount;
        let needed = self.state().opts.min_fund_amount;
        if provided < needed {
            return Err(ExecutionError::NotEnoughFunding { provided, needed }.into());
        }

        if let Some(jig) = self.state().jigs.iter().find(|jig| jig.lock.is_open()) {
            let container = self.state().container(&jig.package)?;
            let class = container.abi.class_by_idx(jig.class_idx)?;
            return Err(ExecutionError::UnlockedJig {
                class_name: class.name.clone(),
                origin: jig.origin,
            }
            .into());
        }

        let tx_hash = self.state().context.tx_hash();
        let executed_at = self.state().context.now();
        let affected = self.state().affected.clone();

        let mut outputs = Vec::with_capacity(affected.len());
        let mut spends = Vec::new();
        for (i, origin) in affected.iter().enumerate() {
            let jig = self.live_jig(origin)?;
            let container = self.state().container(&jig.package)?;
            let class = container.abi.class_by_idx(jig.class_idx)?.clone();
            let state = self.lift(&container, jig.ptr, &class.own_type())?;

            if !jig.is_new {
                spends.push(self.state().context.state_by_origin(origin)?);
            }
            outputs.push(Output {
                origin: jig.origin,
                location: Pointer::from_hash(tx_hash, i as u16),
                class_ptr: jig.class_ptr(),
                lock: jig.lock.to_lock(),
                state,
                created_at: executed_at,
            });
        }

        let reads = self
            .state()
            .jigs
            .iter()
            .filter(|jig| !jig.is_new && !affected.contains(&jig.origin))
            .map(|jig| self.state().context.state_by_origin(&jig.origin))
            .collect::<Result<Vec<_>, _>>()?;

        let deploys = self.state().deploys.clone();
        let hydros = self.state_mut().measurements.clear();
        tx_info!(
            self,
            "tx {}: {} outputs, {} spends, {} hydros",
            tx_hash,
            outputs.len(),
            spends.len(),
            hydros.total()
        );

        Ok(ExecutionResult {
            tx_hash,
            outputs,
            deploys,
            spends,
            reads,
            executed_at,
            hydros,
        })
    }
}

fn value_statement(rtype: &TypeNode, word: Option<WasmWord>, package: PackageId) -> StatementResult {
    match word {
        Some(word) if !rtype.is_void() => StatementResult::Value {
            ty: rtype.clone(),
            word,
            package,
        },
        _ => StatementResult::Empty,
    }
}

/// Values of a class type, own or imported, point to a jig.
pub(crate) fn is_jig_type(abi: &AbiAccess, ty: &TypeNode) -> bool {
    matches!(
        abi_shape(abi, &ty.to_present()),
        Ok(AbiShape::Proxy) | Ok(AbiShape::Jig(_))
    )
}
