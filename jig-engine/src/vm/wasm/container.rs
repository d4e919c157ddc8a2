use super::constants::*;
use super::host::HostFunctions;
use crate::abi::*;
use crate::errors::*;
use crate::execution::{TxState, RAW_EXECUTION_TAG};
use crate::memory::*;
use crate::types::*;
use wasmi::core::TrapCode;
use wasmi::{
    AsContext, Instance, Linker, Memory, MemoryType, Module, StoreContextMut, Val,
};

/// An instance of a package inside the store of a transaction.
#[derive(Clone)]
pub struct WasmContainer {
    pub id: PackageId,
    pub abi: Arc<AbiAccess>,
    instance: Instance,
    memory: Memory,
}

impl WasmContainer {
    /// Links a module against `env.memory`, `env.abort` and the `vm` host functions, and runs its
    /// start section.
    pub fn instantiate(
        ctx: &mut StoreContextMut<'_, TxState>,
        id: PackageId,
        abi: Arc<AbiAccess>,
        module: &Module,
        host: &HostFunctions,
    ) -> Result<Self, RuntimeError> {
        let mut linker = <Linker<TxState>>::new(ctx.engine());

        let memory_type =
            MemoryType::new(MEMORY_PAGES, Some(MEMORY_PAGES)).map_err(instantiation_error)?;
        let env_memory = Memory::new(&mut *ctx, memory_type).map_err(instantiation_error)?;
        linker
            .define(MODULE_ENV_NAME, EXPORT_MEMORY, env_memory)
            .map_err(instantiation_error)?;
        host.define(&mut linker)?;

        let instance = linker
            .instantiate(&mut *ctx, module)
            .map_err(instantiation_error)?
            .start(&mut *ctx)
            .map_err(|e| translate_error(ctx.data(), e))?;

        // Modules exporting their own memory don't import the one of the host.
        let memory = instance
            .get_memory(&*ctx, EXPORT_MEMORY)
            .unwrap_or(env_memory);

        Ok(Self {
            id,
            abi,
            instance,
            memory,
        })
    }

    pub fn has_export<T>(&self, ctx: impl AsContext<Data = T>, name: &str) -> bool {
        self.instance.get_export(ctx, name).is_some()
    }
}

fn instantiation_error<E: fmt::Display>(error: E) -> RuntimeError {
    ExecutionError::WasmInstantiation(error.to_string()).into()
}

/// Host failures travel through the wasm frames as they are. Running out of fuel exceeds the
/// raw execution limit, anything else is a trap.
pub fn translate_error(state: &TxState, error: wasmi::Error) -> RuntimeError {
    if let Some(e) = error.downcast_ref::<RuntimeError>() {
        return e.clone();
    }
    if matches!(error.as_trap_code(), Some(TrapCode::OutOfFuel)) {
        return ExecutionError::HydrosExceeded {
            tag: RAW_EXECUTION_TAG.to_string(),
            max: state.opts().wasm_execution_max_hydros,
        }
        .into();
    }
    ExecutionError::WasmTrap(error.to_string()).into()
}

/// Invokes an export of a container. The container is the current frame while it runs.
pub fn call_export(
    ctx: &mut StoreContextMut<'_, TxState>,
    container: &WasmContainer,
    name: &str,
    args: &[(WasmWord, TypeNode)],
) -> Result<Option<WasmWord>, RuntimeError> {
    let func = container
        .instance
        .get_func(&*ctx, name)
        .ok_or_else(|| ExecutionError::UnknownExport(name.to_string()))?;

    let params: Vec<Val> = args.iter().map(|(word, ty)| word.to_val(ty)).collect();
    let mut results: Vec<Val> = func
        .ty(&*ctx)
        .results()
        .iter()
        .map(|ty| Val::default(*ty))
        .collect();

    ctx.data_mut().frames.push(container.id);
    let outcome = func.call(&mut *ctx, &params, &mut results);
    ctx.data_mut().frames.pop();

    outcome.map_err(|e| translate_error(ctx.data(), e))?;
    Ok(results.first().map(WasmWord::from_val))
}

/// The memory of a container, seen through the store of the transaction.
pub struct WasmMemory<'c, 'a> {
    ctx: &'c mut StoreContextMut<'a, TxState>,
    container: WasmContainer,
}

impl<'c, 'a> WasmMemory<'c, 'a> {
    pub fn new(ctx: &'c mut StoreContextMut<'a, TxState>, container: WasmContainer) -> Self {
        Self { ctx, container }
    }
}

impl ContainerMemory for WasmMemory<'_, '_> {
    fn abi(&self) -> &AbiAccess {
        &self.container.abi
    }

    fn read(&self, ptr: u32, len: usize) -> Result<Vec<u8>, RuntimeError> {
        let mut buffer = vec![0u8; len];
        self.container
            .memory
            .read(&*self.ctx, ptr as usize, &mut buffer)
            .map_err(|_| ExecutionError::MemoryAccess { ptr, len })?;
        Ok(buffer)
    }

    fn write(&mut self, ptr: u32, bytes: &[u8]) -> Result<(), RuntimeError> {
        self.container
            .memory
            .write(&mut *self.ctx, ptr as usize, bytes)
            .map_err(|_| ExecutionError::MemoryAccess {
                ptr,
                len: bytes.len(),
            })?;
        Ok(())
    }

    fn malloc(&mut self, size: u32, rtid: u32) -> Result<u32, RuntimeError> {
        let u32_type = TypeNode::simple("u32");
        let ptr = call_export(
            self.ctx,
            &self.container,
            EXPORT_NEW,
            &[
                (WasmWord::from_u32(size), u32_type.clone()),
                (WasmWord::from_u32(rtid), u32_type),
            ],
        )?
        .ok_or_else(|| ExecutionError::MissingReturnValue(EXPORT_NEW.to_string()))?;
        Ok(ptr.to_u32())
    }

    fn call_export(
        &mut self,
        name: &str,
        args: &[(WasmWord, TypeNode)],
    ) -> Result<(), RuntimeError> {
        call_export(self.ctx, &self.container, name, args).map(|_| ())
    }

    fn jig_data(&self, origin: &Pointer) -> Result<JigData, RuntimeError> {
        self.ctx.data().jig_data(origin)
    }
}
