use super::constants::*;
use crate::errors::*;
use crate::execution::{Executor, TxState};
use wasmi::{AsContextMut, Caller, Func, Linker, Store};

/// The functions a container imports from the host, created once per transaction.
///
/// Every function builds an [`Executor`] over the store context of the call, so nested calls
/// (container A calling the host calling container B calling the host) all see the same
/// transaction state.
#[derive(Clone)]
pub struct HostFunctions {
    abort: Func,
    jig_init: Func,
    jig_link: Func,
    jig_authcheck: Func,
    jig_lock: Func,
    call_method: Func,
    call_static: Func,
    call_function: Func,
    get_prop: Func,
    remote_state: Func,
    caller_typecheck: Func,
    caller_outputcheck: Func,
    caller_output: Func,
    caller_output_val: Func,
    constructor_local: Func,
    constructor_remote: Func,
    debug_str: Func,
}

type HostResult<T> = Result<T, wasmi::Error>;

fn host_error(error: RuntimeError) -> wasmi::Error {
    wasmi::Error::host(error)
}

impl HostFunctions {
    pub fn new(store: &mut Store<TxState>) -> Self {
        let abort = Func::wrap(
            store.as_context_mut(),
            |mut caller: Caller<'_, TxState>,
             msg_ptr: i32,
             file_ptr: i32,
             line: i32,
             col: i32|
             -> HostResult<()> {
                Executor::new(caller.as_context_mut())
                    .host_abort(msg_ptr as u32, file_ptr as u32, line as u32, col as u32)
                    .map_err(host_error)
            },
        );

        let jig_init = Func::wrap(
            store.as_context_mut(),
            |mut caller: Caller<'_, TxState>| -> HostResult<i32> {
                Executor::new(caller.as_context_mut())
                    .host_jig_init()
                    .map(|ptr| ptr as i32)
                    .map_err(host_error)
            },
        );

        let jig_link = Func::wrap(
            store.as_context_mut(),
            |mut caller: Caller<'_, TxState>, jig_ptr: i32, rtid: i32| -> HostResult<i32> {
                Executor::new(caller.as_context_mut())
                    .host_jig_link(jig_ptr as u32, rtid as u32)
                    .map(|ptr| ptr as i32)
                    .map_err(host_error)
            },
        );

        let jig_authcheck = Func::wrap(
            store.as_context_mut(),
            |mut caller: Caller<'_, TxState>, origin_ptr: i32, check: i32| -> HostResult<i32> {
                Executor::new(caller.as_context_mut())
                    .host_jig_authcheck(origin_ptr as u32, check)
                    .map(i32::from)
                    .map_err(host_error)
            },
        );

        let jig_lock = Func::wrap(
            store.as_context_mut(),
            |mut caller: Caller<'_, TxState>,
             origin_ptr: i32,
             lock_type: i32,
             args_ptr: i32|
             -> HostResult<()> {
                Executor::new(caller.as_context_mut())
                    .host_jig_lock(origin_ptr as u32, lock_type, args_ptr as u32)
                    .map_err(host_error)
            },
        );

        let call_method = Func::wrap(
            store.as_context_mut(),
            |mut caller: Caller<'_, TxState>,
             origin_ptr: i32,
             name_ptr: i32,
             args_ptr: i32|
             -> HostResult<i64> {
                Executor::new(caller.as_context_mut())
                    .host_call_method(origin_ptr as u32, name_ptr as u32, args_ptr as u32)
                    .map(|word| word.to_i64())
                    .map_err(host_error)
            },
        );

        let call_static = Func::wrap(
            store.as_context_mut(),
            |mut caller: Caller<'_, TxState>,
             pkg_ptr: i32,
             name_ptr: i32,
             args_ptr: i32|
             -> HostResult<i64> {
                Executor::new(caller.as_context_mut())
                    .host_call_static(pkg_ptr as u32, name_ptr as u32, args_ptr as u32)
                    .map(|word| word.to_i64())
                    .map_err(host_error)
            },
        );

        let call_function = Func::wrap(
            store.as_context_mut(),
            |mut caller: Caller<'_, TxState>,
             pkg_ptr: i32,
             name_ptr: i32,
             args_ptr: i32|
             -> HostResult<i64> {
                Executor::new(caller.as_context_mut())
                    .host_call_function(pkg_ptr as u32, name_ptr as u32, args_ptr as u32)
                    .map(|word| word.to_i64())
                    .map_err(host_error)
            },
        );

        let get_prop = Func::wrap(
            store.as_context_mut(),
            |mut caller: Caller<'_, TxState>, origin_ptr: i32, prop_ptr: i32| -> HostResult<i64> {
                Executor::new(caller.as_context_mut())
                    .host_get_prop(origin_ptr as u32, prop_ptr as u32)
                    .map(|word| word.to_i64())
                    .map_err(host_error)
            },
        );

        let remote_state = Func::wrap(
            store.as_context_mut(),
            |mut caller: Caller<'_, TxState>, origin_ptr: i32| -> HostResult<i32> {
                Executor::new(caller.as_context_mut())
                    .host_remote_state(origin_ptr as u32)
                    .map(|ptr| ptr as i32)
                    .map_err(host_error)
            },
        );

        let caller_typecheck = Func::wrap(
            store.as_context_mut(),
            |mut caller: Caller<'_, TxState>, rtid: i32, exact: i32| -> HostResult<i32> {
                Executor::new(caller.as_context_mut())
                    .host_caller_typecheck(rtid as u32, exact != 0)
                    .map(i32::from)
                    .map_err(host_error)
            },
        );

        let caller_outputcheck = Func::wrap(
            store.as_context_mut(),
            |mut caller: Caller<'_, TxState>| -> HostResult<i32> {
                Ok(i32::from(
                    Executor::new(caller.as_context_mut()).host_caller_outputcheck(),
                ))
            },
        );

        let caller_output = Func::wrap(
            store.as_context_mut(),
            |mut caller: Caller<'_, TxState>| -> HostResult<i32> {
                Executor::new(caller.as_context_mut())
                    .host_caller_output()
                    .map(|ptr| ptr as i32)
                    .map_err(host_error)
            },
        );

        let caller_output_val = Func::wrap(
            store.as_context_mut(),
            |mut caller: Caller<'_, TxState>, key_ptr: i32| -> HostResult<i32> {
                Executor::new(caller.as_context_mut())
                    .host_caller_output_val(key_ptr as u32)
                    .map(|ptr| ptr as i32)
                    .map_err(host_error)
            },
        );

        let constructor_local = Func::wrap(
            store.as_context_mut(),
            |mut caller: Caller<'_, TxState>, class_ptr: i32, args_ptr: i32| -> HostResult<i32> {
                Executor::new(caller.as_context_mut())
                    .host_constructor_local(class_ptr as u32, args_ptr as u32)
                    .map(|ptr| ptr as i32)
                    .map_err(host_error)
            },
        );

        let constructor_remote = Func::wrap(
            store.as_context_mut(),
            |mut caller: Caller<'_, TxState>,
             pkg_ptr: i32,
             class_ptr: i32,
             args_ptr: i32|
             -> HostResult<i32> {
                Executor::new(caller.as_context_mut())
                    .host_constructor_remote(pkg_ptr as u32, class_ptr as u32, args_ptr as u32)
                    .map(|ptr| ptr as i32)
                    .map_err(host_error)
            },
        );

        let debug_str = Func::wrap(
            store.as_context_mut(),
            |mut caller: Caller<'_, TxState>, msg_ptr: i32| -> HostResult<()> {
                Executor::new(caller.as_context_mut())
                    .host_debug_str(msg_ptr as u32)
                    .map_err(host_error)
            },
        );

        Self {
            abort,
            jig_init,
            jig_link,
            jig_authcheck,
            jig_lock,
            call_method,
            call_static,
            call_function,
            get_prop,
            remote_state,
            caller_typecheck,
            caller_outputcheck,
            caller_output,
            caller_output_val,
            constructor_local,
            constructor_remote,
            debug_str,
        }
    }

    /// Defines every host function in the linker of a container.
    pub fn define(&self, linker: &mut Linker<TxState>) -> Result<(), RuntimeError> {
        let definitions = [
            (MODULE_ENV_NAME, ABORT_FUNCTION_NAME, self.abort),
            (MODULE_VM_NAME, JIG_INIT_FUNCTION_NAME, self.jig_init),
            (MODULE_VM_NAME, JIG_LINK_FUNCTION_NAME, self.jig_link),
            (MODULE_VM_NAME, JIG_AUTHCHECK_FUNCTION_NAME, self.jig_authcheck),
            (MODULE_VM_NAME, JIG_LOCK_FUNCTION_NAME, self.jig_lock),
            (MODULE_VM_NAME, CALL_METHOD_FUNCTION_NAME, self.call_method),
            (MODULE_VM_NAME, CALL_STATIC_FUNCTION_NAME, self.call_static),
            (MODULE_VM_NAME, CALL_FUNCTION_FUNCTION_NAME, self.call_function),
            (MODULE_VM_NAME, GET_PROP_FUNCTION_NAME, self.get_prop),
            (MODULE_VM_NAME, REMOTE_STATE_FUNCTION_NAME, self.remote_state),
            (MODULE_VM_NAME, CALLER_TYPECHECK_FUNCTION_NAME, self.caller_typecheck),
            (MODULE_VM_NAME, CALLER_OUTPUTCHECK_FUNCTION_NAME, self.caller_outputcheck),
            (MODULE_VM_NAME, CALLER_OUTPUT_FUNCTION_NAME, self.caller_output),
            (MODULE_VM_NAME, CALLER_OUTPUT_VAL_FUNCTION_NAME, self.caller_output_val),
            (MODULE_VM_NAME, CONSTRUCTOR_LOCAL_FUNCTION_NAME, self.constructor_local),
            (MODULE_VM_NAME, CONSTRUCTOR_REMOTE_FUNCTION_NAME, self.constructor_remote),
            (MODULE_VM_NAME, DEBUG_STR_FUNCTION_NAME, self.debug_str),
        ];

        for (module, name, func) in definitions {
            linker.define(module, name, func).map_err(|e| {
                ExecutionError::WasmInstantiation(format!(
                    "failed to define {}.{}: {}",
                    module, name, e
                ))
            })?;
        }
        Ok(())
    }
}
