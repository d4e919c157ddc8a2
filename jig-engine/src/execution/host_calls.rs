use super::executor::Executor;
use super::jig_ref::*;
use crate::abi::*;
use crate::errors::*;
use crate::locks::*;
use crate::memory::*;
use crate::types::*;
use crate::vm::wasm::*;
use crate::{tx_debug, tx_trace};
use std::str::FromStr;

/// Keys accepted by `caller_output_val`.
const CALLER_KEY_ORIGIN: &str = "origin";
const CALLER_KEY_LOCATION: &str = "location";
const CALLER_KEY_CLASS: &str = "class";

/// Handlers of the host functions. `from` is always the container whose wasm made the call.
impl<'a> Executor<'a> {
    fn calling_container(&self) -> Result<WasmContainer, RuntimeError> {
        Ok(self.state().current_container()?)
    }

    fn read_origin(&mut self, from: &WasmContainer, ptr: u32) -> Result<Pointer, RuntimeError> {
        let bytes = self.memory(from.clone()).read_buffer(ptr)?;
        Ok(Pointer::from_bytes(&bytes)?)
    }

    fn read_string(&mut self, from: &WasmContainer, ptr: u32) -> Result<String, RuntimeError> {
        self.memory(from.clone()).read_string(ptr)
    }

    /// Package ids travel as hex strings, optionally followed by `_` and a name.
    fn read_package_id(&mut self, from: &WasmContainer, ptr: u32) -> Result<PackageId, RuntimeError> {
        let text = self.read_string(from, ptr)?;
        let hex = text.split('_').next().unwrap_or_default();
        PackageId::from_str(hex).map_err(|_| ExecutionError::InvalidPackageId(text.clone()).into())
    }

    /// Reads an args buffer written by a container: each argument as a word of its own size,
    /// one after the other. Returns the arguments in their wire form.
    fn lift_host_args(
        &mut self,
        from: &WasmContainer,
        args_ptr: u32,
        args: &[ArgNode],
    ) -> Result<Vec<u8>, RuntimeError> {
        let buffer = self.memory(from.clone()).read_buffer(args_ptr)?;
        let mut reader = BufReader::new(&buffer);
        let mut writer = BufWriter::new();
        for arg in args {
            let bytes = reader.read_fixed_bytes(arg.ty.own_size() as usize)?;
            let word = WasmWord::from_bytes(bytes);
            writer.write_fixed_bytes(&self.lift(from, word, &arg.ty)?);
        }
        Ok(writer.into_bytes())
    }

    /// Moves a returned value from the container that produced it to the caller.
    fn return_value(
        &mut self,
        target: &WasmContainer,
        from: &WasmContainer,
        rtype: &TypeNode,
        word: Option<WasmWord>,
    ) -> Result<WasmWord, RuntimeError> {
        match word {
            Some(word) if !rtype.is_void() => {
                let bytes = self.lift(target, word, rtype)?;
                self.lower(from, &bytes, rtype)
            }
            _ => Ok(WasmWord::null()),
        }
    }

    fn lower_buffer(&mut self, into: &WasmContainer, bytes: &[u8]) -> Result<u32, RuntimeError> {
        let mut writer = BufWriter::new();
        writer.write_bytes(bytes);
        let word = self.lower(into, &writer.into_bytes(), &buffer_type())?;
        Ok(word.to_u32())
    }

    fn constructing_origin(&self) -> Result<Pointer, RuntimeError> {
        self.state()
            .constructing
            .last()
            .copied()
            .ok_or_else(|| ExecutionError::NoJigInConstruction.into())
    }

    /// The jig behind a proxy held by `from`, loaded if needed, and the container it lives in.
    fn resolve_proxy(
        &mut self,
        from: &WasmContainer,
        origin: &Pointer,
    ) -> Result<(JigRef, WasmContainer), RuntimeError> {
        let jig = self.jig_or_load(origin)?;
        let target = match jig.proxy_target(&from.id) {
            ProxyTarget::Local(_) => from.clone(),
            ProxyTarget::Remote { package, .. } => self.state().container(&package)?,
        };
        Ok((jig, target))
    }

    /// Origin of the jig that called the one running.
    fn caller_origin(&self) -> Option<Pointer> {
        self.state().stack.from_top(2).copied()
    }

    pub fn host_abort(
        &mut self,
        msg_ptr: u32,
        file_ptr: u32,
        line: u32,
        col: u32,
    ) -> Result<(), RuntimeError> {
        let from = self.calling_container()?;
        let message = match msg_ptr {
            0 => String::new(),
            ptr => self.read_string(&from, ptr)?,
        };
        let file = match file_ptr {
            0 => String::new(),
            ptr => self.read_string(&from, ptr)?,
        };
        Err(ExecutionError::Abort {
            message,
            file,
            line,
            col,
        }
        .into())
    }

    /// Identity handed to a constructor before the jig exists.
    pub fn host_jig_init(&mut self) -> Result<u32, RuntimeError> {
        self.state_mut().measurements.new_jigs.inc()?;
        let origin = self.constructing_origin()?;
        let from = self.calling_container()?;

        let bytes = init_params_bytes(&origin, &origin, &CLASS_PTR_PLACEHOLDER, &JigLock::None);
        let word = self.lower(&from, &bytes, &jig_init_params_type())?;
        Ok(word.to_u32())
    }

    /// Registers the jig under construction. Returns its class pointer.
    pub fn host_jig_link(&mut self, jig_ptr: u32, rtid: u32) -> Result<u32, RuntimeError> {
        let origin = self.constructing_origin()?;
        let from = self.calling_container()?;
        let class_name = from
            .abi
            .type_name_by_rtid(rtid)
            .ok_or(ExecutionError::UnknownRtid(rtid))?;
        let class = from.abi.class_by_name(class_name)?;

        let jig = JigRef {
            ptr: WasmWord::from_u32(jig_ptr),
            class_idx: class.idx,
            package: from.id,
            origin,
            location: origin,
            lock: JigLock::None,
            is_new: true,
        };
        tx_trace!(self, "link {} {}", class.name, origin);
        let class_ptr = jig.class_ptr();

        let state = self.state_mut();
        state.add_jig(jig);
        state.mark_affected(origin);
        self.lower_buffer(&from, &class_ptr.to_bytes())
    }

    pub fn host_jig_authcheck(&mut self, origin_ptr: u32, check: i32) -> Result<bool, RuntimeError> {
        let from = self.calling_container()?;
        let origin = self.read_origin(&from, origin_ptr)?;
        let jig = self.jig_or_load(&origin)?;

        match check {
            AUTH_CHECK_CALL => {
                // As seen from inside the jig, were it called now.
                self.state_mut().stack.push(origin);
                let accepts = jig.lock.accepts_execution(self.state());
                self.state_mut().stack.pop();
                Ok(accepts)
            }
            AUTH_CHECK_LOCK => Ok(jig.lock.can_be_changed_by(&origin, self.state())),
            other => Err(ExecutionError::UnknownAuthCheck(other).into()),
        }
    }

    pub fn host_jig_lock(
        &mut self,
        origin_ptr: u32,
        lock_type: i32,
        args_ptr: u32,
    ) -> Result<(), RuntimeError> {
        let from = self.calling_container()?;
        let origin = self.read_origin(&from, origin_ptr)?;
        self.jig_or_load(&origin)?;

        let lock = match LockType::from_i32(lock_type)? {
            LockType::Frozen => JigLock::Frozen,
            LockType::None => JigLock::None,
            LockType::Pubkey => {
                let data = self.memory(from).read_buffer(args_ptr)?;
                let address = Address::try_from(data.as_slice()).map_err(|_| {
                    DecodeError::InvalidLength {
                        expected: ADDRESS_LENGTH,
                        actual: data.len(),
                    }
                })?;
                JigLock::Pubkey(address)
            }
            LockType::Caller => {
                // A jig locking itself goes to its caller, anything else to the running jig.
                let stack = &self.state().stack;
                let parent = match stack.top() {
                    Some(top) if *top == origin => stack.caller(),
                    top => top,
                };
                JigLock::Caller(*parent.ok_or(ExecutionError::CallerLockFromTopLevel(origin))?)
            }
            LockType::Anyone => {
                let top = self.state().stack.top().copied();
                if top != Some(origin) {
                    return Err(PermissionError {
                        origin,
                        operation: "change lock to anyone".to_string(),
                        caller: top,
                        frozen: false,
                    }
                    .into());
                }
                JigLock::Anyone
            }
        };

        self.change_lock(&origin, lock, "change lock")
    }

    pub fn host_call_method(
        &mut self,
        origin_ptr: u32,
        name_ptr: u32,
        args_ptr: u32,
    ) -> Result<WasmWord, RuntimeError> {
        let from = self.calling_container()?;
        let origin = self.read_origin(&from, origin_ptr)?;
        let name = self.read_string(&from, name_ptr)?;

        let (jig, target) = self.resolve_proxy(&from, &origin)?;
        let class = target.abi.class_by_idx(jig.class_idx)?.clone();
        let method = class.method_by_name(&name)?.clone();

        let args = self.lift_host_args(&from, args_ptr, &method.args)?;
        let args = self.lower_args(&target, &method.args, &args)?;
        self.state_mut().mark_affected(origin);
        let word = self.call_method(&target, &jig, &class, &method, args)?;
        self.return_value(&target, &from, &method.rtype, word)
    }

    /// `name` is `{Class}_{method}`.
    pub fn host_call_static(
        &mut self,
        pkg_ptr: u32,
        name_ptr: u32,
        args_ptr: u32,
    ) -> Result<WasmWord, RuntimeError> {
        let from = self.calling_container()?;
        let pkg_id = self.read_package_id(&from, pkg_ptr)?;
        let name = self.read_string(&from, name_ptr)?;
        let (class_name, method_name) = name
            .split_once('_')
            .ok_or_else(|| ExecutionError::UnknownExport(name.clone()))?;

        let target = self.import(&pkg_id)?;
        let class = target.abi.class_by_name(class_name)?.clone();
        let method = class.method_by_name(method_name)?.clone();
        if !method.is_static() {
            return Err(ExecutionError::UnknownMethod {
                class_name: class.name.clone(),
                method: method.name.clone(),
            }
            .into());
        }

        let args = self.lift_host_args(&from, args_ptr, &method.args)?;
        let args = self.lower_args(&target, &method.args, &args)?;
        let word = self.call_export(&target, &method.call_name(), &args)?;
        self.return_value(&target, &from, &method.rtype, word)
    }

    pub fn host_call_function(
        &mut self,
        pkg_ptr: u32,
        name_ptr: u32,
        args_ptr: u32,
    ) -> Result<WasmWord, RuntimeError> {
        let from = self.calling_container()?;
        let pkg_id = self.read_package_id(&from, pkg_ptr)?;
        let name = self.read_string(&from, name_ptr)?;

        let target = self.import(&pkg_id)?;
        let function = target.abi.function_by_name(&name)?.clone();

        let args = self.lift_host_args(&from, args_ptr, &function.args)?;
        let args = self.lower_args(&target, &function.args, &args)?;
        let word = self.call_export(&target, &function.name, &args)?;
        self.return_value(&target, &from, &function.rtype, word)
    }

    pub fn host_get_prop(&mut self, origin_ptr: u32, prop_ptr: u32) -> Result<WasmWord, RuntimeError> {
        let from = self.calling_container()?;
        let origin = self.read_origin(&from, origin_ptr)?;
        let prop = self.read_string(&from, prop_ptr)?;

        let (jig, target) = self.resolve_proxy(&from, &origin)?;
        let class = target.abi.class_by_idx(jig.class_idx)?;
        let field = class.field_by_name(&prop)?.clone();

        let word = self
            .memory(target.clone())
            .read_word(ptr_at(jig.ptr.to_u32(), field.offset)?, &field.ty)?;
        let bytes = self.lift(&target, word, &field.ty)?;
        self.lower(&from, &bytes, &field.ty)
    }

    /// The `Output` of any jig, live or stored, without bringing it into the transaction.
    pub fn host_remote_state(&mut self, origin_ptr: u32) -> Result<u32, RuntimeError> {
        let from = self.calling_container()?;
        let origin = self.read_origin(&from, origin_ptr)?;
        let data = self.state().jig_data(&origin)?;
        let word = self.lower(&from, &data.output_bytes(), &output_type())?;
        Ok(word.to_u32())
    }

    /// Is the caller of the running jig an instance of the type with runtime id `rtid`?
    pub fn host_caller_typecheck(&mut self, rtid: u32, exact: bool) -> Result<bool, RuntimeError> {
        let from = self.calling_container()?;
        let Some(caller_origin) = self.caller_origin() else {
            return Ok(false);
        };
        let Some(type_name) = from.abi.type_name_by_rtid(rtid) else {
            return Ok(false);
        };

        let caller = self.jig_or_load(&caller_origin)?;
        let caller_container = self.state().container(&caller.package)?;
        let caller_class = caller_container.abi.class_by_idx(caller.class_idx)?;
        if exact {
            Ok(caller_class.name == type_name)
        } else {
            Ok(caller_class.is_subclass_of(type_name))
        }
    }

    pub fn host_caller_outputcheck(&self) -> bool {
        self.caller_origin().is_some()
    }

    pub fn host_caller_output(&mut self) -> Result<u32, RuntimeError> {
        let from = self.calling_container()?;
        let origin = self
            .caller_origin()
            .ok_or(ExecutionError::CallerFromTopLevel)?;
        let data = self.state().jig_data(&origin)?;
        let word = self.lower(&from, &data.output_bytes(), &output_type())?;
        Ok(word.to_u32())
    }

    pub fn host_caller_output_val(&mut self, key_ptr: u32) -> Result<u32, RuntimeError> {
        let from = self.calling_container()?;
        let key = self.read_string(&from, key_ptr)?;
        let origin = self
            .caller_origin()
            .ok_or(ExecutionError::CallerFromTopLevel)?;
        let data = self.state().jig_data(&origin)?;

        let pointer = match key.as_str() {
            CALLER_KEY_ORIGIN => data.origin,
            CALLER_KEY_LOCATION => data.location,
            CALLER_KEY_CLASS => data.class_ptr,
            _ => return Err(ExecutionError::UnknownCallerKey(key).into()),
        };
        self.lower_buffer(&from, &pointer.to_bytes())
    }

    /// Creates a jig of a class of the calling package.
    pub fn host_constructor_local(
        &mut self,
        class_ptr: u32,
        args_ptr: u32,
    ) -> Result<u32, RuntimeError> {
        let from = self.calling_container()?;
        let class_name = self.read_string(&from, class_ptr)?;
        let class = from.abi.class_by_name(&class_name)?.clone();

        let args = self.lift_host_args(&from, args_ptr, &class.constructor.args)?;
        let jig = self.construct(&from, &class, &args)?;
        let word = self.lower(&from, &jig.init_params_bytes(), &jig_init_params_type())?;
        Ok(word.to_u32())
    }

    /// Creates a jig of a class of another package.
    pub fn host_constructor_remote(
        &mut self,
        pkg_ptr: u32,
        class_ptr: u32,
        args_ptr: u32,
    ) -> Result<u32, RuntimeError> {
        let from = self.calling_container()?;
        let pkg_id = self.read_package_id(&from, pkg_ptr)?;
        let class_name = self.read_string(&from, class_ptr)?;

        let target = self.import(&pkg_id)?;
        let class = target.abi.class_by_name(&class_name)?.clone();
        let args = self.lift_host_args(&from, args_ptr, &class.constructor.args)?;
        let jig = self.construct(&target, &class, &args)?;
        let word = self.lower(&from, &jig.init_params_bytes(), &jig_init_params_type())?;
        Ok(word.to_u32())
    }

    pub fn host_debug_str(&mut self, msg_ptr: u32) -> Result<(), RuntimeError> {
        let from = self.calling_container()?;
        let msg = self.read_string(&from, msg_ptr)?;
        tx_debug!(self, "{}", msg);
        Ok(())
    }
}
