use crate::types::*;
use wasmi::core::HostError;

/// Represents an error when executing a transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// Deterministic failure of the execution.
    ExecutionError(ExecutionError),

    /// A lock rejected a call or a lock change.
    PermissionError(PermissionError),
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RuntimeError::ExecutionError(e) => write!(f, "{}", e),
            RuntimeError::PermissionError(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for RuntimeError {}

/// Host functions fail with a `RuntimeError`, which travels through the wasm frames untouched
/// until the outermost call returns it.
impl HostError for RuntimeError {}

impl From<ExecutionError> for RuntimeError {
    fn from(error: ExecutionError) -> Self {
        RuntimeError::ExecutionError(error)
    }
}

impl From<PermissionError> for RuntimeError {
    fn from(error: PermissionError) -> Self {
        RuntimeError::PermissionError(error)
    }
}

impl From<DecodeError> for RuntimeError {
    fn from(error: DecodeError) -> Self {
        RuntimeError::ExecutionError(ExecutionError::DecodeError(error))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionError {
    /// The coins funding the transaction add up to less than the minimum.
    NotEnoughFunding { provided: u64, needed: u64 },

    /// No statement was executed at the given index.
    UnknownStatementIndex(usize),
    NotAPackage(usize),
    NotAJig(usize),
    NotAValue(usize),
    /// A nullable statement value given to an argument that can't be null.
    NullArgument(usize),
    NotACoin(Pointer),

    /// Storage has no package with the given id.
    UnknownPackage(PackageId),
    InvalidPackageId(String),
    /// Storage has no unspent output with the given id.
    OutputNotFound(OutputId),
    /// Storage has no unspent output with the given origin.
    JigNotFound(Pointer),
    /// A lowered value references a jig nobody knows about.
    MissingReferencedOutput(Pointer),

    /// The ABI of a package is inconsistent.
    InvalidAbi(String),
    /// A type name is neither a primitive nor defined by the ABI.
    UnknownType(String),
    /// A type that can't cross the wasm boundary, like a function.
    InvalidType(String),
    UnknownExport(String),
    UnknownClass(String),
    UnknownClassIdx(u16),
    UnknownMethod { class_name: String, method: String },
    UnknownMethodIdx { class_name: String, idx: u16 },
    UnknownFunctionIdx(u16),
    UnknownRtid(u32),
    UnknownRtidName(String),
    UnknownField { class_name: String, field: String },
    UnknownCallerKey(String),
    UnknownAuthCheck(i32),

    DecodeError(DecodeError),
    MemoryAccess { ptr: u32, len: usize },
    InvalidBufferRtid { ptr: u32, rtid: u32 },
    InvalidUtf16(u32),
    MissingReturnValue(String),

    WasmInstantiation(String),
    WasmTrap(String),
    /// A host function ran while no container was executing.
    NoActiveContainer,
    Abort {
        message: String,
        file: String,
        line: u32,
        col: u32,
    },

    /// Caller introspection from the top level.
    CallerFromTopLevel,
    /// `jig_init` or `jig_link` called outside a constructor.
    NoJigInConstruction,
    /// A constructor returned without linking a jig.
    JigNotCreated(Pointer),
    /// A jig that is not part of this transaction was used as a jig handle.
    JigNotLive(Pointer),
    /// Finalize found a jig that was never locked.
    UnlockedJig { class_name: String, origin: Pointer },
    /// The jig can only be locked to its caller from inside a method call.
    CallerLockFromTopLevel(Pointer),

    Compilation(String),
    HydrosExceeded { tag: String, max: u64 },
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExecutionError::NotEnoughFunding { provided, needed } => write!(
                f,
                "Not enough funding. Provided: {}. Needed: {}",
                provided, needed
            ),
            ExecutionError::UnknownStatementIndex(idx) => write!(f, "undefined index: {}", idx),
            ExecutionError::NotAPackage(idx) => write!(f, "index {} is not a package", idx),
            ExecutionError::NotAJig(idx) => write!(f, "index {} is not a jig", idx),
            ExecutionError::NotAValue(idx) => write!(f, "index {} is not a value", idx),
            ExecutionError::NullArgument(idx) => {
                write!(f, "index {} is null but the argument is not nullable", idx)
            }
            ExecutionError::NotACoin(origin) => write!(f, "Not a coin: {}", origin),
            ExecutionError::UnknownPackage(id) => write!(f, "unknown package: {}", id),
            ExecutionError::InvalidPackageId(id) => write!(f, "invalid package id: {}", id),
            ExecutionError::OutputNotFound(id) => {
                write!(f, "output not present in utxo set: {}", id)
            }
            ExecutionError::JigNotFound(origin) => write!(f, "unknown jig: {}", origin),
            ExecutionError::MissingReferencedOutput(origin) => {
                write!(f, "Missing referenced output: {}", origin)
            }
            ExecutionError::InvalidAbi(msg) => write!(f, "invalid abi: {}", msg),
            ExecutionError::UnknownType(name) => write!(f, "unknown type: {}", name),
            ExecutionError::InvalidType(name) => {
                write!(f, "values of type {} cannot cross the wasm boundary", name)
            }
            ExecutionError::UnknownExport(name) => write!(f, "unknown export: {}", name),
            ExecutionError::UnknownClass(name) => write!(f, "unknown class: {}", name),
            ExecutionError::UnknownClassIdx(idx) => write!(f, "unknown class index: {}", idx),
            ExecutionError::UnknownMethod { class_name, method } => {
                write!(f, "unknown method: {}#{}", class_name, method)
            }
            ExecutionError::UnknownMethodIdx { class_name, idx } => {
                write!(f, "unknown method index {} for class {}", idx, class_name)
            }
            ExecutionError::UnknownFunctionIdx(idx) => {
                write!(f, "unknown function index: {}", idx)
            }
            ExecutionError::UnknownRtid(id) => write!(f, "Runtime id \"{}\" not found", id),
            ExecutionError::UnknownRtidName(name) => {
                write!(f, "Runtime id for \"{}\" not found", name)
            }
            ExecutionError::UnknownField { class_name, field } => {
                write!(f, "unknown field: {}.{}", class_name, field)
            }
            ExecutionError::UnknownCallerKey(key) => {
                write!(f, "unknown caller output key: {}", key)
            }
            ExecutionError::UnknownAuthCheck(check) => write!(f, "unknown auth check: {}", check),
            ExecutionError::DecodeError(e) => write!(f, "{}", e),
            ExecutionError::MemoryAccess { ptr, len } => {
                write!(f, "memory access out of bounds: {} bytes at {}", len, ptr)
            }
            ExecutionError::InvalidBufferRtid { ptr, rtid } => write!(
                f,
                "expected an ArrayBuffer at {} but found runtime id {}",
                ptr, rtid
            ),
            ExecutionError::InvalidUtf16(ptr) => write!(f, "invalid utf16 string at {}", ptr),
            ExecutionError::MissingReturnValue(name) => {
                write!(f, "export {} returned no value", name)
            }
            ExecutionError::WasmInstantiation(msg) => {
                write!(f, "failed to instantiate wasm module: {}", msg)
            }
            ExecutionError::WasmTrap(msg) => write!(f, "wasm trap: {}", msg),
            ExecutionError::NoActiveContainer => {
                write!(f, "host function called outside of a container")
            }
            ExecutionError::Abort {
                message,
                file,
                line,
                col,
            } => write!(f, "{} in {}:{}:{}", message, file, line, col),
            ExecutionError::CallerFromTopLevel => {
                write!(f, "caller function executed from top level")
            }
            ExecutionError::NoJigInConstruction => write!(f, "no jig is being constructed"),
            ExecutionError::JigNotCreated(origin) => {
                write!(f, "jig {} should had been created", origin)
            }
            ExecutionError::JigNotLive(origin) => {
                write!(f, "jig {} is not part of the transaction", origin)
            }
            ExecutionError::UnlockedJig { class_name, origin } => write!(
                f,
                "Finishing tx with unlocked jig ({}): {}",
                class_name, origin
            ),
            ExecutionError::CallerLockFromTopLevel(origin) => write!(
                f,
                "jig {} can only be locked to its caller from inside a method",
                origin
            ),
            ExecutionError::Compilation(msg) => write!(f, "compilation failed: {}", msg),
            ExecutionError::HydrosExceeded { tag, max } => {
                write!(f, "Max hydros for {} ({}) was over passed", tag, max)
            }
        }
    }
}

impl From<DecodeError> for ExecutionError {
    fn from(error: DecodeError) -> Self {
        ExecutionError::DecodeError(error)
    }
}

/// A jig refused to run a method or to change its lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionError {
    pub origin: Pointer,
    pub operation: String,
    pub caller: Option<Pointer>,
    pub frozen: bool,
}

impl fmt::Display for PermissionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "jig {} is not allowed to {}", self.origin, self.operation)?;
        if let Some(caller) = &self.caller {
            write!(f, " called from {}", caller)?;
        }
        if self.frozen {
            write!(f, " because it's frozen")?;
        }
        Ok(())
    }
}
