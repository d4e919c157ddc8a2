pub const MODULE_ENV_NAME: &str = "env";
pub const MODULE_VM_NAME: &str = "vm";

pub const EXPORT_MEMORY: &str = "memory";
pub const EXPORT_NEW: &str = "__new";
pub const EXPORT_START: &str = "_start";

pub const ABORT_FUNCTION_NAME: &str = "abort";

pub const JIG_INIT_FUNCTION_NAME: &str = "jig_init";
pub const JIG_LINK_FUNCTION_NAME: &str = "jig_link";
pub const JIG_AUTHCHECK_FUNCTION_NAME: &str = "jig_authcheck";
pub const JIG_LOCK_FUNCTION_NAME: &str = "jig_lock";

pub const CALL_METHOD_FUNCTION_NAME: &str = "call_method";
pub const CALL_STATIC_FUNCTION_NAME: &str = "call_static";
pub const CALL_FUNCTION_FUNCTION_NAME: &str = "call_function";
pub const GET_PROP_FUNCTION_NAME: &str = "get_prop";
pub const REMOTE_STATE_FUNCTION_NAME: &str = "remote_state";

pub const CALLER_TYPECHECK_FUNCTION_NAME: &str = "caller_typecheck";
pub const CALLER_OUTPUTCHECK_FUNCTION_NAME: &str = "caller_outputcheck";
pub const CALLER_OUTPUT_FUNCTION_NAME: &str = "caller_output";
pub const CALLER_OUTPUT_VAL_FUNCTION_NAME: &str = "caller_output_val";

pub const CONSTRUCTOR_LOCAL_FUNCTION_NAME: &str = "constructor_local";
pub const CONSTRUCTOR_REMOTE_FUNCTION_NAME: &str = "constructor_remote";

pub const DEBUG_STR_FUNCTION_NAME: &str = "debug_str";

/// Pages of the memory handed to every container through `env.memory`.
pub const MEMORY_PAGES: u32 = 1;

/// `jig_authcheck`: may the jig receive calls.
pub const AUTH_CHECK_CALL: i32 = 0;
/// `jig_authcheck`: may the lock of the jig be changed.
pub const AUTH_CHECK_LOCK: i32 = 1;
