use crate::memory::*;
use crate::types::*;

/// What an instruction left behind. Later instructions refer to it by index.
#[derive(Debug, Clone, PartialEq)]
pub enum StatementResult {
    /// `LOCK`, `FUND`, `SIGN`, `SIGNTO` and calls returning nothing.
    Empty,
    /// `IMPORT` and `DEPLOY`.
    Package(PackageId),
    /// A value returned by a call, living in the container of `package`.
    Value {
        ty: TypeNode,
        word: WasmWord,
        package: PackageId,
    },
    /// `NEW`, `LOAD` and `LOADBYORIGIN`.
    Jig(Pointer),
}

impl StatementResult {
    pub fn kind(&self) -> &'static str {
        match self {
            StatementResult::Empty => "empty",
            StatementResult::Package(_) => "package",
            StatementResult::Value { .. } => "value",
            StatementResult::Jig(_) => "jig",
        }
    }
}
