use crate::types::*;

/// Origins of the jigs currently executing a method, innermost last.
///
/// From inside a method the top of the stack is the jig itself and the entry below it is the
/// jig that called it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallStack {
    frames: Vec<Pointer>,
}

impl CallStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, origin: Pointer) {
        self.frames.push(origin);
    }

    pub fn pop(&mut self) -> Option<Pointer> {
        self.frames.pop()
    }

    pub fn top(&self) -> Option<&Pointer> {
        self.frames.last()
    }

    /// The entry below the top.
    pub fn caller(&self) -> Option<&Pointer> {
        self.from_top(2)
    }

    /// `from_top(1)` is the top, `from_top(2)` the entry below it and so on.
    pub fn from_top(&self, n: usize) -> Option<&Pointer> {
        if n == 0 || n > self.frames.len() {
            return None;
        }
        self.frames.get(self.frames.len() - n)
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// What a lock needs to know to take a decision.
pub trait AuthContext {
    fn stack(&self) -> &CallStack;

    /// True when the current statement is covered by a signature of `address`.
    fn signed_by(&self, address: &Address) -> bool;
}
