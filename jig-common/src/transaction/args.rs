use crate::data::BufWriter;

/// Builds an instruction argument buffer.
///
/// The buffer starts with the positions of the arguments given as references to earlier
/// statements, followed by every argument in order: a reference is a `u16` statement index,
/// anything else is the argument's wire encoding.
#[derive(Debug, Default)]
pub struct ArgsBuilder {
    refs: Vec<u8>,
    body: BufWriter,
    count: u8,
}

impl ArgsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an argument written by `f`.
    pub fn arg<F: FnOnce(&mut BufWriter)>(mut self, f: F) -> Self {
        f(&mut self.body);
        self.count += 1;
        self
    }

    /// Adds an argument taken from the result of statement `stmt_idx`.
    pub fn stmt_ref(mut self, stmt_idx: u16) -> Self {
        self.refs.push(self.count);
        self.body.write_u16(stmt_idx);
        self.count += 1;
        self
    }

    pub fn bool(self, value: bool) -> Self {
        self.arg(|w| {
            w.write_bool(value);
        })
    }

    pub fn u32(self, value: u32) -> Self {
        self.arg(|w| {
            w.write_u32(value);
        })
    }

    pub fn u64(self, value: u64) -> Self {
        self.arg(|w| {
            w.write_u64(value);
        })
    }

    pub fn str(self, value: &str) -> Self {
        self.arg(|w| {
            w.write_str(value);
        })
    }

    pub fn bytes(self, value: &[u8]) -> Self {
        self.arg(|w| {
            w.write_bytes(value);
        })
    }

    pub fn build(self) -> Vec<u8> {
        let mut writer = BufWriter::new();
        writer.write_uleb(self.refs.len() as u64);
        for position in &self.refs {
            writer.write_u8(*position);
        }
        writer.write_fixed_bytes(self.body.data());
        writer.into_bytes()
    }
}

/// Argument buffer of a call without arguments.
pub fn no_args() -> Vec<u8> {
    ArgsBuilder::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refs_prefix() {
        let args = ArgsBuilder::new().u32(7).stmt_ref(3).build();
        assert_eq!(args, vec![1, 1, 7, 0, 0, 0, 3, 0]);
    }

    #[test]
    fn test_no_args() {
        assert_eq!(no_args(), vec![0]);
    }
}
