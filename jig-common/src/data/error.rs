use std::fmt;

/// Represents an error when decoding a wire buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Tried to read past the end of the buffer.
    BufferOverflow { needed: usize, remaining: usize },
    /// An unsigned LEB128 value does not fit in 64 bits.
    InvalidUleb,
    /// A fixed size value came with the wrong length.
    InvalidLength { expected: usize, actual: usize },
    /// Unknown lock type discriminator.
    InvalidLockType(i32),
    /// Unknown instruction opcode.
    UnknownOpCode(u8),
    /// Bytes are not valid UTF-8.
    InvalidUtf8,
    /// The buffer has bytes left after the value was decoded.
    ExtraTrailingBytes(usize),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DecodeError::BufferOverflow { needed, remaining } => write!(
                f,
                "buffer overflow: needed {} bytes but only {} remain",
                needed, remaining
            ),
            DecodeError::InvalidUleb => write!(f, "invalid uleb128 value"),
            DecodeError::InvalidLength { expected, actual } => {
                write!(f, "invalid length: expected {}, got {}", expected, actual)
            }
            DecodeError::InvalidLockType(t) => write!(f, "unknown lock type: {}", t),
            DecodeError::UnknownOpCode(op) => write!(f, "unknown opcode: {:#04x}", op),
            DecodeError::InvalidUtf8 => write!(f, "invalid utf8 string"),
            DecodeError::ExtraTrailingBytes(n) => write!(f, "{} unexpected trailing bytes", n),
        }
    }
}

impl std::error::Error for DecodeError {}
