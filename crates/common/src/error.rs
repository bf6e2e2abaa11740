//! Decode errors for regvm bytecode.

use crate::opcode::Opcode;
use thiserror::Error;

/// Errors that occur while decoding an instruction from a byte stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Byte is not part of the instruction catalog.
    #[error("unknown opcode: {0:#04x}")]
    UnknownOpcode(u8),

    /// Byte is reserved (retired opcode that must not appear in code).
    #[error("reserved opcode: {0:#04x}")]
    ReservedOpcode(u8),

    /// The instruction's operand bytes run past the end of the code.
    #[error(
        "truncated {} at offset {at}: needs {needed} bytes, {available} available",
        opcode.mnemonic()
    )]
    Truncated {
        at: usize,
        opcode: Opcode,
        needed: usize,
        available: usize,
    },

    /// Decode was asked to start at or past the end of the code.
    #[error("offset {at} is outside the code (length {len})")]
    OutOfRange { at: usize, len: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_unknown_opcode() {
        assert_eq!(
            DecodeError::UnknownOpcode(0xFF).to_string(),
            "unknown opcode: 0xff"
        );
    }

    #[test]
    fn display_reserved_opcode() {
        assert_eq!(
            DecodeError::ReservedOpcode(0x22).to_string(),
            "reserved opcode: 0x22"
        );
    }

    #[test]
    fn display_truncated() {
        assert_eq!(
            DecodeError::Truncated {
                at: 4,
                opcode: Opcode::Move,
                needed: 11,
                available: 6
            }
            .to_string(),
            "truncated MOVE at offset 4: needs 11 bytes, 6 available"
        );
    }
}
