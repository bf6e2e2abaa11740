//! Validation errors for regvm contracts.
//!
//! Every scan error names the byte offset (`at`) of the offending
//! instruction. The validator collects errors across all functions.

use regvm_common::Opcode;
use thiserror::Error;

/// Reasons a contract record is rejected before execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    // --- Record limits ---
    /// Logical code length exceeds the bytecode buffer.
    #[error("byte_code_len {len} exceeds bytecode buffer of {buffer} bytes")]
    LengthExceedsBuffer { len: usize, buffer: usize },

    /// Function entry offset is outside the logical code.
    #[error("function '{function}' starts at {offset}, outside the code (length {len})")]
    EntryOutOfBounds {
        function: String,
        offset: usize,
        len: usize,
    },

    // --- Instruction scan ---
    /// Byte at an instruction boundary is not in the catalog.
    #[error("unknown opcode {byte:#04x} at offset {at}")]
    UnknownOpcode { at: usize, byte: u8 },

    /// Operand bytes run past the end of the code.
    #[error("{} at offset {at} is truncated", opcode.mnemonic())]
    TruncatedOperand { at: usize, opcode: Opcode },

    /// Scan ran off the end of the code without RETURN or END.
    #[error("function '{function}' has no RETURN or END before the end of the code")]
    MissingTerminator { function: String },

    /// An operand rule rejected the instruction.
    #[error("illegal operand for {} at offset {at}: {reason}", opcode.mnemonic())]
    IllegalOperand {
        at: usize,
        opcode: Opcode,
        reason: String,
    },
}
