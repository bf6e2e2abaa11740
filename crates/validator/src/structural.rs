//! Structural scan of each function's instruction stream.
//!
//! Starting at a function's entry offset, instructions are decoded one after
//! another until RETURN or END. The scan is linear: branch targets are not
//! followed.

use crate::error::ValidationError;
use crate::rules::{check_operands, OperandRules};
use regvm_common::{DecodeError, Function, Instruction};

/// Scan one function. Stops at the first problem found.
pub fn scan_function<R: OperandRules + ?Sized>(
    code: &[u8],
    function: &Function,
    rules: &R,
) -> Result<usize, ValidationError> {
    let mut ptr = function.offset;
    let mut count = 0;

    loop {
        let instr = match Instruction::decode(code, ptr) {
            Ok(instr) => instr,
            Err(DecodeError::OutOfRange { .. }) => {
                return Err(ValidationError::MissingTerminator {
                    function: function.name.clone(),
                })
            }
            Err(DecodeError::UnknownOpcode(byte) | DecodeError::ReservedOpcode(byte)) => {
                return Err(ValidationError::UnknownOpcode { at: ptr, byte })
            }
            Err(DecodeError::Truncated { opcode, .. }) => {
                return Err(ValidationError::TruncatedOperand { at: ptr, opcode })
            }
        };
        count += 1;

        check_operands(rules, &instr).map_err(|reason| ValidationError::IllegalOperand {
            at: ptr,
            opcode: instr.opcode,
            reason,
        })?;

        if instr.opcode.is_terminator() {
            return Ok(count);
        }
        ptr += instr.len();
    }
}

/// Scan every function in `functions`, collecting one error per failing
/// function.
pub fn check_structural<R: OperandRules + ?Sized>(
    code: &[u8],
    functions: &[Function],
    rules: &R,
) -> Vec<ValidationError> {
    functions
        .iter()
        .filter_map(|f| scan_function(code, f, rules).err())
        .collect()
}
