//! regvm validator: static checks on contract records.
//!
//! The validator runs before a record is trusted: the engine calls it
//! before saving a record and (by default) after loading one. It collects
//! ALL errors rather than stopping at the first.
//!
//! # Usage
//!
//! ```
//! use regvm_common::{ContractRecord, Instruction, Opcode};
//! use regvm_validator::validate;
//!
//! let code = Instruction::bare(Opcode::End).encode();
//! let record = ContractRecord::new(code, "owner").with_function("main", 0);
//! assert!(validate(&record).is_ok());
//! ```
//!
//! # Passes
//!
//! 1. **Limits**: logical length vs buffer, entry offsets in range
//! 2. **Structural**: per-function instruction scan to a terminator, with
//!    operand rules applied per instruction shape

pub mod error;
pub mod limits;
pub mod rules;
pub mod structural;

pub use error::ValidationError;
pub use rules::{OperandRules, PermissiveRules, StrictRules};

use regvm_common::ContractRecord;
use tracing::debug;

/// Validate a record with the default (permissive) operand rules.
pub fn validate(record: &ContractRecord) -> Result<(), Vec<ValidationError>> {
    validate_with(record, &PermissiveRules)
}

/// Validate a record with a caller-supplied rule set.
pub fn validate_with<R: OperandRules + ?Sized>(
    record: &ContractRecord,
    rules: &R,
) -> Result<(), Vec<ValidationError>> {
    // Pass 1: Limits
    let mut all_errors = limits::check_limits(record);

    // Pass 2: Structural. Functions with out-of-range entries were already
    // reported by the limits pass.
    let code = record.code();
    let scannable: Vec<_> = record
        .functions
        .iter()
        .filter(|f| f.offset < code.len())
        .cloned()
        .collect();
    all_errors.extend(structural::check_structural(code, &scannable, rules));

    debug!(
        functions = record.functions.len(),
        code_len = code.len(),
        errors = all_errors.len(),
        "validated contract record"
    );

    if all_errors.is_empty() {
        Ok(())
    } else {
        Err(all_errors)
    }
}

/// Boolean form of [`validate`].
pub fn is_valid(record: &ContractRecord) -> bool {
    validate(record).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use regvm_common::{encode_all, Instruction, Opcode, Operand};

    fn end() -> Instruction {
        Instruction::bare(Opcode::End)
    }

    #[test]
    fn minimal_valid_record() {
        let record = ContractRecord::new(end().encode(), "o").with_function("main", 0);
        assert!(validate(&record).is_ok());
        assert!(is_valid(&record));
    }

    #[test]
    fn empty_function_table_is_vacuously_valid() {
        let record = ContractRecord::new(vec![255, 255], "o");
        assert!(is_valid(&record));
    }

    #[test]
    fn out_of_range_entry_reported_once() {
        let record = ContractRecord::new(end().encode(), "o").with_function("far", 40);
        let errors = validate(&record).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0],
            ValidationError::EntryOutOfBounds { offset: 40, .. }
        ));
    }

    #[test]
    fn multiple_errors_collected() {
        let mut code = encode_all(&[
            Instruction::source_only(Opcode::Push, Operand::Register(0)),
            end(),
        ]);
        code.push(250);
        let mut record = ContractRecord::new(code, "o")
            .with_function("main", 0)
            .with_function("junk", 4);
        record.byte_code_len = 10;
        let errors = validate(&record).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::LengthExceedsBuffer { .. })));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::UnknownOpcode { at: 4, byte: 250 })));
    }

    #[test]
    fn logical_length_hides_trailing_terminator() {
        let code = encode_all(&[
            Instruction::source_only(Opcode::Push, Operand::Register(0)),
            end(),
        ]);
        let mut record = ContractRecord::new(code, "o").with_function("main", 0);
        record.byte_code_len = 3;
        assert_eq!(
            validate(&record),
            Err(vec![ValidationError::MissingTerminator {
                function: "main".into()
            }])
        );
    }

    #[test]
    fn strict_rules_reject_what_permissive_accepts() {
        let code = encode_all(&[
            Instruction::dest_only(Opcode::Data, Operand::Register(0)),
            end(),
        ]);
        let record = ContractRecord::new(code, "o").with_function("main", 0);
        assert!(validate(&record).is_ok());
        let errors = validate_with(&record, &StrictRules).unwrap_err();
        assert!(matches!(
            errors[0],
            ValidationError::IllegalOperand {
                at: 0,
                opcode: Opcode::Data,
                ..
            }
        ));
    }
}
