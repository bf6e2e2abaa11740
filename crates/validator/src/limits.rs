//! Record-level limits: logical length and function entry offsets.

use crate::error::ValidationError;
use regvm_common::ContractRecord;

/// Run the limits check.
///
/// Entry offsets are checked against the logical length clamped to the
/// buffer, so an oversized `byte_code_len` does not hide a bad offset.
pub fn check_limits(record: &ContractRecord) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if record.byte_code_len > record.bytecode.len() {
        errors.push(ValidationError::LengthExceedsBuffer {
            len: record.byte_code_len,
            buffer: record.bytecode.len(),
        });
    }

    let len = record.code().len();
    for f in &record.functions {
        if f.offset >= len {
            errors.push(ValidationError::EntryOutOfBounds {
                function: f.name.clone(),
                offset: f.offset,
                len,
            });
        }
    }

    errors
}
