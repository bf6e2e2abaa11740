//! Integration tests for the regvm validator.

use proptest::prelude::*;
use regvm_common::{encode_all, ContractRecord, Function, Instruction, Opcode, Operand};
use regvm_validator::{is_valid, validate, validate_with, OperandRules, ValidationError};

// ============================================================
// Helpers
// ============================================================

fn record(instrs: &[Instruction]) -> ContractRecord {
    ContractRecord::new(encode_all(instrs), "owner").with_function("main", 0)
}

fn mov(src: Operand, dst: Operand) -> Instruction {
    Instruction::source_dest(Opcode::Move, src, dst)
}

fn end() -> Instruction {
    Instruction::bare(Opcode::End)
}

// ============================================================
// Every shape is walked correctly
// ============================================================

#[test]
fn every_shape_in_one_function() {
    let r = record(&[
        mov(Operand::Immediate(1), Operand::Register(0)),
        Instruction::with_bit(
            Opcode::Set,
            3,
            Operand::Register(0),
            Operand::Register(0),
        ),
        Instruction::source_only(Opcode::Push, Operand::Memory(0x10)),
        Instruction::dest_only(Opcode::Pop, Operand::Indirect(2)),
        Instruction::dest_only(Opcode::Sender, Operand::Memory(0x20)),
        Instruction::source_dest(Opcode::Send, Operand::Immediate(5), Operand::Immediate(9)),
        Instruction::source_dest(Opcode::Store, Operand::Register(1), Operand::Immediate(9)),
        Instruction::source_dest(Opcode::Read, Operand::Immediate(9), Operand::Register(2)),
        Instruction::dest_only(Opcode::Jmp, Operand::Immediate(0)),
        end(),
    ]);
    assert_eq!(validate(&r), Ok(()));
}

#[test]
fn jmp_is_accepted() {
    let r = record(&[Instruction::dest_only(Opcode::Jmp, Operand::Immediate(0)), end()]);
    assert!(is_valid(&r));
}

#[test]
fn several_functions_share_code() {
    let code = encode_all(&[
        Instruction::dest_only(Opcode::Call, Operand::Immediate(4)),
        end(),
        Instruction::bare(Opcode::Return),
    ]);
    // CALL #imm is 2 + 8 bytes, END at 10, RETURN at 11.
    let r = ContractRecord::new(code, "owner")
        .with_function("main", 0)
        .with_function("helper", 11);
    assert!(is_valid(&r));
}

#[test]
fn function_starting_inside_an_operand_is_scanned_from_there() {
    // Offset 2 lands on the literal 0xFF byte of a MOVE.
    let code = encode_all(&[mov(Operand::Immediate(0xFF), Operand::Register(0)), end()]);
    let r = ContractRecord::new(code, "owner").with_function("odd", 2);
    assert_eq!(
        validate(&r),
        Err(vec![ValidationError::UnknownOpcode { at: 2, byte: 0xFF }])
    );
}

#[test]
fn truncated_memory_operand() {
    let mut code = encode_all(&[end()]);
    code.extend([2, 0b0010, 0x01]); // POP [0x01??]
    let r = ContractRecord::new(code, "owner").with_function("tail", 1);
    assert_eq!(
        validate(&r),
        Err(vec![ValidationError::TruncatedOperand {
            at: 1,
            opcode: Opcode::Pop
        }])
    );
}

// ============================================================
// Custom rules
// ============================================================

/// Rejects pushes from memory, to exercise the extension point.
struct NoMemoryPush;

impl OperandRules for NoMemoryPush {
    fn source_only(&self, instr: &Instruction) -> Result<(), String> {
        match instr.source {
            Some(Operand::Memory(_)) => Err("memory push".into()),
            _ => Ok(()),
        }
    }
}

#[test]
fn custom_rules_plug_in() {
    let r = record(&[
        Instruction::source_only(Opcode::Push, Operand::Memory(1)),
        end(),
    ]);
    assert!(validate(&r).is_ok());
    let errors = validate_with(&r, &NoMemoryPush).unwrap_err();
    assert_eq!(
        errors,
        vec![ValidationError::IllegalOperand {
            at: 0,
            opcode: Opcode::Push,
            reason: "memory push".into()
        }]
    );
}

// ============================================================
// Properties
// ============================================================

proptest! {
    /// No byte pattern makes the validator panic.
    #[test]
    fn validate_never_panics(
        bytes in prop::collection::vec(any::<u8>(), 0..128),
        offsets in prop::collection::vec(0usize..160, 0..4),
        len in 0usize..160,
    ) {
        let mut r = ContractRecord::new(bytes, "owner");
        r.byte_code_len = len;
        r.functions = offsets
            .into_iter()
            .enumerate()
            .map(|(i, off)| Function::new(format!("f{i}"), off))
            .collect();
        let _ = validate(&r);
    }

    /// A function that is only MOVEs followed by END always validates.
    #[test]
    fn straight_line_moves_validate(values in prop::collection::vec(any::<i64>(), 0..16)) {
        let mut instrs: Vec<_> = values
            .iter()
            .enumerate()
            .map(|(i, v)| mov(Operand::Immediate(*v), Operand::Register(i as u8)))
            .collect();
        instrs.push(end());
        prop_assert!(is_valid(&record(&instrs)));
    }
}
