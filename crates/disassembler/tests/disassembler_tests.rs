//! Integration tests for the regvm disassembler.

use proptest::prelude::*;
use regvm_common::opcode::ALL_OPCODES;
use regvm_common::{encode_all, Instruction, Opcode, Operand, Shape};
use regvm_disassembler::{decode_lines, disassemble, Line};

/// A representative instruction for every opcode, built from its shape.
fn sample(opcode: Opcode) -> Instruction {
    let src = Operand::Memory(0x0102);
    let dst = Operand::Indirect(7);
    match opcode.shape() {
        Shape::None => Instruction::bare(opcode),
        Shape::SourceDestBit => Instruction::with_bit(opcode, 5, src, dst),
        Shape::Source => Instruction::source_only(opcode, src),
        Shape::Dest | Shape::MemoryDest => Instruction::dest_only(opcode, dst),
        Shape::SourceDest | Shape::Send | Shape::Store | Shape::Read => {
            Instruction::source_dest(opcode, src, dst)
        }
    }
}

#[test]
fn every_opcode_renders_its_mnemonic() {
    for opcode in ALL_OPCODES {
        let code = sample(opcode).encode();
        let text = disassemble(&code);
        assert!(
            text.starts_with(&format!("0000  {}", opcode.mnemonic())),
            "{opcode:?}: {text}"
        );
        assert_eq!(text.lines().count(), 1, "{opcode:?}");
    }
}

#[test]
fn full_program_listing() {
    let code = encode_all(&[
        Instruction::source_dest(Opcode::Move, Operand::Immediate(0x10), Operand::Register(1)),
        Instruction::source_dest(Opcode::Cmp, Operand::Register(1), Operand::Memory(0x20)),
        Instruction::dest_only(Opcode::Jlt, Operand::Immediate(0)),
        Instruction::with_bit(Opcode::Ror, 2, Operand::Indirect(1), Operand::Register(2)),
        Instruction::bare(Opcode::End),
    ]);
    let expected = "\
0000  MOVE #16, r1
000b  CMP r1, [0x0020]
0010  JLT #0
001a  ROR 2, [r1], r2
001f  END
";
    assert_eq!(disassemble(&code), expected);
}

proptest! {
    /// Any byte string lists without panicking, and the lines tile the code.
    #[test]
    fn lines_tile_the_code(code in prop::collection::vec(any::<u8>(), 0..96)) {
        let lines = decode_lines(&code);
        let mut expected_at = 0;
        for line in &lines {
            prop_assert_eq!(line.offset(), expected_at);
            expected_at += match line {
                Line::Instruction { instr, .. } => instr.len(),
                Line::Byte { .. } => 1,
            };
        }
        prop_assert_eq!(expected_at, code.len());
    }
}
